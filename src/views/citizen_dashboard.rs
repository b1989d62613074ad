//! Citizen dashboard: the signed-in user's own applications.

#[cfg(test)]
#[path = "citizen_dashboard_test.rs"]
mod citizen_dashboard_test;

use super::stats::StatusCounts;
use super::{Notice, ViewError, filter_by_status};
use crate::net::api::{self, ApplicationQuery};
use crate::net::client::ApiClient;
use crate::net::types::{Application, ApplicationStatus, User};

pub const LOAD_FAILED: &str = "Failed to load your data. Please try again.";
pub const NOT_SIGNED_IN: &str = "Please log in to view your applications.";

pub struct CitizenDashboard {
    api: ApiClient,
    profile: Option<User>,
    applications: Vec<Application>,
    stats: StatusCounts,
    filter: Option<ApplicationStatus>,
    pub notice: Notice,
}

impl CitizenDashboard {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            profile: None,
            applications: Vec::new(),
            stats: StatusCounts::default(),
            filter: None,
            notice: Notice::default(),
        }
    }

    /// Resolve the session's user record by email, then load the
    /// applications whose owner is that user.
    ///
    /// No matching user record leaves the dashboard empty.
    ///
    /// # Errors
    ///
    /// [`ViewError::Invalid`] without a session; [`ViewError::Failed`] with
    /// `Failed to load your data. Please try again.` when a request fails.
    pub async fn load(&mut self) -> Result<(), ViewError> {
        let Some(identity) = self.api.session().identity() else {
            return Err(self.notice.fail(ViewError::invalid(NOT_SIGNED_IN)));
        };
        let users = match api::list_users(&self.api).await {
            Ok(users) => users,
            Err(e) => return Err(self.notice.fail(ViewError::failed(LOAD_FAILED, e))),
        };
        let Some(profile) = users.into_iter().find(|u| u.email == identity.email) else {
            self.profile = None;
            self.set_applications(Vec::new());
            return Ok(());
        };

        let all = match api::list_applications(&self.api, &ApplicationQuery::default()).await {
            Ok(all) => all,
            Err(e) => return Err(self.notice.fail(ViewError::failed(LOAD_FAILED, e))),
        };
        let mine = all
            .into_iter()
            .filter(|app| app.user.as_ref().is_some_and(|owner| owner.id == profile.id))
            .collect();
        self.profile = Some(profile);
        self.set_applications(mine);
        Ok(())
    }

    fn set_applications(&mut self, applications: Vec<Application>) {
        self.applications = applications;
        self.stats = StatusCounts::from_applications(&self.applications);
    }

    #[must_use]
    pub fn profile(&self) -> Option<&User> {
        self.profile.as_ref()
    }

    #[must_use]
    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    #[must_use]
    pub fn visible(&self) -> Vec<&Application> {
        filter_by_status(&self.applications, self.filter)
    }

    pub fn set_filter(&mut self, filter: Option<ApplicationStatus>) {
        self.filter = filter;
    }

    #[must_use]
    pub fn stats(&self) -> &StatusCounts {
        &self.stats
    }
}
