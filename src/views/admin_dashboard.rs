//! Admin review dashboard: all applications, status filter, statistics and
//! status changes.
//!
//! DESIGN
//! ======
//! Choosing any status except `rejected` sends the PATCH immediately.
//! Choosing `rejected` only opens a draft; the PATCH carrying the reason is
//! sent when a non-blank reason is confirmed. Cancelling drops the draft
//! without contacting the backend. The local list and the statistics are
//! updated only after the backend accepts a change.

#[cfg(test)]
#[path = "admin_dashboard_test.rs"]
mod admin_dashboard_test;

use tracing::info;

use super::stats::StatusCounts;
use super::{Notice, ViewError, filter_by_status};
use crate::net::api::{self, ApplicationQuery};
use crate::net::client::ApiClient;
use crate::net::types::{Application, ApplicationStatus};
use crate::state::prefs::{AdminSection, Preferences};
use crate::storage::StorageError;

pub const LOAD_FAILED: &str = "Failed to load applications.";
pub const UPDATE_FAILED: &str = "Failed to update status. Please try again.";
pub const REJECT_FAILED: &str = "Failed to submit rejection. Please try again.";
pub const REASON_REQUIRED: &str = "Please provide a reason for rejection.";
pub const NO_REJECTION_PENDING: &str = "No rejection is pending.";

/// What happened after a status was chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusChange {
    Applied,
    /// A rejection draft was opened; confirm it with a reason.
    ReasonRequired,
}

/// A rejection waiting for its reason.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RejectionDraft {
    pub application_id: String,
    pub reason: String,
}

pub struct AdminDashboard {
    api: ApiClient,
    prefs: Preferences,
    applications: Vec<Application>,
    stats: StatusCounts,
    filter: Option<ApplicationStatus>,
    draft: Option<RejectionDraft>,
    pub notice: Notice,
}

impl AdminDashboard {
    #[must_use]
    pub fn new(api: ApiClient, prefs: Preferences) -> Self {
        Self {
            api,
            prefs,
            applications: Vec::new(),
            stats: StatusCounts::default(),
            filter: None,
            draft: None,
            notice: Notice::default(),
        }
    }

    /// Fetch every application.
    ///
    /// # Errors
    ///
    /// [`ViewError::Failed`] with `Failed to load applications.`
    pub async fn load(&mut self) -> Result<(), ViewError> {
        match api::list_applications(&self.api, &ApplicationQuery::default()).await {
            Ok(applications) => {
                self.set_applications(applications);
                Ok(())
            }
            Err(e) => Err(self.notice.fail(ViewError::failed(LOAD_FAILED, e))),
        }
    }

    fn set_applications(&mut self, applications: Vec<Application>) {
        self.applications = applications;
        self.stats = StatusCounts::from_applications(&self.applications);
    }

    #[must_use]
    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    /// Applications matching the current filter.
    #[must_use]
    pub fn visible(&self) -> Vec<&Application> {
        filter_by_status(&self.applications, self.filter)
    }

    pub fn set_filter(&mut self, filter: Option<ApplicationStatus>) {
        self.filter = filter;
    }

    #[must_use]
    pub fn filter(&self) -> Option<ApplicationStatus> {
        self.filter
    }

    #[must_use]
    pub fn stats(&self) -> &StatusCounts {
        &self.stats
    }

    #[must_use]
    pub fn draft(&self) -> Option<&RejectionDraft> {
        self.draft.as_ref()
    }

    /// Choose a new status for an application.
    ///
    /// # Errors
    ///
    /// [`ViewError::Failed`] with `Failed to update status. Please try again.`
    pub async fn select_status(&mut self, id: &str, status: ApplicationStatus) -> Result<StatusChange, ViewError> {
        if status == ApplicationStatus::Rejected {
            self.draft = Some(RejectionDraft { application_id: id.to_owned(), reason: String::new() });
            return Ok(StatusChange::ReasonRequired);
        }
        match api::update_status(&self.api, id, status).await {
            Ok(_) => {
                info!(id, %status, "application status updated");
                self.apply(id, status, None);
                Ok(StatusChange::Applied)
            }
            Err(e) => Err(self.notice.fail(ViewError::failed(UPDATE_FAILED, e))),
        }
    }

    pub fn set_rejection_reason(&mut self, reason: &str) {
        if let Some(draft) = self.draft.as_mut() {
            reason.clone_into(&mut draft.reason);
        }
    }

    /// Send the pending rejection with its reason.
    ///
    /// # Errors
    ///
    /// [`ViewError::Invalid`] when no draft is open or the reason is blank
    /// (nothing is sent); [`ViewError::Failed`] with `Failed to submit
    /// rejection. Please try again.` when the backend refuses. The draft
    /// stays open on failure.
    pub async fn confirm_rejection(&mut self) -> Result<(), ViewError> {
        let Some(draft) = self.draft.clone() else {
            return Err(self.notice.fail(ViewError::invalid(NO_REJECTION_PENDING)));
        };
        let reason = draft.reason.trim();
        if reason.is_empty() {
            return Err(self.notice.fail(ViewError::invalid(REASON_REQUIRED)));
        }
        match api::reject_application(&self.api, &draft.application_id, reason).await {
            Ok(_) => {
                info!(id = %draft.application_id, "application rejected");
                self.apply(&draft.application_id, ApplicationStatus::Rejected, Some(reason));
                self.draft = None;
                Ok(())
            }
            Err(e) => Err(self.notice.fail(ViewError::failed(REJECT_FAILED, e))),
        }
    }

    pub fn cancel_rejection(&mut self) {
        self.draft = None;
    }

    fn apply(&mut self, id: &str, status: ApplicationStatus, reason: Option<&str>) {
        if let Some(app) = self.applications.iter_mut().find(|a| a.id == id) {
            app.status = status;
            if let Some(reason) = reason {
                app.rejection_reason = Some(reason.to_owned());
            }
        }
        self.stats = StatusCounts::from_applications(&self.applications);
    }

    /// Section restored from preferences; `None` shows the menu.
    #[must_use]
    pub fn section(&self) -> Option<AdminSection> {
        self.prefs.admin_section()
    }

    /// Open a section (or the menu) and remember the choice.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the choice cannot be persisted.
    pub fn select_section(&self, section: Option<AdminSection>) -> Result<(), StorageError> {
        self.prefs.set_admin_section(section)
    }
}
