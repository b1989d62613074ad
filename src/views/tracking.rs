//! Public status tracker by reference number.

#[cfg(test)]
#[path = "tracking_test.rs"]
mod tracking_test;

use super::{Notice, ViewError};
use crate::net::api;
use crate::net::client::ApiClient;
use crate::net::types::{ApplicationStatus, TrackedApplication};

pub const ENTER_REFERENCE: &str = "Please enter a reference number";
pub const FETCH_FAILED: &str = "Could not fetch application status. Please check the reference number.";
pub const NOT_FOUND: &str = "No application found with this reference number.";

#[must_use]
pub fn status_changed_message(status: ApplicationStatus) -> String {
    format!("Status updated: {}", status.as_str().to_ascii_uppercase())
}

#[derive(Clone, Debug, PartialEq)]
pub enum TrackOutcome {
    Found {
        application: TrackedApplication,
        /// Previous status when a re-fetch of the same reference moved it.
        changed_from: Option<ApplicationStatus>,
    },
    NotFound,
}

pub struct StatusTracker {
    api: ApiClient,
    current: Option<TrackedApplication>,
    reference: Option<String>,
    pub notice: Notice,
}

impl StatusTracker {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api, current: None, reference: None, notice: Notice::default() }
    }

    #[must_use]
    pub fn current(&self) -> Option<&TrackedApplication> {
        self.current.as_ref()
    }

    /// Fetch the status for `reference`.
    ///
    /// # Errors
    ///
    /// [`ViewError::Invalid`] for a blank reference; [`ViewError::Failed`]
    /// for failures other than an unknown reference.
    pub async fn track(&mut self, reference: &str) -> Result<TrackOutcome, ViewError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(self.notice.fail(ViewError::invalid(ENTER_REFERENCE)));
        }
        let previous = match (&self.current, self.reference.as_deref()) {
            (Some(app), Some(seen)) if seen == reference => Some(app.status),
            _ => None,
        };

        match api::track_by_reference(&self.api, reference).await {
            Ok(application) => {
                let changed_from = previous.filter(|prev| *prev != application.status);
                self.notice.clear();
                if changed_from.is_some() {
                    self.notice.succeed(status_changed_message(application.status));
                }
                self.current = Some(application.clone());
                self.reference = Some(reference.to_owned());
                Ok(TrackOutcome::Found { application, changed_from })
            }
            Err(e) => {
                self.current = None;
                self.reference = None;
                if e.is_not_found() {
                    self.notice.error = Some(NOT_FOUND.to_owned());
                    self.notice.success = None;
                    Ok(TrackOutcome::NotFound)
                } else {
                    Err(self.notice.fail(ViewError::failed(FETCH_FAILED, e)))
                }
            }
        }
    }
}
