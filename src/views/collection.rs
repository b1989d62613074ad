//! Collection desk: hand completed documents to applicants.
//!
//! DESIGN
//! ======
//! Marking an application collected is gated behind an explicit identity
//! acknowledgment. Until the admin affirms it, confirming only records an
//! inline error and nothing is sent.

#[cfg(test)]
#[path = "collection_test.rs"]
mod collection_test;

use tracing::{info, warn};

use super::{Notice, ViewError};
use crate::net::api::{self, ApplicationQuery};
use crate::net::client::ApiClient;
use crate::net::types::{Application, ApplicationStatus};

pub const LOAD_FAILED: &str = "Failed to load applications.";
pub const ENTER_REFERENCE: &str = "Please enter a reference number";
pub const FOUND_READY: &str = "Application found and ready for collection!";
pub const ALREADY_COLLECTED: &str = "This application has already been collected.";
pub const NOT_FOUND: &str = "No application found with this reference number.";
pub const SEARCH_FAILED: &str = "Failed to search for application. Please try again.";
pub const VERIFY_IDENTITY: &str = "Please verify the applicant's identity before confirming collection.";
pub const COLLECTED: &str = "Application marked as collected successfully!";
pub const COLLECT_FAILED: &str = "Failed to mark application as collected. Please try again.";
pub const NO_COLLECTION_PENDING: &str = "Select an application to collect first.";

#[must_use]
pub fn not_ready_message(status: ApplicationStatus) -> String {
    format!("Application is not ready for collection. Current status: {status}")
}

#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome {
    Ready(Application),
    AlreadyCollected(Application),
    NotReady(Application),
    NotFound,
}

/// An open collection confirmation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingCollection {
    pub application_id: String,
    pub identity_verified: bool,
}

pub struct CollectionDesk {
    api: ApiClient,
    ready: Vec<Application>,
    search_result: Option<Application>,
    pending: Option<PendingCollection>,
    pub notice: Notice,
}

impl CollectionDesk {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api, ready: Vec::new(), search_result: None, pending: None, notice: Notice::default() }
    }

    /// Load applications waiting for collection. Items the backend returns
    /// with any other status are dropped.
    ///
    /// # Errors
    ///
    /// [`ViewError::Failed`] when the request fails.
    pub async fn load_ready(&mut self) -> Result<(), ViewError> {
        match api::list_applications(&self.api, &ApplicationQuery::status(ApplicationStatus::Ready)).await {
            Ok(list) => {
                self.ready = list.into_iter().filter(|a| a.status == ApplicationStatus::Ready).collect();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to load ready applications");
                Err(ViewError::failed(LOAD_FAILED, e))
            }
        }
    }

    #[must_use]
    pub fn ready(&self) -> &[Application] {
        &self.ready
    }

    #[must_use]
    pub fn search_result(&self) -> Option<&Application> {
        self.search_result.as_ref()
    }

    #[must_use]
    pub fn pending(&self) -> Option<&PendingCollection> {
        self.pending.as_ref()
    }

    /// Look up an application by reference number.
    ///
    /// Found-but-not-ready outcomes are returned as `Ok` with the inline
    /// error set, since the result is still shown.
    ///
    /// # Errors
    ///
    /// [`ViewError::Invalid`] for a blank reference; [`ViewError::Failed`]
    /// when the request fails.
    pub async fn search(&mut self, reference: &str) -> Result<SearchOutcome, ViewError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(self.notice.fail(ViewError::invalid(ENTER_REFERENCE)));
        }
        self.notice.clear();
        self.search_result = None;

        let found = match api::list_applications(&self.api, &ApplicationQuery::reference(reference)).await {
            Ok(list) => list.into_iter().next(),
            Err(e) => return Err(self.notice.fail(ViewError::failed(SEARCH_FAILED, e))),
        };
        let Some(app) = found else {
            self.notice.error = Some(NOT_FOUND.to_owned());
            return Ok(SearchOutcome::NotFound);
        };

        self.search_result = Some(app.clone());
        let outcome = match app.status {
            ApplicationStatus::Ready => {
                self.notice.succeed(FOUND_READY);
                SearchOutcome::Ready(app)
            }
            ApplicationStatus::Collected => {
                self.notice.error = Some(ALREADY_COLLECTED.to_owned());
                SearchOutcome::AlreadyCollected(app)
            }
            other => {
                self.notice.error = Some(not_ready_message(other));
                SearchOutcome::NotReady(app)
            }
        };
        Ok(outcome)
    }

    /// Open the confirmation step for `application_id`, unverified.
    pub fn begin_collection(&mut self, application_id: &str) {
        self.pending = Some(PendingCollection { application_id: application_id.to_owned(), identity_verified: false });
    }

    pub fn set_identity_verified(&mut self, verified: bool) {
        if let Some(pending) = self.pending.as_mut() {
            pending.identity_verified = verified;
        }
    }

    pub fn cancel_collection(&mut self) {
        self.pending = None;
    }

    /// Mark the pending application collected.
    ///
    /// # Errors
    ///
    /// [`ViewError::Invalid`] when nothing is pending or identity was not
    /// verified (nothing is sent); [`ViewError::Failed`] when the backend
    /// refuses.
    pub async fn confirm_collection(&mut self) -> Result<(), ViewError> {
        let Some(pending) = self.pending.clone() else {
            return Err(self.notice.fail(ViewError::invalid(NO_COLLECTION_PENDING)));
        };
        if !pending.identity_verified {
            return Err(self.notice.fail(ViewError::invalid(VERIFY_IDENTITY)));
        }
        if let Err(e) = api::update_status(&self.api, &pending.application_id, ApplicationStatus::Collected).await {
            return Err(self.notice.fail(ViewError::failed(COLLECT_FAILED, e)));
        }

        info!(id = %pending.application_id, "application collected");
        self.pending = None;
        self.notice.succeed(COLLECTED);
        if self.search_result.as_ref().is_some_and(|a| a.id == pending.application_id) {
            self.search_result = None;
        }
        if let Err(e) = self.load_ready().await {
            warn!(error = %e, "ready list not refreshed after collection");
        }
        Ok(())
    }
}
