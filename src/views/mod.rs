//! View models behind each screen.
//!
//! DESIGN
//! ======
//! A view model owns the screen's local state (lists, filters, drafts and
//! inline messages) and talks to the backend only through `net::api`.
//! Failures are returned as [`ViewError`] and also recorded in the view's
//! [`Notice`] so a front end can render them inline. Nothing here touches
//! the session or navigation; the HTTP wrapper already handled auth.

pub mod accounts;
pub mod admin_dashboard;
pub mod application_form;
pub mod catalog;
pub mod citizen_dashboard;
pub mod collection;
pub mod stats;
pub mod tracking;

use crate::error::ApiError;
use crate::net::types::{Application, ApplicationStatus};

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// Local validation or a confirmation gate refused the action.
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: ApiError,
    },
}

impl ViewError {
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    #[must_use]
    pub fn failed(message: impl Into<String>, source: ApiError) -> Self {
        Self::Failed { message: message.into(), source }
    }

    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Inline feedback shown above a form or list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Notice {
    pub error: Option<String>,
    pub success: Option<String>,
}

impl Notice {
    pub fn clear(&mut self) {
        self.error = None;
        self.success = None;
    }

    /// Record `err` as the inline error and hand it back.
    pub fn fail(&mut self, err: ViewError) -> ViewError {
        self.success = None;
        self.error = Some(err.message());
        err
    }

    pub fn succeed(&mut self, message: impl Into<String>) {
        self.error = None;
        self.success = Some(message.into());
    }
}

/// Narrow `applications` to one status, or keep all when `filter` is unset.
#[must_use]
pub fn filter_by_status(applications: &[Application], filter: Option<ApplicationStatus>) -> Vec<&Application> {
    applications.iter().filter(|app| filter.is_none_or(|status| app.status == status)).collect()
}
