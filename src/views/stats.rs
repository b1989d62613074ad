//! Per-status application counts.

#[cfg(test)]
#[path = "stats_test.rs"]
mod stats_test;

use std::collections::BTreeMap;

use crate::net::types::{Application, ApplicationStatus};

/// Counts for every status plus the total. A pure function of the list;
/// views rebuild it whenever their list changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    by_status: BTreeMap<ApplicationStatus, usize>,
}

impl StatusCounts {
    #[must_use]
    pub fn from_applications<'a>(applications: impl IntoIterator<Item = &'a Application>) -> Self {
        let mut counts = Self::default();
        for app in applications {
            counts.total += 1;
            *counts.by_status.entry(app.status).or_insert(0) += 1;
        }
        counts
    }

    #[must_use]
    pub fn count(&self, status: ApplicationStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Every status in display order with its count, zeros included.
    #[must_use]
    pub fn rows(&self) -> Vec<(ApplicationStatus, usize)> {
        ApplicationStatus::ALL.into_iter().map(|status| (status, self.count(status))).collect()
    }
}
