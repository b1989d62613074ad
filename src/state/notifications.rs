//! Notification cache for the signed-in user.
//!
//! DESIGN
//! ======
//! The cache only changes after the backend confirms a mutation, and a
//! refresh replaces it wholesale. The unread count is never tracked
//! incrementally; it is recomputed from the list after every change.
//!
//! Refreshes can overlap (poller tick vs a manual refresh). Each one takes a
//! sequence number when it starts; a response is applied only if no newer
//! refresh has started since, otherwise it is dropped as stale.

#[cfg(test)]
#[path = "notifications_test.rs"]
mod notifications_test;

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::net::api;
use crate::net::client::ApiClient;
use crate::net::types::Notification;

/// Result of a [`NotificationStore::refresh`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The fetched list replaced the cache.
    Applied,
    /// A newer refresh started while this one was in flight; nothing changed.
    Stale,
    /// No identity; the cache was emptied without calling the backend.
    Cleared,
}

/// Per-item result of [`NotificationStore::mark_all_as_read`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkAllSummary {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
}

/// Point-in-time copy of the cache.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NotificationSnapshot {
    pub items: Vec<Notification>,
    pub unread: usize,
    pub loading: bool,
}

#[derive(Default)]
struct Cache {
    items: Vec<Notification>,
    unread: usize,
    in_flight: usize,
    applied_seq: u64,
}

impl Cache {
    fn recount(&mut self) {
        self.unread = unread_in(&self.items);
    }
}

/// Number of unread notifications in `items`.
#[must_use]
pub fn unread_in(items: &[Notification]) -> usize {
    items.iter().filter(|n| !n.is_read).count()
}

pub struct NotificationStore {
    api: ApiClient,
    cache: Mutex<Cache>,
    issued: AtomicU64,
}

impl NotificationStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api, cache: Mutex::new(Cache::default()), issued: AtomicU64::new(0) }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Cache> {
        self.cache.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    #[must_use]
    pub fn snapshot(&self) -> NotificationSnapshot {
        let cache = self.lock();
        NotificationSnapshot { items: cache.items.clone(), unread: cache.unread, loading: cache.in_flight > 0 }
    }

    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.lock().unread
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().in_flight > 0
    }

    /// Empty the cache. In-flight refreshes started before this call are
    /// invalidated.
    pub fn clear(&self) {
        let seq = self.issued.fetch_add(1, Ordering::AcqRel) + 1;
        let mut cache = self.lock();
        cache.items.clear();
        cache.recount();
        cache.applied_seq = seq;
    }

    /// Fetch the full list for the current identity.
    ///
    /// # Errors
    ///
    /// Returns the request's [`ApiError`]; the cache is left unchanged.
    pub async fn refresh(&self) -> Result<RefreshOutcome, ApiError> {
        if self.api.session().identity().is_none() {
            self.clear();
            return Ok(RefreshOutcome::Cleared);
        }

        let seq = self.issued.fetch_add(1, Ordering::AcqRel) + 1;
        self.lock().in_flight += 1;
        let result = api::list_notifications(&self.api).await;

        let mut cache = self.lock();
        cache.in_flight = cache.in_flight.saturating_sub(1);
        let items = match result {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "notification refresh failed");
                return Err(e);
            }
        };
        if seq != self.issued.load(Ordering::Acquire) || seq <= cache.applied_seq {
            debug!(seq, "discarding stale notification refresh");
            return Ok(RefreshOutcome::Stale);
        }
        cache.items = items;
        cache.recount();
        cache.applied_seq = seq;
        debug!(count = cache.items.len(), unread = cache.unread, "notifications refreshed");
        Ok(RefreshOutcome::Applied)
    }

    /// Mark one notification read, then flip it locally.
    ///
    /// # Errors
    ///
    /// Returns the request's [`ApiError`]; the cache is left unchanged.
    pub async fn mark_as_read(&self, id: &str) -> Result<(), ApiError> {
        api::mark_notification_read(&self.api, id).await?;
        let mut cache = self.lock();
        if let Some(item) = cache.items.iter_mut().find(|n| n.id == id) {
            item.is_read = true;
        }
        cache.recount();
        Ok(())
    }

    /// Mark every cached unread notification read, one request each, all
    /// in flight at once. Only the items the backend confirmed are flipped.
    pub async fn mark_all_as_read(&self) -> MarkAllSummary {
        let unread: Vec<String> = self.lock().items.iter().filter(|n| !n.is_read).map(|n| n.id.clone()).collect();
        if unread.is_empty() {
            return MarkAllSummary::default();
        }

        let results = join_all(unread.iter().map(|id| api::mark_notification_read(&self.api, id))).await;

        let mut summary = MarkAllSummary::default();
        for (id, result) in unread.into_iter().zip(results) {
            match result {
                Ok(()) => summary.succeeded.push(id),
                Err(e) => {
                    warn!(error = %e, id, "failed to mark notification read");
                    summary.failed.push(id);
                }
            }
        }

        let mut cache = self.lock();
        for item in &mut cache.items {
            if summary.succeeded.contains(&item.id) {
                item.is_read = true;
            }
        }
        cache.recount();
        info!(succeeded = summary.succeeded.len(), failed = summary.failed.len(), "marked notifications read");
        summary
    }

    /// Delete a notification, then drop it from the cache.
    ///
    /// # Errors
    ///
    /// Returns the request's [`ApiError`]; the cache is left unchanged.
    pub async fn delete_notification(&self, id: &str) -> Result<(), ApiError> {
        api::delete_notification(&self.api, id).await?;
        let mut cache = self.lock();
        cache.items.retain(|n| n.id != id);
        cache.recount();
        Ok(())
    }
}
