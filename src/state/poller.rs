//! Background notification polling tied to the session identity.
//!
//! DESIGN
//! ======
//! One task watches the identity channel. While an identity is present it
//! refreshes immediately, then on a fixed interval (delayed, never burst, if
//! a refresh overruns). When the identity disappears the cache is cleared
//! and polling stops until someone signs in again. Switching to a different
//! identity restarts the cycle with an immediate refresh.
//!
//! Dropping the [`PollerHandle`] aborts the task.

#[cfg(test)]
#[path = "poller_test.rs"]
mod poller_test;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::notifications::NotificationStore;
use super::session::Identity;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Stop polling and wait for the task to finish.
    pub async fn shutdown(mut self) {
        self.task.abort();
        let _ = (&mut self.task).await;
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn the poller. Returns a handle for shutdown.
pub fn spawn_notification_poller(
    store: Arc<NotificationStore>,
    identity: watch::Receiver<Option<Identity>>,
    period: Duration,
) -> PollerHandle {
    let task = tokio::spawn(run(store, identity, period));
    PollerHandle { task }
}

async fn run(store: Arc<NotificationStore>, mut identity: watch::Receiver<Option<Identity>>, period: Duration) {
    loop {
        let current = identity.borrow_and_update().clone();
        match current {
            None => {
                store.clear();
                if identity.changed().await.is_err() {
                    return;
                }
            }
            Some(who) => {
                info!(email = %who.email, period_secs = period.as_secs(), "notification polling started");
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            match store.refresh().await {
                                Ok(outcome) => debug!(?outcome, "poll"),
                                Err(e) => warn!(error = %e, "poll failed"),
                            }
                        }
                        changed = identity.changed() => {
                            if changed.is_err() {
                                return;
                            }
                            info!(email = %who.email, "notification polling stopped");
                            break;
                        }
                    }
                }
            }
        }
    }
}
