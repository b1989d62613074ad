//! Client-side location state.
//!
//! The navigator holds the current path and broadcasts changes. The HTTP
//! interceptor uses it to force `/login`; front ends subscribe to re-run the
//! route guard on every change.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use std::sync::Arc;

use tokio::sync::watch;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

#[derive(Clone, Debug)]
pub struct Navigator {
    current: Arc<watch::Sender<String>>,
}

impl Navigator {
    #[must_use]
    pub fn new(initial: &str) -> Self {
        let (tx, _rx) = watch::channel(initial.to_owned());
        Self { current: Arc::new(tx) }
    }

    /// Move to `path`. Observers are notified even when the path is unchanged,
    /// so a forced redirect to the page already shown still re-runs guards.
    pub fn navigate(&self, path: &str) {
        tracing::debug!(path, "navigate");
        self.current.send_replace(path.to_owned());
    }

    #[must_use]
    pub fn current(&self) -> String {
        self.current.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.current.subscribe()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(HOME_PATH)
    }
}
