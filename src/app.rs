//! Application context: builds every store once and tears it down at exit.
//!
//! DESIGN
//! ======
//! Construction order follows the dependency graph: storage, session
//! (hydrated immediately), navigator, HTTP client, notification store,
//! preferences. Nothing is global; front ends receive the context and hand
//! clones of the pieces they need to view models.
//!
//! Polling is opt-in. A one-shot CLI command never starts it; long-running
//! front ends call [`AppContext::start_polling`] once inside the runtime.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use tracing::info;

use crate::config::ClientConfig;
use crate::nav::Navigator;
use crate::net::client::ApiClient;
use crate::net::transport::{ReqwestTransport, Transport};
use crate::routes::{self, Resolution};
use crate::state::notifications::NotificationStore;
use crate::state::poller::{PollerHandle, spawn_notification_poller};
use crate::state::prefs::Preferences;
use crate::state::session::SessionStore;
use crate::storage::{FileStore, KeyValueStore};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

pub struct AppContext {
    config: ClientConfig,
    session: Arc<SessionStore>,
    navigator: Navigator,
    api: ApiClient,
    notifications: Arc<NotificationStore>,
    prefs: Preferences,
    poller: Option<PollerHandle>,
}

impl AppContext {
    /// Production wiring: file-backed storage and a reqwest transport.
    ///
    /// # Errors
    ///
    /// [`AppError::Http`] if the HTTP client cannot be built.
    pub fn open(config: ClientConfig) -> Result<Self, AppError> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.state_file));
        let transport =
            ReqwestTransport::new(config.api_base_url.clone(), config.timeouts.request(), config.timeouts.connect())?;
        info!(base_url = %config.api_base_url, state_file = %config.state_file.display(), "client context opened");
        Ok(Self::with_parts(config, Arc::new(transport), storage))
    }

    /// Wire the context over an explicit transport and storage.
    #[must_use]
    pub fn with_parts(config: ClientConfig, transport: Arc<dyn Transport>, storage: Arc<dyn KeyValueStore>) -> Self {
        let session = Arc::new(SessionStore::open(storage.clone()));
        let navigator = Navigator::default();
        let api = ApiClient::new(transport, session.clone(), navigator.clone());
        let notifications = Arc::new(NotificationStore::new(api.clone()));
        let prefs = Preferences::new(storage);
        Self { config, session, navigator, api, notifications, prefs, poller: None }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn notifications(&self) -> &Arc<NotificationStore> {
        &self.notifications
    }

    #[must_use]
    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    /// Start the notification poller at the configured interval. Calling it
    /// again while a poller runs does nothing.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn start_polling(&mut self) {
        if self.poller.is_some() {
            return;
        }
        let handle =
            spawn_notification_poller(self.notifications.clone(), self.session.subscribe(), self.config.poll_interval);
        self.poller = Some(handle);
    }

    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|p| !p.is_finished())
    }

    /// Guard `path` for the current session and move the navigator to where
    /// it lands.
    pub fn open_route(&self, path: &str) -> Resolution {
        let resolution = routes::resolve(path, &self.session);
        match &resolution {
            Resolution::Render(route) => self.navigator.navigate(&route.path()),
            Resolution::Redirect(path) => self.navigator.navigate(path),
            Resolution::Pending => {}
        }
        resolution
    }

    /// Stop background work. Session data stays persisted.
    pub async fn shutdown(mut self) {
        if let Some(poller) = self.poller.take() {
            poller.shutdown().await;
        }
        info!("client context closed");
    }
}
