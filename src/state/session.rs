//! Session/auth store for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! The route guard, the notification poller and every authenticated request
//! read from this store. Identity changes are published on a watch channel;
//! login and logout never navigate on their own, consumers react instead.
//!
//! The store must be hydrated from persisted storage before anything renders
//! protected content. `SessionStore::open` hydrates synchronously and marks
//! the store ready.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::net::client::{ApiClient, Auth};
use crate::net::normalize::decode;
use crate::net::transport::HttpRequest;
use crate::net::types::LoginResponse;
use crate::storage::{ACCESS_KEY, KeyValueStore, REFRESH_KEY, SESSION_KEYS, StorageError, USER_KEY};

pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Citizen,
}

impl Role {
    #[must_use]
    pub fn from_is_admin(is_admin: bool) -> Self {
        if is_admin { Self::Admin } else { Self::Citizen }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Admin => "admin",
            Self::Citizen => "citizen",
        })
    }
}

/// Minimal identity record persisted under the `user` key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub role: Role,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{message}")]
    LoginFailed {
        message: String,
        #[source]
        source: ApiError,
    },
    #[error("failed to persist session: {0}")]
    Storage(#[from] StorageError),
    #[error("failed to encode identity: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    identity: watch::Sender<Option<Identity>>,
    ready: AtomicBool,
}

impl SessionStore {
    /// Create an unhydrated store. Call [`SessionStore::hydrate`] before use.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let (identity, _rx) = watch::channel(None);
        Self { storage, identity, ready: AtomicBool::new(false) }
    }

    /// Create a store and hydrate it from persisted storage.
    #[must_use]
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let store = Self::new(storage);
        store.hydrate();
        store
    }

    /// Load the persisted identity, then signal ready. A malformed record is
    /// treated as no session.
    pub fn hydrate(&self) {
        let identity = self.storage.get(USER_KEY).and_then(|raw| match serde_json::from_str::<Identity>(&raw) {
            Ok(identity) => Some(identity),
            Err(e) => {
                warn!(error = %e, "ignoring malformed persisted identity");
                None
            }
        });
        self.publish(identity);
        self.ready.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity.subscribe()
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    /// Current access token, read fresh from storage. Empty reads as absent.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.storage.get(ACCESS_KEY).filter(|t| !t.trim().is_empty())
    }

    /// Exchange credentials for tokens and persist the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::LoginFailed`] with the backend's message (or
    /// `Login failed`) when the exchange is refused, or a storage error when
    /// the session cannot be persisted.
    pub async fn login(&self, api: &ApiClient, email: &str, password: &str) -> Result<Identity, SessionError> {
        let request = HttpRequest::new(Method::POST, "login/")
            .with_json(serde_json::json!({ "email": email, "password": password }));
        let tokens: LoginResponse = api
            .send(request, Auth::Anonymous)
            .await
            .and_then(decode)
            .map_err(|e: ApiError| SessionError::LoginFailed { message: login_failure_message(&e), source: e })?;

        let identity = Identity { email: email.to_owned(), role: Role::from_is_admin(tokens.is_admin) };
        self.storage.set(ACCESS_KEY, &tokens.access)?;
        self.storage.set(REFRESH_KEY, &tokens.refresh)?;
        self.storage.set(USER_KEY, &serde_json::to_string(&identity)?)?;
        self.publish(Some(identity.clone()));

        info!(email, role = %identity.role, "logged in");
        Ok(identity)
    }

    /// Clear the session. Idempotent.
    pub fn logout(&self) {
        self.clear();
    }

    /// Clear the session after the backend rejected our credentials.
    pub(crate) fn expire(&self) {
        self.clear();
    }

    fn clear(&self) {
        for key in SESSION_KEYS {
            if let Err(e) = self.storage.remove(key) {
                warn!(error = %e, key, "failed to clear session key");
            }
        }
        self.publish(None);
    }

    fn publish(&self, identity: Option<Identity>) {
        self.identity.send_if_modified(|current| {
            if *current == identity {
                false
            } else {
                *current = identity;
                true
            }
        });
    }
}

fn login_failure_message(error: &ApiError) -> String {
    match error {
        ApiError::Unauthorized { detail: Some(message) } | ApiError::Validation { message, .. }
            if !message.is_empty() =>
        {
            message.clone()
        }
        _ => LOGIN_FAILED_MESSAGE.to_owned(),
    }
}
