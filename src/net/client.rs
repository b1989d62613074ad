//! HTTP client wrapper: bearer injection and the global auth interceptor.
//!
//! ARCHITECTURE
//! ============
//! Every call goes through [`ApiClient::send`]. Before sending, the access
//! token is read fresh from persisted storage. After receiving, the response
//! is inspected; a 401 or a token-invalid marker clears the session and
//! forces navigation to `/login` before the error is handed back. All other
//! failures are returned unchanged for the caller to render inline.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use super::transport::{HttpRequest, HttpResponse, Transport};
use crate::error::{ApiError, is_auth_failure};
use crate::nav::{LOGIN_PATH, Navigator};
use crate::state::session::SessionStore;

/// Whether a request carries the session's bearer token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Auth {
    Bearer,
    Anonymous,
}

/// Shared REST client. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    navigator: Navigator,
}

impl ApiClient {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, session: Arc<SessionStore>, navigator: Navigator) -> Self {
        Self { transport, session, navigator }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Send a request and return the JSON body of a successful response.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`] for non-2xx responses and
    /// transport failures.
    pub async fn send(&self, mut request: HttpRequest, auth: Auth) -> Result<Value, ApiError> {
        request.bearer = match auth {
            Auth::Bearer => self.session.access_token(),
            Auth::Anonymous => None,
        };
        let method = request.method.clone();
        let path = request.path.clone();

        let response = self.transport.send(request).await.map_err(|e| {
            warn!(error = %e, %method, %path, "request failed before a response");
            e
        })?;
        debug!(%method, %path, status = response.status, "response");

        self.intercept(response)
    }

    fn intercept(&self, response: HttpResponse) -> Result<Value, ApiError> {
        if response.is_success() {
            return Ok(response.body);
        }
        if is_auth_failure(response.status, &response.body) {
            warn!(status = response.status, "credentials rejected; clearing session");
            self.session.expire();
            self.navigator.navigate(LOGIN_PATH);
        }
        Err(ApiError::from_response(response.status, &response.body))
    }

    /// `GET` with the session token.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.send(HttpRequest::new(Method::GET, path), Auth::Bearer).await
    }

    /// `GET` with query parameters and the session token.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get_with_query(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        let request = query
            .iter()
            .fold(HttpRequest::new(Method::GET, path), |req, (k, v)| req.with_query(k, *v));
        self.send(request, Auth::Bearer).await
    }

    /// `POST` a JSON body with the session token.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.send(HttpRequest::new(Method::POST, path).with_json(body), Auth::Bearer).await
    }

    /// `PATCH` a JSON body with the session token.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn patch(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.send(HttpRequest::new(Method::PATCH, path).with_json(body), Auth::Bearer).await
    }

    /// `PUT` a JSON body with the session token.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn put(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.send(HttpRequest::new(Method::PUT, path).with_json(body), Auth::Bearer).await
    }

    /// `DELETE` with the session token.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(HttpRequest::new(Method::DELETE, path), Auth::Bearer).await?;
        Ok(())
    }
}
