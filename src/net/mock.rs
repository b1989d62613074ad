//! Scripted transport and wiring helpers for tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Method;
use serde_json::{Value, json};

use super::client::ApiClient;
use super::transport::{HttpRequest, HttpResponse, Transport};
use crate::error::ApiError;
use crate::nav::Navigator;
use crate::state::session::{Identity, Role, SessionStore};
use crate::storage::{ACCESS_KEY, KeyValueStore, MemoryStore, REFRESH_KEY, USER_KEY};

#[derive(Clone, Debug)]
pub struct MockReply {
    pub status: u16,
    pub body: Value,
    pub delay: Option<Duration>,
}

impl MockReply {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body, delay: None }
    }

    pub fn status(status: u16, body: Value) -> Self {
        Self { status, body, delay: None }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type Responder = Arc<dyn Fn(&HttpRequest, usize) -> MockReply + Send + Sync>;

struct MockRoute {
    method: Method,
    path: String,
    responder: Responder,
    calls: usize,
}

/// Matches on method + path (query ignored). Later registrations win.
/// Unmatched requests answer 404.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<MockRoute>>,
    log: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, method: Method, path: &str, reply: MockReply) {
        self.on_fn(method, path, move |_, _| reply.clone());
    }

    /// Register a responder that sees the request and its 0-based call index.
    pub fn on_fn<F>(&self, method: Method, path: &str, f: F)
    where
        F: Fn(&HttpRequest, usize) -> MockReply + Send + Sync + 'static,
    {
        self.routes.lock().unwrap().push(MockRoute {
            method,
            path: path.trim_start_matches('/').to_owned(),
            responder: Arc::new(f),
            calls: 0,
        });
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<HttpRequest> {
        let path = path.trim_start_matches('/');
        self.requests().into_iter().filter(|r| &r.method == method && r.path == path).collect()
    }

    pub fn calls(&self, method: &Method, path: &str) -> usize {
        self.requests_to(method, path).len()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.log.lock().unwrap().push(request.clone());
        let reply = {
            let mut routes = self.routes.lock().unwrap();
            match routes.iter_mut().rev().find(|r| r.method == request.method && r.path == request.path) {
                Some(route) => {
                    let index = route.calls;
                    route.calls += 1;
                    (route.responder)(&request, index)
                }
                None => MockReply::status(404, json!({ "detail": "Not found." })),
            }
        };
        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(HttpResponse { status: reply.status, body: reply.body })
    }
}

// =============================================================================
// WIRING
// =============================================================================

/// Storage that counts removals per key.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    removals: Mutex<Vec<String>>,
}

impl CountingStore {
    pub fn removals_of(&self, key: &str) -> usize {
        self.removals.lock().unwrap().iter().filter(|k| *k == key).count()
    }
}

impl KeyValueStore for CountingStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), crate::storage::StorageError> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), crate::storage::StorageError> {
        self.removals.lock().unwrap().push(key.to_owned());
        self.inner.remove(key)
    }
}

pub struct Harness {
    pub transport: Arc<MockTransport>,
    pub storage: Arc<CountingStore>,
    pub session: Arc<SessionStore>,
    pub navigator: Navigator,
    pub api: ApiClient,
}

/// Fresh client with no session.
pub fn harness() -> Harness {
    let storage = Arc::new(CountingStore::default());
    build(storage)
}

/// Client with a persisted session for `email` in `role`.
pub fn signed_in(email: &str, role: Role) -> Harness {
    let storage = Arc::new(CountingStore::default());
    let identity = Identity { email: email.to_owned(), role };
    storage.set(ACCESS_KEY, "access-token").unwrap();
    storage.set(REFRESH_KEY, "refresh-token").unwrap();
    storage.set(USER_KEY, &serde_json::to_string(&identity).unwrap()).unwrap();
    build(storage)
}

fn build(storage: Arc<CountingStore>) -> Harness {
    let transport = MockTransport::new();
    let session = Arc::new(SessionStore::open(storage.clone()));
    let navigator = Navigator::default();
    let api = ApiClient::new(transport.clone(), session.clone(), navigator.clone());
    Harness { transport, storage, session, navigator, api }
}
