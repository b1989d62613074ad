use super::*;
use crate::net::mock::{MockReply, harness, signed_in};
use crate::state::session::Role;
use reqwest::Method;
use serde_json::json;

fn notes() -> MockReply {
    MockReply::ok(json!([{
        "id": "n1",
        "title": "Ready",
        "message": "Your passport is ready",
        "type": "application_ready",
        "is_read": false,
        "created_at": "2024-05-01T10:00:00Z",
    }]))
}

async fn advance(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}

#[tokio::test(start_paused = true)]
async fn polls_immediately_then_every_period() {
    let h = signed_in("c@example.com", Role::Citizen);
    h.transport.on(Method::GET, "notifications/", notes());
    let store = Arc::new(NotificationStore::new(h.api.clone()));

    let _poller = spawn_notification_poller(store.clone(), h.session.subscribe(), DEFAULT_POLL_INTERVAL);

    advance(1).await;
    assert_eq!(h.transport.calls(&Method::GET, "notifications/"), 1);
    assert_eq!(store.unread_count(), 1);

    advance(30).await;
    assert_eq!(h.transport.calls(&Method::GET, "notifications/"), 2);

    advance(30).await;
    assert_eq!(h.transport.calls(&Method::GET, "notifications/"), 3);
}

#[tokio::test(start_paused = true)]
async fn logout_stops_polling_and_clears_cache() {
    let h = signed_in("c@example.com", Role::Citizen);
    h.transport.on(Method::GET, "notifications/", notes());
    let store = Arc::new(NotificationStore::new(h.api.clone()));
    let _poller = spawn_notification_poller(store.clone(), h.session.subscribe(), DEFAULT_POLL_INTERVAL);

    advance(45).await;
    assert_eq!(h.transport.calls(&Method::GET, "notifications/"), 2);

    h.session.logout();
    advance(300).await;

    assert_eq!(h.transport.calls(&Method::GET, "notifications/"), 2);
    assert!(store.snapshot().items.is_empty());
    assert_eq!(store.unread_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn no_polling_without_identity() {
    let h = harness();
    h.transport.on(Method::GET, "notifications/", notes());
    let store = Arc::new(NotificationStore::new(h.api.clone()));
    let _poller = spawn_notification_poller(store, h.session.subscribe(), DEFAULT_POLL_INTERVAL);

    advance(120).await;

    assert_eq!(h.transport.calls(&Method::GET, "notifications/"), 0);
}

#[tokio::test(start_paused = true)]
async fn login_starts_polling_immediately() {
    let h = harness();
    h.transport.on(Method::GET, "notifications/", notes());
    h.transport.on(Method::POST, "login/", MockReply::ok(json!({ "access": "a", "refresh": "r", "is_admin": false })));
    let store = Arc::new(NotificationStore::new(h.api.clone()));
    let _poller = spawn_notification_poller(store.clone(), h.session.subscribe(), DEFAULT_POLL_INTERVAL);
    advance(10).await;

    h.session.login(&h.api, "c@example.com", "pw").await.unwrap();
    advance(1).await;

    assert_eq!(h.transport.calls(&Method::GET, "notifications/"), 1);
    assert_eq!(store.unread_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn custom_period_is_honoured() {
    let h = signed_in("c@example.com", Role::Citizen);
    h.transport.on(Method::GET, "notifications/", notes());
    let store = Arc::new(NotificationStore::new(h.api.clone()));
    let _poller = spawn_notification_poller(store, h.session.subscribe(), Duration::from_secs(5));

    advance(11).await;

    assert_eq!(h.transport.calls(&Method::GET, "notifications/"), 3);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_task() {
    let h = signed_in("c@example.com", Role::Citizen);
    h.transport.on(Method::GET, "notifications/", notes());
    let store = Arc::new(NotificationStore::new(h.api.clone()));
    let poller = spawn_notification_poller(store, h.session.subscribe(), DEFAULT_POLL_INTERVAL);
    advance(1).await;

    poller.shutdown().await;
    advance(120).await;

    assert_eq!(h.transport.calls(&Method::GET, "notifications/"), 1);
}
