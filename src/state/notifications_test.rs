use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::net::mock::{MockReply, harness, signed_in};
use crate::state::session::Role;
use reqwest::Method;
use serde_json::{Value, json};

fn note(id: &str, is_read: bool) -> Value {
    json!({
        "id": id,
        "title": format!("Update {id}"),
        "message": "Your application moved",
        "type": "status_update",
        "is_read": is_read,
        "created_at": "2024-05-01T10:00:00Z",
    })
}

fn assert_unread_invariant(store: &NotificationStore) {
    let snap = store.snapshot();
    assert_eq!(snap.unread, snap.items.iter().filter(|n| !n.is_read).count());
}

fn seeded(items: Value) -> (crate::net::mock::Harness, NotificationStore) {
    let h = signed_in("c@example.com", Role::Citizen);
    h.transport.on(Method::GET, "notifications/", MockReply::ok(items));
    let store = NotificationStore::new(h.api.clone());
    (h, store)
}

// =============================================================================
// Refresh
// =============================================================================

#[tokio::test]
async fn refresh_replaces_cache_and_counts_unread() {
    let (_h, store) = seeded(json!([note("a", false), note("b", true), note("c", false)]));

    assert_eq!(store.refresh().await.unwrap(), RefreshOutcome::Applied);

    assert_eq!(store.snapshot().items.len(), 3);
    assert_eq!(store.unread_count(), 2);
    assert!(!store.is_loading());
    assert_unread_invariant(&store);
}

#[tokio::test]
async fn refresh_accepts_paginated_payload() {
    let (_h, store) = seeded(json!({ "results": [note("a", false)] }));

    store.refresh().await.unwrap();

    assert_eq!(store.unread_count(), 1);
}

#[tokio::test]
async fn refresh_without_identity_clears_without_calling_backend() {
    let (h, store) = seeded(json!([note("a", false)]));
    store.refresh().await.unwrap();

    h.session.logout();
    assert_eq!(store.refresh().await.unwrap(), RefreshOutcome::Cleared);

    assert!(store.snapshot().items.is_empty());
    assert_eq!(store.unread_count(), 0);
    assert_eq!(h.transport.calls(&Method::GET, "notifications/"), 1);
}

#[tokio::test]
async fn failed_refresh_keeps_previous_cache() {
    let (h, store) = seeded(json!([note("a", false)]));
    store.refresh().await.unwrap();

    h.transport.on(Method::GET, "notifications/", MockReply::status(500, json!({ "detail": "down" })));
    assert!(store.refresh().await.is_err());

    assert_eq!(store.snapshot().items.len(), 1);
    assert!(!store.is_loading());
}

#[tokio::test(start_paused = true)]
async fn stale_refresh_never_overwrites_newer_one() {
    let h = signed_in("c@example.com", Role::Citizen);
    h.transport.on_fn(Method::GET, "notifications/", |_, call| {
        if call == 0 {
            MockReply::ok(json!([note("old", false)])).delayed(Duration::from_millis(500))
        } else {
            MockReply::ok(json!([note("new", true)])).delayed(Duration::from_millis(10))
        }
    });
    let store = Arc::new(NotificationStore::new(h.api.clone()));

    let slow = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.refresh().await }
    });
    tokio::task::yield_now().await;
    let fast = store.refresh().await.unwrap();
    let slow = slow.await.unwrap().unwrap();

    assert_eq!(fast, RefreshOutcome::Applied);
    assert_eq!(slow, RefreshOutcome::Stale);
    let snap = store.snapshot();
    assert_eq!(snap.items.len(), 1);
    assert_eq!(snap.items[0].id, "new");
    assert_eq!(snap.unread, 0);
}

#[tokio::test(start_paused = true)]
async fn loading_flag_tracks_in_flight_refresh() {
    let h = signed_in("c@example.com", Role::Citizen);
    h.transport.on(
        Method::GET,
        "notifications/",
        MockReply::ok(json!([])).delayed(Duration::from_secs(1)),
    );
    let store = Arc::new(NotificationStore::new(h.api.clone()));

    let task = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.refresh().await }
    });
    tokio::task::yield_now().await;
    assert!(store.is_loading());

    task.await.unwrap().unwrap();
    assert!(!store.is_loading());
}

// =============================================================================
// Mutations
// =============================================================================

#[tokio::test]
async fn mark_as_read_flips_flag_after_success() {
    let (h, store) = seeded(json!([note("a", false), note("b", false)]));
    h.transport.on(Method::PATCH, "notifications/a/", MockReply::ok(json!({})));
    store.refresh().await.unwrap();

    store.mark_as_read("a").await.unwrap();

    assert_eq!(store.unread_count(), 1);
    assert!(store.snapshot().items.iter().find(|n| n.id == "a").unwrap().is_read);
    assert_unread_invariant(&store);
}

#[tokio::test]
async fn mark_as_read_twice_never_goes_negative() {
    let (h, store) = seeded(json!([note("a", false)]));
    h.transport.on(Method::PATCH, "notifications/a/", MockReply::ok(json!({})));
    store.refresh().await.unwrap();

    store.mark_as_read("a").await.unwrap();
    store.mark_as_read("a").await.unwrap();

    assert_eq!(store.unread_count(), 0);
}

#[tokio::test]
async fn failed_mark_as_read_leaves_cache_untouched() {
    let (h, store) = seeded(json!([note("a", false)]));
    h.transport.on(Method::PATCH, "notifications/a/", MockReply::status(500, Value::Null));
    store.refresh().await.unwrap();

    assert!(store.mark_as_read("a").await.is_err());

    assert_eq!(store.unread_count(), 1);
}

#[tokio::test]
async fn mark_all_as_read_flips_every_unread_item() {
    let (h, store) = seeded(json!([note("a", false), note("b", true), note("c", false), note("d", false)]));
    for id in ["a", "c", "d"] {
        h.transport.on(Method::PATCH, &format!("notifications/{id}/"), MockReply::ok(json!({})));
    }
    store.refresh().await.unwrap();

    let summary = store.mark_all_as_read().await;

    assert_eq!(summary.succeeded.len(), 3);
    assert!(summary.failed.is_empty());
    assert_eq!(store.unread_count(), 0);
    assert!(store.snapshot().items.iter().all(|n| n.is_read));
    assert_eq!(h.transport.calls(&Method::PATCH, "notifications/b/"), 0);
}

#[tokio::test]
async fn mark_all_as_read_only_flips_confirmed_items() {
    let (h, store) = seeded(json!([note("a", false), note("b", false)]));
    h.transport.on(Method::PATCH, "notifications/a/", MockReply::ok(json!({})));
    h.transport.on(Method::PATCH, "notifications/b/", MockReply::status(500, Value::Null));
    store.refresh().await.unwrap();

    let summary = store.mark_all_as_read().await;

    assert_eq!(summary.succeeded, vec!["a".to_owned()]);
    assert_eq!(summary.failed, vec!["b".to_owned()]);
    assert_eq!(store.unread_count(), 1);
    assert_unread_invariant(&store);
}

#[tokio::test]
async fn mark_all_with_nothing_unread_sends_nothing() {
    let (h, store) = seeded(json!([note("a", true)]));
    store.refresh().await.unwrap();

    let summary = store.mark_all_as_read().await;

    assert_eq!(summary, MarkAllSummary::default());
    assert_eq!(h.transport.requests().len(), 1);
}

#[tokio::test]
async fn delete_adjusts_count_only_for_unread_items() {
    let (h, store) = seeded(json!([note("a", false), note("b", true), note("c", false)]));
    h.transport.on(Method::DELETE, "notifications/b/", MockReply::status(204, Value::Null));
    h.transport.on(Method::DELETE, "notifications/c/", MockReply::status(204, Value::Null));
    store.refresh().await.unwrap();

    store.delete_notification("b").await.unwrap();
    assert_eq!(store.unread_count(), 2);

    store.delete_notification("c").await.unwrap();
    assert_eq!(store.unread_count(), 1);
    assert_eq!(store.snapshot().items.len(), 1);
    assert_unread_invariant(&store);
}

#[tokio::test]
async fn failed_delete_keeps_item() {
    let (_h, store) = seeded(json!([note("a", false)]));
    store.refresh().await.unwrap();

    // Unregistered route answers 404.
    assert!(store.delete_notification("a").await.is_err());

    assert_eq!(store.snapshot().items.len(), 1);
}

#[test]
fn empty_store_has_zero_unread() {
    let h = harness();
    let store = NotificationStore::new(h.api.clone());
    assert_eq!(store.snapshot(), NotificationSnapshot::default());
}
