use reqwest::Method;
use serde_json::{Value, json};

use super::*;
use crate::net::mock::{Harness, MockReply, signed_in};
use crate::state::session::Role;

fn app(id: &str, status: &str) -> Value {
    json!({ "id": id, "status": status, "reference_number": format!("REF-{id}") })
}

fn desk() -> (Harness, CollectionDesk) {
    let h = signed_in("admin@example.com", Role::Admin);
    let view = CollectionDesk::new(h.api.clone());
    (h, view)
}

#[tokio::test]
async fn ready_list_drops_other_statuses() {
    let (h, mut view) = desk();
    h.transport.on(Method::GET, "applications/", MockReply::ok(json!([app("1", "ready"), app("2", "collected")])));

    view.load_ready().await.unwrap();

    assert_eq!(view.ready().len(), 1);
    let sent = h.transport.requests_to(&Method::GET, "applications/");
    assert_eq!(sent[0].query_value("status"), Some("ready"));
}

#[tokio::test]
async fn blank_reference_is_rejected_locally() {
    let (h, mut view) = desk();

    let err = view.search("   ").await.unwrap_err();

    assert_eq!(err.to_string(), ENTER_REFERENCE);
    assert!(h.transport.requests().is_empty());
}

#[tokio::test]
async fn search_outcomes_follow_status() {
    let (h, mut view) = desk();

    h.transport.on(Method::GET, "applications/", MockReply::ok(json!([app("1", "ready")])));
    assert!(matches!(view.search("REF-1").await.unwrap(), SearchOutcome::Ready(_)));
    assert_eq!(view.notice.success.as_deref(), Some(FOUND_READY));

    h.transport.on(Method::GET, "applications/", MockReply::ok(json!([app("2", "collected")])));
    assert!(matches!(view.search("REF-2").await.unwrap(), SearchOutcome::AlreadyCollected(_)));
    assert_eq!(view.notice.error.as_deref(), Some(ALREADY_COLLECTED));

    h.transport.on(Method::GET, "applications/", MockReply::ok(json!([app("3", "printed")])));
    assert!(matches!(view.search("REF-3").await.unwrap(), SearchOutcome::NotReady(_)));
    assert_eq!(
        view.notice.error.as_deref(),
        Some("Application is not ready for collection. Current status: printed")
    );
    assert_eq!(view.search_result().map(|a| a.id.as_str()), Some("3"));

    h.transport.on(Method::GET, "applications/", MockReply::ok(json!([])));
    assert_eq!(view.search("REF-4").await.unwrap(), SearchOutcome::NotFound);
    assert_eq!(view.notice.error.as_deref(), Some(NOT_FOUND));
    assert!(view.search_result().is_none());

    let sent = h.transport.requests_to(&Method::GET, "applications/");
    assert_eq!(sent[0].query_value("reference_number"), Some("REF-1"));
}

#[tokio::test]
async fn search_failure_uses_generic_message() {
    let (h, mut view) = desk();
    h.transport.on(Method::GET, "applications/", MockReply::status(500, Value::Null));

    let err = view.search("REF-1").await.unwrap_err();

    assert_eq!(err.to_string(), SEARCH_FAILED);
}

#[tokio::test]
async fn collection_requires_identity_verification() {
    let (h, mut view) = desk();
    h.transport.on(Method::PATCH, "applications/1/", MockReply::ok(app("1", "collected")));

    view.begin_collection("1");
    let err = view.confirm_collection().await.unwrap_err();

    assert_eq!(err.to_string(), VERIFY_IDENTITY);
    assert_eq!(h.transport.calls(&Method::PATCH, "applications/1/"), 0);
    assert!(view.pending().is_some());
}

#[tokio::test]
async fn verified_collection_patches_and_reloads() {
    let (h, mut view) = desk();
    h.transport.on_fn(Method::GET, "applications/", |req, _| {
        if req.query_value("status") == Some("ready") {
            MockReply::ok(json!([]))
        } else {
            MockReply::ok(json!([app("1", "ready")]))
        }
    });
    h.transport.on(Method::PATCH, "applications/1/", MockReply::ok(app("1", "collected")));
    view.search("REF-1").await.unwrap();

    view.begin_collection("1");
    view.set_identity_verified(true);
    view.confirm_collection().await.unwrap();

    let sent = h.transport.requests_to(&Method::PATCH, "applications/1/");
    assert_eq!(sent[0].json(), Some(&json!({ "status": "collected" })));
    assert_eq!(view.notice.success.as_deref(), Some(COLLECTED));
    assert!(view.search_result().is_none());
    assert!(view.pending().is_none());
    assert!(view.ready().is_empty());
}

#[tokio::test]
async fn cancelled_collection_sends_nothing() {
    let (h, mut view) = desk();

    view.begin_collection("1");
    view.set_identity_verified(true);
    view.cancel_collection();

    assert!(view.confirm_collection().await.is_err());
    assert!(h.transport.requests().is_empty());
}
