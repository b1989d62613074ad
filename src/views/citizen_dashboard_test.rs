use reqwest::Method;
use serde_json::{Value, json};

use super::*;
use crate::net::mock::{MockReply, harness, signed_in};
use crate::state::session::Role;

fn user(id: &str, email: &str) -> Value {
    json!({ "id": id, "username": id, "email": email })
}

fn app(id: &str, owner: &str, status: &str) -> Value {
    json!({ "id": id, "status": status, "user": user(owner, &format!("{owner}@example.com")) })
}

#[tokio::test]
async fn keeps_only_own_applications() {
    let h = signed_in("u1@example.com", Role::Citizen);
    h.transport.on(
        Method::GET,
        "users/",
        MockReply::ok(json!([user("u1", "u1@example.com"), user("u2", "u2@example.com")])),
    );
    h.transport.on(
        Method::GET,
        "applications/",
        MockReply::ok(json!({ "results": [
            app("a1", "u1", "submitted"),
            app("a2", "u2", "ready"),
            app("a3", "u1", "ready"),
        ] })),
    );
    let mut view = CitizenDashboard::new(h.api.clone());

    view.load().await.unwrap();

    assert_eq!(view.profile().map(|u| u.id.as_str()), Some("u1"));
    let ids: Vec<_> = view.applications().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["a1", "a3"]);
    assert_eq!(view.stats().total, 2);
    assert_eq!(view.stats().count(ApplicationStatus::Ready), 1);

    view.set_filter(Some(ApplicationStatus::Submitted));
    assert_eq!(view.visible().len(), 1);
}

#[tokio::test]
async fn unknown_user_leaves_dashboard_empty() {
    let h = signed_in("ghost@example.com", Role::Citizen);
    h.transport.on(Method::GET, "users/", MockReply::ok(json!([user("u1", "u1@example.com")])));
    let mut view = CitizenDashboard::new(h.api.clone());

    view.load().await.unwrap();

    assert!(view.profile().is_none());
    assert!(view.applications().is_empty());
    assert_eq!(h.transport.calls(&Method::GET, "applications/"), 0);
}

#[tokio::test]
async fn request_failure_reports_generic_message() {
    let h = signed_in("u1@example.com", Role::Citizen);
    h.transport.on(Method::GET, "users/", MockReply::status(502, Value::Null));
    let mut view = CitizenDashboard::new(h.api.clone());

    let err = view.load().await.unwrap_err();

    assert_eq!(err.to_string(), LOAD_FAILED);
    assert_eq!(view.notice.error.as_deref(), Some(LOAD_FAILED));
}

#[tokio::test]
async fn requires_a_session() {
    let h = harness();
    let mut view = CitizenDashboard::new(h.api.clone());

    assert!(matches!(view.load().await, Err(ViewError::Invalid(_))));
    assert!(h.transport.requests().is_empty());
}
