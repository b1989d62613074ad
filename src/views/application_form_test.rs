use std::time::Duration;

use reqwest::Method;
use serde_json::{Value, json};

use super::*;
use crate::net::mock::{Harness, MockReply, signed_in};
use crate::net::transport::RequestBody;
use crate::state::session::Role;

fn pdf() -> Upload {
    Upload { file_name: "birth.pdf".into(), content: b"%PDF-1.4".to_vec(), mime: Some("application/pdf".into()) }
}

async fn form() -> (Harness, ApplicationForm) {
    let h = signed_in("c@example.com", Role::Citizen);
    h.transport.on(
        Method::GET,
        "document-types/",
        MockReply::ok(json!({ "results": [{ "id": "d1", "name": "National ID" }, { "id": "d2", "name": "Death Certificate" }] })),
    );
    h.transport.on(Method::GET, "registry-branches/", MockReply::ok(json!([{ "id": "b1", "name": "Central" }])));
    let mut view = ApplicationForm::new(h.api.clone());
    view.load_options().await.unwrap();
    (h, view)
}

#[test]
fn requirements_follow_document_name() {
    assert_eq!(upload_requirement("National ID").title, "Upload Birth Certificate or Photocopy");
    assert_eq!(upload_requirement("PASSPORT renewal").title, "Upload Birth Certificate or Photocopy");
    assert_eq!(upload_requirement("Birth Certificate").title, "Upload Supporting Documents");
    assert!(upload_requirement("deathcertificate").description.contains("burial permit"));
    assert_eq!(upload_requirement("Marriage Licence").title, "Upload Required Documents");
    assert_eq!(upload_requirement("anything").accept, ".jpg,.jpeg,.png,.pdf");
}

#[test]
fn accepted_extensions() {
    assert!(is_accepted_file("scan.PDF"));
    assert!(is_accepted_file("photo.jpeg"));
    assert!(!is_accepted_file("notes.docx"));
    assert!(!is_accepted_file("noextension"));
}

#[tokio::test(start_paused = true)]
async fn options_load_concurrently() {
    let h = signed_in("c@example.com", Role::Citizen);
    h.transport.on(
        Method::GET,
        "document-types/",
        MockReply::ok(json!([])).delayed(Duration::from_secs(2)),
    );
    h.transport.on(
        Method::GET,
        "registry-branches/",
        MockReply::ok(json!([])).delayed(Duration::from_secs(2)),
    );
    let mut view = ApplicationForm::new(h.api.clone());

    let started = tokio::time::Instant::now();
    view.load_options().await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn options_failure_reports_generic_message() {
    let h = signed_in("c@example.com", Role::Citizen);
    h.transport.on(Method::GET, "document-types/", MockReply::ok(json!([])));
    h.transport.on(Method::GET, "registry-branches/", MockReply::status(500, Value::Null));
    let mut view = ApplicationForm::new(h.api.clone());

    let err = view.load_options().await.unwrap_err();

    assert_eq!(err.to_string(), OPTIONS_FAILED);
    assert!(view.document_types().is_empty());
}

#[tokio::test]
async fn selected_type_drives_requirement() {
    let (_h, mut view) = form().await;

    assert!(view.requirement().is_none());
    view.select_document_type(Some("d2"));

    assert_eq!(view.requirement().map(|r| r.title), Some("Upload Supporting Documents"));
}

#[tokio::test]
async fn incomplete_form_sends_nothing() {
    let (h, mut view) = form().await;
    view.select_document_type(Some("d1"));
    view.select_branch(Some("b1"));

    let err = view.submit().await.unwrap_err();

    assert_eq!(err.to_string(), INCOMPLETE);
    assert_eq!(h.transport.calls(&Method::POST, "applications/"), 0);
}

#[tokio::test]
async fn unsupported_file_is_refused() {
    let (_h, mut view) = form().await;

    let upload = Upload { file_name: "cv.docx".into(), content: vec![0], mime: None };

    assert!(matches!(view.attach(upload), Err(ViewError::Invalid(_))));
}

#[tokio::test]
async fn submit_creates_then_uploads() {
    let (h, mut view) = form().await;
    h.transport.on(
        Method::POST,
        "applications/",
        MockReply::status(201, json!({ "id": "app-9", "status": "submitted", "reference_number": "REF-9" })),
    );
    h.transport.on(Method::POST, "attachments/", MockReply::status(201, json!({ "id": "att-1" })));

    view.select_document_type(Some("d1"));
    view.select_branch(Some("b1"));
    view.attach(pdf()).unwrap();
    view.set_description("Birth certificate copy");
    let created = view.submit().await.unwrap();

    assert_eq!(created.id, "app-9");
    let create = &h.transport.requests_to(&Method::POST, "applications/")[0];
    assert_eq!(create.json(), Some(&json!({ "document_type": "d1", "branch": "b1" })));
    let upload = &h.transport.requests_to(&Method::POST, "attachments/")[0];
    let RequestBody::Multipart(form) = &upload.body else {
        panic!("expected multipart upload");
    };
    assert!(form.fields.contains(&("application".to_owned(), "app-9".to_owned())));
    assert!(form.fields.contains(&("description".to_owned(), "Birth certificate copy".to_owned())));
    assert_eq!(view.notice.success.as_deref(), Some(SUBMITTED));
    assert!(view.selected_document_type().is_none());
}

#[tokio::test]
async fn failed_upload_reports_submission_failure() {
    let (h, mut view) = form().await;
    h.transport.on(
        Method::POST,
        "applications/",
        MockReply::status(201, json!({ "id": "app-9", "status": "submitted" })),
    );
    h.transport.on(Method::POST, "attachments/", MockReply::status(400, json!({ "file": ["Invalid file."] })));

    view.select_document_type(Some("d1"));
    view.select_branch(Some("b1"));
    view.attach(pdf()).unwrap();
    let err = view.submit().await.unwrap_err();

    assert_eq!(err.to_string(), SUBMIT_FAILED);
    assert_eq!(view.notice.error.as_deref(), Some(SUBMIT_FAILED));
}
