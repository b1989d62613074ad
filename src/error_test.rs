use super::*;
use serde_json::json;

#[test]
fn status_401_is_unauthorized() {
    let err = ApiError::from_response(401, &json!({ "detail": "Invalid email or password." }));
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Invalid email or password.");
}

#[test]
fn token_marker_is_unauthorized_regardless_of_status() {
    let body = json!({
        "detail": "Given token not valid for any token type",
        "code": "token_not_valid"
    });
    assert!(is_auth_failure(403, &body));
    assert!(ApiError::from_response(403, &body).is_unauthorized());
}

#[test]
fn unrelated_403_is_not_an_auth_failure() {
    let body = json!({ "detail": "You do not have permission to perform this action." });
    assert!(!is_auth_failure(403, &body));
    assert!(matches!(ApiError::from_response(403, &body), ApiError::Server { status: 403, .. }));
}

#[test]
fn status_400_keeps_field_errors() {
    let err = ApiError::from_response(400, &json!({ "email": ["This email is already taken."] }));
    match err {
        ApiError::Validation { message, body } => {
            assert_eq!(message, "This email is already taken.");
            assert!(body.get("email").is_some());
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn status_404_is_not_found() {
    let err = ApiError::from_response(404, &json!({ "detail": "Application not found." }));
    assert!(err.is_not_found());
}

#[test]
fn user_message_prefers_backend_text_for_validation() {
    let err = ApiError::from_response(400, &json!({ "detail": "Reference number is required." }));
    assert_eq!(err.user_message("generic"), "Reference number is required.");
}

#[test]
fn user_message_uses_fallback_for_network_and_server() {
    assert_eq!(ApiError::Network("refused".into()).user_message("Try again."), "Try again.");
    let err = ApiError::from_response(500, &json!({ "detail": "boom" }));
    assert_eq!(err.user_message("Try again."), "Try again.");
}
