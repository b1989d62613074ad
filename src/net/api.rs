//! Typed REST endpoints for every backend resource the client uses.
//!
//! Each function is a thin adapter: build the request, send it through
//! [`ApiClient`] (so bearer injection and the auth interceptor always run),
//! then decode through the normalization boundary.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use reqwest::Method;
use serde_json::{Value, json};

use super::client::{ApiClient, Auth};
use super::normalize::{decode, decode_list};
use super::transport::{FilePart, HttpRequest, MultipartForm};
use super::types::{
    Application, ApplicationStatus, Attachment, Branch, BranchInput, DocumentType, DocumentTypeInput, Notification,
    TrackedApplication, User,
};
use crate::error::ApiError;

// =============================================================================
// APPLICATIONS
// =============================================================================

/// Optional server-side filters for `GET applications/`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplicationQuery {
    pub status: Option<ApplicationStatus>,
    pub reference_number: Option<String>,
}

impl ApplicationQuery {
    #[must_use]
    pub fn status(status: ApplicationStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    #[must_use]
    pub fn reference(reference_number: &str) -> Self {
        Self { reference_number: Some(reference_number.to_owned()), ..Self::default() }
    }
}

/// List applications visible to the session.
///
/// # Errors
///
/// Propagates [`ApiError`] from the request or payload decoding.
pub async fn list_applications(api: &ApiClient, query: &ApplicationQuery) -> Result<Vec<Application>, ApiError> {
    let mut params: Vec<(&str, &str)> = Vec::new();
    if let Some(status) = query.status {
        params.push(("status", status.as_str()));
    }
    if let Some(reference) = query.reference_number.as_deref() {
        params.push(("reference_number", reference));
    }
    decode_list(api.get_with_query("applications/", &params).await?)
}

/// # Errors
///
/// Propagates [`ApiError`] from the request or payload decoding.
pub async fn get_application(api: &ApiClient, id: &str) -> Result<Application, ApiError> {
    decode(api.get(&format!("applications/{id}/")).await?)
}

/// Create an application for the current user.
///
/// # Errors
///
/// Propagates [`ApiError`] from the request or payload decoding.
pub async fn create_application(api: &ApiClient, document_type: &str, branch: &str) -> Result<Application, ApiError> {
    let body = json!({ "document_type": document_type, "branch": branch });
    decode(api.post("applications/", body).await?)
}

/// Move an application to `status`. No transition validation happens here;
/// the backend is the authority.
///
/// # Errors
///
/// Propagates [`ApiError`] from the request or payload decoding.
pub async fn update_status(api: &ApiClient, id: &str, status: ApplicationStatus) -> Result<Application, ApiError> {
    patch_application(api, id, json!({ "status": status })).await
}

/// Reject an application with a reason.
///
/// # Errors
///
/// Propagates [`ApiError`] from the request or payload decoding.
pub async fn reject_application(api: &ApiClient, id: &str, reason: &str) -> Result<Application, ApiError> {
    let body = json!({ "status": ApplicationStatus::Rejected, "rejection_reason": reason });
    patch_application(api, id, body).await
}

async fn patch_application(api: &ApiClient, id: &str, body: Value) -> Result<Application, ApiError> {
    decode(api.patch(&format!("applications/{id}/"), body).await?)
}

/// # Errors
///
/// Propagates [`ApiError`] from the request.
pub async fn delete_application(api: &ApiClient, id: &str) -> Result<(), ApiError> {
    api.delete(&format!("applications/{id}/")).await
}

/// Public status lookup by reference number. Sent without credentials.
///
/// # Errors
///
/// [`ApiError::NotFound`] for an unknown reference, otherwise whatever the
/// request or decoding produced.
pub async fn track_by_reference(api: &ApiClient, reference_number: &str) -> Result<TrackedApplication, ApiError> {
    let request = HttpRequest::new(Method::GET, "track-by-reference/").with_query("ref", reference_number);
    decode(api.send(request, Auth::Anonymous).await?)
}

// =============================================================================
// ATTACHMENTS
// =============================================================================

/// A file selected for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content: Vec<u8>,
    pub mime: Option<String>,
}

/// Attach a file to an application (multipart).
///
/// # Errors
///
/// Propagates [`ApiError`] from the request or payload decoding.
pub async fn upload_attachment(
    api: &ApiClient,
    application_id: &str,
    upload: Upload,
    description: Option<&str>,
) -> Result<Attachment, ApiError> {
    let mut form = MultipartForm::default();
    form.fields.push(("application".to_owned(), application_id.to_owned()));
    if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
        form.fields.push(("description".to_owned(), description.to_owned()));
    }
    form.files.push(FilePart {
        field: "file".to_owned(),
        file_name: upload.file_name,
        content: upload.content,
        mime: upload.mime,
    });
    let request = HttpRequest::new(Method::POST, "attachments/").with_multipart(form);
    decode(api.send(request, Auth::Bearer).await?)
}

// =============================================================================
// DOCUMENT TYPES
// =============================================================================

/// # Errors
///
/// Propagates [`ApiError`] from the request or payload decoding.
pub async fn list_document_types(api: &ApiClient) -> Result<Vec<DocumentType>, ApiError> {
    decode_list(api.get("document-types/").await?)
}

/// # Errors
///
/// Propagates [`ApiError`] from the request or payload decoding.
pub async fn create_document_type(api: &ApiClient, input: &DocumentTypeInput) -> Result<DocumentType, ApiError> {
    decode(api.post("document-types/", serde_json::to_value(input)?).await?)
}

/// # Errors
///
/// Propagates [`ApiError`] from the request or payload decoding.
pub async fn update_document_type(
    api: &ApiClient,
    id: &str,
    input: &DocumentTypeInput,
) -> Result<DocumentType, ApiError> {
    decode(api.put(&format!("document-types/{id}/"), serde_json::to_value(input)?).await?)
}

/// # Errors
///
/// Propagates [`ApiError`] from the request.
pub async fn delete_document_type(api: &ApiClient, id: &str) -> Result<(), ApiError> {
    api.delete(&format!("document-types/{id}/")).await
}

// =============================================================================
// BRANCHES
// =============================================================================

/// Branch list for management screens.
///
/// # Errors
///
/// Propagates [`ApiError`] from the request or payload decoding.
pub async fn list_branches(api: &ApiClient) -> Result<Vec<Branch>, ApiError> {
    decode_list(api.get("branches/").await?)
}

/// Branch list offered to citizens on the application form.
///
/// # Errors
///
/// Propagates [`ApiError`] from the request or payload decoding.
pub async fn list_registry_branches(api: &ApiClient) -> Result<Vec<Branch>, ApiError> {
    decode_list(api.get("registry-branches/").await?)
}

/// # Errors
///
/// Propagates [`ApiError`] from the request or payload decoding.
pub async fn create_branch(api: &ApiClient, input: &BranchInput) -> Result<Branch, ApiError> {
    decode(api.post("branches/", serde_json::to_value(input)?).await?)
}

/// # Errors
///
/// Propagates [`ApiError`] from the request or payload decoding.
pub async fn update_branch(api: &ApiClient, id: &str, input: &BranchInput) -> Result<Branch, ApiError> {
    decode(api.put(&format!("branches/{id}/"), serde_json::to_value(input)?).await?)
}

/// # Errors
///
/// Propagates [`ApiError`] from the request.
pub async fn delete_branch(api: &ApiClient, id: &str) -> Result<(), ApiError> {
    api.delete(&format!("branches/{id}/")).await
}

// =============================================================================
// USERS
// =============================================================================

/// Fields accepted by `POST register/`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub password: String,
}

/// Create a citizen account. Sent without credentials.
///
/// # Errors
///
/// [`ApiError::Validation`] carries flattened field errors.
pub async fn register(api: &ApiClient, registration: &Registration) -> Result<(), ApiError> {
    let request = HttpRequest::new(Method::POST, "register/").with_json(serde_json::to_value(registration)?);
    api.send(request, Auth::Anonymous).await?;
    Ok(())
}

/// # Errors
///
/// Propagates [`ApiError`] from the request or payload decoding.
pub async fn list_users(api: &ApiClient) -> Result<Vec<User>, ApiError> {
    decode_list(api.get("users/").await?)
}

/// Partially update a user. `changes` is sent as-is.
///
/// # Errors
///
/// Propagates [`ApiError`] from the request or payload decoding.
pub async fn update_user(api: &ApiClient, id: &str, changes: Value) -> Result<User, ApiError> {
    decode(api.patch(&format!("users/{id}/"), changes).await?)
}

/// # Errors
///
/// Propagates [`ApiError`] from the request.
pub async fn delete_user(api: &ApiClient, id: &str) -> Result<(), ApiError> {
    api.delete(&format!("users/{id}/")).await
}

// =============================================================================
// NOTIFICATIONS
// =============================================================================

/// # Errors
///
/// Propagates [`ApiError`] from the request or payload decoding.
pub async fn list_notifications(api: &ApiClient) -> Result<Vec<Notification>, ApiError> {
    decode_list(api.get("notifications/").await?)
}

/// # Errors
///
/// Propagates [`ApiError`] from the request.
pub async fn mark_notification_read(api: &ApiClient, id: &str) -> Result<(), ApiError> {
    api.patch(&format!("notifications/{id}/"), json!({ "is_read": true })).await?;
    Ok(())
}

/// # Errors
///
/// Propagates [`ApiError`] from the request.
pub async fn delete_notification(api: &ApiClient, id: &str) -> Result<(), ApiError> {
    api.delete(&format!("notifications/{id}/")).await
}
