//! Wire DTOs for the registry REST API.
//!
//! DESIGN
//! ======
//! Field names mirror the backend serializers so serde needs no renames
//! beyond `type`. Optional and server-computed fields default when absent,
//! which lets list, detail and lookup endpoints share the same structs.
//!
//! Ids are opaque strings on the client. The backend may send them as JSON
//! strings (UUIDs) or numbers; both decode to the same `String`.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

// =============================================================================
// APPLICATION STATUS
// =============================================================================

/// Lifecycle status of a document application, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Submitted,
    Review,
    Approved,
    Printed,
    Ready,
    Collected,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [Self; 7] = [
        Self::Submitted,
        Self::Review,
        Self::Approved,
        Self::Printed,
        Self::Ready,
        Self::Collected,
        Self::Rejected,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Review => "review",
            Self::Approved => "approved",
            Self::Printed => "printed",
            Self::Ready => "ready",
            Self::Collected => "collected",
            Self::Rejected => "rejected",
        }
    }

    /// Human label used by the backend's choice list.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Submitted => "Submitted",
            Self::Review => "Under Review",
            Self::Approved => "Approved",
            Self::Printed => "Printed",
            Self::Ready => "Ready for Collection",
            Self::Collected => "Collected",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| UnknownStatus(s.to_owned()))
    }
}

// =============================================================================
// IDS
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(RawId::into_string)
}

fn de_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Option::<RawId>::deserialize(deserializer).map(|id| id.map(RawId::into_string))
}

// =============================================================================
// USERS
// =============================================================================

/// A registry account as returned by `users/` and nested in applications.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl User {
    /// Name shown in lists: full name, else username, else `N/A`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ if !self.username.is_empty() => &self.username,
            _ => "N/A",
        }
    }
}

/// Body of a successful `POST login/`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub is_admin: bool,
}

// =============================================================================
// APPLICATIONS
// =============================================================================

/// Uploaded supporting file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub application: Option<String>,
    /// File URL.
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// A document application as returned by `applications/`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub document_type: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub branch: Option<String>,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub qr_code: Option<String>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub document_type_name: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub applicant_name: Option<String>,
}

/// Public status lookup shape from `track-by-reference/`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackedApplication {
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub document_type: Option<DocumentType>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub branch: Option<Branch>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub qr_code: Option<String>,
}

// =============================================================================
// CATALOG
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentType {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_processing_days")]
    pub processing_days: u32,
    /// Decimal amount as serialized by the backend, e.g. `"25.00"`.
    #[serde(default = "default_fee")]
    pub fee: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Writable fields of a document type.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DocumentTypeInput {
    pub name: String,
    pub description: String,
    pub processing_days: u32,
    pub fee: String,
    pub requirements: String,
    pub is_active: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Writable fields of a registry branch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BranchInput {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
}

fn default_processing_days() -> u32 {
    1
}

fn default_fee() -> String {
    "0.00".to_owned()
}

fn default_true() -> bool {
    true
}

// =============================================================================
// NOTIFICATIONS
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    StatusUpdate,
    ApplicationApproved,
    ApplicationRejected,
    ApplicationReady,
    #[default]
    #[serde(other)]
    System,
}

/// A user notification. The client caches these and mutates `is_read`
/// only after the backend confirms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    #[serde(default)]
    pub is_read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Related application id, if any.
    #[serde(default, deserialize_with = "de_opt_id")]
    pub application: Option<String>,
}
