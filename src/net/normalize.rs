//! Normalization boundary for backend payload shapes.
//!
//! DESIGN
//! ======
//! List endpoints answer either with a bare JSON array or with a paginated
//! envelope (`{ "results": [...] }`). Error bodies are a `detail` string, a
//! map of field errors, or plain text. Everything is converted here into one
//! canonical shape so views never branch on payload layout.

#[cfg(test)]
#[path = "normalize_test.rs"]
mod normalize_test;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Either list layout the backend may return.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Bare(Vec<T>),
    Paginated {
        results: Vec<T>,
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
    },
}

impl<T> ListPayload<T> {
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Paginated { results: items, .. } => items,
        }
    }
}

/// Decode a list response of either layout into a plain `Vec`.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] when the payload is neither an array nor an
/// object, or when an item does not match `T`.
pub fn decode_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, ApiError> {
    let payload: ListPayload<T> = serde_json::from_value(value)?;
    Ok(payload.into_items())
}

/// Decode a single resource body.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] when the body does not match `T`.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    Ok(serde_json::from_value(value)?)
}

/// Pick the most specific human-readable message out of an error body.
///
/// Preference order: `detail`, then every field error flattened in key
/// order, then `fallback`.
#[must_use]
pub fn error_message(body: &Value, fallback: &str) -> String {
    if let Some(detail) = body.get("detail").and_then(Value::as_str) {
        return detail.to_owned();
    }
    let parts = flatten_messages(body);
    if parts.is_empty() { fallback.to_owned() } else { parts.join(", ") }
}

fn flatten_messages(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => vec![s.clone()],
        Value::Array(items) => items.iter().flat_map(flatten_messages).collect(),
        Value::Object(map) => map.values().flat_map(flatten_messages).collect(),
        _ => Vec::new(),
    }
}
