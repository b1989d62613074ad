//! Networking: transport, the auth-aware client wrapper, resource endpoints
//! and the payload normalization boundary.

pub mod api;
pub mod client;
pub mod normalize;
pub mod transport;
pub mod types;

#[cfg(test)]
pub mod mock;
