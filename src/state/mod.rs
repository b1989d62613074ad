//! Client state stores shared across views.

pub mod notifications;
pub mod poller;
pub mod prefs;
pub mod session;
