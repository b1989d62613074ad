//! Client core for a civil-registry document service.
//!
//! SYSTEM CONTEXT
//! ==============
//! Citizens apply for documents (birth certificates, passports, IDs) and
//! follow them through a fixed status pipeline; admins review, reject, and
//! hand over finished documents. The backend is a REST API. This crate holds
//! everything a front end needs on top of it: the authenticated HTTP client,
//! session and notification state, the route guard, and per-screen view
//! models. The `registry` binary is a command-line front end over them.
//!
//! ARCHITECTURE
//! ============
//! `net` talks to the backend and normalizes payloads. `state` owns the
//! long-lived stores (session, notifications, preferences). `views` are
//! short-lived screen models built on both. [`app::AppContext`] wires the
//! graph together and tears it down.

pub mod app;
pub mod config;
pub mod error;
pub mod nav;
pub mod net;
pub mod routes;
pub mod state;
pub mod storage;
pub mod util;
pub mod views;
