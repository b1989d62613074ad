//! UI preferences persisted alongside the session.
//!
//! Dark mode is stored as `"true"`/`"false"` under `dark_mode`. The admin
//! dashboard remembers its last open section under `admin_menu_selected`;
//! an empty value means the section menu itself.
//!
//! TRADE-OFFS
//! ==========
//! Preferences are best-effort. Unreadable or unknown values fall back to
//! defaults instead of failing the caller.

#[cfg(test)]
#[path = "prefs_test.rs"]
mod prefs_test;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::storage::{ADMIN_MENU_KEY, DARK_MODE_KEY, KeyValueStore, StorageError};

/// Sections reachable from the admin dashboard menu. Stored values match
/// what earlier clients wrote, so existing preferences keep working.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdminSection {
    ManageUsers,
    ReviewApplications,
    ApplicationStatistics,
    Settings,
    Branches,
    DocumentTypes,
}

impl AdminSection {
    pub const ALL: [Self; 6] = [
        Self::ManageUsers,
        Self::ReviewApplications,
        Self::ApplicationStatistics,
        Self::Settings,
        Self::Branches,
        Self::DocumentTypes,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ManageUsers => "Manage Users",
            Self::ReviewApplications => "Review Applications",
            Self::ApplicationStatistics => "Application Statistics",
            Self::Settings => "Settings",
            Self::Branches => "branches",
            Self::DocumentTypes => "documents",
        }
    }
}

impl fmt::Display for AdminSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown admin section: {0}")]
pub struct UnknownSection(pub String);

impl FromStr for AdminSection {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|section| section.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownSection(s.to_owned()))
    }
}

#[derive(Clone)]
pub struct Preferences {
    storage: Arc<dyn KeyValueStore>,
}

impl Preferences {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    #[must_use]
    pub fn dark_mode(&self) -> bool {
        self.storage.get(DARK_MODE_KEY).is_some_and(|v| v == "true")
    }

    /// # Errors
    ///
    /// Returns a [`StorageError`] if the preference cannot be written.
    pub fn set_dark_mode(&self, enabled: bool) -> Result<(), StorageError> {
        self.storage.set(DARK_MODE_KEY, if enabled { "true" } else { "false" })
    }

    /// Flip dark mode and return the new value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the preference cannot be written.
    pub fn toggle_dark_mode(&self) -> Result<bool, StorageError> {
        let next = !self.dark_mode();
        self.set_dark_mode(next)?;
        Ok(next)
    }

    /// Last selected admin section; `None` shows the menu.
    #[must_use]
    pub fn admin_section(&self) -> Option<AdminSection> {
        self.storage.get(ADMIN_MENU_KEY).and_then(|raw| raw.parse().ok())
    }

    /// # Errors
    ///
    /// Returns a [`StorageError`] if the preference cannot be written.
    pub fn set_admin_section(&self, section: Option<AdminSection>) -> Result<(), StorageError> {
        self.storage.set(ADMIN_MENU_KEY, section.map_or("", AdminSection::as_str))
    }
}
