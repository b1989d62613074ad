//! Route table and role guard.
//!
//! DESIGN
//! ======
//! Every navigation is checked against the current session; nothing is
//! cached. A guarded route renders only when a session exists and its role
//! matches exactly (an admin does not inherit citizen routes). Everything
//! else redirects, and redirects are followed until a route renders.
//!
//! Before the session store has hydrated the guard answers `Pending` so
//! that no protected content is produced from an unknown session.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use tracing::debug;

use crate::nav::{HOME_PATH, LOGIN_PATH};
use crate::state::session::{Identity, Role, SessionStore};

/// Upper bound on redirect hops while resolving one navigation.
pub const MAX_REDIRECTS: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Root,
    Login,
    Register,
    Dashboard,
    AdminDashboard,
    AdminCollection,
    CitizenDashboard,
    Apply,
    Status,
    StatusReference(String),
    Unknown(String),
}

/// Who may see a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Public,
    Only(Role),
    /// Never rendered; always redirects.
    Redirect,
}

impl Route {
    /// Parse a location path. Trailing slashes and query strings are ignored.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Root,
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/dashboard" => Self::Dashboard,
            "/admin/dashboard" => Self::AdminDashboard,
            "/admin/collection" => Self::AdminCollection,
            "/citizen/dashboard" => Self::CitizenDashboard,
            "/apply" => Self::Apply,
            "/status" => Self::Status,
            other => match other.strip_prefix("/status/") {
                Some(reference) if !reference.is_empty() && !reference.contains('/') => {
                    Self::StatusReference(reference.to_owned())
                }
                _ => Self::Unknown(path.to_owned()),
            },
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Root => HOME_PATH.to_owned(),
            Self::Login => LOGIN_PATH.to_owned(),
            Self::Register => "/register".to_owned(),
            Self::Dashboard => "/dashboard".to_owned(),
            Self::AdminDashboard => "/admin/dashboard".to_owned(),
            Self::AdminCollection => "/admin/collection".to_owned(),
            Self::CitizenDashboard => "/citizen/dashboard".to_owned(),
            Self::Apply => "/apply".to_owned(),
            Self::Status => "/status".to_owned(),
            Self::StatusReference(reference) => format!("/status/{reference}"),
            Self::Unknown(path) => path.clone(),
        }
    }

    #[must_use]
    pub fn access(&self) -> Access {
        match self {
            Self::Login | Self::Register => Access::Public,
            Self::AdminDashboard | Self::AdminCollection => Access::Only(Role::Admin),
            Self::CitizenDashboard | Self::Apply | Self::Status | Self::StatusReference(_) => {
                Access::Only(Role::Citizen)
            }
            Self::Root | Self::Dashboard | Self::Unknown(_) => Access::Redirect,
        }
    }

    /// Landing route for a signed-in role.
    #[must_use]
    pub fn home_for(role: Role) -> Self {
        match role {
            Role::Admin => Self::AdminDashboard,
            Role::Citizen => Self::CitizenDashboard,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Session not hydrated yet; render nothing protected.
    Pending,
    Render(Route),
    Redirect(String),
}

/// One guard step for `route` under `identity`.
#[must_use]
pub fn check(route: &Route, identity: Option<&Identity>) -> Resolution {
    match route.access() {
        Access::Public => Resolution::Render(route.clone()),
        Access::Only(role) => match identity {
            Some(who) if who.role == role => Resolution::Render(route.clone()),
            _ => Resolution::Redirect(LOGIN_PATH.to_owned()),
        },
        Access::Redirect => match route {
            Route::Root => Resolution::Redirect(LOGIN_PATH.to_owned()),
            Route::Dashboard => match identity {
                Some(who) => Resolution::Redirect(Route::home_for(who.role).path()),
                None => Resolution::Redirect(LOGIN_PATH.to_owned()),
            },
            _ => Resolution::Redirect(HOME_PATH.to_owned()),
        },
    }
}

/// Resolve `path` to the route that will render, following redirects.
///
/// Returns `Pending` before hydration, and `Redirect` only when the hop
/// limit is exhausted.
#[must_use]
pub fn resolve(path: &str, session: &SessionStore) -> Resolution {
    if !session.is_ready() {
        return Resolution::Pending;
    }
    let identity = session.identity();
    let mut route = Route::parse(path);
    for _ in 0..=MAX_REDIRECTS {
        match check(&route, identity.as_ref()) {
            Resolution::Redirect(next) => {
                debug!(from = %route.path(), to = %next, "route redirect");
                route = Route::parse(&next);
            }
            decided => return decided,
        }
    }
    Resolution::Redirect(route.path())
}
