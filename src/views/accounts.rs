//! Account screens: self-registration, profile editing and the admin user
//! directory.

#[cfg(test)]
#[path = "accounts_test.rs"]
mod accounts_test;

use serde::Serialize;
use tracing::info;

use super::{Notice, ViewError};
use crate::net::api::{self, Registration};
use crate::net::client::ApiClient;
use crate::net::types::User;

pub const PASSWORD_MISMATCH: &str = "Passwords do not match.";
pub const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";
pub const REGISTERED: &str = "Registration successful! Redirecting to login...";
pub const PROFILE_LOAD_FAILED: &str = "Failed to load profile data.";
pub const PROFILE_UPDATE_FAILED: &str = "Failed to update profile. Please try again.";
pub const PROFILE_UPDATED: &str = "Profile updated successfully!";
pub const USERS_LOAD_FAILED: &str = "Failed to load users.";
pub const USER_UPDATE_FAILED: &str = "Failed to update user. Please try again.";
pub const USER_DELETE_FAILED: &str = "Failed to delete user. Please try again.";

// =============================================================================
// REGISTRATION
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub date_of_birth: String,
    pub gender: String,
    pub phone_number: String,
    pub address: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    fn to_request(&self) -> Registration {
        let optional = |v: &str| Some(v.trim().to_owned()).filter(|v| !v.is_empty());
        Registration {
            username: self.username.trim().to_owned(),
            email: self.email.trim().to_owned(),
            full_name: self.full_name.trim().to_owned(),
            phone_number: self.phone_number.trim().to_owned(),
            date_of_birth: optional(&self.date_of_birth),
            gender: optional(&self.gender),
            address: optional(&self.address),
            password: self.password.clone(),
        }
    }
}

/// Create a citizen account. Sent without credentials; the caller moves to
/// the login screen on success.
///
/// # Errors
///
/// [`ViewError::Invalid`] when the passwords differ (nothing is sent);
/// [`ViewError::Failed`] carrying the backend's field errors, or
/// `Registration failed. Please try again.` when there are none.
pub async fn register(api: &ApiClient, form: &RegistrationForm, notice: &mut Notice) -> Result<(), ViewError> {
    notice.clear();
    if form.password != form.confirm_password {
        return Err(notice.fail(ViewError::invalid(PASSWORD_MISMATCH)));
    }
    match api::register(api, &form.to_request()).await {
        Ok(()) => {
            info!(email = %form.email.trim(), "account registered");
            notice.succeed(REGISTERED);
            Ok(())
        }
        Err(e) => {
            let message = e.user_message(REGISTRATION_FAILED);
            Err(notice.fail(ViewError::failed(message, e)))
        }
    }
}

// =============================================================================
// PROFILE
// =============================================================================

/// Editable profile fields. Password fields blank means unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    pub confirm_password: String,
}

impl ProfileForm {
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            full_name: user.full_name.clone().unwrap_or_default(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone().unwrap_or_default(),
            password: String::new(),
            confirm_password: String::new(),
        }
    }
}

#[derive(Serialize)]
struct ProfileUpdate<'a> {
    username: &'a str,
    full_name: &'a str,
    email: &'a str,
    phone_number: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
}

pub struct ProfileEditor {
    api: ApiClient,
    user: Option<User>,
    pub form: ProfileForm,
    pub notice: Notice,
}

impl ProfileEditor {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api, user: None, form: ProfileForm::default(), notice: Notice::default() }
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Find the session's user record and prefill the form.
    ///
    /// # Errors
    ///
    /// [`ViewError::NotFound`] when no session or no matching record exists;
    /// [`ViewError::Failed`] when the request fails.
    pub async fn load(&mut self) -> Result<(), ViewError> {
        let Some(identity) = self.api.session().identity() else {
            return Err(self.notice.fail(ViewError::NotFound(PROFILE_LOAD_FAILED.to_owned())));
        };
        let users = match api::list_users(&self.api).await {
            Ok(users) => users,
            Err(e) => return Err(self.notice.fail(ViewError::failed(PROFILE_LOAD_FAILED, e))),
        };
        let Some(user) = users.into_iter().find(|u| u.email == identity.email) else {
            return Err(self.notice.fail(ViewError::NotFound(PROFILE_LOAD_FAILED.to_owned())));
        };
        self.form = ProfileForm::from_user(&user);
        self.user = Some(user);
        Ok(())
    }

    /// Save the form. The password is sent only when one was entered.
    ///
    /// # Errors
    ///
    /// [`ViewError::Invalid`] when the passwords differ or no profile is
    /// loaded; [`ViewError::Failed`] carrying the backend message, or the
    /// generic one.
    pub async fn save(&mut self) -> Result<(), ViewError> {
        self.notice.clear();
        let Some(id) = self.user.as_ref().map(|u| u.id.clone()) else {
            return Err(self.notice.fail(ViewError::invalid(PROFILE_LOAD_FAILED)));
        };
        if !self.form.password.is_empty() && self.form.password != self.form.confirm_password {
            return Err(self.notice.fail(ViewError::invalid(PASSWORD_MISMATCH)));
        }
        let update = ProfileUpdate {
            username: &self.form.username,
            full_name: &self.form.full_name,
            email: &self.form.email,
            phone_number: &self.form.phone_number,
            password: Some(self.form.password.as_str()).filter(|p| !p.is_empty()),
        };
        let body = match serde_json::to_value(&update) {
            Ok(body) => body,
            Err(e) => return Err(self.notice.fail(ViewError::failed(PROFILE_UPDATE_FAILED, e.into()))),
        };

        match api::update_user(&self.api, &id, body).await {
            Ok(user) => {
                self.form = ProfileForm::from_user(&user);
                self.user = Some(user);
                self.notice.succeed(PROFILE_UPDATED);
                Ok(())
            }
            Err(e) => {
                let message = e.user_message(PROFILE_UPDATE_FAILED);
                Err(self.notice.fail(ViewError::failed(message, e)))
            }
        }
    }
}

// =============================================================================
// USER DIRECTORY
// =============================================================================

/// Fields an admin may change on another account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UserChanges {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub is_admin: bool,
}

impl UserChanges {
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            full_name: user.full_name.clone().unwrap_or_default(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone().unwrap_or_default(),
            is_admin: user.is_admin,
        }
    }
}

pub struct UserDirectory {
    api: ApiClient,
    users: Vec<User>,
    pub notice: Notice,
}

impl UserDirectory {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api, users: Vec::new(), notice: Notice::default() }
    }

    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// # Errors
    ///
    /// [`ViewError::Failed`] with `Failed to load users.`
    pub async fn load(&mut self) -> Result<(), ViewError> {
        match api::list_users(&self.api).await {
            Ok(users) => {
                self.users = users;
                Ok(())
            }
            Err(e) => Err(self.notice.fail(ViewError::failed(USERS_LOAD_FAILED, e))),
        }
    }

    /// Save changes to a user, then reload the list.
    ///
    /// # Errors
    ///
    /// [`ViewError::Failed`] carrying the backend message, or the generic
    /// one; a reload failure after a successful save is reported as a load
    /// failure.
    pub async fn update(&mut self, id: &str, changes: &UserChanges) -> Result<(), ViewError> {
        let body = match serde_json::to_value(changes) {
            Ok(body) => body,
            Err(e) => return Err(self.notice.fail(ViewError::failed(USER_UPDATE_FAILED, e.into()))),
        };
        if let Err(e) = api::update_user(&self.api, id, body).await {
            let message = e.user_message(USER_UPDATE_FAILED);
            return Err(self.notice.fail(ViewError::failed(message, e)));
        }
        info!(id, "user updated");
        self.notice.clear();
        self.load().await
    }

    /// Delete a user, then reload the list.
    ///
    /// # Errors
    ///
    /// [`ViewError::Failed`] with `Failed to delete user. Please try again.`
    pub async fn delete(&mut self, id: &str) -> Result<(), ViewError> {
        if let Err(e) = api::delete_user(&self.api, id).await {
            return Err(self.notice.fail(ViewError::failed(USER_DELETE_FAILED, e)));
        }
        info!(id, "user deleted");
        self.notice.clear();
        self.load().await
    }
}
