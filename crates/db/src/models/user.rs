//! User entity model and DTOs.

use redtag_core::markdown::AlertSubscriptions;
use redtag_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub alert_furniture: bool,
    pub alert_clothing: bool,
    pub alert_bric_a_brac: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// The user's exclusive-item alert subscriptions.
    pub fn subscriptions(&self) -> AlertSubscriptions {
        AlertSubscriptions {
            furniture: self.alert_furniture,
            clothing: self.alert_clothing,
            bric_a_brac: self.alert_bric_a_brac,
        }
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: String,
    pub alert_furniture: bool,
    pub alert_clothing: bool,
    pub alert_bric_a_brac: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            alert_furniture: user.alert_furniture,
            alert_clothing: user.alert_clothing,
            alert_bric_a_brac: user.alert_bric_a_brac,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user. The password is already hashed.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// Request body for `PUT /users/me/alert-preferences`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UpdateAlertPreferences {
    pub alert_furniture: bool,
    pub alert_clothing: bool,
    pub alert_bric_a_brac: bool,
}
