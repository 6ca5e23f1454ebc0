//! The authenticated-user session payload.

use std::fmt;

use kalakriti_core::error::FieldErrors;
use serde::{Deserialize, Serialize};

/// The signed-in customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Backend user id.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
}

/// A signed-in user with their API token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// The signed-in user.
    pub user: UserProfile,
    /// Bearer token for the backend API.
    pub token: String,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl AuthSession {
    /// Checks that the session identifies a user and carries a token.
    ///
    /// Returns an empty map when the session is usable.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.user.id.trim().is_empty() {
            errors.insert("user_id", "User id is required");
        }
        if self.token.trim().is_empty() {
            errors.insert("token", "Token is required");
        }
        errors
    }
}
