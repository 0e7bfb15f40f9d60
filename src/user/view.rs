//! The public representation of a user returned by the API.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::user::{User, UserID};

/// A user as shown to API clients, without the password hash or tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserID,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub is_verified: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.to_string(),
            email: user.email.to_string(),
            is_admin: user.is_admin,
            is_verified: user.is_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
