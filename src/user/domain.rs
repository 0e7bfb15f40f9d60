//! Validated user name and email types.

use std::{fmt::Display, str::FromStr};

use email_address::EmailAddress;
use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, validation::required_text};

/// The longest username allowed.
pub const MAX_USERNAME_LENGTH: usize = 80;

/// The longest email address allowed.
pub const MAX_EMAIL_LENGTH: usize = 120;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for UserID {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for UserID {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self)
    }
}

/// A non-empty username of at most [MAX_USERNAME_LENGTH] characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Create a username, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingField] if `name` is blank or [Error::InvalidField] if it is
    /// too long or contains '@'. Logins containing '@' are treated as email addresses.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = required_text("username", Some(name), MAX_USERNAME_LENGTH)?;

        if name.contains('@') {
            return Err(Error::InvalidField(
                "username cannot contain '@'".to_owned(),
            ));
        }

        Ok(Self(name))
    }

    /// Create a username without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Username {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Username::new(s)
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A syntactically valid email address of at most [MAX_EMAIL_LENGTH] characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Create an email address, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingField] if `address` is blank or
    /// [Error::InvalidField] if it is too long or not an email address.
    pub fn new(address: &str) -> Result<Self, Error> {
        let address = required_text("email", Some(address), MAX_EMAIL_LENGTH)?;

        if EmailAddress::is_valid(&address) {
            Ok(Self(address))
        } else {
            Err(Error::InvalidField(format!(
                "\"{address}\" is not a valid email address"
            )))
        }
    }

    /// Create an email address without validation.
    pub fn new_unchecked(address: &str) -> Self {
        Self(address.to_owned())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Email {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Email::new(s)
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
