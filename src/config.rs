//! Settings for authentication and outgoing email.

use std::env;

use time::Duration;

use crate::auth::PasswordHash;

/// How long issued tokens last and how hard passwords are hashed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuthConfig {
    /// How long an access token is valid for.
    pub access_token_duration: Duration,
    /// How long a refresh token is valid for.
    pub refresh_token_duration: Duration,
    /// How long a password reset token is valid for.
    pub reset_token_duration: Duration,
    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_duration: Duration::hours(1),
            refresh_token_duration: Duration::days(30),
            reset_token_duration: Duration::hours(1),
            password_hash_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

/// The default SMTP submission port.
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Errors from reading the mail settings from the environment.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    /// A variable needed alongside `SMTP_HOST` was not set.
    #[error("the environment variable '{0}' must be set when SMTP_HOST is set")]
    MissingVariable(&'static str),

    /// `SMTP_PORT` was not a valid port number.
    #[error("SMTP_PORT must be a port number, got \"{0}\"")]
    InvalidPort(String),
}

/// Connection details for the SMTP relay used to send email.
#[derive(Debug, Clone, PartialEq)]
pub struct MailConfig {
    /// Host name of the SMTP relay.
    pub host: String,
    /// Port of the SMTP relay.
    pub port: u16,
    /// Username for logging in to the relay.
    pub username: String,
    /// Password for logging in to the relay.
    pub password: String,
    /// The `From` address on outgoing mail.
    pub sender: String,
}

impl MailConfig {
    /// Read the mail settings from the `SMTP_*` and `MAIL_SENDER` environment variables.
    ///
    /// Returns `Ok(None)` when `SMTP_HOST` is unset, meaning emails should only be logged.
    ///
    /// # Errors
    /// Returns a [ConfigError] if `SMTP_HOST` is set but the other settings are
    /// missing or invalid.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<Self>, ConfigError> {
        let Some(host) = lookup("SMTP_HOST").filter(|host| !host.is_empty()) else {
            return Ok(None);
        };

        let port = match lookup("SMTP_PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?,
            None => DEFAULT_SMTP_PORT,
        };

        let require = |key: &'static str| lookup(key).ok_or(ConfigError::MissingVariable(key));

        Ok(Some(Self {
            host,
            port,
            username: require("SMTP_USERNAME")?,
            password: require("SMTP_PASSWORD")?,
            sender: require("MAIL_SENDER")?,
        }))
    }
}
