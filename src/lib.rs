//! Hustle Hub is a backend for tracking personal finances and side hustles.
//!
//! This library provides a JSON REST API for managing users, hustles,
//! transactions, debts and savings goals, plus a dashboard endpoint that
//! aggregates monthly financial summaries.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod access;
mod app_state;
mod auth;
mod config;
mod dashboard;
mod database_id;
mod date;
mod db;
mod debt;
mod endpoints;
mod goal;
mod hustle;
mod json;
mod logging;
mod mail;
mod routing;
mod transaction;
mod user;
mod validation;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, ValidatedPassword};
pub use config::{AuthConfig, ConfigError, MailConfig};
pub use db::{drop_all_tables, initialize as initialize_db};
pub use hustle::{Hustle, NewHustle, create_hustle};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use mail::{MailError, Mailer};
pub use routing::build_router;
pub use transaction::{NewTransaction, Transaction, TransactionType, create_transaction};
pub use user::{
    Email, NewUser, User, UserID, Username, count_users, create_user,
    get_user_by_username_or_email,
};

use crate::hustle::HustleId;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A required field was missing or blank in the request body.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A field in the request body was present but not acceptable, e.g. too
    /// long or a negative amount.
    ///
    /// The string is shown to the client and should explain how to fix it.
    #[error("{0}")]
    InvalidField(String),

    /// The request body could not be parsed as the expected JSON object.
    #[error("invalid request body: {0}")]
    InvalidJson(String),

    /// The user provided a password that has fewer characters than the
    /// minimum length.
    #[error("Password must be at least {0} characters long")]
    PasswordTooShort(usize),

    /// The username is already taken by another user.
    #[error("Username already exists")]
    DuplicateUsername,

    /// The email address is already registered to another user.
    #[error("Email already exists")]
    DuplicateEmail,

    /// A date string could not be parsed.
    #[error("Invalid date \"{0}\". Use YYYY-MM-DD")]
    InvalidDate(String),

    /// A status string did not match any of the known statuses for the record.
    #[error("Invalid status \"{0}\"")]
    InvalidStatus(String),

    /// A transaction type was something other than income or expense.
    #[error("Invalid transaction type \"{0}\", expected \"income\" or \"expense\"")]
    InvalidTransactionType(String),

    /// The hustle ID used to link a record does not refer to one of the
    /// owner's hustles.
    #[error("Hustle {0} does not exist or belongs to another user")]
    InvalidHustle(HustleId),

    /// The password reset token does not match any user.
    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    /// The password reset token matched a user but is past its expiry.
    #[error("Reset token has expired")]
    ExpiredResetToken,

    /// The email verification token does not match any user.
    #[error("Invalid verification token")]
    InvalidVerificationToken,

    /// The user provided an invalid combination of username and password.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The current password given when changing password was wrong.
    #[error("Current password is incorrect")]
    IncorrectPassword,

    /// The request did not include a bearer token.
    #[error("Missing authorization token")]
    MissingToken,

    /// The bearer token could not be decoded, has expired or is the wrong
    /// kind of token for the route.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The bearer token has been revoked, e.g. by logging out.
    #[error("Token has been revoked")]
    RevokedToken,

    /// The authenticated user is not allowed to perform the action.
    #[error("You do not have permission to perform this action")]
    Forbidden,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("The requested resource could not be found")]
    NotFound,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A JSON web token could not be created.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.username") =>
            {
                Error::DuplicateUsername
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code used when this error is sent to the client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingField(_)
            | Error::InvalidField(_)
            | Error::InvalidJson(_)
            | Error::PasswordTooShort(_)
            | Error::DuplicateUsername
            | Error::DuplicateEmail
            | Error::InvalidDate(_)
            | Error::InvalidStatus(_)
            | Error::InvalidTransactionType(_)
            | Error::InvalidHustle(_)
            | Error::InvalidResetToken
            | Error::ExpiredResetToken
            | Error::InvalidVerificationToken => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials
            | Error::IncorrectPassword
            | Error::MissingToken
            | Error::InvalidToken
            | Error::RevokedToken => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::HashingError(_)
            | Error::TokenCreation(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal errors are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
