//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    Error,
    auth::JwtKeys,
    config::AuthConfig,
    db::initialize,
    mail::Mailer,
};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The keys used to sign and verify JSON web tokens.
    pub jwt_keys: JwtKeys,

    /// Token lifetimes and password hashing settings.
    pub auth_config: AuthConfig,

    /// Delivers notification emails.
    pub mailer: Mailer,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `jwt_secret` is used to sign access and refresh tokens.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        jwt_secret: &str,
        auth_config: AuthConfig,
        mailer: Mailer,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            jwt_keys: JwtKeys::from_secret(jwt_secret),
            auth_config,
            mailer,
        })
    }
}

impl FromRef<AppState> for Arc<Mutex<Connection>> {
    fn from_ref(state: &AppState) -> Self {
        state.db_connection.clone()
    }
}
