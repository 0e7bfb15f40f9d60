//! Registration of new users.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{PasswordHash, SecretToken, ValidatedPassword},
    config::AuthConfig,
    db::lock_connection,
    json::ApiJson,
    mail::{Mailer, verification_email},
    user::{Email, NewUser, UserView, Username, create_user},
};

/// The state needed for registering users and sending them emails.
#[derive(Clone)]
pub struct AccountState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The token lifetimes and password hashing cost.
    pub auth_config: AuthConfig,
    /// Sends verification and password emails.
    pub mailer: Mailer,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            auth_config: state.auth_config,
            mailer: state.mailer.clone(),
        }
    }
}

/// The details of a new account.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// The response to a successful registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: String,
    pub user: UserView,
}

/// Create a new user and email them a verification code.
///
/// # Errors
///
/// Returns an error if a field is missing or invalid, the password is too
/// short, or the username or email is already registered.
pub async fn register_user(
    State(state): State<AccountState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), Error> {
    let username = Username::new(request.username.as_deref().unwrap_or_default())?;
    let email = Email::new(request.email.as_deref().unwrap_or_default())?;
    let password = match request.password.as_deref() {
        None | Some("") => return Err(Error::MissingField("password")),
        Some(password) => ValidatedPassword::new(password)?,
    };

    let password_hash = PasswordHash::new(password, state.auth_config.password_hash_cost)?;
    let verification_token = SecretToken::generate();

    let user = create_user(
        NewUser {
            username,
            email,
            password_hash,
            is_admin: false,
            verification_token_hash: Some(verification_token.hash),
        },
        &*lock_connection(&state.db_connection)?,
    )?;

    tracing::info!("registered user {}", user.id);
    state
        .mailer
        .send_in_background(verification_email(&user, &verification_token.raw));

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: "User created successfully".to_owned(),
            user: UserView::from(&user),
        }),
    ))
}
