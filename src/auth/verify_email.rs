//! Email address verification.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::State,
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    Error,
    auth::{AccountState, AuthUser, SecretToken, hash_secret},
    db::lock_connection,
    json::ApiJson,
    mail::verification_email,
    user::{get_user_by_id, mark_verified, set_verification_token},
};

/// The code from a verification email.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: Option<String>,
}

/// Mark the user holding the verification code as verified.
///
/// # Errors
///
/// Returns [Error::InvalidVerificationToken] if no user holds the code.
pub async fn verify_email(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    ApiJson(request): ApiJson<VerifyEmailRequest>,
) -> Result<Json<Value>, Error> {
    let token = request
        .token
        .filter(|token| !token.trim().is_empty())
        .ok_or(Error::MissingField("token"))?;

    let connection = lock_connection(&db_connection)?;
    let user = mark_verified(&hash_secret(&token), &connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidVerificationToken,
        error => error,
    })?;

    tracing::info!("user {} verified their email address", user.id);

    Ok(Json(json!({ "success": "Email verified successfully" })))
}

/// Send the authenticated user a new verification code.
///
/// Users that are already verified are left alone.
pub async fn resend_verification(
    State(state): State<AccountState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_user_by_id(auth_user.id, &connection)?;

    if user.is_verified {
        return Ok(Json(json!({ "success": "Email is already verified" })));
    }

    let token = SecretToken::generate();
    set_verification_token(user.id, &token.hash, &connection)?;
    drop(connection);

    state
        .mailer
        .send_in_background(verification_email(&user, &token.raw));

    Ok(Json(json!({ "success": "Verification email sent" })))
}
