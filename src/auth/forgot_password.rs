//! Password reset by emailed one time code.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::{AccountState, PasswordHash, SecretToken, ValidatedPassword, hash_secret},
    db::lock_connection,
    json::ApiJson,
    mail::{password_changed_email, password_reset_email},
    user::{find_user_by_email, get_reset_token_owner, reset_password, set_reset_token},
};

/// A request for a password reset code.
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: Option<String>,
}

/// A password reset code to check.
#[derive(Debug, Deserialize)]
pub struct ValidateResetRequest {
    pub reset_token: Option<String>,
}

/// A password reset code and the new password.
#[derive(Debug, Deserialize)]
pub struct ConfirmResetRequest {
    pub reset_token: Option<String>,
    pub new_password: Option<String>,
}

fn required(field: &'static str, value: Option<String>) -> Result<String, Error> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or(Error::MissingField(field))
}

/// Email a password reset code to the user registered with the given email.
///
/// The response is the same whether or not the email is registered.
pub async fn request_password_reset(
    State(state): State<AccountState>,
    ApiJson(request): ApiJson<ResetRequest>,
) -> Result<Json<Value>, Error> {
    let email = required("email", request.email)?;

    let connection = lock_connection(&state.db_connection)?;

    if let Some(user) = find_user_by_email(&email, &connection)? {
        let token = SecretToken::generate();
        let valid_for = state.auth_config.reset_token_duration;
        set_reset_token(
            user.id,
            &token.hash,
            OffsetDateTime::now_utc() + valid_for,
            &connection,
        )?;

        tracing::info!("password reset requested for user {}", user.id);
        state
            .mailer
            .send_in_background(password_reset_email(&user, &token.raw, valid_for));
    } else {
        tracing::debug!("password reset requested for unregistered email");
    }

    Ok(Json(
        json!({ "success": "If the email exists, a reset link has been sent" }),
    ))
}

/// Check whether a password reset code exists and has not expired.
pub async fn validate_reset_token(
    State(state): State<AccountState>,
    ApiJson(request): ApiJson<ValidateResetRequest>,
) -> Result<Json<Value>, Error> {
    let token = required("reset_token", request.reset_token)?;

    let connection = lock_connection(&state.db_connection)?;
    let valid = match get_reset_token_owner(&hash_secret(&token), &connection) {
        Ok((_, expires_at)) => expires_at > OffsetDateTime::now_utc(),
        Err(Error::NotFound) => false,
        Err(error) => return Err(error),
    };

    Ok(Json(json!({ "valid": valid })))
}

/// Set a new password using a password reset code.
///
/// # Errors
///
/// Returns [Error::InvalidResetToken] for an unknown code,
/// [Error::ExpiredResetToken] for an expired one and
/// [Error::PasswordTooShort] if the new password is too short.
pub async fn confirm_password_reset(
    State(state): State<AccountState>,
    ApiJson(request): ApiJson<ConfirmResetRequest>,
) -> Result<Json<Value>, Error> {
    let token = required("reset_token", request.reset_token)?;
    let new_password = match request.new_password.as_deref() {
        None | Some("") => return Err(Error::MissingField("new_password")),
        Some(password) => ValidatedPassword::new(password)?,
    };

    let token_hash = hash_secret(&token);
    {
        let connection = lock_connection(&state.db_connection)?;
        let (_, expires_at) = get_reset_token_owner(&token_hash, &connection)
            .map_err(invalid_reset_token_if_not_found)?;

        if expires_at <= OffsetDateTime::now_utc() {
            return Err(Error::ExpiredResetToken);
        }
    }

    let password_hash = PasswordHash::new(new_password, state.auth_config.password_hash_cost)?;

    // The code may have been used or replaced while the password was hashed.
    let user = {
        let connection = lock_connection(&state.db_connection)?;
        reset_password(&token_hash, &password_hash, &connection)
            .map_err(invalid_reset_token_if_not_found)?
    };

    tracing::info!("user {} reset their password", user.id);
    state
        .mailer
        .send_in_background(password_changed_email(&user));

    Ok(Json(
        json!({ "success": "Password has been reset successfully" }),
    ))
}

fn invalid_reset_token_if_not_found(error: Error) -> Error {
    match error {
        Error::NotFound => Error::InvalidResetToken,
        error => error,
    }
}
