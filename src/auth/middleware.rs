//! Authentication middleware that validates bearer tokens on protected routes.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{Claims, JwtKeys, TokenType, decode_token, is_token_revoked},
    db::lock_connection,
    user::{User, UserID, get_user_by_id},
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The database connection used to check the blocklist and look up users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The keys for verifying tokens.
    pub jwt_keys: JwtKeys,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            jwt_keys: state.jwt_keys.clone(),
        }
    }
}

/// The user making an authenticated request.
///
/// `is_admin` is read from the database for each request, so role changes
/// apply to tokens that were issued earlier.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    /// The ID of the authenticated user.
    pub id: UserID,
    /// Whether the user is an admin.
    pub is_admin: bool,
    /// The ID of the access token used for the request.
    pub jti: String,
}

/// Get the token from the `Authorization: Bearer` header.
///
/// # Errors
/// Returns [Error::MissingToken] if the header is absent or not a bearer token.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, Error> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|authorization| authorization.token().to_owned())
        .ok_or(Error::MissingToken)
}

/// Check that `token` is a valid, unrevoked token of type `expected_type` for an existing user.
///
/// # Errors
/// Returns [Error::InvalidToken] if the token cannot be decoded, is the wrong
/// type or its user no longer exists, and [Error::RevokedToken] if it is on
/// the blocklist.
pub fn authenticate_token(
    token: &str,
    expected_type: TokenType,
    keys: &JwtKeys,
    connection: &Connection,
) -> Result<(Claims, User), Error> {
    let claims = decode_token(token, keys)?;

    if claims.token_type != expected_type {
        return Err(Error::InvalidToken);
    }

    if is_token_revoked(&claims.jti, connection)? {
        return Err(Error::RevokedToken);
    }

    let user = get_user_by_id(claims.user_id()?, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidToken,
        error => error,
    })?;

    Ok((claims, user))
}

fn authenticate_request(state: &AuthState, headers: &HeaderMap) -> Result<AuthUser, Error> {
    let token = bearer_token(headers)?;
    let connection = lock_connection(&state.db_connection)?;
    let (claims, user) =
        authenticate_token(&token, TokenType::Access, &state.jwt_keys, &connection)?;

    Ok(AuthUser {
        id: user.id,
        is_admin: user.is_admin,
        jti: claims.jti,
    })
}

/// Middleware function that checks for a valid access token.
///
/// The [AuthUser] is placed into the request and the request executed normally
/// if the token is valid, otherwise a 401 response is returned.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(user): Extension<AuthUser>` to receive the user.
pub async fn auth_guard(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate_request(&state, request.headers()) {
        Ok(auth_user) => {
            request.extensions_mut().insert(auth_user);
            next.run(request).await
        }
        Err(error) => error.into_response(),
    }
}
