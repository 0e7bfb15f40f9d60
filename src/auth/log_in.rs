//! This file defines the route handler for log-in requests.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{JwtKeys, issue_token_pair},
    config::AuthConfig,
    db::lock_connection,
    json::ApiJson,
    user::{UserView, get_user_by_username_or_email},
};

/// The state needed to log in a user.
#[derive(Clone)]
pub struct LogInState {
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The keys for signing tokens.
    pub jwt_keys: JwtKeys,
    /// The token lifetimes.
    pub auth_config: AuthConfig,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            jwt_keys: state.jwt_keys.clone(),
            auth_config: state.auth_config,
        }
    }
}

/// The credentials sent to log in.
#[derive(Debug, Deserialize)]
pub struct LogInRequest {
    /// The username or email address.
    pub username: Option<String>,
    /// The raw password.
    pub password: Option<String>,
}

/// The tokens and profile returned after logging in.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogInResponse {
    pub success: String,
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserView,
}

/// Handler for log-in requests.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The username or password is missing.
/// - The username does not belong to a registered user.
/// - The password is not correct.
/// - An internal error occurred when verifying the password.
pub async fn log_in(
    State(state): State<LogInState>,
    ApiJson(request): ApiJson<LogInRequest>,
) -> Result<Json<LogInResponse>, Error> {
    let login = request
        .username
        .filter(|login| !login.trim().is_empty())
        .ok_or(Error::MissingField("username"))?;
    let password = request
        .password
        .filter(|password| !password.is_empty())
        .ok_or(Error::MissingField("password"))?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        get_user_by_username_or_email(&login, &connection).map_err(|error| match error {
            Error::NotFound => Error::InvalidCredentials,
            error => error,
        })?
    };

    if !user.password_hash.verify(&password)? {
        tracing::debug!("failed log-in attempt for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let tokens = issue_token_pair(user.id, user.is_admin, &state.auth_config, &state.jwt_keys)?;

    Ok(Json(LogInResponse {
        success: "Login successful".to_owned(),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        user: UserView::from(&user),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        auth::{TokenType, decode_token},
        endpoints,
        test_utils::{TEST_PASSWORD, TestApp},
    };

    use super::LogInResponse;

    #[tokio::test]
    async fn email_log_in_never_matches_another_users_username() {
        let app = TestApp::new();
        // Stored before usernames were restricted.
        let impostor = app.insert_user("bob@example.com");
        let bob = app.insert_user("bob");
        assert_eq!(bob.email.as_ref(), "bob@example.com");

        let response = app
            .server
            .post(endpoints::LOG_IN)
            .json(&json!({ "username": "bob@example.com", "password": TEST_PASSWORD }))
            .await;

        response.assert_status_ok();
        let body = response.json::<LogInResponse>();
        assert_eq!(body.user.id, bob.id);
        assert_ne!(body.user.id, impostor.id);
    }

    #[tokio::test]
    async fn log_in_with_username_returns_tokens() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");

        let response = app
            .server
            .post(endpoints::LOG_IN)
            .json(&json!({ "username": "john_doe", "password": TEST_PASSWORD }))
            .await;

        response.assert_status_ok();
        let body = response.json::<LogInResponse>();
        assert_eq!(body.success, "Login successful");
        assert_eq!(body.user.id, user.id);
        let access = decode_token(&body.access_token, &app.state.jwt_keys).unwrap();
        let refresh = decode_token(&body.refresh_token, &app.state.jwt_keys).unwrap();
        assert_eq!(access.token_type, TokenType::Access);
        assert_eq!(refresh.token_type, TokenType::Refresh);
        assert_eq!(access.user_id(), Ok(user.id));
    }

    #[tokio::test]
    async fn log_in_with_email_succeeds() {
        let app = TestApp::new();
        app.insert_user("john_doe");

        let response = app
            .server
            .post(endpoints::LOG_IN)
            .json(&json!({ "username": "john_doe@example.com", "password": TEST_PASSWORD }))
            .await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let app = TestApp::new();
        app.insert_user("john_doe");

        let response = app
            .server
            .post(endpoints::LOG_IN)
            .json(&json!({ "username": "john_doe", "password": "wrongpassword" }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.json::<Value>()["error"],
            "Invalid username or password"
        );
    }

    #[tokio::test]
    async fn unknown_user_gets_same_error_as_wrong_password() {
        let app = TestApp::new();

        let response = app
            .server
            .post(endpoints::LOG_IN)
            .json(&json!({ "username": "nobody", "password": TEST_PASSWORD }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.json::<Value>()["error"],
            "Invalid username or password"
        );
    }

    #[tokio::test]
    async fn missing_password_is_bad_request() {
        let app = TestApp::new();

        let response = app
            .server
            .post(endpoints::LOG_IN)
            .json(&json!({ "username": "john_doe" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
