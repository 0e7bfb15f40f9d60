//! Exchanges a refresh token for a new token pair.

use axum::{Json, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::{LogInState, TokenType, authenticate_token, bearer_token, issue_token_pair, revoke_token},
    db::lock_connection,
};

/// A new access and refresh token.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Handler for token refresh requests.
///
/// Expects a refresh token in the `Authorization: Bearer` header. The refresh
/// token is revoked so each one can only be used once.
pub async fn refresh_tokens(
    State(state): State<LogInState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, Error> {
    let token = bearer_token(&headers)?;
    let connection = lock_connection(&state.db_connection)?;

    let (claims, user) =
        authenticate_token(&token, TokenType::Refresh, &state.jwt_keys, &connection)?;
    revoke_token(&claims.jti, TokenType::Refresh, user.id, &connection)?;

    let tokens = issue_token_pair(user.id, user.is_admin, &state.auth_config, &state.jwt_keys)?;

    Ok(Json(RefreshResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::{
        auth::{TokenType, decode_token, issue_token_pair},
        endpoints,
        test_utils::TestApp,
    };

    use super::RefreshResponse;

    #[tokio::test]
    async fn refresh_returns_new_pair() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");
        let tokens = issue_token_pair(
            user.id,
            false,
            &app.state.auth_config,
            &app.state.jwt_keys,
        )
        .unwrap();

        let response = app
            .server
            .post(endpoints::REFRESH)
            .authorization_bearer(&tokens.refresh_token)
            .await;

        response.assert_status_ok();
        let body = response.json::<RefreshResponse>();
        let access = decode_token(&body.access_token, &app.state.jwt_keys).unwrap();
        assert_eq!(access.token_type, TokenType::Access);
        assert_ne!(body.refresh_token, tokens.refresh_token);

        app.server
            .get(endpoints::USERS_ME)
            .authorization_bearer(&body.access_token)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn refresh_token_can_only_be_used_once() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");
        let tokens = issue_token_pair(
            user.id,
            false,
            &app.state.auth_config,
            &app.state.jwt_keys,
        )
        .unwrap();

        app.server
            .post(endpoints::REFRESH)
            .authorization_bearer(&tokens.refresh_token)
            .await
            .assert_status_ok();

        let response = app
            .server
            .post(endpoints::REFRESH)
            .authorization_bearer(&tokens.refresh_token)
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn access_token_cannot_refresh() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");

        let response = app
            .server
            .post(endpoints::REFRESH)
            .authorization_bearer(app.access_token(&user))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}
