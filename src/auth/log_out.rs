//! Revokes the access token used to make the request.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::State,
};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    Error,
    auth::{AuthUser, TokenType, revoke_token},
    db::lock_connection,
};

/// Handler for log-out requests.
///
/// The presented access token is added to the blocklist so it cannot be used again.
pub async fn log_out(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&db_connection)?;
    revoke_token(&user.jti, TokenType::Access, user.id, &connection)?;

    Ok(Json(json!({ "success": "Successfully logged out" })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::Value;

    use crate::{endpoints, test_utils::TestApp};

    #[tokio::test]
    async fn log_out_revokes_token() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");
        let token = app.access_token(&user);

        let response = app
            .server
            .post(endpoints::LOG_OUT)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>()["success"],
            "Successfully logged out"
        );

        let response = app
            .server
            .get(endpoints::USERS_ME)
            .authorization_bearer(&token)
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn log_out_requires_token() {
        let app = TestApp::new();

        let response = app.server.post(endpoints::LOG_OUT).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}
