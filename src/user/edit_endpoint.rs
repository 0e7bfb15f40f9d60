//! Route handlers for changing a user's profile, password and role.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    Error,
    access::{ensure_owner_or_admin, require_admin},
    auth::{AccountState, AuthUser, PasswordHash, SecretToken, ValidatedPassword},
    db::lock_connection,
    json::ApiJson,
    mail::{password_changed_email, verification_email},
    user::{
        Email, UserID, UserView, Username, get_user_by_id, set_admin, update_password,
        update_profile,
    },
};

/// The new username and email for a user.
#[derive(Debug, Deserialize)]
pub struct EditProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// The response to a successful change to a user.
#[derive(Debug, Serialize, Deserialize)]
pub struct EditUserResponse {
    pub success: String,
    pub user: UserView,
}

/// Change a user's username and email.
///
/// Changing the email address marks the user as unverified and sends a new
/// verification code to the new address.
pub async fn edit_user(
    State(state): State<AccountState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<i64>,
    ApiJson(request): ApiJson<EditProfileRequest>,
) -> Result<Json<EditUserResponse>, Error> {
    let user_id = UserID::new(user_id);
    ensure_owner_or_admin(&auth_user, user_id)?;

    let username = Username::new(request.username.as_deref().unwrap_or_default())?;
    let email = Email::new(request.email.as_deref().unwrap_or_default())?;

    let connection = lock_connection(&state.db_connection)?;
    let current = get_user_by_id(user_id, &connection)?;

    let verification_token = if current
        .email
        .as_ref()
        .eq_ignore_ascii_case(email.as_ref())
    {
        None
    } else {
        Some(SecretToken::generate())
    };

    let user = update_profile(
        user_id,
        &username,
        &email,
        verification_token.as_ref().map(|token| token.hash.as_str()),
        &connection,
    )?;
    drop(connection);

    if let Some(token) = verification_token {
        tracing::info!("user {} changed their email address", user.id);
        state
            .mailer
            .send_in_background(verification_email(&user, &token.raw));
    }

    Ok(Json(EditUserResponse {
        success: "User updated successfully".to_owned(),
        user: UserView::from(&user),
    }))
}

/// The current and new password for a password change.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Change the authenticated user's own password.
///
/// # Errors
///
/// Returns [Error::IncorrectPassword] if the current password is wrong and
/// [Error::Forbidden] if an admin tries to change someone else's password.
pub async fn change_password(
    State(state): State<AccountState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<i64>,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> Result<Json<Value>, Error> {
    let user_id = UserID::new(user_id);
    ensure_owner_or_admin(&auth_user, user_id)?;
    if auth_user.id != user_id {
        return Err(Error::Forbidden);
    }

    let current_password = request
        .current_password
        .filter(|password| !password.is_empty())
        .ok_or(Error::MissingField("current_password"))?;
    let new_password = match request.new_password.as_deref() {
        None | Some("") => return Err(Error::MissingField("new_password")),
        Some(password) => ValidatedPassword::new(password)?,
    };

    let user = get_user_by_id(user_id, &*lock_connection(&state.db_connection)?)?;

    if !user.password_hash.verify(&current_password)? {
        return Err(Error::IncorrectPassword);
    }

    let password_hash = PasswordHash::new(new_password, state.auth_config.password_hash_cost)?;
    update_password(
        user_id,
        &password_hash,
        &*lock_connection(&state.db_connection)?,
    )?;

    tracing::info!("user {} changed their password", user.id);
    state
        .mailer
        .send_in_background(password_changed_email(&user));

    Ok(Json(json!({ "success": "Password updated successfully" })))
}

/// The new role for a user.
#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub is_admin: Option<bool>,
}

/// Grant or revoke a user's admin role. Admin only.
///
/// Admins cannot remove their own admin role.
pub async fn change_role(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<i64>,
    ApiJson(request): ApiJson<ChangeRoleRequest>,
) -> Result<Json<EditUserResponse>, Error> {
    require_admin(&auth_user)?;

    let user_id = UserID::new(user_id);
    let is_admin = request.is_admin.ok_or(Error::MissingField("is_admin"))?;

    if user_id == auth_user.id && !is_admin {
        return Err(Error::InvalidField(
            "You cannot remove your own admin role".to_owned(),
        ));
    }

    let connection = lock_connection(&db_connection)?;
    let user = set_admin(user_id, is_admin, &connection)?;

    tracing::info!(
        "user {} set the admin role of user {} to {}",
        auth_user.id,
        user.id,
        is_admin
    );

    Ok(Json(EditUserResponse {
        success: "User role updated successfully".to_owned(),
        user: UserView::from(&user),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{TEST_PASSWORD, TestApp},
        user::get_user_by_id,
    };

    use super::EditUserResponse;

    #[tokio::test]
    async fn edit_profile_keeps_verification_when_email_unchanged() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");
        app.connection()
            .execute("UPDATE user SET is_verified = 1", ())
            .unwrap();

        let response = app
            .server
            .put(&format_endpoint(endpoints::USER, user.id.as_i64()))
            .authorization_bearer(app.access_token(&user))
            .json(&json!({ "username": "johnny", "email": "john_doe@example.com" }))
            .await;

        response.assert_status_ok();
        let body = response.json::<EditUserResponse>();
        assert_eq!(body.user.username, "johnny");
        assert!(body.user.is_verified);
        assert!(app.sent_emails().is_empty());
    }

    #[tokio::test]
    async fn edit_profile_with_new_email_requires_verification() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");
        app.connection()
            .execute("UPDATE user SET is_verified = 1", ())
            .unwrap();

        let response = app
            .server
            .put(&format_endpoint(endpoints::USER, user.id.as_i64()))
            .authorization_bearer(app.access_token(&user))
            .json(&json!({ "username": "john_doe", "email": "john@new.example.com" }))
            .await;

        response.assert_status_ok();
        assert!(!response.json::<EditUserResponse>().user.is_verified);
        let code = app.last_code_sent_to("john@new.example.com");

        app.server
            .post(endpoints::VERIFY_EMAIL)
            .json(&json!({ "token": code }))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn edit_profile_rejects_taken_username() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");
        app.insert_user("jane_smith");

        let response = app
            .server
            .put(&format_endpoint(endpoints::USER, user.id.as_i64()))
            .authorization_bearer(app.access_token(&user))
            .json(&json!({ "username": "jane_smith", "email": "john_doe@example.com" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "Username already exists");
    }

    #[tokio::test]
    async fn user_cannot_edit_someone_else() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");
        let other = app.insert_user("jane_smith");

        app.server
            .put(&format_endpoint(endpoints::USER, other.id.as_i64()))
            .authorization_bearer(app.access_token(&user))
            .json(&json!({ "username": "hacked", "email": "hacked@example.com" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn change_password_checks_current_password() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");

        let response = app
            .server
            .put(&format_endpoint(endpoints::USER_PASSWORD, user.id.as_i64()))
            .authorization_bearer(app.access_token(&user))
            .json(&json!({ "current_password": "wrong", "new_password": "brandnew123" }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.json::<Value>()["error"],
            "Current password is incorrect"
        );
    }

    #[tokio::test]
    async fn change_password_updates_hash_and_notifies() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");

        let response = app
            .server
            .put(&format_endpoint(endpoints::USER_PASSWORD, user.id.as_i64()))
            .authorization_bearer(app.access_token(&user))
            .json(&json!({ "current_password": TEST_PASSWORD, "new_password": "brandnew123" }))
            .await;

        response.assert_status_ok();
        let stored = get_user_by_id(user.id, &app.connection()).unwrap();
        assert!(stored.password_hash.verify("brandnew123").unwrap());
        assert_eq!(app.sent_emails().len(), 1);
    }

    #[tokio::test]
    async fn admin_cannot_change_other_users_password() {
        let app = TestApp::new();
        let admin = app.insert_admin("admin");
        let user = app.insert_user("john_doe");

        app.server
            .put(&format_endpoint(endpoints::USER_PASSWORD, user.id.as_i64()))
            .authorization_bearer(app.access_token(&admin))
            .json(&json!({ "current_password": TEST_PASSWORD, "new_password": "brandnew123" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_can_promote_user() {
        let app = TestApp::new();
        let admin = app.insert_admin("admin");
        let user = app.insert_user("john_doe");

        let response = app
            .server
            .put(&format_endpoint(endpoints::USER_ROLE, user.id.as_i64()))
            .authorization_bearer(app.access_token(&admin))
            .json(&json!({ "is_admin": true }))
            .await;

        response.assert_status_ok();
        assert!(response.json::<EditUserResponse>().user.is_admin);
    }

    #[tokio::test]
    async fn admin_cannot_demote_self() {
        let app = TestApp::new();
        let admin = app.insert_admin("admin");

        app.server
            .put(&format_endpoint(endpoints::USER_ROLE, admin.id.as_i64()))
            .authorization_bearer(app.access_token(&admin))
            .json(&json!({ "is_admin": false }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn regular_user_cannot_change_roles() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");

        app.server
            .put(&format_endpoint(endpoints::USER_ROLE, user.id.as_i64()))
            .authorization_bearer(app.access_token(&user))
            .json(&json!({ "is_admin": true }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
