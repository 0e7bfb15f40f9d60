use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    Error,
    access::ensure_owner_or_admin,
    auth::AuthUser,
    db::lock_connection,
    user::{UserID, delete_user},
};

/// Delete a user and all of their hustles, transactions, debts and goals.
///
/// Users may delete themselves, admins may delete anyone.
pub async fn delete_user_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<Value>, Error> {
    let user_id = UserID::new(user_id);
    ensure_owner_or_admin(&auth_user, user_id)?;

    let connection = lock_connection(&db_connection)?;
    delete_user(user_id, &connection)?;

    tracing::info!("user {} deleted user {}", auth_user.id, user_id);

    Ok(Json(json!({ "success": "User deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::{
        endpoints::{self, format_endpoint},
        hustle::list_hustles,
        test_utils::TestApp,
        user::count_users,
    };

    #[tokio::test]
    async fn deleting_user_removes_their_data() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");
        app.insert_hustle(&user, "Uber");

        app.server
            .delete(&format_endpoint(endpoints::USER, user.id.as_i64()))
            .authorization_bearer(app.access_token(&user))
            .await
            .assert_status_ok();

        let connection = app.connection();
        assert_eq!(count_users(&connection), Ok(0));
        assert_eq!(list_hustles(None, &connection).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn user_cannot_delete_someone_else() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");
        let other = app.insert_user("jane_smith");

        app.server
            .delete(&format_endpoint(endpoints::USER, other.id.as_i64()))
            .authorization_bearer(app.access_token(&user))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn admin_can_delete_anyone() {
        let app = TestApp::new();
        let admin = app.insert_admin("admin");
        let user = app.insert_user("john_doe");

        app.server
            .delete(&format_endpoint(endpoints::USER, user.id.as_i64()))
            .authorization_bearer(app.access_token(&admin))
            .await
            .assert_status_ok();
    }
}
