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
    transaction::{TransactionId, delete_transaction, get_transaction},
};

pub async fn delete_transaction_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&db_connection)?;
    let transaction = get_transaction(transaction_id, &connection)?;
    ensure_owner_or_admin(&auth_user, transaction.user_id)?;

    delete_transaction(transaction.id, &connection)?;

    Ok(Json(json!({ "success": "Transaction deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use time::macros::date;

    use crate::{
        Error,
        endpoints::{self, format_endpoint},
        test_utils::{TestApp, insert_test_transaction, new_test_transaction},
        transaction::{TransactionType, get_transaction},
    };

    #[tokio::test]
    async fn owner_can_delete_transaction() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");
        let transaction = insert_test_transaction(
            &app.connection(),
            new_test_transaction(&user, TransactionType::Expense, 10.0, date!(2025 - 01 - 05)),
        );

        app.server
            .delete(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .authorization_bearer(app.access_token(&user))
            .await
            .assert_status_ok();

        assert_eq!(
            get_transaction(transaction.id, &app.connection()),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn other_user_cannot_delete_transaction() {
        let app = TestApp::new();
        let john = app.insert_user("john_doe");
        let jane = app.insert_user("jane_smith");
        let transaction = insert_test_transaction(
            &app.connection(),
            new_test_transaction(&jane, TransactionType::Expense, 10.0, date!(2025 - 01 - 05)),
        );

        app.server
            .delete(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .authorization_bearer(app.access_token(&john))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
