//! Defines the endpoint for updating a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    Error,
    access::ensure_owner_or_admin,
    auth::AuthUser,
    date::parse_optional_date,
    db::lock_connection,
    hustle::{HustleId, ensure_hustle_owned_by},
    json::ApiJson,
    transaction::{
        MAX_DESCRIPTION_LENGTH, Transaction, TransactionId, TransactionType, TransactionUpdate,
        get_transaction, update_transaction,
    },
    validation::{deserialize_some, positive_amount, updated_text},
};

/// Fields to change on a transaction. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct EditTransactionRequest {
    pub description: Option<String>,
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    pub date: Option<String>,
    /// `null` unlinks the transaction from its hustle.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub hustle_id: Option<Option<HustleId>>,
}

impl EditTransactionRequest {
    fn validate(self) -> Result<TransactionUpdate, Error> {
        Ok(TransactionUpdate {
            description: updated_text(
                "description",
                self.description.as_deref(),
                MAX_DESCRIPTION_LENGTH,
            )?,
            amount: self
                .amount
                .map(|amount| positive_amount(Some(amount)))
                .transpose()?,
            transaction_type: self
                .transaction_type
                .as_deref()
                .map(str::parse::<TransactionType>)
                .transpose()?,
            date: parse_optional_date(self.date.as_deref())?,
            hustle_id: self.hustle_id,
        })
    }
}

/// Update some or all of a transaction's fields.
pub async fn edit_transaction_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(transaction_id): Path<TransactionId>,
    ApiJson(request): ApiJson<EditTransactionRequest>,
) -> Result<Json<Transaction>, Error> {
    let update = request.validate()?;

    let connection = lock_connection(&db_connection)?;
    let transaction = get_transaction(transaction_id, &connection)?;
    ensure_owner_or_admin(&auth_user, transaction.user_id)?;

    if let Some(Some(hustle_id)) = update.hustle_id {
        ensure_hustle_owned_by(hustle_id, transaction.user_id, &connection)?;
    }

    let transaction = update_transaction(transaction.id, update, &connection)?;

    Ok(Json(transaction))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{TestApp, insert_test_transaction, new_test_transaction},
        transaction::{NewTransaction, Transaction, TransactionType},
    };

    #[tokio::test]
    async fn partial_update_changes_only_amount() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");
        let transaction = insert_test_transaction(
            &app.connection(),
            new_test_transaction(&user, TransactionType::Expense, 10.0, date!(2025 - 01 - 05)),
        );

        let response = app
            .server
            .put(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .authorization_bearer(app.access_token(&user))
            .json(&json!({ "amount": 12.75 }))
            .await;

        response.assert_status_ok();
        let updated = response.json::<Transaction>();
        assert_eq!(updated.amount, 12.75);
        assert_eq!(updated.description, transaction.description);
        assert_eq!(updated.date, transaction.date);
        assert_eq!(updated.transaction_type, TransactionType::Expense);
    }

    #[tokio::test]
    async fn null_hustle_unlinks() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");
        let hustle = app.insert_hustle(&user, "Uber");
        let transaction = insert_test_transaction(
            &app.connection(),
            NewTransaction {
                hustle_id: Some(hustle.id),
                ..new_test_transaction(&user, TransactionType::Income, 10.0, date!(2025 - 01 - 05))
            },
        );

        let response = app
            .server
            .put(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .authorization_bearer(app.access_token(&user))
            .json(&json!({ "hustle_id": null }))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Transaction>().hustle_id, None);
    }

    #[tokio::test]
    async fn cannot_link_to_other_users_hustle() {
        let app = TestApp::new();
        let john = app.insert_user("john_doe");
        let jane = app.insert_user("jane_smith");
        let janes_hustle = app.insert_hustle(&jane, "Tutoring");
        let transaction = insert_test_transaction(
            &app.connection(),
            new_test_transaction(&john, TransactionType::Income, 10.0, date!(2025 - 01 - 05)),
        );

        app.server
            .put(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .authorization_bearer(app.access_token(&john))
            .json(&json!({ "hustle_id": janes_hustle.id }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_negative_amount() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");
        let transaction = insert_test_transaction(
            &app.connection(),
            new_test_transaction(&user, TransactionType::Expense, 10.0, date!(2025 - 01 - 05)),
        );

        app.server
            .put(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .authorization_bearer(app.access_token(&user))
            .json(&json!({ "amount": -3 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cannot_edit_other_users_transaction() {
        let app = TestApp::new();
        let john = app.insert_user("john_doe");
        let jane = app.insert_user("jane_smith");
        let transaction = insert_test_transaction(
            &app.connection(),
            new_test_transaction(&jane, TransactionType::Expense, 10.0, date!(2025 - 01 - 05)),
        );

        app.server
            .put(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .authorization_bearer(app.access_token(&john))
            .json(&json!({ "amount": 1 }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
