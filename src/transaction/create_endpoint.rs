//! Defines the endpoint for recording a new transaction.

use std::sync::{Arc, Mutex};

use axum::{Extension, Json, extract::State, http::StatusCode};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    Error,
    auth::AuthUser,
    date::{parse_optional_date, today},
    db::lock_connection,
    hustle::{HustleId, ensure_hustle_owned_by},
    json::ApiJson,
    transaction::{
        MAX_DESCRIPTION_LENGTH, NewTransaction, Transaction, TransactionType, create_transaction,
    },
    validation::{positive_amount, required_text},
};

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub description: Option<String>,
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Defaults to today (UTC).
    pub date: Option<String>,
    pub hustle_id: Option<HustleId>,
}

/// Record a transaction for the authenticated user.
pub async fn create_transaction_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let description = required_text(
        "description",
        request.description.as_deref(),
        MAX_DESCRIPTION_LENGTH,
    )?;
    let amount = positive_amount(request.amount)?;
    let transaction_type: TransactionType = request
        .transaction_type
        .as_deref()
        .ok_or(Error::MissingField("type"))?
        .parse()?;
    let date = parse_optional_date(request.date.as_deref())?.unwrap_or_else(today);

    let connection = lock_connection(&db_connection)?;
    if let Some(hustle_id) = request.hustle_id {
        ensure_hustle_owned_by(hustle_id, auth_user.id, &connection)?;
    }

    let transaction = create_transaction(
        NewTransaction {
            description,
            amount,
            transaction_type,
            date,
            user_id: auth_user.id,
            hustle_id: request.hustle_id,
        },
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(transaction)))
}
