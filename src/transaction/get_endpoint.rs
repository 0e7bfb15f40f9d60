//! Route handlers for reading transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    Error,
    access::{ensure_owner_or_admin, owner_filter},
    auth::AuthUser,
    date::parse_optional_date,
    db::lock_connection,
    hustle::HustleId,
    transaction::{
        Transaction, TransactionFilter, TransactionId, TransactionType, get_transaction,
        list_transactions,
    },
};

/// Query parameters for listing transactions.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    pub user_id: Option<i64>,
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    pub hustle_id: Option<HustleId>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl TransactionQuery {
    fn into_filter(self, auth_user: &AuthUser) -> Result<TransactionFilter, Error> {
        Ok(TransactionFilter {
            user_id: owner_filter(auth_user, self.user_id)?,
            transaction_type: self
                .transaction_type
                .as_deref()
                .filter(|text| !text.is_empty())
                .map(str::parse::<TransactionType>)
                .transpose()?,
            hustle_id: self.hustle_id,
            start_date: parse_optional_date(self.start_date.as_deref())?,
            end_date: parse_optional_date(self.end_date.as_deref())?,
        })
    }
}

/// List transactions, newest first.
pub async fn get_transactions_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let filter = query.into_filter(&auth_user)?;
    let transactions = list_transactions(&filter, &*lock_connection(&db_connection)?)?;

    Ok(Json(transactions))
}

/// Get a single transaction. Only its owner and admins can see it.
pub async fn get_transaction_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    let transaction = get_transaction(transaction_id, &*lock_connection(&db_connection)?)?;
    ensure_owner_or_admin(&auth_user, transaction.user_id)?;

    Ok(Json(transaction))
}
