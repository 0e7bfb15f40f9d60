//! Route handlers for reading debts.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    access::{ensure_owner_or_admin, owner_filter},
    auth::AuthUser,
    date::parse_optional_date,
    db::lock_connection,
    debt::{Debt, DebtFilter, DebtId, DebtStatus, get_debt, list_debts},
    hustle::HustleId,
};

/// Query parameters for listing debts.
#[derive(Debug, Default, Deserialize)]
pub struct DebtQuery {
    pub user_id: Option<i64>,
    pub status: Option<String>,
    pub hustle_id: Option<HustleId>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub search: Option<String>,
}

/// The body of the debt list response.
#[derive(Debug, Serialize, Deserialize)]
pub struct DebtsResponse {
    pub debts: Vec<Debt>,
}

/// List debts, soonest due first.
pub async fn get_debts_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<DebtQuery>,
) -> Result<Json<DebtsResponse>, Error> {
    let filter = DebtFilter {
        user_id: owner_filter(&auth_user, query.user_id)?,
        status: query
            .status
            .as_deref()
            .filter(|status| !status.is_empty())
            .map(str::parse::<DebtStatus>)
            .transpose()?,
        hustle_id: query.hustle_id,
        start_date: parse_optional_date(query.start_date.as_deref())?,
        end_date: parse_optional_date(query.end_date.as_deref())?,
        search: query.search,
    };

    let debts = list_debts(&filter, &*lock_connection(&db_connection)?)?;

    Ok(Json(DebtsResponse { debts }))
}

/// Get a single debt. Only its owner and admins can see it.
pub async fn get_debt_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(debt_id): Path<DebtId>,
) -> Result<Json<Debt>, Error> {
    let debt = get_debt(debt_id, &*lock_connection(&db_connection)?)?;
    ensure_owner_or_admin(&auth_user, debt.user_id)?;

    Ok(Json(debt))
}
