//! Route handlers for reading hustles.

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
    db::lock_connection,
    hustle::{Hustle, HustleId, get_hustle, list_hustles},
    transaction::{Transaction, TransactionFilter, list_transactions},
};

/// Query parameters for listing hustles.
#[derive(Debug, Default, Deserialize)]
pub struct HustleQuery {
    /// Admins can restrict the list to one user.
    pub user_id: Option<i64>,
}

/// List the caller's hustles, or every user's hustles for admins.
pub async fn get_hustles_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<HustleQuery>,
) -> Result<Json<Vec<Hustle>>, Error> {
    let owner = owner_filter(&auth_user, query.user_id)?;
    let hustles = list_hustles(owner, &*lock_connection(&db_connection)?)?;

    Ok(Json(hustles))
}

/// Get a single hustle. Only its owner and admins can see it.
pub async fn get_hustle_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(hustle_id): Path<HustleId>,
) -> Result<Json<Hustle>, Error> {
    let hustle = get_hustle(hustle_id, &*lock_connection(&db_connection)?)?;
    ensure_owner_or_admin(&auth_user, hustle.user_id)?;

    Ok(Json(hustle))
}

/// List the transactions attributed to a hustle, newest first.
pub async fn get_hustle_transactions(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(hustle_id): Path<HustleId>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = lock_connection(&db_connection)?;
    let hustle = get_hustle(hustle_id, &connection)?;
    ensure_owner_or_admin(&auth_user, hustle.user_id)?;

    let transactions = list_transactions(
        &TransactionFilter {
            hustle_id: Some(hustle.id),
            ..Default::default()
        },
        &connection,
    )?;

    Ok(Json(transactions))
}
