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
    hustle::{HustleId, delete_hustle, get_hustle},
};

/// Delete a hustle. Its transactions, debts and goals are kept but no longer linked to it.
pub async fn delete_hustle_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(hustle_id): Path<HustleId>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&db_connection)?;
    let hustle = get_hustle(hustle_id, &connection)?;
    ensure_owner_or_admin(&auth_user, hustle.user_id)?;

    delete_hustle(hustle.id, &connection)?;

    Ok(Json(json!({ "success": "Hustle deleted successfully" })))
}
