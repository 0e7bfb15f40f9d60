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
    debt::{DebtId, delete_debt, get_debt},
};

pub async fn delete_debt_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(debt_id): Path<DebtId>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&db_connection)?;
    let debt = get_debt(debt_id, &connection)?;
    ensure_owner_or_admin(&auth_user, debt.user_id)?;

    delete_debt(debt.id, &connection)?;

    Ok(Json(json!({ "success": "Debt deleted successfully" })))
}
