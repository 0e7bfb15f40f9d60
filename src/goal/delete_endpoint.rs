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
    goal::{GoalId, delete_goal, get_goal},
};

pub async fn delete_goal_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<GoalId>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&db_connection)?;
    let goal = get_goal(goal_id, &connection)?;
    ensure_owner_or_admin(&auth_user, goal.user_id)?;

    delete_goal(goal.id, &connection)?;

    Ok(Json(json!({ "success": "Goal deleted successfully" })))
}
