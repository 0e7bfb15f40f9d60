//! Route handlers for reading user profiles.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use rusqlite::Connection;

use crate::{
    Error,
    access::{ensure_owner_or_admin, require_admin},
    auth::AuthUser,
    db::lock_connection,
    user::{UserID, UserView, get_user_by_id, list_users},
};

/// Get the authenticated user's own profile.
pub async fn get_me(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<UserView>, Error> {
    let connection = lock_connection(&db_connection)?;
    let user = get_user_by_id(auth_user.id, &connection)?;

    Ok(Json(UserView::from(&user)))
}

/// Get a user's profile. Users may only view themselves unless they are an admin.
pub async fn get_user(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserView>, Error> {
    let user_id = UserID::new(user_id);
    ensure_owner_or_admin(&auth_user, user_id)?;

    let connection = lock_connection(&db_connection)?;
    let user = get_user_by_id(user_id, &connection)?;

    Ok(Json(UserView::from(&user)))
}

/// List every user. Admin only.
pub async fn get_users(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Vec<UserView>>, Error> {
    require_admin(&auth_user)?;

    let connection = lock_connection(&db_connection)?;
    let users = list_users(&connection)?;

    Ok(Json(users.iter().map(UserView::from).collect()))
}
