//! Defines the endpoint for creating a hustle.

use std::sync::{Arc, Mutex};

use axum::{Extension, Json, extract::State, http::StatusCode};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    Error,
    auth::AuthUser,
    db::lock_connection,
    hustle::{
        Hustle, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH, MAX_TYPE_LENGTH, NewHustle,
        create_hustle,
    },
    json::ApiJson,
    validation::{optional_text, required_text},
};

#[derive(Debug, Deserialize)]
pub struct CreateHustleRequest {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub hustle_type: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Create a hustle owned by the authenticated user.
pub async fn create_hustle_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateHustleRequest>,
) -> Result<(StatusCode, Json<Hustle>), Error> {
    let new_hustle = NewHustle {
        title: required_text("title", request.title.as_deref(), MAX_TITLE_LENGTH)?,
        hustle_type: required_text("type", request.hustle_type.as_deref(), MAX_TYPE_LENGTH)?,
        description: optional_text(
            "description",
            request.description.as_deref(),
            MAX_DESCRIPTION_LENGTH,
        )?,
        is_active: request.is_active.unwrap_or(true),
        user_id: auth_user.id,
    };

    let hustle = create_hustle(new_hustle, &*lock_connection(&db_connection)?)?;
    tracing::debug!("user {} created hustle {}", auth_user.id, hustle.id);

    Ok((StatusCode::CREATED, Json(hustle)))
}
