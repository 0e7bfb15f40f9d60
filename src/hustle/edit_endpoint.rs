//! Defines the endpoint for updating a hustle.

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
    db::lock_connection,
    hustle::{
        Hustle, HustleId, HustleUpdate, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH,
        MAX_TYPE_LENGTH, get_hustle, update_hustle,
    },
    json::ApiJson,
    validation::{deserialize_some, optional_text, updated_text},
};

/// Fields to change on a hustle. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct EditHustleRequest {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub hustle_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl EditHustleRequest {
    fn validate(self) -> Result<HustleUpdate, Error> {
        Ok(HustleUpdate {
            title: updated_text("title", self.title.as_deref(), MAX_TITLE_LENGTH)?,
            hustle_type: updated_text("type", self.hustle_type.as_deref(), MAX_TYPE_LENGTH)?,
            description: self
                .description
                .map(|description| {
                    optional_text("description", description.as_deref(), MAX_DESCRIPTION_LENGTH)
                })
                .transpose()?,
            is_active: self.is_active,
        })
    }
}

/// Update some or all of a hustle's fields.
pub async fn edit_hustle_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(hustle_id): Path<HustleId>,
    ApiJson(request): ApiJson<EditHustleRequest>,
) -> Result<Json<Hustle>, Error> {
    let update = request.validate()?;

    let connection = lock_connection(&db_connection)?;
    let hustle = get_hustle(hustle_id, &connection)?;
    ensure_owner_or_admin(&auth_user, hustle.user_id)?;

    let hustle = update_hustle(hustle.id, update, &connection)?;

    Ok(Json(hustle))
}
