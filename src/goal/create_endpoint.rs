use std::sync::{Arc, Mutex};

use axum::{Extension, Json, extract::State, http::StatusCode};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    Error,
    auth::AuthUser,
    date::parse_date,
    db::lock_connection,
    goal::{Goal, GoalStatus, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH, NewGoal, create_goal},
    hustle::{HustleId, ensure_hustle_owned_by},
    json::ApiJson,
    validation::required_text,
};

#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
    pub hustle_id: Option<HustleId>,
}

/// Create a goal for the authenticated user.
pub async fn create_goal_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateGoalRequest>,
) -> Result<(StatusCode, Json<Goal>), Error> {
    let title = required_text("title", request.title.as_deref(), MAX_TITLE_LENGTH)?;
    let description = required_text(
        "description",
        request.description.as_deref(),
        MAX_DESCRIPTION_LENGTH,
    )?;
    let due_date = parse_date(
        request
            .due_date
            .as_deref()
            .ok_or(Error::MissingField("due_date"))?,
    )?;
    let status = request
        .status
        .as_deref()
        .map(str::parse::<GoalStatus>)
        .transpose()?
        .unwrap_or_default();

    let connection = lock_connection(&db_connection)?;
    if let Some(hustle_id) = request.hustle_id {
        ensure_hustle_owned_by(hustle_id, auth_user.id, &connection)?;
    }

    let goal = create_goal(
        NewGoal {
            title,
            description,
            due_date,
            status,
            user_id: auth_user.id,
            hustle_id: request.hustle_id,
        },
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(goal)))
}
