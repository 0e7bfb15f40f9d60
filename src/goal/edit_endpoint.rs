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
    date::parse_optional_date,
    db::lock_connection,
    goal::{
        Goal, GoalId, GoalStatus, GoalUpdate, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH, get_goal,
        update_goal,
    },
    hustle::{HustleId, ensure_hustle_owned_by},
    json::ApiJson,
    validation::{deserialize_some, updated_text},
};

#[derive(Debug, Deserialize)]
pub struct EditGoalRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub hustle_id: Option<Option<HustleId>>,
}

impl EditGoalRequest {
    fn validate(self) -> Result<GoalUpdate, Error> {
        Ok(GoalUpdate {
            title: updated_text("title", self.title.as_deref(), MAX_TITLE_LENGTH)?,
            description: updated_text(
                "description",
                self.description.as_deref(),
                MAX_DESCRIPTION_LENGTH,
            )?,
            due_date: parse_optional_date(self.due_date.as_deref())?,
            status: self
                .status
                .as_deref()
                .map(str::parse::<GoalStatus>)
                .transpose()?,
            hustle_id: self.hustle_id,
        })
    }
}

/// Update some or all of a goal's fields.
pub async fn edit_goal_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<GoalId>,
    ApiJson(request): ApiJson<EditGoalRequest>,
) -> Result<Json<Goal>, Error> {
    let update = request.validate()?;

    let connection = lock_connection(&db_connection)?;
    let goal = get_goal(goal_id, &connection)?;
    ensure_owner_or_admin(&auth_user, goal.user_id)?;

    if let Some(Some(hustle_id)) = update.hustle_id {
        ensure_hustle_owned_by(hustle_id, goal.user_id, &connection)?;
    }

    let goal = update_goal(goal.id, update, &connection)?;

    Ok(Json(goal))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        endpoints::{self, format_endpoint},
        goal::{Goal, GoalStatus},
        test_utils::{TestApp, insert_test_goal},
    };

    #[tokio::test]
    async fn complete_goal() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");
        let goal = insert_test_goal(&app.connection(), &user, "Holiday", date!(2025 - 08 - 01));

        let response = app
            .server
            .put(&format_endpoint(endpoints::GOAL, goal.id))
            .authorization_bearer(app.access_token(&user))
            .json(&json!({ "status": "completed" }))
            .await;

        response.assert_status_ok();
        let updated = response.json::<Goal>();
        assert_eq!(updated.status, GoalStatus::Completed);
        assert_eq!(updated.title, "Holiday");
    }

    #[tokio::test]
    async fn admin_cannot_link_to_hustle_of_another_user() {
        let app = TestApp::new();
        let admin = app.insert_admin("admin");
        let john = app.insert_user("john_doe");
        let admins_hustle = app.insert_hustle(&admin, "Consulting");
        let goal = insert_test_goal(&app.connection(), &john, "Holiday", date!(2025 - 08 - 01));

        app.server
            .put(&format_endpoint(endpoints::GOAL, goal.id))
            .authorization_bearer(app.access_token(&admin))
            .json(&json!({ "hustle_id": admins_hustle.id }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
