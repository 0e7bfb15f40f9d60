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
    goal::{Goal, GoalFilter, GoalId, GoalStatus, get_goal, list_goals},
    hustle::HustleId,
};

#[derive(Debug, Default, Deserialize)]
pub struct GoalQuery {
    pub user_id: Option<i64>,
    pub status: Option<String>,
    pub hustle_id: Option<HustleId>,
}

/// List goals, soonest due first.
pub async fn get_goals_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<GoalQuery>,
) -> Result<Json<Vec<Goal>>, Error> {
    let filter = GoalFilter {
        user_id: owner_filter(&auth_user, query.user_id)?,
        status: query
            .status
            .as_deref()
            .filter(|status| !status.is_empty())
            .map(str::parse::<GoalStatus>)
            .transpose()?,
        hustle_id: query.hustle_id,
    };

    let goals = list_goals(&filter, &*lock_connection(&db_connection)?)?;

    Ok(Json(goals))
}

pub async fn get_goal_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<GoalId>,
) -> Result<Json<Goal>, Error> {
    let goal = get_goal(goal_id, &*lock_connection(&db_connection)?)?;
    ensure_owner_or_admin(&auth_user, goal.user_id)?;

    Ok(Json(goal))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use time::macros::date;

    use crate::{
        endpoints::{self, format_endpoint},
        goal::Goal,
        test_utils::{TestApp, insert_test_goal},
    };

    #[tokio::test]
    async fn list_goals_by_status() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");
        let holiday = insert_test_goal(&app.connection(), &user, "Holiday", date!(2025 - 08 - 01));

        let token = app.access_token(&user);
        let pending = app
            .server
            .get(endpoints::GOALS)
            .add_query_param("status", "pending")
            .authorization_bearer(&token)
            .await
            .json::<Vec<Goal>>();
        assert_eq!(pending, vec![holiday]);

        let completed = app
            .server
            .get(endpoints::GOALS)
            .add_query_param("status", "completed")
            .authorization_bearer(&token)
            .await
            .json::<Vec<Goal>>();
        assert!(completed.is_empty());
    }

    #[tokio::test]
    async fn other_users_goal_is_hidden() {
        let app = TestApp::new();
        let john = app.insert_user("john_doe");
        let jane = app.insert_user("jane_smith");
        let goal = insert_test_goal(&app.connection(), &jane, "Holiday", date!(2025 - 08 - 01));

        app.server
            .get(&format_endpoint(endpoints::GOAL, goal.id))
            .authorization_bearer(app.access_token(&john))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
