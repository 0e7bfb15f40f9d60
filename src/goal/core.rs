//! Defines the core data models and database queries for savings goals.

use std::{fmt, str::FromStr};

use rusqlite::{
    Connection, Row, params, params_from_iter,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::DatabaseId,
    db::Filter,
    hustle::HustleId,
    transaction::map_hustle_error,
    user::UserID,
};

/// Database identifier for a goal.
pub type GoalId = DatabaseId;

/// Progress towards a goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl GoalStatus {
    /// The name used in the database and the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Pending => "pending",
            GoalStatus::InProgress => "in_progress",
            GoalStatus::Completed => "completed",
            GoalStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalStatus {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim() {
            "pending" => Ok(GoalStatus::Pending),
            "in_progress" => Ok(GoalStatus::InProgress),
            "completed" => Ok(GoalStatus::Completed),
            "cancelled" => Ok(GoalStatus::Cancelled),
            other => Err(Error::InvalidStatus(other.to_owned())),
        }
    }
}

impl ToSql for GoalStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for GoalStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// Something a user is working towards by a due date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub title: String,
    pub description: String,
    pub due_date: Date,
    pub status: GoalStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub user_id: UserID,
    pub hustle_id: Option<HustleId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub title: String,
    pub description: String,
    pub due_date: Date,
    pub status: GoalStatus,
    pub user_id: UserID,
    pub hustle_id: Option<HustleId>,
}

/// Changes to a goal. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<Date>,
    pub status: Option<GoalStatus>,
    pub hustle_id: Option<Option<HustleId>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalFilter {
    pub user_id: Option<UserID>,
    pub status: Option<GoalStatus>,
    pub hustle_id: Option<HustleId>,
}

const GOAL_COLUMNS: &str =
    "id, title, description, due_date, status, created_at, updated_at, user_id, hustle_id";

/// Create the goal table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS goal (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                due_date TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'in_progress', 'completed', 'cancelled')),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                hustle_id INTEGER,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(hustle_id) REFERENCES hustle(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_goal_user_due_date ON goal(user_id, due_date)",
        (),
    )?;

    Ok(())
}

fn map_goal_row(row: &Row) -> Result<Goal, rusqlite::Error> {
    Ok(Goal {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        due_date: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        user_id: row.get(7)?,
        hustle_id: row.get(8)?,
    })
}

/// Create a new goal in the database.
///
/// # Errors
/// Returns [Error::InvalidHustle] if the hustle does not exist.
pub fn create_goal(new_goal: NewGoal, connection: &Connection) -> Result<Goal, Error> {
    let hustle_id = new_goal.hustle_id;

    connection
        .prepare(&format!(
            "INSERT INTO goal
                (title, description, due_date, status, created_at, updated_at, user_id, hustle_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6, ?7)
             RETURNING {GOAL_COLUMNS}"
        ))?
        .query_row(
            params![
                new_goal.title,
                new_goal.description,
                new_goal.due_date,
                new_goal.status,
                OffsetDateTime::now_utc(),
                new_goal.user_id,
                new_goal.hustle_id,
            ],
            map_goal_row,
        )
        .map_err(|error| map_hustle_error(error, hustle_id))
}

/// Retrieve a goal by its ID.
///
/// # Errors
/// Returns [Error::NotFound] if the goal does not exist.
pub fn get_goal(id: GoalId, connection: &Connection) -> Result<Goal, Error> {
    connection
        .prepare(&format!("SELECT {GOAL_COLUMNS} FROM goal WHERE id = ?1"))?
        .query_row([id], map_goal_row)
        .map_err(Error::from)
}

/// Retrieve the goals matching `filter`, soonest due first.
pub fn list_goals(filter: &GoalFilter, connection: &Connection) -> Result<Vec<Goal>, Error> {
    let mut conditions = Filter::default();
    conditions.add("user_id = ?", filter.user_id.map(|id| id.as_i64()));
    conditions.add("status = ?", filter.status.map(|status| status.as_str().to_owned()));
    conditions.add("hustle_id = ?", filter.hustle_id);

    connection
        .prepare(&format!(
            "SELECT {GOAL_COLUMNS} FROM goal {} ORDER BY due_date ASC, id ASC",
            conditions.where_clause()
        ))?
        .query_map(params_from_iter(conditions.into_params()), map_goal_row)?
        .map(|maybe_goal| maybe_goal.map_err(Error::from))
        .collect()
}

/// Apply `update` to a goal and return the updated goal.
///
/// # Errors
/// Returns [Error::NotFound] if the goal does not exist.
pub fn update_goal(id: GoalId, update: GoalUpdate, connection: &Connection) -> Result<Goal, Error> {
    let (set_hustle, hustle_id) = match update.hustle_id {
        Some(hustle_id) => (true, hustle_id),
        None => (false, None),
    };

    connection
        .prepare(&format!(
            "UPDATE goal SET
                title = COALESCE(?2, title),
                description = COALESCE(?3, description),
                due_date = COALESCE(?4, due_date),
                status = COALESCE(?5, status),
                hustle_id = CASE WHEN ?6 THEN ?7 ELSE hustle_id END,
                updated_at = ?8
             WHERE id = ?1
             RETURNING {GOAL_COLUMNS}"
        ))?
        .query_row(
            params![
                id,
                update.title,
                update.description,
                update.due_date,
                update.status,
                set_hustle,
                hustle_id,
                OffsetDateTime::now_utc(),
            ],
            map_goal_row,
        )
        .map_err(|error| map_hustle_error(error, hustle_id))
}

/// Delete a goal.
///
/// # Errors
/// Returns [Error::NotFound] if the goal does not exist.
pub fn delete_goal(id: GoalId, connection: &Connection) -> Result<(), Error> {
    match connection.execute("DELETE FROM goal WHERE id = ?1", [id])? {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}
