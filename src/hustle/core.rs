//! Defines the core data model and database queries for hustles.

use rusqlite::{Connection, Row, params, params_from_iter};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::DatabaseId,
    db::Filter,
    user::UserID,
};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for a hustle.
pub type HustleId = DatabaseId;

/// An income-generating activity that transactions, debts and goals can be attributed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hustle {
    /// The ID of the hustle.
    pub id: HustleId,
    /// A short name, e.g. "Uber driving".
    pub title: String,
    /// What kind of hustle it is, e.g. "side hustle" or "investment".
    #[serde(rename = "type")]
    pub hustle_type: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Whether the hustle is still being worked on.
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// The owner of the hustle.
    pub user_id: UserID,
}

/// The data needed to create a hustle.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHustle {
    pub title: String,
    pub hustle_type: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub user_id: UserID,
}

/// Changes to a hustle. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HustleUpdate {
    pub title: Option<String>,
    pub hustle_type: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const HUSTLE_COLUMNS: &str =
    "id, title, type, description, is_active, created_at, updated_at, user_id";

/// Create the hustle table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_hustle_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS hustle (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                type TEXT NOT NULL,
                description TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_hustle_user_id ON hustle(user_id)",
        (),
    )?;

    Ok(())
}

fn map_hustle_row(row: &Row) -> Result<Hustle, rusqlite::Error> {
    Ok(Hustle {
        id: row.get(0)?,
        title: row.get(1)?,
        hustle_type: row.get(2)?,
        description: row.get(3)?,
        is_active: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        user_id: row.get(7)?,
    })
}

/// Create a new hustle in the database.
///
/// # Errors
/// Returns an [Error::SqlError] if the owner does not exist or there is some other SQL error.
pub fn create_hustle(new_hustle: NewHustle, connection: &Connection) -> Result<Hustle, Error> {
    let now = OffsetDateTime::now_utc();

    connection
        .prepare(&format!(
            "INSERT INTO hustle
                (title, type, description, is_active, created_at, updated_at, user_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6)
            RETURNING {HUSTLE_COLUMNS}"
        ))?
        .query_row(
            params![
                new_hustle.title,
                new_hustle.hustle_type,
                new_hustle.description,
                new_hustle.is_active,
                now,
                new_hustle.user_id,
            ],
            map_hustle_row,
        )
        .map_err(Error::from)
}

/// Retrieve a hustle by its ID.
///
/// # Errors
/// Returns [Error::NotFound] if the hustle does not exist.
pub fn get_hustle(id: HustleId, connection: &Connection) -> Result<Hustle, Error> {
    connection
        .prepare(&format!("SELECT {HUSTLE_COLUMNS} FROM hustle WHERE id = ?1"))?
        .query_row([id], map_hustle_row)
        .map_err(Error::from)
}

/// Retrieve the hustles owned by `owner`, or every hustle when `owner` is `None`.
pub fn list_hustles(owner: Option<UserID>, connection: &Connection) -> Result<Vec<Hustle>, Error> {
    let mut filter = Filter::default();
    filter.add("user_id = ?", owner.map(|owner| owner.as_i64()));

    connection
        .prepare(&format!(
            "SELECT {HUSTLE_COLUMNS} FROM hustle {} ORDER BY created_at DESC, id DESC",
            filter.where_clause()
        ))?
        .query_map(params_from_iter(filter.into_params()), map_hustle_row)?
        .map(|maybe_hustle| maybe_hustle.map_err(Error::from))
        .collect()
}

/// Apply `update` to a hustle and return the updated hustle.
///
/// # Errors
/// Returns [Error::NotFound] if the hustle does not exist.
pub fn update_hustle(
    id: HustleId,
    update: HustleUpdate,
    connection: &Connection,
) -> Result<Hustle, Error> {
    let (set_description, description) = match update.description {
        Some(description) => (true, description),
        None => (false, None),
    };

    connection
        .prepare(&format!(
            "UPDATE hustle SET
                title = COALESCE(?2, title),
                type = COALESCE(?3, type),
                description = CASE WHEN ?4 THEN ?5 ELSE description END,
                is_active = COALESCE(?6, is_active),
                updated_at = ?7
            WHERE id = ?1
            RETURNING {HUSTLE_COLUMNS}"
        ))?
        .query_row(
            params![
                id,
                update.title,
                update.hustle_type,
                set_description,
                description,
                update.is_active,
                OffsetDateTime::now_utc(),
            ],
            map_hustle_row,
        )
        .map_err(Error::from)
}

/// Delete a hustle. Records linked to it are kept and unlinked.
///
/// # Errors
/// Returns [Error::NotFound] if the hustle does not exist.
pub fn delete_hustle(id: HustleId, connection: &Connection) -> Result<(), Error> {
    match connection.execute("DELETE FROM hustle WHERE id = ?1", [id])? {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

/// Check that `hustle_id` refers to a hustle owned by `owner`.
///
/// # Errors
/// Returns [Error::InvalidHustle] if the hustle does not exist or has another owner.
pub fn ensure_hustle_owned_by(
    hustle_id: HustleId,
    owner: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let is_owner: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM hustle WHERE id = ?1 AND user_id = ?2)",
        params![hustle_id, owner],
        |row| row.get(0),
    )?;

    if is_owner {
        Ok(())
    } else {
        Err(Error::InvalidHustle(hustle_id))
    }
}
