//! Defines the core data models and database queries for transactions.

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
    user::UserID,
};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for a transaction.
pub type TransactionId = DatabaseId;

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// The name used in the database and the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned. Always positive.
    pub amount: f64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// When the money moved.
    pub date: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub user_id: UserID,
    /// The hustle the transaction is attributed to, if any.
    pub hustle_id: Option<HustleId>,
}

/// The data needed to create a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub description: String,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub date: Date,
    pub user_id: UserID,
    pub hustle_id: Option<HustleId>,
}

/// Changes to a transaction. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub transaction_type: Option<TransactionType>,
    pub date: Option<Date>,
    /// `Some(None)` unlinks the transaction from its hustle.
    pub hustle_id: Option<Option<HustleId>>,
}

/// Which transactions to list. Every field that is `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub user_id: Option<UserID>,
    pub transaction_type: Option<TransactionType>,
    pub hustle_id: Option<HustleId>,
    /// Inclusive.
    pub start_date: Option<Date>,
    /// Inclusive.
    pub end_date: Option<Date>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str =
    "id, description, amount, type, date, created_at, updated_at, user_id, hustle_id";

/// Create the transaction table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                hustle_id INTEGER,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(hustle_id) REFERENCES hustle(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    // Composite index for the dashboard and date range queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date)",
        (),
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_hustle_id ON \"transaction\"(hustle_id)",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        transaction_type: row.get(3)?,
        date: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        user_id: row.get(7)?,
        hustle_id: row.get(8)?,
    })
}

/// Create a new transaction in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidHustle] if the hustle ID does not refer to a real hustle,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let hustle_id = new_transaction.hustle_id;

    connection
        .prepare(&format!(
            "INSERT INTO \"transaction\"
                (description, amount, type, date, created_at, updated_at, user_id, hustle_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6, ?7)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            params![
                new_transaction.description,
                new_transaction.amount,
                new_transaction.transaction_type,
                new_transaction.date,
                OffsetDateTime::now_utc(),
                new_transaction.user_id,
                new_transaction.hustle_id,
            ],
            map_transaction_row,
        )
        .map_err(|error| map_hustle_error(error, hustle_id))
}

/// Retrieve a transaction by its ID.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1"
        ))?
        .query_row([id], map_transaction_row)
        .map_err(Error::from)
}

/// Retrieve the transactions matching `filter`, newest first.
pub fn list_transactions(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut conditions = Filter::default();
    conditions.add("user_id = ?", filter.user_id.map(|id| id.as_i64()));
    conditions.add(
        "type = ?",
        filter.transaction_type.map(|kind| kind.as_str().to_owned()),
    );
    conditions.add("hustle_id = ?", filter.hustle_id);
    conditions.add("date >= ?", filter.start_date.map(|date| date.to_string()));
    conditions.add("date <= ?", filter.end_date.map(|date| date.to_string()));

    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" {} ORDER BY date DESC, id DESC",
            conditions.where_clause()
        ))?
        .query_map(params_from_iter(conditions.into_params()), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Apply `update` to a transaction and return the updated transaction.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist or
/// [Error::InvalidHustle] if the new hustle does not exist.
pub fn update_transaction(
    id: TransactionId,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let (set_hustle, hustle_id) = match update.hustle_id {
        Some(hustle_id) => (true, hustle_id),
        None => (false, None),
    };

    connection
        .prepare(&format!(
            "UPDATE \"transaction\" SET
                description = COALESCE(?2, description),
                amount = COALESCE(?3, amount),
                type = COALESCE(?4, type),
                date = COALESCE(?5, date),
                hustle_id = CASE WHEN ?6 THEN ?7 ELSE hustle_id END,
                updated_at = ?8
             WHERE id = ?1
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            params![
                id,
                update.description,
                update.amount,
                update.transaction_type,
                update.date,
                set_hustle,
                hustle_id,
                OffsetDateTime::now_utc(),
            ],
            map_transaction_row,
        )
        .map_err(|error| map_hustle_error(error, hustle_id))
}

/// Delete a transaction.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    match connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])? {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

/// Maps a foreign key failure on `hustle_id` to [Error::InvalidHustle].
pub(crate) fn map_hustle_error(error: rusqlite::Error, hustle_id: Option<HustleId>) -> Error {
    match (error, hustle_id) {
        (
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ),
            Some(hustle_id),
        ) => Error::InvalidHustle(hustle_id),
        (error, _) => error.into(),
    }
}
