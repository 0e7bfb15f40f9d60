//! Database initialisation and connection helpers.

use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Transaction as SqlTransaction, types::Value};

use crate::{
    Error, auth::create_token_blocklist_table, debt::create_debt_table,
    goal::create_goal_table, hustle::create_hustle_table,
    transaction::create_transaction_table, user::create_user_table,
};

/// The tables in the order they must be created. Tables are dropped in the
/// reverse order.
const TABLE_NAMES: [&str; 6] = [
    "user",
    "token_blocklist",
    "hustle",
    "\"transaction\"",
    "debt",
    "goal",
];

/// Create all of the database tables for the application.
///
/// Foreign key enforcement is switched on for `connection` before the tables
/// are created. Tables that already exist are left untouched.
///
/// # Errors
/// This function may return a [rusqlite::Error] if something went wrong creating the tables.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    // Has no effect inside a transaction, so it must come first.
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_token_blocklist_table(&transaction)?;
    create_hustle_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_debt_table(&transaction)?;
    create_goal_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Drop every application table, deleting all data.
///
/// # Errors
/// Returns a [rusqlite::Error] if a table could not be dropped.
pub fn drop_all_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    for table in TABLE_NAMES.iter().rev() {
        transaction.execute(&format!("DROP TABLE IF EXISTS {table}"), ())?;
    }

    transaction.commit()
}

/// Acquire the lock on the shared database connection.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the mutex has been poisoned.
pub fn lock_connection(
    connection: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}

/// The `WHERE` conditions of a list query and the values bound to them.
///
/// Each condition uses a single `?` placeholder, bound in the order the
/// conditions were added.
#[derive(Debug, Default)]
pub struct Filter {
    conditions: Vec<&'static str>,
    params: Vec<Value>,
}

impl Filter {
    /// Add `condition` with its parameter if `value` is set.
    pub fn add<T: Into<Value>>(&mut self, condition: &'static str, value: Option<T>) {
        if let Some(value) = value {
            self.conditions.push(condition);
            self.params.push(value.into());
        }
    }

    /// Add a condition that uses the same parameter several times, e.g. a search over two columns.
    pub fn add_repeated(&mut self, condition: &'static str, value: Option<String>, times: usize) {
        if let Some(value) = value {
            self.conditions.push(condition);
            self.params
                .extend(std::iter::repeat_n(Value::Text(value), times));
        }
    }

    /// The `WHERE` clause, or an empty string when there are no conditions.
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// The values to bind, in order.
    pub fn into_params(self) -> Vec<Value> {
        self.params
    }
}
