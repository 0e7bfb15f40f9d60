//! Defines the core data models and database queries for debts.

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

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for a debt.
pub type DebtId = DatabaseId;

/// How much of a debt has been paid back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    #[default]
    Pending,
    PartiallyPaid,
    Paid,
}

impl DebtStatus {
    /// The name used in the database and the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtStatus::Pending => "pending",
            DebtStatus::PartiallyPaid => "partially_paid",
            DebtStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for DebtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DebtStatus {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim() {
            "pending" => Ok(DebtStatus::Pending),
            "partially_paid" => Ok(DebtStatus::PartiallyPaid),
            "paid" => Ok(DebtStatus::Paid),
            other => Err(Error::InvalidStatus(other.to_owned())),
        }
    }
}

impl ToSql for DebtStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for DebtStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// Money owed to a creditor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: DebtId,
    /// How much is owed. Always positive.
    pub amount: f64,
    /// Who the money is owed to.
    pub creditor: String,
    pub description: Option<String>,
    /// When the debt should be paid back by.
    pub due_date: Date,
    pub status: DebtStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub user_id: UserID,
    pub hustle_id: Option<HustleId>,
}

/// The data needed to create a debt.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDebt {
    pub amount: f64,
    pub creditor: String,
    pub description: Option<String>,
    pub due_date: Date,
    pub status: DebtStatus,
    pub user_id: UserID,
    pub hustle_id: Option<HustleId>,
}

/// Changes to a debt. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebtUpdate {
    pub amount: Option<f64>,
    pub creditor: Option<String>,
    pub description: Option<Option<String>>,
    pub due_date: Option<Date>,
    pub status: Option<DebtStatus>,
    pub hustle_id: Option<Option<HustleId>>,
}

/// Which debts to list. Every field that is `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebtFilter {
    pub user_id: Option<UserID>,
    pub status: Option<DebtStatus>,
    pub hustle_id: Option<HustleId>,
    /// Earliest due date, inclusive.
    pub start_date: Option<Date>,
    /// Latest due date, inclusive.
    pub end_date: Option<Date>,
    /// Matches a substring of the creditor or description.
    pub search: Option<String>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const DEBT_COLUMNS: &str = "id, amount, creditor, description, due_date, status, created_at, \
    updated_at, user_id, hustle_id";

/// Create the debt table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_debt_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS debt (
                id INTEGER PRIMARY KEY,
                amount REAL NOT NULL CHECK (amount > 0),
                creditor TEXT NOT NULL,
                description TEXT,
                due_date TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'partially_paid', 'paid')),
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
        "CREATE INDEX IF NOT EXISTS idx_debt_user_due_date ON debt(user_id, due_date)",
        (),
    )?;

    Ok(())
}

fn map_debt_row(row: &Row) -> Result<Debt, rusqlite::Error> {
    Ok(Debt {
        id: row.get(0)?,
        amount: row.get(1)?,
        creditor: row.get(2)?,
        description: row.get(3)?,
        due_date: row.get(4)?,
        status: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        user_id: row.get(8)?,
        hustle_id: row.get(9)?,
    })
}

/// Create a new debt in the database.
///
/// # Errors
/// Returns [Error::InvalidHustle] if the hustle does not exist.
pub fn create_debt(new_debt: NewDebt, connection: &Connection) -> Result<Debt, Error> {
    let hustle_id = new_debt.hustle_id;

    connection
        .prepare(&format!(
            "INSERT INTO debt
                (amount, creditor, description, due_date, status,
                created_at, updated_at, user_id, hustle_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, ?7, ?8)
             RETURNING {DEBT_COLUMNS}"
        ))?
        .query_row(
            params![
                new_debt.amount,
                new_debt.creditor,
                new_debt.description,
                new_debt.due_date,
                new_debt.status,
                OffsetDateTime::now_utc(),
                new_debt.user_id,
                new_debt.hustle_id,
            ],
            map_debt_row,
        )
        .map_err(|error| map_hustle_error(error, hustle_id))
}

/// Retrieve a debt by its ID.
///
/// # Errors
/// Returns [Error::NotFound] if the debt does not exist.
pub fn get_debt(id: DebtId, connection: &Connection) -> Result<Debt, Error> {
    connection
        .prepare(&format!("SELECT {DEBT_COLUMNS} FROM debt WHERE id = ?1"))?
        .query_row([id], map_debt_row)
        .map_err(Error::from)
}

/// Retrieve the debts matching `filter`, soonest due first.
pub fn list_debts(filter: &DebtFilter, connection: &Connection) -> Result<Vec<Debt>, Error> {
    let mut conditions = Filter::default();
    conditions.add("user_id = ?", filter.user_id.map(|id| id.as_i64()));
    conditions.add("status = ?", filter.status.map(|status| status.as_str().to_owned()));
    conditions.add("hustle_id = ?", filter.hustle_id);
    conditions.add("due_date >= ?", filter.start_date.map(|date| date.to_string()));
    conditions.add("due_date <= ?", filter.end_date.map(|date| date.to_string()));
    conditions.add_repeated(
        "(creditor LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\')",
        filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|search| !search.is_empty())
            .map(|search| format!("%{}%", escape_like(search))),
        2,
    );

    connection
        .prepare(&format!(
            "SELECT {DEBT_COLUMNS} FROM debt {} ORDER BY due_date ASC, id ASC",
            conditions.where_clause()
        ))?
        .query_map(params_from_iter(conditions.into_params()), map_debt_row)?
        .map(|maybe_debt| maybe_debt.map_err(Error::from))
        .collect()
}

/// Escape the `LIKE` wildcards in `text` so it only matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for character in text.chars() {
        if matches!(character, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(character);
    }

    escaped
}

/// Apply `update` to a debt and return the updated debt.
///
/// # Errors
/// Returns [Error::NotFound] if the debt does not exist.
pub fn update_debt(id: DebtId, update: DebtUpdate, connection: &Connection) -> Result<Debt, Error> {
    let (set_description, description) = match update.description {
        Some(description) => (true, description),
        None => (false, None),
    };
    let (set_hustle, hustle_id) = match update.hustle_id {
        Some(hustle_id) => (true, hustle_id),
        None => (false, None),
    };

    connection
        .prepare(&format!(
            "UPDATE debt SET
                amount = COALESCE(?2, amount),
                creditor = COALESCE(?3, creditor),
                description = CASE WHEN ?4 THEN ?5 ELSE description END,
                due_date = COALESCE(?6, due_date),
                status = COALESCE(?7, status),
                hustle_id = CASE WHEN ?8 THEN ?9 ELSE hustle_id END,
                updated_at = ?10
             WHERE id = ?1
             RETURNING {DEBT_COLUMNS}"
        ))?
        .query_row(
            params![
                id,
                update.amount,
                update.creditor,
                set_description,
                description,
                update.due_date,
                update.status,
                set_hustle,
                hustle_id,
                OffsetDateTime::now_utc(),
            ],
            map_debt_row,
        )
        .map_err(|error| map_hustle_error(error, hustle_id))
}

/// Delete a debt.
///
/// # Errors
/// Returns [Error::NotFound] if the debt does not exist.
pub fn delete_debt(id: DebtId, connection: &Connection) -> Result<(), Error> {
    match connection.execute("DELETE FROM debt WHERE id = ?1", [id])? {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        test_utils::{get_test_connection, insert_test_debt, insert_test_hustle, insert_test_user},
    };

    use super::{
        DebtFilter, DebtStatus, DebtUpdate, delete_debt, get_debt, list_debts, update_debt,
    };

    #[test]
    fn parse_debt_status() {
        assert_eq!("partially_paid".parse(), Ok(DebtStatus::PartiallyPaid));
        assert_eq!(
            "overdue".parse::<DebtStatus>(),
            Err(Error::InvalidStatus("overdue".to_owned()))
        );
    }

    #[test]
    fn new_debts_are_pending() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "john_doe");

        let debt = insert_test_debt(&connection, &user, "Bank", date!(2025 - 06 - 01));

        assert_eq!(debt.status, DebtStatus::Pending);
        assert_eq!(get_debt(debt.id, &connection), Ok(debt));
    }

    #[test]
    fn list_orders_by_due_date() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "john_doe");
        let later = insert_test_debt(&connection, &user, "Bank", date!(2025 - 09 - 01));
        let sooner = insert_test_debt(&connection, &user, "Mum", date!(2025 - 03 - 01));

        let debts = list_debts(
            &DebtFilter {
                user_id: Some(user.id),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        assert_eq!(debts, vec![sooner, later]);
    }

    #[test]
    fn list_filters_by_status_range_and_search() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "john_doe");
        let bank = insert_test_debt(&connection, &user, "Big Bank", date!(2025 - 02 - 01));
        let mum = insert_test_debt(&connection, &user, "Mum", date!(2025 - 03 - 01));
        let paid = update_debt(
            mum.id,
            DebtUpdate {
                status: Some(DebtStatus::Paid),
                description: Some(Some("car repairs".to_owned())),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();
        insert_test_debt(&connection, &user, "Landlord", date!(2025 - 12 - 01));

        let paid_debts = list_debts(
            &DebtFilter {
                status: Some(DebtStatus::Paid),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();
        assert_eq!(paid_debts, vec![paid.clone()]);

        let first_quarter = list_debts(
            &DebtFilter {
                start_date: Some(date!(2025 - 01 - 01)),
                end_date: Some(date!(2025 - 03 - 31)),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();
        assert_eq!(first_quarter, vec![bank.clone(), paid.clone()]);

        let by_creditor = list_debts(
            &DebtFilter {
                search: Some("bank".to_owned()),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();
        assert_eq!(by_creditor, vec![bank]);

        let by_description = list_debts(
            &DebtFilter {
                search: Some("repairs".to_owned()),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();
        assert_eq!(by_description, vec![paid]);
    }

    #[test]
    fn search_treats_wildcards_literally() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "john_doe");
        insert_test_debt(&connection, &user, "Big Bank", date!(2025 - 02 - 01));
        let store = insert_test_debt(&connection, &user, "50%_off Store", date!(2025 - 03 - 01));
        let search = |text: &str| {
            list_debts(
                &DebtFilter {
                    search: Some(text.to_owned()),
                    ..Default::default()
                },
                &connection,
            )
            .unwrap()
        };

        assert_eq!(search("_"), vec![store.clone()]);
        assert_eq!(search("%"), vec![store.clone()]);
        assert_eq!(search("%_off"), vec![store]);
        assert!(search("B_g").is_empty());
    }

    #[test]
    fn update_only_status() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "john_doe");
        let hustle = insert_test_hustle(&connection, &user, "Uber");
        let debt = insert_test_debt(&connection, &user, "Bank", date!(2025 - 06 - 01));
        let linked = update_debt(
            debt.id,
            DebtUpdate {
                hustle_id: Some(Some(hustle.id)),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        let updated = update_debt(
            debt.id,
            DebtUpdate {
                status: Some(DebtStatus::PartiallyPaid),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        assert_eq!(updated.status, DebtStatus::PartiallyPaid);
        assert_eq!(updated.amount, debt.amount);
        assert_eq!(updated.creditor, debt.creditor);
        assert_eq!(updated.hustle_id, linked.hustle_id);
    }

    #[test]
    fn delete_debt_removes_it() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "john_doe");
        let debt = insert_test_debt(&connection, &user, "Bank", date!(2025 - 06 - 01));

        delete_debt(debt.id, &connection).unwrap();

        assert_eq!(get_debt(debt.id, &connection), Err(Error::NotFound));
    }
}
