//! Database queries that summarise a user's transactions for the dashboard.

use std::collections::HashMap;

use rusqlite::{Connection, params};
use time::Date;

use crate::{
    Error,
    dashboard::aggregation::MonthTotals,
    hustle::HustleId,
    transaction::{TransactionId, TransactionType},
    user::UserID,
};

/// All-time income and expenses for a user.
pub(super) fn get_totals(user_id: UserID, connection: &Connection) -> Result<MonthTotals, Error> {
    connection
        .query_row(
            "SELECT
                COALESCE(SUM(CASE WHEN type = 'income' THEN amount END), 0),
                COALESCE(SUM(CASE WHEN type = 'expense' THEN amount END), 0)
            FROM \"transaction\"
            WHERE user_id = ?1",
            [user_id],
            |row| {
                Ok(MonthTotals {
                    income: row.get(0)?,
                    expenses: row.get(1)?,
                })
            },
        )
        .map_err(Error::from)
}

/// Income and expenses per calendar month from `start` onwards, keyed by "YYYY-MM".
pub(super) fn get_monthly_totals(
    user_id: UserID,
    start: Date,
    connection: &Connection,
) -> Result<HashMap<String, MonthTotals>, Error> {
    connection
        .prepare(
            "SELECT
                substr(date, 1, 7) AS month,
                COALESCE(SUM(CASE WHEN type = 'income' THEN amount END), 0),
                COALESCE(SUM(CASE WHEN type = 'expense' THEN amount END), 0)
            FROM \"transaction\"
            WHERE user_id = ?1 AND date >= ?2
            GROUP BY month",
        )?
        .query_map(params![user_id, start], |row| {
            Ok((
                row.get(0)?,
                MonthTotals {
                    income: row.get(1)?,
                    expenses: row.get(2)?,
                },
            ))
        })?
        .map(|maybe_row| maybe_row.map_err(Error::from))
        .collect()
}

/// The number of the user's hustles that are marked active.
pub(super) fn count_active_hustles(user_id: UserID, connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM hustle WHERE user_id = ?1 AND is_active = 1",
            [user_id],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Transaction totals for one hustle.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HustleTotals {
    pub id: HustleId,
    pub title: String,
    pub income: f64,
    pub expenses: f64,
    /// The date of the most recent linked transaction.
    pub last_activity: Option<Date>,
}

impl HustleTotals {
    pub fn profit(&self) -> f64 {
        self.income - self.expenses
    }
}

/// Totals for each of the user's hustles that has at least one transaction.
pub(super) fn get_hustle_totals(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<HustleTotals>, Error> {
    connection
        .prepare(
            "SELECT
                hustle.id,
                hustle.title,
                COALESCE(SUM(CASE WHEN t.type = 'income' THEN t.amount END), 0),
                COALESCE(SUM(CASE WHEN t.type = 'expense' THEN t.amount END), 0),
                MAX(t.date)
            FROM hustle
            INNER JOIN \"transaction\" t ON t.hustle_id = hustle.id
            WHERE hustle.user_id = ?1
            GROUP BY hustle.id",
        )?
        .query_map([user_id], |row| {
            Ok(HustleTotals {
                id: row.get(0)?,
                title: row.get(1)?,
                income: row.get(2)?,
                expenses: row.get(3)?,
                last_activity: row.get(4)?,
            })
        })?
        .map(|maybe_totals| maybe_totals.map_err(Error::from))
        .collect()
}

/// A transaction with the name of its hustle.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct RecentTransaction {
    pub id: TransactionId,
    pub transaction_type: TransactionType,
    pub description: String,
    pub amount: f64,
    pub date: Date,
    /// `None` for transactions that are not linked to a hustle.
    pub hustle: Option<String>,
}

/// The user's `limit` most recent transactions.
pub(super) fn get_recent_transactions(
    user_id: UserID,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<RecentTransaction>, Error> {
    connection
        .prepare(
            "SELECT t.id, t.type, t.description, t.amount, t.date, hustle.title
            FROM \"transaction\" t
            LEFT JOIN hustle ON hustle.id = t.hustle_id
            WHERE t.user_id = ?1
            ORDER BY t.date DESC, t.id DESC
            LIMIT ?2",
        )?
        .query_map(params![user_id, limit], |row| {
            Ok(RecentTransaction {
                id: row.get(0)?,
                transaction_type: row.get(1)?,
                description: row.get(2)?,
                amount: row.get(3)?,
                date: row.get(4)?,
                hustle: row.get(5)?,
            })
        })?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}
