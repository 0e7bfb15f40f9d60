//! The dashboard overview handler and its response types.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    access::target_user,
    auth::AuthUser,
    dashboard::{
        aggregation::{
            HustleStatus, hustle_status, last_months, month_label, percentage_change,
            top_by_income, top_by_profit, totals_for_months,
        },
        queries::{
            count_active_hustles, get_hustle_totals, get_monthly_totals, get_recent_transactions,
            get_totals,
        },
    },
    date::today,
    db::lock_connection,
    hustle::HustleId,
    transaction::{TransactionId, TransactionType},
    user::{UserID, get_user_by_id},
};

/// Number of calendar months in the monthly chart, including the current month.
const MONTHS_IN_CHART: usize = 12;
const HUSTLE_COMPARISON_LIMIT: usize = 5;
const TOP_HUSTLES_LIMIT: usize = 3;
const RECENT_TRANSACTIONS_LIMIT: u32 = 5;

/// The label for transactions that are not linked to a hustle.
const GENERAL_HUSTLE_LABEL: &str = "General";

/// Income, expenses and profit for one month of the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// e.g. "Jan".
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HustleComparison {
    pub name: String,
    pub income: f64,
    pub expenses: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentTransactionView {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub description: String,
    pub amount: f64,
    pub date: Date,
    /// The hustle's title, or "General".
    pub hustle: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HustlePerformance {
    pub id: HustleId,
    pub name: String,
    pub status: HustleStatus,
    pub income: f64,
    pub expenses: f64,
    pub profit: f64,
}

/// A summary of a user's finances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub user_name: String,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_profit: f64,
    /// Percentage change in income from last month to this month.
    pub income_change: i64,
    /// Percentage change in expenses from last month to this month.
    pub expenses_change: i64,
    pub active_hustles: i64,
    /// Oldest month first.
    pub monthly_data: Vec<MonthlySummary>,
    pub hustle_comparison: Vec<HustleComparison>,
    pub recent_transactions: Vec<RecentTransactionView>,
    pub hustles: Vec<HustlePerformance>,
}

/// Query parameters for the dashboard.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// Admins can view another user's dashboard.
    pub user_id: Option<i64>,
}

/// Get the dashboard overview for the caller, or for `?user_id=` when the caller is an admin.
pub async fn get_dashboard_overview(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardOverview>, Error> {
    let user_id = target_user(&auth_user, query.user_id)?;

    let connection = lock_connection(&db_connection)?;
    let overview = build_overview(user_id, today(), &connection)?;

    Ok(Json(overview))
}

/// Summarise the finances of `user_id` as of `today`.
///
/// # Errors
/// Returns [Error::NotFound] if the user does not exist.
pub fn build_overview(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<DashboardOverview, Error> {
    let user = get_user_by_id(user_id, connection)?;

    let totals = get_totals(user.id, connection)?;

    let months = last_months(today, MONTHS_IN_CHART);
    let first_month = months.first().copied().unwrap_or(today);
    let monthly_totals = totals_for_months(
        &months,
        &get_monthly_totals(user.id, first_month, connection)?,
    );

    let (income_change, expenses_change) = match monthly_totals.as_slice() {
        [.., (_, previous), (_, current)] => (
            percentage_change(current.income, previous.income),
            percentage_change(current.expenses, previous.expenses),
        ),
        _ => (0, 0),
    };

    let monthly_data = monthly_totals
        .iter()
        .map(|(month, totals)| MonthlySummary {
            month: month_label(*month).to_owned(),
            income: totals.income,
            expenses: totals.expenses,
            profit: totals.income - totals.expenses,
        })
        .collect();

    let hustle_totals = get_hustle_totals(user.id, connection)?;
    let hustle_comparison = top_by_income(&hustle_totals, HUSTLE_COMPARISON_LIMIT)
        .into_iter()
        .map(|hustle| HustleComparison {
            profit: hustle.profit(),
            name: hustle.title,
            income: hustle.income,
            expenses: hustle.expenses,
        })
        .collect();
    let hustles = top_by_profit(&hustle_totals, TOP_HUSTLES_LIMIT)
        .into_iter()
        .map(|hustle| HustlePerformance {
            status: hustle_status(&hustle, today),
            profit: hustle.profit(),
            id: hustle.id,
            name: hustle.title,
            income: hustle.income,
            expenses: hustle.expenses,
        })
        .collect();

    let recent_transactions =
        get_recent_transactions(user.id, RECENT_TRANSACTIONS_LIMIT, connection)?
            .into_iter()
            .map(|transaction| RecentTransactionView {
                id: transaction.id,
                transaction_type: transaction.transaction_type,
                description: transaction.description,
                amount: transaction.amount,
                date: transaction.date,
                hustle: transaction
                    .hustle
                    .unwrap_or_else(|| GENERAL_HUSTLE_LABEL.to_owned()),
            })
            .collect();

    Ok(DashboardOverview {
        user_name: user.username.to_string(),
        total_income: totals.income,
        total_expenses: totals.expenses,
        net_profit: totals.income - totals.expenses,
        income_change,
        expenses_change,
        active_hustles: count_active_hustles(user.id, connection)?,
        monthly_data,
        hustle_comparison,
        recent_transactions,
        hustles,
    })
}
