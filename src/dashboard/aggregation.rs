//! Monthly windows, percentage changes and hustle rankings for the dashboard.

use std::collections::HashMap;

use time::{Date, Duration, Month};

use crate::dashboard::queries::HustleTotals;

/// How recently a hustle needs a transaction to count as active.
pub(super) const ACTIVITY_WINDOW_DAYS: i64 = 30;

/// The change from `previous` to `current` as a whole percentage.
///
/// Returns 0 when `previous` is 0.
pub(super) fn percentage_change(current: f64, previous: f64) -> i64 {
    if previous == 0.0 {
        return 0;
    }

    ((current - previous) / previous * 100.0).round() as i64
}

/// The first day of the month containing `date`.
pub(super) fn month_start(date: Date) -> Date {
    date.replace_day(1).unwrap_or(date)
}

/// The first day of the month before the month starting on `month`.
pub(super) fn previous_month(month: Date) -> Date {
    month_start(month - Duration::days(1))
}

/// The first day of each of the last `count` calendar months up to and
/// including the month containing `today`, oldest first.
pub(super) fn last_months(today: Date, count: usize) -> Vec<Date> {
    let mut months = Vec::with_capacity(count);
    let mut month = month_start(today);

    for _ in 0..count {
        months.push(month);
        month = previous_month(month);
    }

    months.reverse();
    months
}

/// The key used to group transactions by month in SQL, e.g. "2025-03".
pub(super) fn month_key(month: Date) -> String {
    format!("{:04}-{:02}", month.year(), u8::from(month.month()))
}

/// The three-letter abbreviation of the month, e.g. "Jan".
pub(super) fn month_label(month: Date) -> &'static str {
    match month.month() {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// Income and expenses for one calendar month.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(super) struct MonthTotals {
    pub income: f64,
    pub expenses: f64,
}

/// Look up the totals for each of `months`, using zero for months without transactions.
pub(super) fn totals_for_months(
    months: &[Date],
    totals_by_key: &HashMap<String, MonthTotals>,
) -> Vec<(Date, MonthTotals)> {
    months
        .iter()
        .map(|&month| {
            let totals = totals_by_key
                .get(&month_key(month))
                .copied()
                .unwrap_or_default();
            (month, totals)
        })
        .collect()
}

/// The `limit` hustles with the most income, highest first.
pub(super) fn top_by_income(hustles: &[HustleTotals], limit: usize) -> Vec<HustleTotals> {
    let mut ranked = hustles.to_vec();
    ranked.sort_by(|a, b| b.income.total_cmp(&a.income).then(a.id.cmp(&b.id)));
    ranked.truncate(limit);
    ranked
}

/// The `limit` hustles with the most profit, highest first.
pub(super) fn top_by_profit(hustles: &[HustleTotals], limit: usize) -> Vec<HustleTotals> {
    let mut ranked = hustles.to_vec();
    ranked.sort_by(|a, b| b.profit().total_cmp(&a.profit()).then(a.id.cmp(&b.id)));
    ranked.truncate(limit);
    ranked
}

/// Whether a hustle is doing fine or needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HustleStatus {
    Active,
    NeedsAttention,
}

/// A hustle is active when it had a transaction in the last 30 days and is not losing money.
pub(super) fn hustle_status(hustle: &HustleTotals, today: Date) -> HustleStatus {
    let recently_active = hustle
        .last_activity
        .is_some_and(|last| today - last < Duration::days(ACTIVITY_WINDOW_DAYS));

    if recently_active && hustle.profit() >= 0.0 {
        HustleStatus::Active
    } else {
        HustleStatus::NeedsAttention
    }
}
