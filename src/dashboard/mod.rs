//! Dashboard module
//!
//! Summarises a user's income, expenses and hustles: all-time totals, the
//! change from last month, a twelve month chart and the best performing hustles.

mod aggregation;
mod handlers;
mod queries;

pub use handlers::get_dashboard_overview;
