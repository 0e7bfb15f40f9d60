//! Debts owed by a user, optionally attributed to a hustle.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;

pub use core::{
    Debt, DebtFilter, DebtId, DebtStatus, DebtUpdate, NewDebt, create_debt, create_debt_table,
    delete_debt, get_debt, list_debts, update_debt,
};
pub use create_endpoint::create_debt_endpoint;
pub use delete_endpoint::delete_debt_endpoint;
pub use edit_endpoint::edit_debt_endpoint;
pub use get_endpoint::{DebtsResponse, get_debt_endpoint, get_debts_endpoint};

/// Maximum length of a creditor's name.
pub const MAX_CREDITOR_LENGTH: usize = 100;
/// Maximum length of a debt's description.
pub const MAX_DESCRIPTION_LENGTH: usize = 200;
