//! Income and expense transactions, optionally attributed to a hustle.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;

pub use core::{
    NewTransaction, Transaction, TransactionFilter, TransactionId, TransactionType,
    TransactionUpdate, create_transaction, create_transaction_table, delete_transaction,
    get_transaction, list_transactions, update_transaction,
};
pub(crate) use core::map_hustle_error;
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use get_endpoint::{get_transaction_endpoint, get_transactions_endpoint};

/// Maximum length of a transaction's description.
pub const MAX_DESCRIPTION_LENGTH: usize = 200;
