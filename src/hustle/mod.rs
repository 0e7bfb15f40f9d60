//! Hustles: the income-generating activities that records can be attributed to.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;

pub use core::{
    Hustle, HustleId, HustleUpdate, NewHustle, create_hustle, create_hustle_table, delete_hustle,
    ensure_hustle_owned_by, get_hustle, list_hustles, update_hustle,
};
pub use create_endpoint::create_hustle_endpoint;
pub use delete_endpoint::delete_hustle_endpoint;
pub use edit_endpoint::edit_hustle_endpoint;
pub use get_endpoint::{get_hustle_endpoint, get_hustle_transactions, get_hustles_endpoint};

/// Maximum length of a hustle's title.
pub const MAX_TITLE_LENGTH: usize = 100;
/// Maximum length of a hustle's type.
pub const MAX_TYPE_LENGTH: usize = 50;
/// Maximum length of a hustle's description.
pub const MAX_DESCRIPTION_LENGTH: usize = 200;
