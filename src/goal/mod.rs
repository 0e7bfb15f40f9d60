//! Savings and personal goals with a due date, optionally attributed to a hustle.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;

pub use core::{
    Goal, GoalFilter, GoalId, GoalStatus, GoalUpdate, NewGoal, create_goal, create_goal_table,
    delete_goal, get_goal, list_goals, update_goal,
};
pub use create_endpoint::create_goal_endpoint;
pub use delete_endpoint::delete_goal_endpoint;
pub use edit_endpoint::edit_goal_endpoint;
pub use get_endpoint::{get_goal_endpoint, get_goals_endpoint};

/// Maximum length of a goal's title.
pub const MAX_TITLE_LENGTH: usize = 100;
/// Maximum length of a goal's description.
pub const MAX_DESCRIPTION_LENGTH: usize = 200;
