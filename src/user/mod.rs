//! Users, their profiles and the endpoints for managing them.

mod core;
mod delete_endpoint;
mod domain;
mod edit_endpoint;
mod get_endpoint;
mod view;

pub use core::{
    NewUser, User, count_users, create_user, create_user_table, delete_user, find_user_by_email,
    get_reset_token_owner, get_user_by_id, get_user_by_username_or_email, list_users,
    mark_verified, reset_password, set_admin, set_reset_token, set_verification_token,
    update_password, update_profile,
};
pub use delete_endpoint::delete_user_endpoint;
pub use domain::{Email, UserID, Username};
pub use edit_endpoint::{change_password, change_role, edit_user};
pub use get_endpoint::{get_me, get_user, get_users};
pub use view::UserView;
