mod blocklist;
mod forgot_password;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod refresh;
mod register_user;
mod secret_token;
mod token;
mod verify_email;

pub use blocklist::{create_token_blocklist_table, is_token_revoked, revoke_token};
pub use forgot_password::{confirm_password_reset, request_password_reset, validate_reset_token};
pub use log_in::{LogInState, log_in};
pub use log_out::log_out;
pub use middleware::{AuthUser, auth_guard, authenticate_token, bearer_token};
pub use password::{PasswordHash, ValidatedPassword};
pub use refresh::refresh_tokens;
pub use register_user::{AccountState, register_user};
pub use secret_token::{SecretToken, hash_secret};
#[cfg(test)]
pub use token::encode_token;
pub use token::{Claims, JwtKeys, TokenType, decode_token, issue_token_pair};
pub use verify_email::{resend_verification, verify_email};
