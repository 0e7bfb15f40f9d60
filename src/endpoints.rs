//! The API endpoint paths.
//!
//! Paths with a parameter use the `{id}` syntax understood by the axum router.
//! Use [format_endpoint] to fill in the parameter.

pub const USERS: &str = "/users";
pub const USERS_ME: &str = "/users/me";
pub const USER: &str = "/users/{id}";
pub const USER_PASSWORD: &str = "/users/{id}/password";
pub const USER_ROLE: &str = "/users/{id}/role";
pub const PASSWORD_RESET_REQUEST: &str = "/users/password-reset/request";
pub const PASSWORD_RESET_VALIDATE: &str = "/users/password-reset/validate";
pub const PASSWORD_RESET_CONFIRM: &str = "/users/password-reset/confirm";

pub const LOG_IN: &str = "/auth/login";
pub const LOG_OUT: &str = "/auth/logout";
pub const REFRESH: &str = "/auth/refresh";
pub const VERIFY_EMAIL: &str = "/auth/verify-email";
pub const RESEND_VERIFICATION: &str = "/auth/resend-verification";

pub const HUSTLES: &str = "/hustles";
pub const HUSTLE: &str = "/hustles/{id}";
pub const HUSTLE_TRANSACTIONS: &str = "/hustles/{id}/transactions";

pub const TRANSACTIONS: &str = "/transactions";
pub const TRANSACTION: &str = "/transactions/{id}";

pub const DEBTS: &str = "/debts";
pub const DEBT: &str = "/debts/{id}";

pub const GOALS: &str = "/goals";
pub const GOAL: &str = "/goals/{id}";

pub const DASHBOARD_OVERVIEW: &str = "/dashboard/overview";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// This function assumes that an endpoint path contains at most one parameter.
/// If no parameter is found in `endpoint_path`, the original path is returned.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let end = endpoint_path[start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| start + offset + 1);

    format!(
        "{}{id}{}",
        &endpoint_path[..start],
        &endpoint_path[end..]
    )
}
