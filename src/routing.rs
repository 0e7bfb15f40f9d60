//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::{
    AppState, Error,
    auth::{
        auth_guard, confirm_password_reset, log_in, log_out, refresh_tokens, register_user,
        request_password_reset, resend_verification, validate_reset_token, verify_email,
    },
    dashboard::get_dashboard_overview,
    debt::{
        create_debt_endpoint, delete_debt_endpoint, edit_debt_endpoint, get_debt_endpoint,
        get_debts_endpoint,
    },
    endpoints,
    goal::{
        create_goal_endpoint, delete_goal_endpoint, edit_goal_endpoint, get_goal_endpoint,
        get_goals_endpoint,
    },
    hustle::{
        create_hustle_endpoint, delete_hustle_endpoint, edit_hustle_endpoint, get_hustle_endpoint,
        get_hustle_transactions, get_hustles_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_transaction_endpoint, get_transactions_endpoint,
    },
    user::{
        change_password, change_role, delete_user_endpoint, edit_user, get_me, get_user,
        get_users,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::USERS, post(register_user))
        .route(endpoints::LOG_IN, post(log_in))
        .route(endpoints::REFRESH, post(refresh_tokens))
        .route(endpoints::VERIFY_EMAIL, post(verify_email))
        .route(
            endpoints::PASSWORD_RESET_REQUEST,
            post(request_password_reset),
        )
        .route(
            endpoints::PASSWORD_RESET_VALIDATE,
            post(validate_reset_token),
        )
        .route(
            endpoints::PASSWORD_RESET_CONFIRM,
            post(confirm_password_reset),
        );

    let protected_routes = Router::new()
        .route(endpoints::LOG_OUT, post(log_out))
        .route(endpoints::RESEND_VERIFICATION, post(resend_verification))
        .route(endpoints::USERS, get(get_users))
        .route(endpoints::USERS_ME, get(get_me))
        .route(
            endpoints::USER,
            get(get_user).put(edit_user).delete(delete_user_endpoint),
        )
        .route(endpoints::USER_PASSWORD, put(change_password))
        .route(endpoints::USER_ROLE, put(change_role))
        .route(
            endpoints::HUSTLES,
            get(get_hustles_endpoint).post(create_hustle_endpoint),
        )
        .route(
            endpoints::HUSTLE,
            get(get_hustle_endpoint)
                .put(edit_hustle_endpoint)
                .delete(delete_hustle_endpoint),
        )
        .route(
            endpoints::HUSTLE_TRANSACTIONS,
            get(get_hustle_transactions),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::DEBTS,
            get(get_debts_endpoint).post(create_debt_endpoint),
        )
        .route(
            endpoints::DEBT,
            get(get_debt_endpoint)
                .put(edit_debt_endpoint)
                .delete(delete_debt_endpoint),
        )
        .route(
            endpoints::GOALS,
            get(get_goals_endpoint).post(create_goal_endpoint),
        )
        .route(
            endpoints::GOAL,
            get(get_goal_endpoint)
                .put(edit_goal_endpoint)
                .delete(delete_goal_endpoint),
        )
        .route(endpoints::DASHBOARD_OVERVIEW, get(get_dashboard_overview))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}
