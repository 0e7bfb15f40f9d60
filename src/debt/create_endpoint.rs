//! Defines the endpoint for recording a debt.

use std::sync::{Arc, Mutex};

use axum::{Extension, Json, extract::State, http::StatusCode};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    Error,
    auth::AuthUser,
    date::parse_date,
    db::lock_connection,
    debt::{
        Debt, DebtStatus, MAX_CREDITOR_LENGTH, MAX_DESCRIPTION_LENGTH, NewDebt, create_debt,
    },
    hustle::{HustleId, ensure_hustle_owned_by},
    json::ApiJson,
    validation::{optional_text, positive_amount, required_text},
};

#[derive(Debug, Deserialize)]
pub struct CreateDebtRequest {
    pub amount: Option<f64>,
    pub creditor: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    /// Defaults to pending.
    pub status: Option<String>,
    pub hustle_id: Option<HustleId>,
}

/// Record a debt for the authenticated user.
pub async fn create_debt_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateDebtRequest>,
) -> Result<(StatusCode, Json<Debt>), Error> {
    let amount = positive_amount(request.amount)?;
    let creditor = required_text("creditor", request.creditor.as_deref(), MAX_CREDITOR_LENGTH)?;
    let description = optional_text(
        "description",
        request.description.as_deref(),
        MAX_DESCRIPTION_LENGTH,
    )?;
    let due_date = parse_date(
        request
            .due_date
            .as_deref()
            .ok_or(Error::MissingField("due_date"))?,
    )?;
    let status = request
        .status
        .as_deref()
        .map(str::parse::<DebtStatus>)
        .transpose()?
        .unwrap_or_default();

    let connection = lock_connection(&db_connection)?;
    if let Some(hustle_id) = request.hustle_id {
        ensure_hustle_owned_by(hustle_id, auth_user.id, &connection)?;
    }

    let debt = create_debt(
        NewDebt {
            amount,
            creditor,
            description,
            due_date,
            status,
            user_id: auth_user.id,
            hustle_id: request.hustle_id,
        },
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(debt)))
}
