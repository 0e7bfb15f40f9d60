//! Defines the endpoint for updating a debt.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    Error,
    access::ensure_owner_or_admin,
    auth::AuthUser,
    date::parse_optional_date,
    db::lock_connection,
    debt::{
        Debt, DebtId, DebtStatus, DebtUpdate, MAX_CREDITOR_LENGTH, MAX_DESCRIPTION_LENGTH,
        get_debt, update_debt,
    },
    hustle::{HustleId, ensure_hustle_owned_by},
    json::ApiJson,
    validation::{deserialize_some, optional_text, positive_amount, updated_text},
};

/// Fields to change on a debt. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct EditDebtRequest {
    pub amount: Option<f64>,
    pub creditor: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    pub due_date: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub hustle_id: Option<Option<HustleId>>,
}

impl EditDebtRequest {
    fn validate(self) -> Result<DebtUpdate, Error> {
        Ok(DebtUpdate {
            amount: self
                .amount
                .map(|amount| positive_amount(Some(amount)))
                .transpose()?,
            creditor: updated_text("creditor", self.creditor.as_deref(), MAX_CREDITOR_LENGTH)?,
            description: self
                .description
                .map(|description| {
                    optional_text("description", description.as_deref(), MAX_DESCRIPTION_LENGTH)
                })
                .transpose()?,
            due_date: parse_optional_date(self.due_date.as_deref())?,
            status: self
                .status
                .as_deref()
                .map(str::parse::<DebtStatus>)
                .transpose()?,
            hustle_id: self.hustle_id,
        })
    }
}

/// Update some or all of a debt's fields, e.g. only its status.
pub async fn edit_debt_endpoint(
    State(db_connection): State<Arc<Mutex<Connection>>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(debt_id): Path<DebtId>,
    ApiJson(request): ApiJson<EditDebtRequest>,
) -> Result<Json<Debt>, Error> {
    let update = request.validate()?;

    let connection = lock_connection(&db_connection)?;
    let debt = get_debt(debt_id, &connection)?;
    ensure_owner_or_admin(&auth_user, debt.user_id)?;

    if let Some(Some(hustle_id)) = update.hustle_id {
        ensure_hustle_owned_by(hustle_id, debt.user_id, &connection)?;
    }

    let debt = update_debt(debt.id, update, &connection)?;

    Ok(Json(debt))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        debt::{Debt, DebtStatus},
        endpoints::{self, format_endpoint},
        test_utils::{TestApp, insert_test_debt},
    };

    #[tokio::test]
    async fn update_only_status() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");
        let debt = insert_test_debt(&app.connection(), &user, "Bank", date!(2025 - 05 - 01));

        let response = app
            .server
            .put(&format_endpoint(endpoints::DEBT, debt.id))
            .authorization_bearer(app.access_token(&user))
            .json(&json!({ "status": "paid" }))
            .await;

        response.assert_status_ok();
        let updated = response.json::<Debt>();
        assert_eq!(updated.status, DebtStatus::Paid);
        assert_eq!(updated.amount, debt.amount);
        assert_eq!(updated.due_date, debt.due_date);
    }

    #[tokio::test]
    async fn link_to_own_hustle() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");
        let hustle = app.insert_hustle(&user, "Uber");
        let debt = insert_test_debt(&app.connection(), &user, "Bank", date!(2025 - 05 - 01));

        let response = app
            .server
            .put(&format_endpoint(endpoints::DEBT, debt.id))
            .authorization_bearer(app.access_token(&user))
            .json(&json!({ "hustle_id": hustle.id }))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Debt>().hustle_id, Some(hustle.id));
    }

    #[tokio::test]
    async fn blank_creditor_is_rejected() {
        let app = TestApp::new();
        let user = app.insert_user("john_doe");
        let debt = insert_test_debt(&app.connection(), &user, "Bank", date!(2025 - 05 - 01));

        app.server
            .put(&format_endpoint(endpoints::DEBT, debt.id))
            .authorization_bearer(app.access_token(&user))
            .json(&json!({ "creditor": " " }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
