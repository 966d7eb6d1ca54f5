//! Provisioning handlers.
//!
//! Accounts and the plan catalog are owned by external systems in
//! production. These endpoints stand in for them: seeding, test
//! fixtures, operator corrections. All of them require the service API
//! key.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use telmo_core::{Account, CatalogPlan, Msisdn};

use crate::auth::ServiceAuth;
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

/// Account provisioning request.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Subscriber phone number.
    pub phone_number: Msisdn,
    /// Initial airtime credit, in francs.
    #[serde(default)]
    pub credit_balance: i64,
    /// Initial mobile-money balance, in francs.
    #[serde(default)]
    pub mobile_money_balance: i64,
}

/// Provisioning response.
#[derive(Debug, Serialize)]
pub struct ProvisionResponse {
    /// Domain status discriminator, always `"success"` here.
    pub status: &'static str,
}

/// Create or overwrite an account.
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    ApiJson(body): ApiJson<CreateAccountRequest>,
) -> Result<Json<ProvisionResponse>, ApiError> {
    if body.credit_balance < 0 || body.mobile_money_balance < 0 {
        return Err(ApiError::BadRequest(
            "initial balances must be non-negative".into(),
        ));
    }

    tracing::info!(phone_number = %body.phone_number, "Provisioning account");

    let account = Account::with_balances(
        body.phone_number,
        body.credit_balance,
        body.mobile_money_balance,
    );
    state.store.put_account(&account)?;

    Ok(Json(ProvisionResponse { status: "success" }))
}

/// Insert or replace a catalog plan.
pub async fn put_plan(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    ApiJson(plan): ApiJson<CatalogPlan>,
) -> Result<Json<ProvisionResponse>, ApiError> {
    plan.validate().map_err(ApiError::BadRequest)?;

    tracing::info!(plan_id = %plan.plan_id, category = %plan.category.as_str(), "Seeding catalog plan");

    state.catalog.put_plan(&plan)?;

    Ok(Json(ProvisionResponse { status: "success" }))
}
