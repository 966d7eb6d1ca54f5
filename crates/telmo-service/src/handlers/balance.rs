//! Balance check handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use telmo_core::{Msisdn, SubscriptionGrant};

use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

/// Balance check request.
#[derive(Debug, Deserialize)]
pub struct CheckBalanceRequest {
    /// Subscriber phone number.
    pub phone_number: Msisdn,
}

/// Balance check response.
#[derive(Debug, Serialize)]
pub struct CheckBalanceResponse {
    /// Domain status discriminator, always `"success"` here.
    pub status: &'static str,
    /// Subscriber phone number, echoed.
    pub phone_number: Msisdn,
    /// Airtime credit balance in francs.
    pub credit_balance: i64,
    /// Mobile-money balance in francs.
    pub mobile_money_balance: i64,
    /// Subscriptions granted to the account.
    pub active_subscriptions: Vec<SubscriptionGrant>,
}

/// Read an account's balances and subscriptions.
pub async fn check_balance(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CheckBalanceRequest>,
) -> Result<Json<CheckBalanceResponse>, ApiError> {
    tracing::debug!(phone_number = %body.phone_number, "Checking balance");

    let snapshot = state.ledger.check_balance(&body.phone_number)?;

    Ok(Json(CheckBalanceResponse {
        status: "success",
        phone_number: body.phone_number,
        credit_balance: snapshot.credit_balance,
        mobile_money_balance: snapshot.mobile_money_balance,
        active_subscriptions: snapshot.active_subscriptions,
    }))
}
