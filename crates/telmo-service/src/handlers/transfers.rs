//! Mobile-money transfer handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use telmo_core::Msisdn;

use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

/// Transfer request.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Sender phone number.
    pub source_phone: Msisdn,
    /// Recipient phone number.
    pub target_phone: Msisdn,
    /// Amount in whole francs.
    pub amount: i64,
}

/// Transfer response.
#[derive(Debug, Serialize)]
pub struct TransferResponse {
    /// Domain status discriminator, always `"success"` here.
    pub status: &'static str,
    /// Sender phone number, echoed.
    pub source_phone: Msisdn,
    /// Recipient phone number, echoed.
    pub target_phone: Msisdn,
    /// Amount moved, in francs.
    pub amount: i64,
    /// When the transfer committed.
    pub timestamp: DateTime<Utc>,
}

/// Move mobile money between two accounts atomically.
pub async fn transfer(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<TransferRequest>,
) -> Result<Json<TransferResponse>, ApiError> {
    tracing::debug!(
        source_phone = %body.source_phone,
        target_phone = %body.target_phone,
        amount = body.amount,
        "Transferring mobile money"
    );

    let receipt = state
        .ledger
        .transfer_money(&body.source_phone, &body.target_phone, body.amount)?;

    Ok(Json(TransferResponse {
        status: "success",
        source_phone: receipt.source,
        target_phone: receipt.target,
        amount: receipt.amount,
        timestamp: receipt.timestamp,
    }))
}
