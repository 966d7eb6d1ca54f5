//! Subscription activation and recommendation handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use telmo_core::{CatalogPlan, Msisdn, PlanId};
use telmo_ledger::Recommendation;

use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

/// Subscription activation request.
#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    /// Subscriber phone number.
    pub phone_number: Msisdn,
    /// Catalog plan to activate.
    pub subscription_id: PlanId,
}

/// Subscription activation response.
#[derive(Debug, Serialize)]
pub struct ActivateResponse {
    /// Domain status discriminator, always `"success"` here.
    pub status: &'static str,
    /// Subscriber phone number, echoed.
    pub phone_number: Msisdn,
    /// Activated plan.
    pub subscription_id: PlanId,
    /// Human-readable plan name.
    pub plan_name: String,
    /// Price deducted from the credit balance, in francs.
    pub price: i64,
    /// When the plan took effect.
    pub activated_at: DateTime<Utc>,
    /// When the plan expires.
    pub expires_at: DateTime<Utc>,
}

/// Activate a catalog plan against the account's credit balance.
pub async fn activate(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<ActivateRequest>,
) -> Result<Json<ActivateResponse>, ApiError> {
    tracing::debug!(
        phone_number = %body.phone_number,
        subscription_id = %body.subscription_id,
        "Activating subscription"
    );

    let receipt = state
        .ledger
        .activate_subscription(&body.phone_number, &body.subscription_id)?;

    Ok(Json(ActivateResponse {
        status: "success",
        phone_number: body.phone_number,
        subscription_id: receipt.plan_id,
        plan_name: receipt.plan_name,
        price: receipt.price,
        activated_at: receipt.activated_at,
        expires_at: receipt.expires_at,
    }))
}

/// Recommendation request.
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    /// Subscriber phone number.
    pub phone_number: Msisdn,
}

/// Recommendation response.
#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    /// Domain status discriminator, always `"success"` here.
    pub status: &'static str,
    /// Subscriber phone number, echoed.
    pub phone_number: Msisdn,
    /// Message for the subscriber.
    pub message: String,
    /// The recommended plan, when the category held one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<CatalogPlan>,
}

/// Recommend a plan from the subscriber's activation history.
///
/// An unknown subscriber still gets a recommendation (the entry-level
/// data category); recommendations are advisory, not account state.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<RecommendRequest>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let recommendation = state.ledger.recommend_plan(&body.phone_number)?;

    let (message, plan) = match recommendation {
        Recommendation::Plan { plan, message } => (message, Some(plan)),
        Recommendation::None { message } => (message, None),
    };

    Ok(Json(RecommendResponse {
        status: "success",
        phone_number: body.phone_number,
        message,
        plan,
    }))
}
