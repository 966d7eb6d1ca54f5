//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, balance, health, subscriptions, transfers};
use crate::state::AppState;

/// Maximum concurrent requests for the operation endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Operations (fronted by the gateway)
/// - `POST /v1/checkBalance` - Balances and subscriptions
/// - `POST /v1/activateSubscription` - Activate a catalog plan
/// - `POST /v1/transferMoney` - Mobile-money transfer
/// - `POST /v1/getSubscriptionRecommendation` - Plan recommendation
///
/// ## Provisioning (service API key)
/// - `POST /v1/admin/accounts` - Create/overwrite an account
/// - `POST /v1/admin/catalog` - Insert/replace a catalog plan
pub fn create_router(state: AppState) -> Router {
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let api_routes = Router::new()
        .route("/checkBalance", post(balance::check_balance))
        .route("/activateSubscription", post(subscriptions::activate))
        .route("/transferMoney", post(transfers::transfer))
        .route(
            "/getSubscriptionRecommendation",
            post(subscriptions::recommend),
        )
        .route("/admin/accounts", post(admin::create_account))
        .route("/admin/catalog", post(admin::put_plan))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        .nest("/v1", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
