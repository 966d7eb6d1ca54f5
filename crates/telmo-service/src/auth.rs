//! Authentication extractors.
//!
//! The operation routes sit behind the fronting gateway and carry no
//! credentials of their own. Provisioning routes require the service
//! API key via `x-api-key`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::state::AppState;

/// Service authentication via API key.
///
/// Rejects when no `SERVICE_API_KEY` is configured: provisioning is
/// then disabled outright rather than open.
#[derive(Debug, Clone)]
pub struct ServiceAuth;

#[async_trait]
impl FromRequestParts<Arc<AppState>> for ServiceAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let api_key = parts
            .headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let expected_key = state
            .config
            .service_api_key
            .as_ref()
            .ok_or(ApiError::Unauthorized)?;

        if api_key != expected_key {
            return Err(ApiError::Unauthorized);
        }

        Ok(ServiceAuth)
    }
}
