//! Telmo HTTP API service.
//!
//! This crate exposes the account ledger over HTTP:
//!
//! - Balance checks
//! - Subscription activation
//! - Mobile-money transfers
//! - Plan recommendations
//! - Provisioning endpoints for accounts and the plan catalog
//!
//! Success and error bodies both carry a `status` discriminator
//! (`"success"` / `"error"`), which is the shape the agent-side
//! classifier consumes. Provisioning routes are guarded by a service
//! API key; the operation routes are open to the fronting gateway.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers stay async for consistency

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
