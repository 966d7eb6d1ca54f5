//! Core types and utilities for the telmo mobile-money backend.
//!
//! This crate provides the foundational types used throughout the platform:
//!
//! - **Identifiers**: [`Msisdn`], [`PlanId`]
//! - **Accounts**: [`Account`], [`SubscriptionGrant`]
//! - **Catalog**: [`CatalogPlan`], [`PlanCategory`]
//! - **History**: [`TransactionRecord`], [`TransactionType`]
//! - **Errors**: [`LedgerError`]
//!
//! # Money unit
//!
//! All monetary amounts are whole francs stored as `i64`. There is no
//! subunit, and fractional amounts are rejected at validation time.
//! Integer storage avoids floating-point precision issues in balances.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod catalog;
pub mod error;
pub mod ids;
pub mod transaction;

pub use account::{Account, SubscriptionGrant};
pub use catalog::{CatalogPlan, PlanCategory};
pub use error::{LedgerError, Result};
pub use ids::{IdError, Msisdn, PlanId};
pub use transaction::{TransactionRecord, TransactionType};
