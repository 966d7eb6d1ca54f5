//! The transactional account ledger.
//!
//! The ledger mutates per-account balances, appends subscription
//! grants and records transaction history atomically against the
//! key-value transaction store. Balance checks are expressed as store
//! transaction conditions, never as a preceding read, so there is no
//! check-then-act window anywhere in this crate.
//!
//! Each operation is a single atomic round trip:
//! `Pending -> {Committed, Cancelled, StoreUnavailable}`. A cancelled
//! transaction changed nothing and is not retryable as submitted; an
//! unavailable store changed nothing and is safe to retry with the same
//! parameters. The ledger never retries internally — retry policy
//! belongs to the caller.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ledger;

pub use ledger::{
    ActivationReceipt, BalanceSnapshot, Ledger, Recommendation, TransferReceipt,
};
