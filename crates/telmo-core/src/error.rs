//! The ledger error taxonomy.

use crate::ids::{IdError, Msisdn, PlanId};

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors surfaced by ledger operations.
///
/// Validation and domain-rule violations are deterministic rejections:
/// retrying the same call cannot succeed. Only [`StoreUnavailable`]
/// indicates a transient infrastructure fault that is safe to retry
/// with the same parameters, since the underlying store transaction
/// either fully committed or not at all.
///
/// [`StoreUnavailable`]: LedgerError::StoreUnavailable
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Missing or malformed caller input, rejected before any store access.
    #[error("validation error: {0}")]
    Validation(String),

    /// The requested plan does not exist in the catalog.
    #[error("plan not found in catalog: {plan_id}")]
    PlanNotFound {
        /// The plan that was looked up.
        plan_id: PlanId,
    },

    /// The account does not exist.
    #[error("account not found: {msisdn}")]
    AccountNotFound {
        /// The phone number that was looked up.
        msisdn: Msisdn,
    },

    /// The store cancelled the activation transaction: the credit
    /// balance did not cover the plan price (or the account vanished).
    /// Account state is unchanged.
    #[error("insufficient credit balance or unknown account")]
    InsufficientBalance,

    /// Self-transfer or non-positive amount; the store was never contacted.
    #[error("invalid transfer: {0}")]
    InvalidTransfer(String),

    /// The store cancelled the transfer transaction as a whole. The
    /// store reports a single collective failure, so an insufficient
    /// source balance cannot be told apart from a nonexistent
    /// recipient. Account state is unchanged.
    #[error("transaction cancelled: insufficient balance or invalid recipient")]
    TransactionCancelled,

    /// Transient infrastructure fault; no partial state was applied.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Unrecognized error from a downstream domain call.
    #[error("unknown domain error: {0}")]
    UnknownDomain(String),
}

impl LedgerError {
    /// Whether the caller may retry the same call with the same
    /// parameters and expect a different outcome.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// Stable machine-readable code for response bodies.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::PlanNotFound { .. } => "plan_not_found",
            Self::AccountNotFound { .. } => "account_not_found",
            Self::InsufficientBalance => "insufficient_balance",
            Self::InvalidTransfer(_) => "invalid_transfer",
            Self::TransactionCancelled => "transaction_cancelled",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::UnknownDomain(_) => "unknown_error",
        }
    }
}

impl From<IdError> for LedgerError {
    fn from(err: IdError) -> Self {
        Self::Validation(err.to_string())
    }
}
