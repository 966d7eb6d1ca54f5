//! Error types for telmo storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
///
/// A transaction concludes in exactly one of three ways: committed
/// (`Ok`), cancelled ([`TransactionCancelled`]) or not applied because
/// the backend faulted ([`Unavailable`]). Partial application cannot
/// happen.
///
/// [`TransactionCancelled`]: StoreError::TransactionCancelled
/// [`Unavailable`]: StoreError::Unavailable
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A write condition failed; the whole batch was discarded. The
    /// store does not report which condition failed.
    #[error("transaction cancelled: a write condition failed")]
    TransactionCancelled,

    /// The backend is unreachable or faulted; nothing was applied.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Serialization/deserialization of a stored value failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            StoreError::TransactionCancelled.to_string(),
            "transaction cancelled: a write condition failed"
        );
        assert_eq!(
            StoreError::Unavailable("io timeout".into()).to_string(),
            "store unavailable: io timeout"
        );
    }
}
