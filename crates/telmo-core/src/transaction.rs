//! Transaction history types.
//!
//! Every ledger mutation appends exactly one record per debit/credit
//! leg. Records are keyed by `(account, timestamp)` with RFC 3339
//! timestamps so they sort chronologically under the account. They are
//! an audit trail: append-only, immutable, and never read back by the
//! ledger itself.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::Msisdn;

/// The kind of balance movement a record documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Credit debit for a plan activation.
    SubscriptionActivation,

    /// Mobile money debit on the sender leg of a transfer.
    TransferSent,

    /// Mobile money credit on the recipient leg of a transfer.
    TransferReceived,
}

/// An immutable transaction-history record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// The account the record belongs to.
    pub account: Msisdn,

    /// When the movement happened; part of the record key.
    pub timestamp: DateTime<Utc>,

    /// Signed amount in francs: debits negative, credits positive.
    pub amount: i64,

    /// Movement kind.
    pub transaction_type: TransactionType,

    /// Free-text detail for the audit trail.
    pub details: String,
}

impl TransactionRecord {
    /// Record the debit leg of a subscription activation.
    #[must_use]
    pub fn subscription_activation(
        account: Msisdn,
        price: i64,
        plan_name: &str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            account,
            timestamp,
            amount: -price.abs(),
            transaction_type: TransactionType::SubscriptionActivation,
            details: format!("Activation of plan {plan_name}"),
        }
    }

    /// Record the sender leg of a mobile money transfer.
    #[must_use]
    pub fn transfer_sent(
        account: Msisdn,
        amount: i64,
        target: &Msisdn,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            account,
            timestamp,
            amount: -amount.abs(),
            transaction_type: TransactionType::TransferSent,
            details: format!("Transfer sent to {target}"),
        }
    }

    /// Record the recipient leg of a mobile money transfer.
    #[must_use]
    pub fn transfer_received(
        account: Msisdn,
        amount: i64,
        source: &Msisdn,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            account,
            timestamp,
            amount: amount.abs(),
            transaction_type: TransactionType::TransferReceived,
            details: format!("Transfer received from {source}"),
        }
    }

    /// The timestamp in the key encoding used by the store
    /// (RFC 3339 UTC with microsecond precision).
    #[must_use]
    pub fn key_timestamp(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msisdn(s: &str) -> Msisdn {
        s.parse().unwrap()
    }

    #[test]
    fn activation_record_is_a_debit() {
        let record = TransactionRecord::subscription_activation(
            msisdn("771234567"),
            2000,
            "Data 1GB",
            Utc::now(),
        );
        assert_eq!(record.amount, -2000);
        assert_eq!(
            record.transaction_type,
            TransactionType::SubscriptionActivation
        );
        assert!(record.details.contains("Data 1GB"));
    }

    #[test]
    fn transfer_legs_have_opposite_signs() {
        let now = Utc::now();
        let sent =
            TransactionRecord::transfer_sent(msisdn("771234567"), 500, &msisdn("781234567"), now);
        let received = TransactionRecord::transfer_received(
            msisdn("781234567"),
            500,
            &msisdn("771234567"),
            now,
        );
        assert_eq!(sent.amount, -500);
        assert_eq!(received.amount, 500);
    }

    #[test]
    fn key_timestamps_sort_chronologically() {
        let base = Utc::now();
        let earlier = TransactionRecord::transfer_sent(
            msisdn("771234567"),
            1,
            &msisdn("781234567"),
            base,
        );
        let later = TransactionRecord::transfer_sent(
            msisdn("771234567"),
            1,
            &msisdn("781234567"),
            base + chrono::Duration::microseconds(1),
        );
        assert!(earlier.key_timestamp() < later.key_timestamp());
    }

    #[test]
    fn type_serializes_screaming_snake() {
        let json = serde_json::to_string(&TransactionType::SubscriptionActivation).unwrap();
        assert_eq!(json, "\"SUBSCRIPTION_ACTIVATION\"");
        let json = serde_json::to_string(&TransactionType::TransferSent).unwrap();
        assert_eq!(json, "\"TRANSFER_SENT\"");
    }
}
