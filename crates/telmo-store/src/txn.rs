//! The conditioned-write transaction protocol.
//!
//! The ledger expresses every mutation as a batch of 2-3 conditioned
//! writes. Conditions and updates are typed enums rather than an
//! expression language: the ledger is the only client of this protocol,
//! and the handful of shapes it needs are all here.

use telmo_core::{Account, SubscriptionGrant, TransactionRecord};

/// Which account balance a condition or update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceField {
    /// Airtime credit.
    Credit,

    /// Mobile money.
    MobileMoney,
}

impl BalanceField {
    /// Read the targeted balance from an account.
    #[must_use]
    pub fn read(self, account: &Account) -> i64 {
        match self {
            Self::Credit => account.credit_balance,
            Self::MobileMoney => account.mobile_money_balance,
        }
    }

    /// Mutable reference to the targeted balance.
    pub fn read_mut(self, account: &mut Account) -> &mut i64 {
        match self {
            Self::Credit => &mut account.credit_balance,
            Self::MobileMoney => &mut account.mobile_money_balance,
        }
    }
}

/// Predicate an update is conditioned on. Evaluated against current
/// item state inside the transaction, never as a preceding read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// The account item must exist.
    AccountExists,

    /// The account must exist and the given balance must be at least
    /// `amount`. This is how non-negativity is enforced at write time.
    BalanceAtLeast {
        /// The balance the predicate reads.
        field: BalanceField,
        /// The inclusive lower bound.
        amount: i64,
    },
}

impl Condition {
    /// Evaluate the predicate against an item that may be absent.
    #[must_use]
    pub fn holds(self, account: Option<&Account>) -> bool {
        match (self, account) {
            (_, None) => false,
            (Self::AccountExists, Some(_)) => true,
            (Self::BalanceAtLeast { field, amount }, Some(account)) => {
                field.read(account) >= amount
            }
        }
    }
}

/// A single mutation applied to an account item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOp {
    /// Add `delta` (signed) to a balance.
    AdjustBalance {
        /// The balance being adjusted.
        field: BalanceField,
        /// Signed amount to add.
        delta: i64,
    },

    /// Append a grant to the account's subscription list.
    AppendSubscription(SubscriptionGrant),
}

/// One item write inside an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactWrite {
    /// A conditioned update of an account item.
    Update {
        /// The account being written.
        msisdn: telmo_core::Msisdn,
        /// Predicate that must hold for the whole batch to commit.
        condition: Condition,
        /// Mutations applied when the batch commits.
        ops: Vec<UpdateOp>,
    },

    /// Append a transaction-history record. Unconditioned.
    PutRecord(TransactionRecord),
}
