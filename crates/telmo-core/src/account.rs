//! Account types for telmo.
//!
//! An account holds two independent balances (airtime credit and mobile
//! money) plus the ordered list of subscription grants. Balances are
//! only ever mutated through the ledger's store transactions; the
//! non-negativity invariant lives in the store's write conditions, not
//! in this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{Msisdn, PlanId};

/// A subscriber account.
///
/// Accounts are created by the provisioning surface and never deleted
/// by the ledger. `active_subscriptions` is append-only: grants are
/// never removed or reordered, expiry is evaluated at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// The subscriber phone number, the account key.
    pub msisdn: Msisdn,

    /// Airtime credit balance in francs. Always >= 0.
    pub credit_balance: i64,

    /// Mobile money balance in francs. Always >= 0.
    pub mobile_money_balance: i64,

    /// Subscription grants in activation order.
    pub active_subscriptions: Vec<SubscriptionGrant>,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with zero balances.
    #[must_use]
    pub fn new(msisdn: Msisdn) -> Self {
        let now = Utc::now();
        Self {
            msisdn,
            credit_balance: 0,
            mobile_money_balance: 0,
            active_subscriptions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new account with the given opening balances.
    #[must_use]
    pub fn with_balances(msisdn: Msisdn, credit: i64, mobile_money: i64) -> Self {
        let mut account = Self::new(msisdn);
        account.credit_balance = credit;
        account.mobile_money_balance = mobile_money;
        account
    }

    /// Check whether the credit balance covers a debit of `amount`.
    #[must_use]
    pub fn has_sufficient_credit(&self, amount: i64) -> bool {
        self.credit_balance >= amount
    }

    /// Check whether the mobile money balance covers a debit of `amount`.
    #[must_use]
    pub fn has_sufficient_mobile_money(&self, amount: i64) -> bool {
        self.mobile_money_balance >= amount
    }

    /// Whether the account holds a grant for a data plan.
    ///
    /// Membership is by plan id naming a `DATA` plan; expiry is not
    /// consulted. Used by the recommendation rule.
    #[must_use]
    pub fn has_data_plan(&self) -> bool {
        self.active_subscriptions
            .iter()
            .any(|grant| grant.plan_id.as_str().contains("DATA") || grant.plan_id.as_str().starts_with("F_D_"))
    }
}

/// An immutable record of a plan activation attached to an account.
///
/// The plan name is a denormalized copy taken from the catalog at
/// activation time: later catalog edits must not retroactively alter a
/// granted subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionGrant {
    /// The activated plan.
    pub plan_id: PlanId,

    /// Plan name as it was in the catalog at activation time.
    pub name: String,

    /// When the plan was activated.
    pub activated_at: DateTime<Utc>,

    /// When the plan expires.
    pub expires_at: DateTime<Utc>,
}

impl SubscriptionGrant {
    /// Whether the grant has expired as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
