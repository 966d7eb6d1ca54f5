//! Ledger operations.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use telmo_core::{
    CatalogPlan, LedgerError, Msisdn, PlanCategory, PlanId, Result, SubscriptionGrant,
    TransactionRecord,
};
use telmo_store::{
    BalanceField, CatalogStore, Condition, StoreError, TransactWrite, TransactionStore, UpdateOp,
};

/// The account ledger.
///
/// Holds explicitly injected store and catalog handles, so tests can
/// substitute the in-memory backend and drive atomicity and race
/// behavior deterministically.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn TransactionStore>,
    catalog: Arc<dyn CatalogStore>,
}

/// The result of a balance check: a point-in-time view of one account.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSnapshot {
    /// Airtime credit balance in francs.
    pub credit_balance: i64,

    /// Mobile money balance in francs.
    pub mobile_money_balance: i64,

    /// Subscription grants in activation order.
    pub active_subscriptions: Vec<SubscriptionGrant>,
}

/// Structured outcome of a successful subscription activation.
#[derive(Debug, Clone, Serialize)]
pub struct ActivationReceipt {
    /// The activated plan.
    pub plan_id: PlanId,

    /// Plan name at activation time.
    pub plan_name: String,

    /// Price debited from the credit balance, in francs.
    pub price: i64,

    /// When the plan was activated.
    pub activated_at: DateTime<Utc>,

    /// When the plan expires.
    pub expires_at: DateTime<Utc>,
}

/// Structured outcome of a successful transfer.
#[derive(Debug, Clone, Serialize)]
pub struct TransferReceipt {
    /// Sender account.
    pub source: Msisdn,

    /// Recipient account.
    pub target: Msisdn,

    /// Amount moved, in francs.
    pub amount: i64,

    /// When the transfer committed.
    pub timestamp: DateTime<Utc>,
}

/// Outcome of a plan recommendation.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Recommendation {
    /// A plan was selected for the subscriber.
    Plan {
        /// The recommended plan.
        plan: CatalogPlan,
        /// Why this plan was chosen.
        message: String,
    },

    /// The selected category holds no plans.
    None {
        /// Fallback message for the subscriber.
        message: String,
    },
}

impl Ledger {
    /// Create a ledger over the given store and catalog.
    pub fn new(store: Arc<dyn TransactionStore>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self { store, catalog }
    }

    /// Read an account's balances and active subscriptions.
    ///
    /// Pure read, no side effects. A missing account is the domain
    /// outcome [`LedgerError::AccountNotFound`], not a store error.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AccountNotFound`] or [`LedgerError::StoreUnavailable`].
    pub fn check_balance(&self, msisdn: &Msisdn) -> Result<BalanceSnapshot> {
        let account = self
            .store
            .get_account(msisdn)
            .map_err(store_fault)?
            .ok_or_else(|| LedgerError::AccountNotFound {
                msisdn: msisdn.clone(),
            })?;

        Ok(BalanceSnapshot {
            credit_balance: account.credit_balance,
            mobile_money_balance: account.mobile_money_balance,
            active_subscriptions: account.active_subscriptions,
        })
    }

    /// Activate a subscription plan: debit the credit balance by the
    /// plan price and append the grant, atomically, with one history
    /// record.
    ///
    /// Never partially applies: the debit, the grant append and the
    /// history record ride in a single store transaction conditioned on
    /// `credit_balance >= price`. There is no compensating fallback.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::PlanNotFound`] if the catalog has no such plan.
    /// - [`LedgerError::InsufficientBalance`] if the store cancelled
    ///   the transaction; account state is unchanged.
    /// - [`LedgerError::StoreUnavailable`] on infrastructure faults;
    ///   safe to retry.
    pub fn activate_subscription(
        &self,
        msisdn: &Msisdn,
        plan_id: &PlanId,
    ) -> Result<ActivationReceipt> {
        let plan = self
            .catalog
            .resolve_plan(plan_id)
            .map_err(store_fault)?
            .ok_or_else(|| LedgerError::PlanNotFound {
                plan_id: plan_id.clone(),
            })?;

        let now = Utc::now();
        let expires_at = now + Duration::days(i64::from(plan.duration_days));
        let grant = SubscriptionGrant {
            plan_id: plan.plan_id.clone(),
            name: plan.name.clone(),
            activated_at: now,
            expires_at,
        };

        let writes = vec![
            TransactWrite::Update {
                msisdn: msisdn.clone(),
                condition: Condition::BalanceAtLeast {
                    field: BalanceField::Credit,
                    amount: plan.price,
                },
                ops: vec![
                    UpdateOp::AdjustBalance {
                        field: BalanceField::Credit,
                        delta: -plan.price,
                    },
                    UpdateOp::AppendSubscription(grant),
                ],
            },
            TransactWrite::PutRecord(TransactionRecord::subscription_activation(
                msisdn.clone(),
                plan.price,
                &plan.name,
                now,
            )),
        ];

        match self.store.transact(writes) {
            Ok(()) => {
                tracing::info!(
                    account = %msisdn,
                    plan = %plan.plan_id,
                    price = plan.price,
                    "subscription activated"
                );
                Ok(ActivationReceipt {
                    plan_id: plan.plan_id,
                    plan_name: plan.name,
                    price: plan.price,
                    activated_at: now,
                    expires_at,
                })
            }
            Err(StoreError::TransactionCancelled) => {
                tracing::info!(account = %msisdn, plan = %plan.plan_id, "activation cancelled");
                Err(LedgerError::InsufficientBalance)
            }
            Err(err) => Err(store_fault(err)),
        }
    }

    /// Transfer mobile money between two accounts.
    ///
    /// Preconditions (`source != target`, `amount > 0`) are checked
    /// before any store call; a violation never touches the store.
    /// The debit, the credit and the sender-leg history record ride in
    /// one atomic transaction.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidTransfer`] on a self-transfer or
    ///   non-positive amount.
    /// - [`LedgerError::TransactionCancelled`] if the store cancelled
    ///   the batch. The store reports one collective failure, so an
    ///   insufficient source balance cannot be told apart from a
    ///   nonexistent recipient; no secondary lookup is performed.
    /// - [`LedgerError::StoreUnavailable`] on infrastructure faults.
    pub fn transfer_money(
        &self,
        source: &Msisdn,
        target: &Msisdn,
        amount: i64,
    ) -> Result<TransferReceipt> {
        if source == target {
            return Err(LedgerError::InvalidTransfer(
                "source and target must differ".into(),
            ));
        }
        if amount <= 0 {
            return Err(LedgerError::InvalidTransfer(
                "amount must be positive".into(),
            ));
        }

        let now = Utc::now();
        let writes = vec![
            TransactWrite::Update {
                msisdn: source.clone(),
                condition: Condition::BalanceAtLeast {
                    field: BalanceField::MobileMoney,
                    amount,
                },
                ops: vec![UpdateOp::AdjustBalance {
                    field: BalanceField::MobileMoney,
                    delta: -amount,
                }],
            },
            TransactWrite::Update {
                msisdn: target.clone(),
                condition: Condition::AccountExists,
                ops: vec![UpdateOp::AdjustBalance {
                    field: BalanceField::MobileMoney,
                    delta: amount,
                }],
            },
            TransactWrite::PutRecord(TransactionRecord::transfer_sent(
                source.clone(),
                amount,
                target,
                now,
            )),
        ];

        match self.store.transact(writes) {
            Ok(()) => {
                tracing::info!(source = %source, target = %target, amount, "transfer committed");
                Ok(TransferReceipt {
                    source: source.clone(),
                    target: target.clone(),
                    amount,
                    timestamp: now,
                })
            }
            Err(StoreError::TransactionCancelled) => {
                tracing::info!(source = %source, target = %target, amount, "transfer cancelled");
                Err(LedgerError::TransactionCancelled)
            }
            Err(err) => Err(store_fault(err)),
        }
    }

    /// Recommend a plan based on the subscriber's active plans.
    ///
    /// A subscriber with no data plan gets the leading entry of the
    /// Data category; one who already holds a data plan gets a Pack
    /// upgrade. A missing account is treated as having no plans.
    ///
    /// # Errors
    ///
    /// [`LedgerError::StoreUnavailable`] on infrastructure faults.
    pub fn recommend_plan(&self, msisdn: &Msisdn) -> Result<Recommendation> {
        let has_data_plan = self
            .store
            .get_account(msisdn)
            .map_err(store_fault)?
            .is_some_and(|account| account.has_data_plan());

        let category = if has_data_plan {
            PlanCategory::Pack
        } else {
            PlanCategory::Data
        };

        let plans = self.catalog.plans_in_category(category).map_err(store_fault)?;
        match plans.into_iter().next() {
            Some(plan) => {
                let message = format!(
                    "Based on your usage we recommend the {} plan.",
                    plan.name
                );
                Ok(Recommendation::Plan { plan, message })
            }
            None => Ok(Recommendation::None {
                message: "No specific recommendation right now; browse the full catalog.".into(),
            }),
        }
    }
}

/// Map a store fault to the domain taxonomy. Cancellations are handled
/// at the call sites, where the operation knows what a cancellation
/// means; everything else is a transient infrastructure fault.
fn store_fault(err: StoreError) -> LedgerError {
    match err {
        StoreError::TransactionCancelled => LedgerError::TransactionCancelled,
        StoreError::Unavailable(msg) | StoreError::Serialization(msg) => {
            LedgerError::StoreUnavailable(msg)
        }
    }
}
