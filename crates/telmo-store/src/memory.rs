//! In-memory store backend.
//!
//! Implements the same conditioned-transaction semantics as the
//! `RocksDB` backend over plain maps behind a single mutex. Primarily
//! for tests: deterministic, fast, and able to inject `Unavailable`
//! faults on demand.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Duration;

use telmo_core::{Account, CatalogPlan, Msisdn, PlanCategory, PlanId, TransactionRecord};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::txn::{TransactWrite, UpdateOp};
use crate::{CatalogStore, TransactionStore};

#[derive(Default)]
struct Inner {
    accounts: HashMap<Msisdn, Account>,
    // BTreeMap keyed like the RocksDB transactions column family, so
    // listing behaves identically.
    records: BTreeMap<Vec<u8>, TransactionRecord>,
    plans: BTreeMap<Vec<u8>, CatalogPlan>,
}

/// In-memory transaction store.
///
/// Cheaply cloneable via [`Arc`]; clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    unavailable: Arc<AtomicBool>,
    transact_calls: Arc<AtomicU64>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with
    /// [`StoreError::Unavailable`] until re-enabled. Lets tests walk
    /// the transient-fault path deterministically.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `transact` calls received, including failed ones.
    /// Used to assert that precondition rejections never reach the store.
    #[must_use]
    pub fn transact_calls(&self) -> u64 {
        self.transact_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected fault".into()));
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }
}

impl TransactionStore for MemoryStore {
    fn get_account(&self, msisdn: &Msisdn) -> Result<Option<Account>> {
        self.check_available()?;
        Ok(self.lock()?.accounts.get(msisdn).cloned())
    }

    fn put_account(&self, account: &Account) -> Result<()> {
        self.check_available()?;
        self.lock()?
            .accounts
            .insert(account.msisdn.clone(), account.clone());
        Ok(())
    }

    fn transact(&self, writes: Vec<TransactWrite>) -> Result<()> {
        self.transact_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let mut inner = self.lock()?;

        // Conditions are evaluated against pre-transaction state under
        // the lock; any violation discards the batch untouched.
        for write in &writes {
            if let TransactWrite::Update {
                msisdn, condition, ..
            } = write
            {
                if !condition.holds(inner.accounts.get(msisdn)) {
                    tracing::debug!(account = %msisdn, ?condition, "transaction cancelled");
                    return Err(StoreError::TransactionCancelled);
                }
            }
        }

        // Updates are applied to staged copies first, so a failing op
        // later in the batch leaves the live maps untouched.
        let now = chrono::Utc::now();
        let mut staged_accounts: HashMap<Msisdn, Account> = HashMap::new();
        let mut staged_records: Vec<(Vec<u8>, TransactionRecord)> = Vec::new();
        for write in writes {
            match write {
                TransactWrite::Update { msisdn, ops, .. } => {
                    let account = match staged_accounts.entry(msisdn.clone()) {
                        Entry::Occupied(entry) => entry.into_mut(),
                        Entry::Vacant(entry) => entry.insert(
                            inner
                                .accounts
                                .get(&msisdn)
                                .cloned()
                                .ok_or(StoreError::TransactionCancelled)?,
                        ),
                    };
                    for op in ops {
                        apply_op(account, op)?;
                    }
                    account.updated_at = now;
                }
                TransactWrite::PutRecord(mut record) => {
                    let mut key = keys::transaction_key(&record);
                    while inner.records.contains_key(&key)
                        || staged_records.iter().any(|(staged, _)| *staged == key)
                    {
                        record.timestamp += Duration::microseconds(1);
                        key = keys::transaction_key(&record);
                    }
                    staged_records.push((key, record));
                }
            }
        }

        for (msisdn, account) in staged_accounts {
            inner.accounts.insert(msisdn, account);
        }
        for (key, record) in staged_records {
            inner.records.insert(key, record);
        }
        Ok(())
    }

    fn list_transactions(&self, msisdn: &Msisdn, limit: usize) -> Result<Vec<TransactionRecord>> {
        self.check_available()?;
        let inner = self.lock()?;
        let prefix = keys::transactions_prefix(msisdn);
        Ok(inner
            .records
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .take(limit)
            .map(|(_, record)| record.clone())
            .collect())
    }
}

// A delta that would overflow the i64 balance cancels the batch; a
// wrapped balance would be indistinguishable from a legitimate one.
fn apply_op(account: &mut Account, op: UpdateOp) -> Result<()> {
    match op {
        UpdateOp::AdjustBalance { field, delta } => {
            let balance = field.read_mut(account);
            *balance = balance
                .checked_add(delta)
                .ok_or(StoreError::TransactionCancelled)?;
        }
        UpdateOp::AppendSubscription(grant) => {
            account.active_subscriptions.push(grant);
        }
    }
    Ok(())
}

impl CatalogStore for MemoryStore {
    fn resolve_plan(&self, plan_id: &PlanId) -> Result<Option<CatalogPlan>> {
        self.check_available()?;
        let inner = self.lock()?;
        for category in PlanCategory::all() {
            if let Some(plan) = inner.plans.get(&keys::plan_key(category, plan_id)) {
                return Ok(Some(plan.clone()));
            }
        }
        Ok(None)
    }

    fn plans_in_category(&self, category: PlanCategory) -> Result<Vec<CatalogPlan>> {
        self.check_available()?;
        let inner = self.lock()?;
        let prefix = keys::category_prefix(category);
        Ok(inner
            .plans
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(_, plan)| plan.clone())
            .collect())
    }

    fn put_plan(&self, plan: &CatalogPlan) -> Result<()> {
        self.check_available()?;
        self.lock()?
            .plans
            .insert(keys::plan_key(plan.category, &plan.plan_id), plan.clone());
        Ok(())
    }
}
