//! `RocksDB` storage implementation.

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Duration;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use telmo_core::{Account, CatalogPlan, Msisdn, PlanCategory, PlanId, TransactionRecord};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::txn::{TransactWrite, UpdateOp};
use crate::{CatalogStore, TransactionStore};

/// `RocksDB`-backed transaction store.
///
/// `RocksDB` offers atomic write batches but no conditional writes, so
/// the conditioned-transaction protocol is implemented as
/// check-then-batch under a commit mutex: conditions are evaluated
/// against current state while the mutex is held, and the batch is
/// written before it is released. Two racing conditioned transactions
/// therefore cannot both observe a satisfying pre-state.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    commit_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            commit_lock: Mutex::new(()),
        })
    }

    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Unavailable(format!("column family not found: {name}")))
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn load_account(&self, msisdn: &Msisdn) -> Result<Option<Account>> {
        let cf = self.cf(cf::ACCOUNTS)?;
        self.db
            .get_cf(&cf, keys::account_key(msisdn))
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }
}

impl TransactionStore for RocksStore {
    fn get_account(&self, msisdn: &Msisdn) -> Result<Option<Account>> {
        self.load_account(msisdn)
    }

    fn put_account(&self, account: &Account) -> Result<()> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let value = Self::serialize(account)?;
        self.db
            .put_cf(&cf, keys::account_key(&account.msisdn), value)
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn transact(&self, writes: Vec<TransactWrite>) -> Result<()> {
        let _guard = self
            .commit_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("commit lock poisoned".into()))?;

        // Load the pre-transaction state of every referenced account once.
        let mut pre_state: HashMap<Msisdn, Option<Account>> = HashMap::new();
        for write in &writes {
            if let TransactWrite::Update { msisdn, .. } = write {
                if !pre_state.contains_key(msisdn) {
                    pre_state.insert(msisdn.clone(), self.load_account(msisdn)?);
                }
            }
        }

        // All conditions are checked against pre-transaction state; any
        // violation cancels the batch as a single unit.
        for write in &writes {
            if let TransactWrite::Update {
                msisdn, condition, ..
            } = write
            {
                let current = pre_state.get(msisdn).and_then(Option::as_ref);
                if !condition.holds(current) {
                    tracing::debug!(account = %msisdn, ?condition, "transaction cancelled");
                    return Err(StoreError::TransactionCancelled);
                }
            }
        }

        let cf_accounts = self.cf(cf::ACCOUNTS)?;
        let cf_transactions = self.cf(cf::TRANSACTIONS)?;
        let mut batch = WriteBatch::default();
        let mut record_keys: HashSet<Vec<u8>> = HashSet::new();
        let now = chrono::Utc::now();

        for write in writes {
            match write {
                TransactWrite::Update { msisdn, ops, .. } => {
                    let account = pre_state
                        .get_mut(&msisdn)
                        .and_then(Option::as_mut)
                        .ok_or(StoreError::TransactionCancelled)?;
                    for op in ops {
                        apply_op(account, op)?;
                    }
                    account.updated_at = now;
                    let value = Self::serialize(account)?;
                    batch.put_cf(&cf_accounts, keys::account_key(&msisdn), value);
                }
                TransactWrite::PutRecord(mut record) => {
                    // Two records in one batch can land on the same
                    // microsecond; nudge the later one forward so both legs
                    // persist.
                    let mut key = keys::transaction_key(&record);
                    while record_keys.contains(&key) {
                        record.timestamp += Duration::microseconds(1);
                        key = keys::transaction_key(&record);
                    }
                    record_keys.insert(key.clone());
                    let value = Self::serialize(&record)?;
                    batch.put_cf(&cf_transactions, key, value);
                }
            }
        }

        self.db
            .write(batch)
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn list_transactions(&self, msisdn: &Msisdn, limit: usize) -> Result<Vec<TransactionRecord>> {
        let cf = self.cf(cf::TRANSACTIONS)?;
        let prefix = keys::transactions_prefix(msisdn);

        let mut records = Vec::new();
        let iter = self.db.iterator_cf(
            &cf,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );
        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Unavailable(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            if records.len() >= limit {
                break;
            }
            records.push(Self::deserialize(&value)?);
        }
        Ok(records)
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

impl CatalogStore for RocksStore {
    fn resolve_plan(&self, plan_id: &PlanId) -> Result<Option<CatalogPlan>> {
        // Plan ids are unique across categories; scan each category
        // prefix until the id turns up.
        for category in PlanCategory::all() {
            let cf = self.cf(cf::CATALOG)?;
            let key = keys::plan_key(category, plan_id);
            if let Some(data) = self
                .db
                .get_cf(&cf, key)
                .map_err(|e| StoreError::Unavailable(e.to_string()))?
            {
                return Ok(Some(Self::deserialize(&data)?));
            }
        }
        Ok(None)
    }

    fn plans_in_category(&self, category: PlanCategory) -> Result<Vec<CatalogPlan>> {
        let cf = self.cf(cf::CATALOG)?;
        let prefix = keys::category_prefix(category);

        let mut plans = Vec::new();
        let iter = self.db.iterator_cf(
            &cf,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );
        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Unavailable(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            plans.push(Self::deserialize(&value)?);
        }
        Ok(plans)
    }

    fn put_plan(&self, plan: &CatalogPlan) -> Result<()> {
        let cf = self.cf(cf::CATALOG)?;
        let key = keys::plan_key(plan.category, &plan.plan_id);
        let value = Self::serialize(plan)?;
        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::txn::{BalanceField, Condition};
    use chrono::Utc;
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn msisdn(s: &str) -> Msisdn {
        s.parse().unwrap()
    }

    #[test]
    fn account_roundtrip() {
        let (store, _dir) = create_test_store();
        let account = Account::with_balances(msisdn("771234567"), 5000, 1000);
        store.put_account(&account).unwrap();

        let loaded = store.get_account(&account.msisdn).unwrap().unwrap();
        assert_eq!(loaded.credit_balance, 5000);
        assert_eq!(loaded.mobile_money_balance, 1000);
        assert!(store.get_account(&msisdn("781234567")).unwrap().is_none());
    }

    #[test]
    fn conditioned_debit_commits() {
        let (store, _dir) = create_test_store();
        let account = Account::with_balances(msisdn("771234567"), 0, 1000);
        store.put_account(&account).unwrap();

        store
            .transact(vec![TransactWrite::Update {
                msisdn: account.msisdn.clone(),
                condition: Condition::BalanceAtLeast {
                    field: BalanceField::MobileMoney,
                    amount: 400,
                },
                ops: vec![UpdateOp::AdjustBalance {
                    field: BalanceField::MobileMoney,
                    delta: -400,
                }],
            }])
            .unwrap();

        let loaded = store.get_account(&account.msisdn).unwrap().unwrap();
        assert_eq!(loaded.mobile_money_balance, 600);
    }

    #[test]
    fn failed_condition_cancels_whole_batch() {
        let (store, _dir) = create_test_store();
        let source = Account::with_balances(msisdn("771234567"), 0, 100);
        let target = Account::with_balances(msisdn("781234567"), 0, 0);
        store.put_account(&source).unwrap();
        store.put_account(&target).unwrap();

        let result = store.transact(vec![
            TransactWrite::Update {
                msisdn: source.msisdn.clone(),
                condition: Condition::BalanceAtLeast {
                    field: BalanceField::MobileMoney,
                    amount: 500,
                },
                ops: vec![UpdateOp::AdjustBalance {
                    field: BalanceField::MobileMoney,
                    delta: -500,
                }],
            },
            TransactWrite::Update {
                msisdn: target.msisdn.clone(),
                condition: Condition::AccountExists,
                ops: vec![UpdateOp::AdjustBalance {
                    field: BalanceField::MobileMoney,
                    delta: 500,
                }],
            },
            TransactWrite::PutRecord(TransactionRecord::transfer_sent(
                source.msisdn.clone(),
                500,
                &target.msisdn,
                Utc::now(),
            )),
        ]);

        assert!(matches!(result, Err(StoreError::TransactionCancelled)));
        // Nothing applied: balances and history untouched.
        let source = store.get_account(&source.msisdn).unwrap().unwrap();
        let target = store.get_account(&target.msisdn).unwrap().unwrap();
        assert_eq!(source.mobile_money_balance, 100);
        assert_eq!(target.mobile_money_balance, 0);
        assert!(store
            .list_transactions(&source.msisdn, 10)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn overflowing_adjustment_cancels_without_writing() {
        let (store, _dir) = create_test_store();
        let account = Account::with_balances(msisdn("771234567"), 0, i64::MAX);
        store.put_account(&account).unwrap();

        let result = store.transact(vec![TransactWrite::Update {
            msisdn: account.msisdn.clone(),
            condition: Condition::AccountExists,
            ops: vec![UpdateOp::AdjustBalance {
                field: BalanceField::MobileMoney,
                delta: 1,
            }],
        }]);

        assert!(matches!(result, Err(StoreError::TransactionCancelled)));
        let loaded = store.get_account(&account.msisdn).unwrap().unwrap();
        assert_eq!(loaded.mobile_money_balance, i64::MAX);
    }

    #[test]
    fn records_list_in_chronological_order() {
        let (store, _dir) = create_test_store();
        let account = Account::with_balances(msisdn("771234567"), 0, 1000);
        let target = msisdn("781234567");
        store.put_account(&account).unwrap();

        let base = Utc::now();
        for offset in [2i64, 0, 1] {
            store
                .transact(vec![TransactWrite::PutRecord(
                    TransactionRecord::transfer_sent(
                        account.msisdn.clone(),
                        100 + offset,
                        &target,
                        base + Duration::seconds(offset),
                    ),
                )])
                .unwrap();
        }

        let records = store.list_transactions(&account.msisdn, 10).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].amount, -100);
        assert_eq!(records[1].amount, -101);
        assert_eq!(records[2].amount, -102);
    }

    #[test]
    fn colliding_record_timestamps_both_persist() {
        let (store, _dir) = create_test_store();
        let account = msisdn("771234567");
        let target = msisdn("781234567");
        let now = Utc::now();

        store
            .transact(vec![
                TransactWrite::PutRecord(TransactionRecord::transfer_sent(
                    account.clone(),
                    100,
                    &target,
                    now,
                )),
                TransactWrite::PutRecord(TransactionRecord::transfer_sent(
                    account.clone(),
                    200,
                    &target,
                    now,
                )),
            ])
            .unwrap();

        let records = store.list_transactions(&account, 10).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn catalog_resolve_and_list() {
        let (store, _dir) = create_test_store();
        let data_plan = CatalogPlan {
            category: PlanCategory::Data,
            plan_id: "F_D_1GB".parse().unwrap(),
            name: "Data 1GB".into(),
            description: "1GB valid 30 days".into(),
            price: 2000,
            duration_days: 30,
        };
        let pack_plan = CatalogPlan {
            category: PlanCategory::Pack,
            plan_id: "P_PREMIUM".parse().unwrap(),
            name: "Pack Premium".into(),
            description: "Data + voice".into(),
            price: 5000,
            duration_days: 30,
        };
        store.put_plan(&data_plan).unwrap();
        store.put_plan(&pack_plan).unwrap();

        let resolved = store.resolve_plan(&data_plan.plan_id).unwrap().unwrap();
        assert_eq!(resolved, data_plan);
        assert!(store
            .resolve_plan(&"NOPE_1".parse().unwrap())
            .unwrap()
            .is_none());

        let packs = store.plans_in_category(PlanCategory::Pack).unwrap();
        assert_eq!(packs, vec![pack_plan]);
    }
}
