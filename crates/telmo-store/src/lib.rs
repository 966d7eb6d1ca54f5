//! Key-value transaction store for the telmo ledger.
//!
//! This crate defines the store boundary the ledger writes through: a
//! point get/put surface plus a multi-item transaction primitive that
//! applies a batch of conditioned writes atomically. All writes succeed
//! or none apply; any condition violation fails the batch as a single
//! unit with no per-item attribution.
//!
//! # Backends
//!
//! - [`RocksStore`] (feature `rocksdb-backend`, default): persistent
//!   storage with column families and CBOR values.
//! - [`MemoryStore`]: always available; used by tests, with a fault
//!   toggle to exercise the unavailable path deterministically.
//!
//! # Example
//!
//! ```
//! use telmo_store::{MemoryStore, TransactionStore, TransactWrite, Condition, UpdateOp, BalanceField};
//! use telmo_core::Account;
//!
//! let store = MemoryStore::new();
//! let msisdn: telmo_core::Msisdn = "771234567".parse().unwrap();
//! store.put_account(&Account::with_balances(msisdn.clone(), 0, 1000)).unwrap();
//!
//! store
//!     .transact(vec![TransactWrite::Update {
//!         msisdn: msisdn.clone(),
//!         condition: Condition::BalanceAtLeast { field: BalanceField::MobileMoney, amount: 400 },
//!         ops: vec![UpdateOp::AdjustBalance { field: BalanceField::MobileMoney, delta: -400 }],
//!     }])
//!     .unwrap();
//!
//! assert_eq!(store.get_account(&msisdn).unwrap().unwrap().mobile_money_balance, 600);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod memory;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
#[cfg(feature = "rocksdb-backend")]
pub mod schema;
pub mod txn;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;
pub use txn::{BalanceField, Condition, TransactWrite, UpdateOp};

use telmo_core::{Account, CatalogPlan, Msisdn, PlanCategory, PlanId, TransactionRecord};

/// The account/history store the ledger writes through.
///
/// Implementations guarantee that [`transact`](Self::transact) is
/// atomic: of two concurrently submitted conditioned batches touching
/// the same account, at most one observes a pre-write state satisfying
/// its conditions; the other fails with
/// [`StoreError::TransactionCancelled`] and applies nothing.
pub trait TransactionStore: Send + Sync {
    /// Get an account by phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend operation fails.
    fn get_account(&self, msisdn: &Msisdn) -> Result<Option<Account>>;

    /// Insert or replace an account record.
    ///
    /// This is the provisioning surface; the ledger itself only
    /// mutates accounts through [`transact`](Self::transact).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend operation fails.
    fn put_account(&self, account: &Account) -> Result<()>;

    /// Apply a batch of conditioned writes atomically.
    ///
    /// # Errors
    ///
    /// - [`StoreError::TransactionCancelled`] if any condition failed;
    ///   nothing was applied.
    /// - [`StoreError::Unavailable`] on backend faults; nothing was
    ///   applied.
    fn transact(&self, writes: Vec<TransactWrite>) -> Result<()>;

    /// List transaction records for an account in chronological order.
    ///
    /// The ledger never reads history back; this exists for the audit
    /// surface and for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend operation fails.
    fn list_transactions(&self, msisdn: &Msisdn, limit: usize) -> Result<Vec<TransactionRecord>>;
}

/// Read-only plan catalog lookup, plus the seeding surface used by the
/// catalog owner.
pub trait CatalogStore: Send + Sync {
    /// Resolve a plan by id, searching every category.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend operation fails.
    fn resolve_plan(&self, plan_id: &PlanId) -> Result<Option<CatalogPlan>>;

    /// List the plans of one category in key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend operation fails.
    fn plans_in_category(&self, category: PlanCategory) -> Result<Vec<CatalogPlan>>;

    /// Insert or replace a catalog plan.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend operation fails.
    fn put_plan(&self, plan: &CatalogPlan) -> Result<()>;
}
