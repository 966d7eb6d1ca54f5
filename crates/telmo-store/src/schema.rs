//! Column families for the `RocksDB` backend.

/// Column family names.
pub mod cf {
    /// Account items, keyed by MSISDN.
    pub const ACCOUNTS: &str = "accounts";

    /// Transaction-history records, keyed by `msisdn \0 timestamp`.
    pub const TRANSACTIONS: &str = "transactions";

    /// Catalog plans, keyed by `category \0 plan_id`.
    pub const CATALOG: &str = "catalog";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::ACCOUNTS, cf::TRANSACTIONS, cf::CATALOG]
}
