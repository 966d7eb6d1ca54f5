//! Key encoding for the storage backends.
//!
//! Composite keys join their parts with a `0x00` separator, which no
//! MSISDN, RFC 3339 timestamp or category name contains, so prefix
//! scans cannot bleed across accounts or categories.

use telmo_core::{Msisdn, PlanCategory, PlanId, TransactionRecord};

/// Separator byte between composite key parts.
pub const SEP: u8 = 0x00;

/// Account item key: the phone number itself.
#[must_use]
pub fn account_key(msisdn: &Msisdn) -> Vec<u8> {
    msisdn.as_bytes().to_vec()
}

/// Transaction record key: `msisdn \0 rfc3339-micros`.
///
/// RFC 3339 UTC timestamps sort lexicographically in chronological
/// order, so records iterate oldest-first under the account prefix.
#[must_use]
pub fn transaction_key(record: &TransactionRecord) -> Vec<u8> {
    let timestamp = record.key_timestamp();
    let mut key = Vec::with_capacity(record.account.as_bytes().len() + 1 + timestamp.len());
    key.extend_from_slice(record.account.as_bytes());
    key.push(SEP);
    key.extend_from_slice(timestamp.as_bytes());
    key
}

/// Prefix covering all transaction records of one account.
#[must_use]
pub fn transactions_prefix(msisdn: &Msisdn) -> Vec<u8> {
    let mut key = Vec::with_capacity(msisdn.as_bytes().len() + 1);
    key.extend_from_slice(msisdn.as_bytes());
    key.push(SEP);
    key
}

/// Catalog plan key: `category \0 plan_id`.
#[must_use]
pub fn plan_key(category: PlanCategory, plan_id: &PlanId) -> Vec<u8> {
    let category = category.as_str().as_bytes();
    let mut key = Vec::with_capacity(category.len() + 1 + plan_id.as_bytes().len());
    key.extend_from_slice(category);
    key.push(SEP);
    key.extend_from_slice(plan_id.as_bytes());
    key
}

/// Prefix covering all plans of one category.
#[must_use]
pub fn category_prefix(category: PlanCategory) -> Vec<u8> {
    let mut key = Vec::with_capacity(category.as_str().len() + 1);
    key.extend_from_slice(category.as_str().as_bytes());
    key.push(SEP);
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn msisdn(s: &str) -> Msisdn {
        s.parse().unwrap()
    }

    #[test]
    fn transaction_keys_sort_chronologically() {
        let base = Utc::now();
        let account = msisdn("771234567");
        let target = msisdn("781234567");
        let first =
            TransactionRecord::transfer_sent(account.clone(), 100, &target, base);
        let second = TransactionRecord::transfer_sent(
            account,
            100,
            &target,
            base + Duration::seconds(1),
        );
        assert!(transaction_key(&first) < transaction_key(&second));
    }

    #[test]
    fn transaction_key_stays_under_account_prefix() {
        let account = msisdn("771234567");
        let record = TransactionRecord::transfer_sent(
            account.clone(),
            100,
            &msisdn("781234567"),
            Utc::now(),
        );
        assert!(transaction_key(&record).starts_with(&transactions_prefix(&account)));
        // A longer phone number must not fall under the shorter prefix.
        assert!(!transaction_key(&record).starts_with(&transactions_prefix(&msisdn("7712345678"))));
    }

    #[test]
    fn plan_key_stays_under_category_prefix() {
        let plan_id: PlanId = "F_D_1GB".parse().unwrap();
        let key = plan_key(PlanCategory::Data, &plan_id);
        assert!(key.starts_with(&category_prefix(PlanCategory::Data)));
        assert!(!key.starts_with(&category_prefix(PlanCategory::Pack)));
    }
}
