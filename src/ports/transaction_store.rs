//! Transaction record store port.
//!
//! Durable keyed storage for verified-transaction records. The unique key
//! on `txid` is what enforces at-most-once consumption of a payment.

use crate::domain::foundation::{Timestamp, TxId, UsdtAmount};
use crate::domain::subscription::TransactionRecord;
use async_trait::async_trait;
use thiserror::Error;

/// Failures from either record store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// An insert collided with an existing unique key.
    #[error("record already exists for key '{key}'")]
    Conflict { key: String },

    /// Any other store failure (connectivity, query, mapping).
    #[error("store operation failed: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn conflict(key: impl Into<String>) -> Self {
        StoreError::Conflict { key: key.into() }
    }

    pub fn backend(reason: impl Into<String>) -> Self {
        StoreError::Backend(reason.into())
    }
}

/// Store port for consumed payment claims, keyed by `txid`.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Look up a record by transaction hash.
    ///
    /// Returns `None` if the hash has never been consumed.
    async fn find(&self, txid: &TxId) -> Result<Option<TransactionRecord>, StoreError>;

    /// Insert a new record.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the hash is already consumed (lost race with a
    ///   concurrent claim for the same TXID)
    /// - `Backend` on any other persistence failure
    async fn insert(&self, record: &TransactionRecord) -> Result<(), StoreError>;

    /// Sum of verified amounts in `[from, to)`, for the admin report.
    async fn revenue_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<UsdtAmount, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn TransactionStore) {}
    }

    #[test]
    fn conflict_error_names_the_key() {
        let err = StoreError::conflict("abc");
        assert_eq!(err.to_string(), "record already exists for key 'abc'");
    }
}
