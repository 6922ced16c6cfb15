//! In-memory record stores.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::RwLock;

use crate::domain::foundation::{Timestamp, TxId, UsdtAmount, UserId};
use crate::domain::subscription::{Subscription, TransactionRecord};
use crate::ports::{StoreError, SubscriptionStore, TransactionStore};

/// TransactionStore held in a map keyed by txid.
#[derive(Default)]
pub struct InMemoryTransactionStore {
    records: RwLock<HashMap<String, TransactionRecord>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn find(&self, txid: &TxId) -> Result<Option<TransactionRecord>, StoreError> {
        Ok(self.records.read().await.get(txid.as_str()).cloned())
    }

    async fn insert(&self, record: &TransactionRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(record.txid.as_str()) {
            return Err(StoreError::conflict(record.txid.as_str()));
        }
        records.insert(record.txid.as_str().to_string(), record.clone());
        Ok(())
    }

    async fn revenue_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<UsdtAmount, StoreError> {
        let records = self.records.read().await;
        let total = records
            .values()
            .filter(|r| r.verified_at >= from && r.verified_at < to)
            .fold(UsdtAmount::ZERO, |acc, r| acc.saturating_add(r.amount));
        Ok(total)
    }
}

/// SubscriptionStore held in a map keyed by user id.
#[derive(Default)]
pub struct InMemorySubscriptionStore {
    rows: RwLock<HashMap<i64, Subscription>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn upsert(&self, subscription: &Subscription) -> Result<(), StoreError> {
        self.rows
            .write()
            .await
            .insert(subscription.user_id.as_i64(), subscription.clone());
        Ok(())
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Subscription>, StoreError> {
        Ok(self.rows.read().await.get(&user_id.as_i64()).cloned())
    }

    async fn due_for_reminder(
        &self,
        now: Timestamp,
        window: Duration,
    ) -> Result<Vec<Subscription>, StoreError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|row| row.needs_reminder_at(now, window))
            .cloned()
            .collect())
    }

    async fn expired_as_of(&self, now: Timestamp) -> Result<Vec<Subscription>, StoreError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|row| row.is_expired_at(now))
            .cloned()
            .collect())
    }

    async fn mark_reminder_sent(&self, user_id: UserId) -> Result<(), StoreError> {
        if let Some(row) = self.rows.write().await.get_mut(&user_id.as_i64()) {
            row.mark_reminder_sent();
        }
        Ok(())
    }

    async fn deactivate(&self, user_id: UserId) -> Result<(), StoreError> {
        if let Some(row) = self.rows.write().await.get_mut(&user_id.as_i64()) {
            row.deactivate();
        }
        Ok(())
    }

    async fn count_active(&self) -> Result<u64, StoreError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|row| row.is_active)
            .count() as u64)
    }

    async fn count_all(&self) -> Result<u64, StoreError> {
        Ok(self.rows.read().await.len() as u64)
    }
}
