//! PostgreSQL implementation of TransactionStore.
//!
//! The `transactions` table carries a primary key on `txid`; the resulting
//! unique violation on insert is what makes a payment hash single-use even
//! under concurrent claims.

use crate::domain::foundation::{Timestamp, TxId, UsdtAmount};
use crate::domain::subscription::TransactionRecord;
use crate::ports::{StoreError, TransactionStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// PostgreSQL implementation of the TransactionStore port.
pub struct PostgresTransactionStore {
    pool: PgPool,
}

impl PostgresTransactionStore {
    /// Creates a new PostgresTransactionStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a consumed transaction.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    txid: String,
    payer_id: i64,
    amount_micros: i64,
    verified_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for TransactionRecord {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let txid = TxId::parse(&row.txid)
            .map_err(|e| StoreError::backend(format!("Invalid stored txid: {}", e)))?;

        Ok(TransactionRecord {
            txid,
            payer_id: crate::domain::foundation::UserId::new(row.payer_id),
            amount: UsdtAmount::from_micros(row.amount_micros),
            verified_at: Timestamp::from_datetime(row.verified_at),
        })
    }
}

#[async_trait]
impl TransactionStore for PostgresTransactionStore {
    async fn find(&self, txid: &TxId) -> Result<Option<TransactionRecord>, StoreError> {
        let row: Option<TransactionRow> = sqlx::query_as(
            r#"
            SELECT txid, payer_id, amount_micros, verified_at
            FROM transactions
            WHERE txid = $1
            "#,
        )
        .bind(txid.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::backend(format!("Failed to find transaction: {}", e)))?;

        row.map(TransactionRecord::try_from).transpose()
    }

    async fn insert(&self, record: &TransactionRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO transactions (txid, payer_id, amount_micros, verified_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.txid.as_str())
        .bind(record.payer_id.as_i64())
        .bind(record.amount.as_micros())
        .bind(record.verified_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return StoreError::conflict(record.txid.as_str());
                }
            }
            StoreError::backend(format!("Failed to insert transaction: {}", e))
        })?;

        Ok(())
    }

    async fn revenue_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<UsdtAmount, StoreError> {
        let total: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(amount_micros)::BIGINT
            FROM transactions
            WHERE verified_at >= $1 AND verified_at < $2
            "#,
        )
        .bind(from.as_datetime())
        .bind(to.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::backend(format!("Failed to sum revenue: {}", e)))?;

        Ok(UsdtAmount::from_micros(total.unwrap_or(0)))
    }
}
