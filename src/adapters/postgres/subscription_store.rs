//! PostgreSQL implementation of SubscriptionStore.
//!
//! One row per user. A grant replaces the whole row via
//! `ON CONFLICT (user_id) DO UPDATE`; sweep passes only flip the
//! `is_active` and `reminder_sent` flags.

use crate::domain::foundation::{Timestamp, TxId, UserId};
use crate::domain::subscription::Subscription;
use crate::ports::{StoreError, SubscriptionStore};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

/// PostgreSQL implementation of the SubscriptionStore port.
pub struct PostgresSubscriptionStore {
    pool: PgPool,
}

impl PostgresSubscriptionStore {
    /// Creates a new PostgresSubscriptionStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    user_id: i64,
    username: Option<String>,
    display_name: Option<String>,
    last_txid: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    is_active: bool,
    reminder_sent: bool,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = StoreError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let last_txid = TxId::parse(&row.last_txid)
            .map_err(|e| StoreError::backend(format!("Invalid stored txid: {}", e)))?;

        Ok(Subscription {
            user_id: UserId::new(row.user_id),
            username: row.username,
            display_name: row.display_name,
            last_txid,
            start_date: Timestamp::from_datetime(row.start_date),
            end_date: Timestamp::from_datetime(row.end_date),
            is_active: row.is_active,
            reminder_sent: row.reminder_sent,
        })
    }
}

const SELECT_COLUMNS: &str = "user_id, username, display_name, last_txid, \
     start_date, end_date, is_active, reminder_sent";

#[async_trait]
impl SubscriptionStore for PostgresSubscriptionStore {
    async fn upsert(&self, subscription: &Subscription) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                user_id, username, display_name, last_txid,
                start_date, end_date, is_active, reminder_sent
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO UPDATE SET
                username = EXCLUDED.username,
                display_name = EXCLUDED.display_name,
                last_txid = EXCLUDED.last_txid,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                is_active = EXCLUDED.is_active,
                reminder_sent = EXCLUDED.reminder_sent
            "#,
        )
        .bind(subscription.user_id.as_i64())
        .bind(&subscription.username)
        .bind(&subscription.display_name)
        .bind(subscription.last_txid.as_str())
        .bind(subscription.start_date.as_datetime())
        .bind(subscription.end_date.as_datetime())
        .bind(subscription.is_active)
        .bind(subscription.reminder_sent)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::backend(format!("Failed to upsert subscription: {}", e)))?;

        Ok(())
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Subscription>, StoreError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM subscriptions WHERE user_id = $1"
        ))
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::backend(format!("Failed to find subscription: {}", e)))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn due_for_reminder(
        &self,
        now: Timestamp,
        window: Duration,
    ) -> Result<Vec<Subscription>, StoreError> {
        let window_end = *now.as_datetime() + window;

        let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM subscriptions
            WHERE is_active = TRUE
              AND reminder_sent = FALSE
              AND end_date >= $1
              AND end_date <= $2
            ORDER BY end_date ASC
            "#
        ))
        .bind(now.as_datetime())
        .bind(window_end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend(format!("Failed to query reminders: {}", e)))?;

        rows.into_iter().map(Subscription::try_from).collect()
    }

    async fn expired_as_of(&self, now: Timestamp) -> Result<Vec<Subscription>, StoreError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM subscriptions
            WHERE is_active = TRUE
              AND end_date <= $1
            ORDER BY end_date ASC
            "#
        ))
        .bind(now.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend(format!("Failed to query expiries: {}", e)))?;

        rows.into_iter().map(Subscription::try_from).collect()
    }

    async fn mark_reminder_sent(&self, user_id: UserId) -> Result<(), StoreError> {
        sqlx::query("UPDATE subscriptions SET reminder_sent = TRUE WHERE user_id = $1")
            .bind(user_id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::backend(format!("Failed to mark reminder: {}", e)))?;

        Ok(())
    }

    async fn deactivate(&self, user_id: UserId) -> Result<(), StoreError> {
        sqlx::query("UPDATE subscriptions SET is_active = FALSE WHERE user_id = $1")
            .bind(user_id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::backend(format!("Failed to deactivate: {}", e)))?;

        Ok(())
    }

    async fn count_active(&self) -> Result<u64, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE is_active = TRUE")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| StoreError::backend(format!("Failed to count active: {}", e)))?;

        Ok(count as u64)
    }

    async fn count_all(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::backend(format!("Failed to count subscriptions: {}", e)))?;

        Ok(count as u64)
    }
}
