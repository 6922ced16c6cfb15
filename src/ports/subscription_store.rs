//! Subscription record store port.
//!
//! One row per user, replaced wholesale on each grant. The sweep only
//! reads rows and toggles `is_active` / `reminder_sent`; it never creates
//! subscriptions.

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::subscription::Subscription;
use async_trait::async_trait;
use chrono::Duration;

use super::transaction_store::StoreError;

/// Store port for access grants, keyed by `user_id`.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Create or replace the user's subscription row (last writer wins).
    async fn upsert(&self, subscription: &Subscription) -> Result<(), StoreError>;

    /// Fetch a user's subscription, active or not.
    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Subscription>, StoreError>;

    /// Active subscriptions whose `end_date` falls within `window` of `now`
    /// and whose reminder has not yet fired for the current `end_date`.
    async fn due_for_reminder(
        &self,
        now: Timestamp,
        window: Duration,
    ) -> Result<Vec<Subscription>, StoreError>;

    /// Active subscriptions whose `end_date` is at or before `now`.
    async fn expired_as_of(&self, now: Timestamp) -> Result<Vec<Subscription>, StoreError>;

    /// Flag the one-time reminder for the user's current `end_date` as sent.
    async fn mark_reminder_sent(&self, user_id: UserId) -> Result<(), StoreError>;

    /// Flip the user's row to inactive after revocation.
    async fn deactivate(&self, user_id: UserId) -> Result<(), StoreError>;

    /// Number of currently active subscriptions.
    async fn count_active(&self) -> Result<u64, StoreError>;

    /// Number of subscription rows ever created.
    async fn count_all(&self) -> Result<u64, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn SubscriptionStore) {}
    }
}
