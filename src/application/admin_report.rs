//! On-demand administrative summary.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UsdtAmount};
use crate::ports::{StoreError, SubscriptionStore, TransactionStore};

/// Snapshot shown to the administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSummary {
    pub active_subscriptions: u64,
    pub total_subscriptions: u64,
    pub today_revenue: UsdtAmount,
}

/// Builds the admin panel numbers from the two record stores.
pub struct AdminReporter {
    transactions: Arc<dyn TransactionStore>,
    subscriptions: Arc<dyn SubscriptionStore>,
}

impl AdminReporter {
    pub fn new(
        transactions: Arc<dyn TransactionStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
    ) -> Self {
        Self {
            transactions,
            subscriptions,
        }
    }

    /// Active count, total count and revenue verified since midnight UTC.
    pub async fn summarize(&self) -> Result<AdminSummary, StoreError> {
        let active_subscriptions = self.subscriptions.count_active().await?;
        let total_subscriptions = self.subscriptions.count_all().await?;

        let today = Timestamp::start_of_today();
        let tomorrow = today.plus_days(1);
        let today_revenue = self.transactions.revenue_between(today, tomorrow).await?;

        Ok(AdminSummary {
            active_subscriptions,
            total_subscriptions,
            today_revenue,
        })
    }
}
