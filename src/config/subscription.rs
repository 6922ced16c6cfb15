//! Subscription plan configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Subscription configuration (price, period, sweep timing)
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionConfig {
    /// Price of one subscription period in whole USDT
    #[serde(default = "default_price_usdt")]
    pub price_usdt: i64,

    /// Length of one subscription period in days
    #[serde(default = "default_period_days")]
    pub period_days: i64,

    /// How far before expiry the reminder fires, in hours
    #[serde(default = "default_reminder_window_hours")]
    pub reminder_window_hours: i64,

    /// Pause between sweep cycles in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Pause before retrying a failed sweep cycle in seconds
    #[serde(default = "default_sweep_retry")]
    pub sweep_retry_secs: u64,

    /// Lifetime of a one-use invite link in seconds
    #[serde(default = "default_invite_ttl")]
    pub invite_ttl_secs: u64,
}

impl SubscriptionConfig {
    /// Get sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Get sweep retry interval as Duration
    pub fn sweep_retry(&self) -> Duration {
        Duration::from_secs(self.sweep_retry_secs)
    }

    /// Validate subscription configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.price_usdt <= 0 {
            return Err(ValidationError::InvalidSubscriptionPrice);
        }
        if self.period_days <= 0 {
            return Err(ValidationError::InvalidSubscriptionPeriod);
        }
        if self.sweep_interval_secs == 0 || self.sweep_retry_secs == 0 {
            return Err(ValidationError::InvalidSweepInterval);
        }
        Ok(())
    }
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            price_usdt: default_price_usdt(),
            period_days: default_period_days(),
            reminder_window_hours: default_reminder_window_hours(),
            sweep_interval_secs: default_sweep_interval(),
            sweep_retry_secs: default_sweep_retry(),
            invite_ttl_secs: default_invite_ttl(),
        }
    }
}

fn default_price_usdt() -> i64 {
    25
}

fn default_period_days() -> i64 {
    30
}

fn default_reminder_window_hours() -> i64 {
    12
}

fn default_sweep_interval() -> u64 {
    3600
}

fn default_sweep_retry() -> u64 {
    300
}

fn default_invite_ttl() -> u64 {
    3600
}
