//! Application layer - the payment-verification and subscription-lifecycle
//! engine.
//!
//! - `PaymentProcessor` - validates, deduplicates, verifies and records one
//!   inbound TXID claim, then hands off to the lifecycle manager
//! - `LedgerVerifier` - destination-address and minimum-amount rules
//! - `SubscriptionLifecycle` - grant/renew plus the reminder and expiry
//!   sweep transitions
//! - `SweepScheduler` - the cancellable periodic loop driving the sweeps
//! - `AdminReporter` - on-demand counts and daily revenue

mod admin_report;
mod ledger_verifier;
mod lifecycle;
mod payment_processor;
mod scheduler;

pub use admin_report::{AdminReporter, AdminSummary};
pub use ledger_verifier::LedgerVerifier;
pub use lifecycle::{
    GrantOutcome, InviteDelivery, LifecycleSettings, SubscriptionLifecycle, SweepError,
};
pub use payment_processor::{ClaimGrant, PaymentProcessor};
pub use scheduler::{SchedulerConfig, SweepScheduler};
