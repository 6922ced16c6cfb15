//! Subscription domain - payment claims and time-boxed access grants.

mod errors;
mod subscription;
mod transaction;

pub use errors::ClaimError;
pub use subscription::{SubscriberProfile, Subscription};
pub use transaction::TransactionRecord;
