//! In-memory adapter - store, gateway, and ledger implementations backed by
//! process memory. Used by integration tests and local experiments; state
//! disappears with the process.

mod gateway;
mod ledger;
mod stores;

pub use gateway::{InMemoryGroupGateway, SentMessage};
pub use ledger::InMemoryLedger;
pub use stores::{InMemorySubscriptionStore, InMemoryTransactionStore};
