//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the core engine and the outside world. Adapters implement these ports.
//!
//! - `TransactionStore` - consumed payment claims, keyed by txid
//! - `SubscriptionStore` - one access grant per user
//! - `LedgerLookup` - read-only transaction-info resolution
//! - `GroupGateway` - invite links, DMs, membership status, ban/unban

mod group_gateway;
mod ledger_lookup;
mod subscription_store;
mod transaction_store;

pub use group_gateway::{GatewayError, GroupGateway, InviteLink, MemberStatus};
pub use ledger_lookup::{LedgerError, LedgerLookup, TransferEntry};
pub use subscription_store::SubscriptionStore;
pub use transaction_store::{StoreError, TransactionStore};
