//! PostgreSQL adapter - durable implementations of the record stores.

mod subscription_store;
mod transaction_store;

pub use subscription_store::PostgresSubscriptionStore;
pub use transaction_store::PostgresTransactionStore;
