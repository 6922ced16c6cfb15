//! In-memory ledger lookup.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::TxId;
use crate::ports::{LedgerError, LedgerLookup, TransferEntry};

/// LedgerLookup answering from a preloaded map of transactions.
#[derive(Default)]
pub struct InMemoryLedger {
    transactions: RwLock<HashMap<String, Vec<TransferEntry>>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the transfer entries a transaction hash resolves to.
    pub async fn record_transaction(&self, txid: &TxId, transfers: Vec<TransferEntry>) {
        self.transactions
            .write()
            .await
            .insert(txid.as_str().to_string(), transfers);
    }
}

#[async_trait]
impl LedgerLookup for InMemoryLedger {
    async fn transfers(&self, txid: &TxId) -> Result<Vec<TransferEntry>, LedgerError> {
        // Unknown hashes resolve to no transfers, like an unconfirmed or
        // nonexistent transaction on the real ledger.
        Ok(self
            .transactions
            .read()
            .await
            .get(txid.as_str())
            .cloned()
            .unwrap_or_default())
    }
}
