//! Ledger lookup port.
//!
//! Read-only resolution of a transaction hash to its TRC-20 transfer
//! entries. The verifier never sees transport details; implementations
//! must apply a bounded timeout so a claim can never hang indefinitely.

use crate::domain::foundation::{TxId, UsdtAmount};
use async_trait::async_trait;
use thiserror::Error;

/// One TRC-20 transfer inside a looked-up transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEntry {
    /// Destination address of the transfer.
    pub to_address: String,

    /// Transfer amount, already parsed from the smallest-unit encoding.
    pub amount: UsdtAmount,
}

/// Failures resolving a transaction hash.
///
/// All of these are treated as "payment not verified" by the caller;
/// none of them propagate to the user as anything more specific.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("ledger request failed: {0}")]
    Transport(String),

    #[error("ledger responded with status {0}")]
    Status(u16),

    #[error("ledger payload malformed: {0}")]
    Malformed(String),
}

/// Port for the external transaction-info lookup.
#[async_trait]
pub trait LedgerLookup: Send + Sync {
    /// Resolve a hash to its transfer entries.
    ///
    /// A transaction that exists but carries no TRC-20 transfers resolves
    /// to an empty list, not an error.
    async fn transfers(&self, txid: &TxId) -> Result<Vec<TransferEntry>, LedgerError>;
}
