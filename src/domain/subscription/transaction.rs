//! Verified-transaction record entity.

use crate::domain::foundation::{Timestamp, TxId, UsdtAmount, UserId};
use serde::{Deserialize, Serialize};

/// One consumed payment claim.
///
/// # Invariants
///
/// - `txid` is globally unique; a persisted record marks that hash as
///   consumed forever, so no two grants can ever come from the same payment.
/// - Records are written exactly once, at the moment the ledger verifier
///   confirms a qualifying transfer, and never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction hash, the idempotency key for payment processing.
    pub txid: TxId,

    /// User who submitted the claim.
    pub payer_id: UserId,

    /// Verified transfer amount. This is the qualifying entry's actual
    /// amount, not the configured price, so overpayments stay visible.
    pub amount: UsdtAmount,

    /// When verification succeeded.
    pub verified_at: Timestamp,
}

impl TransactionRecord {
    pub fn new(txid: TxId, payer_id: UserId, amount: UsdtAmount, verified_at: Timestamp) -> Self {
        Self {
            txid,
            payer_id,
            amount,
            verified_at,
        }
    }
}
