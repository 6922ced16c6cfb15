//! Error kinds for payment processing and the subscription sweep.

use crate::domain::foundation::TxIdFormatError;
use thiserror::Error;

/// Why a payment claim was not turned into an access grant.
///
/// Each variant maps to one short, specific user-facing message; raw
/// provider errors never reach end users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    /// Claim failed the fixed-length format gate. User-correctable.
    #[error("{0}")]
    InvalidFormat(#[from] TxIdFormatError),

    /// The transaction hash was already consumed by an earlier claim,
    /// no matter who submitted it. Terminal.
    #[error("transaction id has already been used")]
    AlreadyUsed,

    /// The ledger lookup returned no qualifying transfer, or the lookup
    /// itself failed. The user may retry after confirmations settle.
    #[error("payment not found or not valid")]
    VerificationFailed,

    /// A record-store operation failed. Logged; not retried automatically.
    #[error("storage failure: {0}")]
    Persistence(String),

    /// A group-membership operation failed. The user is asked to contact
    /// support; no subscription row is written.
    #[error("group membership failure: {0}")]
    Membership(String),
}

impl ClaimError {
    pub fn persistence(reason: impl Into<String>) -> Self {
        ClaimError::Persistence(reason.into())
    }

    pub fn membership(reason: impl Into<String>) -> Self {
        ClaimError::Membership(reason.into())
    }

    /// Whether resubmitting the same claim could ever succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClaimError::VerificationFailed | ClaimError::Persistence(_) | ClaimError::Membership(_)
        )
    }
}
