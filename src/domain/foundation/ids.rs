//! Identifier value objects for Telegram entities and ledger transactions.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Required length of a TRON transaction hash.
pub const TXID_LEN: usize = 64;

/// Telegram user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Telegram chat identifier (group or private chat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(i64);

impl ChatId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<UserId> for ChatId {
    /// A private chat with a user shares the user's numeric id.
    fn from(user: UserId) -> Self {
        Self(user.0)
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a claimed transaction id fails the format gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transaction id must be {TXID_LEN} characters long, got {actual}")]
pub struct TxIdFormatError {
    pub actual: usize,
}

/// Transaction hash on the TRON ledger.
///
/// The only syntactic rule is the fixed length of 64 characters, mirroring
/// what the ledger lookup itself accepts. No charset validation is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    /// Parse a raw claim into a transaction id.
    ///
    /// Surrounding whitespace is trimmed before the length check.
    pub fn parse(raw: &str) -> Result<Self, TxIdFormatError> {
        let trimmed = raw.trim();
        if trimmed.chars().count() != TXID_LEN {
            return Err(TxIdFormatError {
                actual: trimmed.chars().count(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
