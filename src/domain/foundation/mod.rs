//! Foundation module - Shared domain primitives.
//!
//! Value objects that form the vocabulary of the arena-gate domain:
//! Telegram identifiers, ledger transaction hashes, exact USDT amounts
//! and UTC timestamps.

mod amount;
mod ids;
mod timestamp;

pub use amount::{AmountParseError, UsdtAmount, MICROS_PER_USDT};
pub use ids::{ChatId, TxId, TxIdFormatError, UserId, TXID_LEN};
pub use timestamp::Timestamp;
