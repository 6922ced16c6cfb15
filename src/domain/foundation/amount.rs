//! Monetary value object for USDT amounts.
//!
//! TRC-20 USDT carries six decimal places. All amounts are held as signed
//! 64-bit integers of the smallest unit (micro-USDT), so threshold
//! comparisons near the subscription price are exact. Floats never appear.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Smallest units per whole USDT.
pub const MICROS_PER_USDT: i64 = 1_000_000;

/// Error returned when a raw ledger amount cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid smallest-unit amount '{raw}'")]
pub struct AmountParseError {
    pub raw: String,
}

/// An amount of USDT, stored in micro-USDT.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UsdtAmount(i64);

impl UsdtAmount {
    pub const ZERO: UsdtAmount = UsdtAmount(0);

    /// Amount from a count of smallest units.
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Amount from a whole number of USDT.
    pub const fn from_whole(usdt: i64) -> Self {
        Self(usdt * MICROS_PER_USDT)
    }

    /// Parse a string-encoded integer of smallest units, as returned by the
    /// ledger lookup (`amount_str`). Negative amounts are rejected.
    pub fn parse_micros(raw: &str) -> Result<Self, AmountParseError> {
        let micros: i64 = raw.trim().parse().map_err(|_| AmountParseError {
            raw: raw.to_string(),
        })?;
        if micros < 0 {
            return Err(AmountParseError {
                raw: raw.to_string(),
            });
        }
        Ok(Self(micros))
    }

    pub fn as_micros(&self) -> i64 {
        self.0
    }

    /// Saturating sum, for revenue aggregation.
    pub fn saturating_add(&self, other: UsdtAmount) -> UsdtAmount {
        UsdtAmount(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for UsdtAmount {
    /// Renders with two decimal places, truncating sub-cent units.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / MICROS_PER_USDT;
        let cents = (self.0 % MICROS_PER_USDT).abs() / 10_000;
        write!(f, "{}.{:02}", whole, cents)
    }
}
