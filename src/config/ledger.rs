//! Ledger API configuration (TronScan)

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// TRON wallet addresses are base58check, 34 characters starting with 'T'.
const WALLET_ADDRESS_LEN: usize = 34;

/// Ledger configuration (TronScan API, receiving wallet)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerConfig {
    /// TronScan API key
    pub api_key: String,

    /// Receiving wallet address payments must land on
    pub wallet_address: String,

    /// TronScan API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl LedgerConfig {
    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate ledger configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("LEDGER_API_KEY"));
        }
        if self.wallet_address.is_empty() {
            return Err(ValidationError::MissingRequired("LEDGER_WALLET_ADDRESS"));
        }
        if !self.wallet_address.starts_with('T')
            || self.wallet_address.len() != WALLET_ADDRESS_LEN
        {
            return Err(ValidationError::InvalidWalletAddress);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidLedgerTimeout);
        }
        Ok(())
    }
}

fn default_api_base_url() -> String {
    "https://apilist.tronscanapi.com".to_string()
}

fn default_timeout() -> u64 {
    10
}
