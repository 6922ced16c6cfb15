//! TronScan client - implementation of LedgerLookup for the TronScan API.
//!
//! Fetches a transaction by hash and extracts its TRC-20 transfer entries.
//! Amounts arrive as strings in micro-USDT, so they are parsed with integer
//! arithmetic only.
//!
//! # Configuration
//!
//! ```ignore
//! let config = TronScanConfig::new(api_key)
//!     .with_base_url("https://apilist.tronscanapi.com")
//!     .with_timeout(Duration::from_secs(10));
//!
//! let ledger = TronScanLedger::new(config);
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::foundation::{TxId, UsdtAmount};
use crate::ports::{LedgerError, LedgerLookup, TransferEntry};

/// Configuration for the TronScan client.
#[derive(Debug, Clone)]
pub struct TronScanConfig {
    /// API key sent in the TRON-PRO-API-KEY header.
    api_key: Secret<String>,
    /// Base URL for the API (default: https://apilist.tronscanapi.com).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl TronScanConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: "https://apilist.tronscanapi.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// LedgerLookup implementation backed by TronScan.
pub struct TronScanLedger {
    config: TronScanConfig,
    client: Client,
}

impl TronScanLedger {
    /// Creates a new TronScan client with the given configuration.
    pub fn new(config: TronScanConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Builds the transaction-info endpoint URL.
    fn transaction_url(&self, txid: &TxId) -> String {
        format!(
            "{}/api/transaction-info?hash={}",
            self.config.base_url, txid
        )
    }
}

#[async_trait]
impl LedgerLookup for TronScanLedger {
    async fn transfers(&self, txid: &TxId) -> Result<Vec<TransferEntry>, LedgerError> {
        let response = self
            .client
            .get(self.transaction_url(txid))
            .header("TRON-PRO-API-KEY", self.config.api_key())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LedgerError::Transport(format!(
                        "Request timed out after {}s",
                        self.config.timeout.as_secs()
                    ))
                } else {
                    LedgerError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::Status(status.as_u16()));
        }

        let info: TransactionInfo = response
            .json()
            .await
            .map_err(|e| LedgerError::Malformed(format!("Failed to parse response: {}", e)))?;

        parse_transfers(info)
    }
}

/// Converts the raw API payload into transfer entries.
///
/// An unknown transaction comes back without a `trc20TransferInfo` field,
/// which yields an empty list rather than an error.
fn parse_transfers(info: TransactionInfo) -> Result<Vec<TransferEntry>, LedgerError> {
    info.trc20_transfer_info
        .unwrap_or_default()
        .into_iter()
        .map(|raw| {
            let amount = UsdtAmount::parse_micros(&raw.amount_str).map_err(|_| {
                LedgerError::Malformed(format!("Unparseable transfer amount: {}", raw.amount_str))
            })?;
            Ok(TransferEntry {
                to_address: raw.to_address,
                amount,
            })
        })
        .collect()
}

// ----- TronScan API Types -----

#[derive(Debug, Deserialize)]
struct TransactionInfo {
    #[serde(rename = "trc20TransferInfo")]
    trc20_transfer_info: Option<Vec<RawTransfer>>,
}

#[derive(Debug, Deserialize)]
struct RawTransfer {
    #[serde(default)]
    to_address: String,
    #[serde(default)]
    amount_str: String,
}
