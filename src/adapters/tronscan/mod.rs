//! TronScan adapter - ledger lookup backed by the TronScan HTTP API.

mod client;

pub use client::{TronScanConfig, TronScanLedger};
