//! Arena Gate - Paid Group Access Bot
//!
//! This crate sells time-boxed access to a restricted Telegram group for
//! TRC-20 USDT payments, verified against the public Tron ledger.

pub mod adapters;
pub mod application;
pub mod bot;
pub mod config;
pub mod domain;
pub mod messages;
pub mod ports;
