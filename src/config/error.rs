//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid Telegram bot token format")]
    InvalidBotToken,

    #[error("Admin user id must be non-zero")]
    InvalidAdminUserId,

    #[error("Group id must be a negative supergroup id")]
    InvalidGroupId,

    #[error("Invalid TRON wallet address format")]
    InvalidWalletAddress,

    #[error("Subscription price must be positive")]
    InvalidSubscriptionPrice,

    #[error("Subscription period must be positive")]
    InvalidSubscriptionPeriod,

    #[error("Sweep interval must be positive")]
    InvalidSweepInterval,

    #[error("Ledger timeout must be positive")]
    InvalidLedgerTimeout,
}
