//! arena-gate - the bot binary.
//!
//! Wires configuration, the PostgreSQL stores, the TronScan ledger client
//! and the Telegram front end together, then runs the update dispatcher
//! and the sweep scheduler until Ctrl-C.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use arena_gate::adapters::postgres::{PostgresSubscriptionStore, PostgresTransactionStore};
use arena_gate::adapters::telegram::{TelegramApi, TelegramApiConfig, TelegramGateway};
use arena_gate::adapters::tronscan::{TronScanConfig, TronScanLedger};
use arena_gate::application::{
    AdminReporter, LedgerVerifier, LifecycleSettings, PaymentProcessor, SchedulerConfig,
    SubscriptionLifecycle, SweepScheduler,
};
use arena_gate::bot::{BotRouter, RouterSettings, UpdateDispatcher};
use arena_gate::config::AppConfig;
use arena_gate::domain::foundation::{ChatId, UsdtAmount, UserId};
use arena_gate::ports::{GroupGateway, SubscriptionStore, TransactionStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Missing or invalid configuration is fatal; there is no degraded mode.
    let config = AppConfig::load()?;
    config.validate()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database migrations applied");
    }

    let transactions: Arc<dyn TransactionStore> =
        Arc::new(PostgresTransactionStore::new(pool.clone()));
    let subscriptions: Arc<dyn SubscriptionStore> =
        Arc::new(PostgresSubscriptionStore::new(pool));

    let ledger = Arc::new(TronScanLedger::new(
        TronScanConfig::new(config.ledger.api_key.clone())
            .with_base_url(config.ledger.api_base_url.clone())
            .with_timeout(config.ledger.timeout()),
    ));

    let api = Arc::new(TelegramApi::new(TelegramApiConfig::new(
        config.telegram.bot_token.clone(),
    )));
    let gateway: Arc<dyn GroupGateway> = Arc::new(TelegramGateway::new(api.clone()));

    let price = UsdtAmount::from_whole(config.subscription.price_usdt);
    let admin_id = UserId::new(config.telegram.admin_user_id);

    let verifier = LedgerVerifier::new(ledger, config.ledger.wallet_address.clone(), price);
    let lifecycle = Arc::new(SubscriptionLifecycle::new(
        subscriptions.clone(),
        gateway.clone(),
        LifecycleSettings {
            group_id: ChatId::new(config.telegram.group_id),
            admin_id,
            period_days: config.subscription.period_days,
            reminder_window_hours: config.subscription.reminder_window_hours,
            invite_ttl_secs: config.subscription.invite_ttl_secs,
        },
    ));
    let processor = Arc::new(PaymentProcessor::new(
        transactions.clone(),
        verifier,
        lifecycle.clone(),
    ));
    let reporter = AdminReporter::new(transactions, subscriptions.clone());

    let router = Arc::new(BotRouter::new(
        processor,
        subscriptions,
        reporter,
        gateway,
        RouterSettings {
            admin_id,
            wallet_address: config.ledger.wallet_address.clone(),
            price,
            period_days: config.subscription.period_days,
        },
    ));

    let scheduler = SweepScheduler::new(
        lifecycle,
        SchedulerConfig {
            interval: config.subscription.sweep_interval(),
            retry_interval: config.subscription.sweep_retry(),
        },
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scheduler_handle = {
        let shutdown_rx = shutdown_rx.clone();
        tokio::spawn(async move { scheduler.run(shutdown_rx).await })
    };

    let dispatcher = UpdateDispatcher::new(api, router);
    let dispatcher_handle = {
        let shutdown_rx = shutdown_rx.clone();
        tokio::spawn(async move { dispatcher.run(shutdown_rx).await })
    };

    tracing::info!("arena-gate started");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    shutdown_tx.send(true)?;

    scheduler_handle.await?;
    dispatcher_handle.await?;

    Ok(())
}
