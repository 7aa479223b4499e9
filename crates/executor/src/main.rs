use std::sync::Arc;

use dotenvy::dotenv;
use tracing::{error, info};

use common::config::{EnvSource, ExecutorConfig, TradingMode};
use common::identity::ManagedIdentity;
use common::logger;
use common::notifier::{build_notifier, send_alert};
use executor::services::execution_service::{ExecutionMode, ExecutionService};
use executor::services::market_clock::wait_for_market_close;
use market_data::remote::AlpacaClient;
use storage::build_store;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger();

    let env = EnvSource::process();
    let config = match ExecutorConfig::from_env(&env) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };
    let account_id = config.account_id.clone();
    info!("--- Portfolio Manager Started (Account: {}) ---", account_id);

    let identity = ManagedIdentity::from_env(&env)?;
    let store = build_store(&config.store, &identity);

    let client = Arc::new(AlpacaClient::new(
        &config.credentials,
        &config.trading_endpoint,
        &config.data_endpoint,
    )?);
    let mode = match config.trading {
        TradingMode::Live => {
            info!("[{}] Connecting to Alpaca: {}", account_id, config.trading_endpoint);
            ExecutionMode::Live(client.clone())
        }
        TradingMode::Simulated => ExecutionMode::Simulated,
    };
    let service = ExecutionService::new(store.clone(), client, mode, account_id.clone())
        .with_order_notional(config.order_notional);

    service.check_account().await;

    let signals = match store.get_todays_signals().await {
        Ok(signals) => signals,
        Err(e) => {
            error!("[DB-ERROR] Failed to fetch today's signals: {}", e);
            Vec::new()
        }
    };
    if signals.is_empty() {
        info!("No signals found.");
        return Ok(());
    }

    match config.trading {
        TradingMode::Live => wait_for_market_close(&account_id).await,
        TradingMode::Simulated => info!("[{}] SIMULATION: Skipping wait.", account_id),
    }

    let summary = service.run(&signals).await;
    info!("[{}] {}", account_id, summary);

    let notifier = build_notifier(&config.notifier);
    send_alert(notifier.as_ref(), &format!("[{}] {}", account_id, summary)).await;
    Ok(())
}
