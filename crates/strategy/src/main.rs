use std::sync::Arc;

use chrono::Local;
use dotenvy::dotenv;
use tracing::info;

use common::config::{EnvSource, GeneratorConfig};
use common::identity::ManagedIdentity;
use common::logger;
use common::notifier::build_notifier;
use market_data::remote::YahooChartClient;
use storage::build_store;
use strategy::report::build_report_sink;
use strategy::services::signal_service::SignalService;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger();
    info!("--- Starting Nightly Analysis [{}] ---", Local::now());

    let env = EnvSource::process();
    let config = GeneratorConfig::from_env(&env)?;
    let identity = ManagedIdentity::from_env(&env)?;

    let store = build_store(&config.store, &identity);
    let prices = Arc::new(YahooChartClient::new(config.chart_url.clone())?);
    let reports = build_report_sink(&config.report, identity);
    let notifier = build_notifier(&config.notifier);

    let summary = SignalService::new(store, prices, reports, notifier)
        .with_retention_days(config.retention_days)
        .with_replace_todays_signals(config.replace_todays_signals)
        .run()
        .await;

    info!(
        "--- Analysis Complete: {} tickers, {} rows, {} signals stored ---",
        summary.tickers,
        summary.rows.len(),
        summary.persisted
    );
    Ok(())
}
