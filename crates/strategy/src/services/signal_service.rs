use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use common::config::DEFAULT_RETENTION_DAYS;
use common::models::{AnalysisRow, SignalInsert, SignalKind};
use common::notifier::{Notifier, send_alert};
use market_data::{MarketDataError, PriceHistory};
use storage::Store;
use tracing::{error, info, warn};

use crate::report::ReportSink;

/// Result of analyzing one ticker that had enough history.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerAnalysis {
    pub row: AnalysisRow,
    pub persisted: bool,
}

#[derive(Debug, Default)]
pub struct GeneratorSummary {
    pub tickers: usize,
    pub rows: Vec<AnalysisRow>,
    pub persisted: usize,
    pub report_location: Option<String>,
    pub pruned: Option<u64>,
}

/// Nightly signal generation over the active ticker list.
pub struct SignalService {
    store: Arc<dyn Store>,
    prices: Arc<dyn PriceHistory>,
    reports: Arc<dyn ReportSink>,
    notifier: Arc<dyn Notifier>,
    retention_days: u32,
    replace_todays_signals: bool,
}

impl SignalService {
    pub fn new(
        store: Arc<dyn Store>,
        prices: Arc<dyn PriceHistory>,
        reports: Arc<dyn ReportSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            prices,
            reports,
            notifier,
            retention_days: DEFAULT_RETENTION_DAYS,
            replace_todays_signals: false,
        }
    }

    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    pub fn with_replace_todays_signals(mut self, replace: bool) -> Self {
        self.replace_todays_signals = replace;
        self
    }

    pub async fn run(&self) -> GeneratorSummary {
        self.run_for(Local::now().date_naive()).await
    }

    pub async fn run_for(&self, today: NaiveDate) -> GeneratorSummary {
        let mut summary = GeneratorSummary::default();

        if let Err(e) = self.reports.prepare().await {
            error!("Report preparation failed: {}", e);
        }

        let tickers = match self.store.get_active_tickers().await {
            Ok(tickers) => tickers,
            Err(e) => {
                error!("[DB-ERROR] Failed to fetch stock list: {}", e);
                Vec::new()
            }
        };
        if tickers.is_empty() {
            info!("No stocks found in database to analyze.");
            return summary;
        }
        summary.tickers = tickers.len();

        if self.replace_todays_signals {
            match self.store.clear_todays_signals().await {
                Ok(n) => info!("Cleared {} signals already stored for today", n),
                Err(e) => error!("[DB-ERROR] Failed to clear signals: {}", e),
            }
        }

        info!("Analyzing {} stocks...", tickers.len());
        for ticker in &tickers {
            match self.analyze_ticker(ticker, today).await {
                Ok(Some(analysis)) => {
                    if analysis.persisted {
                        summary.persisted += 1;
                    }
                    summary.rows.push(analysis.row);
                }
                Ok(None) => {}
                Err(e) => error!("Error analyzing {}: {}", ticker, e),
            }
        }

        if summary.rows.is_empty() {
            info!("No analysis data generated.");
            return summary;
        }

        let file_name = self.reports.file_name(today);
        match self.reports.publish(&file_name, &summary.rows).await {
            Ok(location) => summary.report_location = Some(location),
            Err(e) => error!("Failed to publish report {}: {}", file_name, e),
        }

        info!("Pruning old database records...");
        match self.store.prune_signals_older_than(self.retention_days).await {
            Ok(n) => summary.pruned = Some(n),
            Err(e) => error!("[DB-ERROR] Failed to prune signals: {}", e),
        }

        let message = format!("Nightly Analysis Complete. Processed {} stocks.", summary.tickers);
        send_alert(self.notifier.as_ref(), &message).await;

        summary
    }

    /// `Ok(None)` means too little history; that is a skip, not a failure.
    /// A store failure is logged and leaves the row in the report.
    pub async fn analyze_ticker(
        &self,
        ticker: &str,
        today: NaiveDate,
    ) -> Result<Option<TickerAnalysis>, MarketDataError> {
        let closes = self.prices.daily_closes(ticker).await?;
        let [.., yesterday, latest] = closes.as_slice() else {
            warn!("Skipping {}: Insufficient data.", ticker);
            return Ok(None);
        };
        let (yesterday, latest) = (*yesterday, *latest);

        let signal = SignalKind::classify(yesterday, latest);
        let mut persisted = false;

        if signal.is_actionable() {
            let insert = SignalInsert {
                ticker: ticker.to_string(),
                kind: signal,
                price: latest,
                created_at: Utc::now(),
            };
            match self.store.save_signal(&insert).await {
                Ok(()) => {
                    persisted = true;
                    info!(
                        "{}: {} (Today: {:.2} vs Yest: {:.2})",
                        ticker, signal, latest, yesterday
                    );
                }
                Err(e) => error!("[DB-ERROR] Failed to save signal for {}: {}", ticker, e),
            }
        }

        Ok(Some(TickerAnalysis {
            row: AnalysisRow {
                ticker: ticker.to_string(),
                date: today,
                signal,
                price: latest,
                previous_price: yesterday,
            },
            persisted,
        }))
    }
}
