use std::fmt;
use std::sync::Arc;

use common::config::DEFAULT_ORDER_NOTIONAL;
use common::models::{Signal, SignalKind, TradeAttempt, TradeDecision};
use market_data::{Broker, BrokerError, MarketOrder, OrderAck, OrderSide, Quote, QuoteSource, TimeInForce};
use storage::Store;
use tracing::{error, info, warn};

/// How valid signals are acted on. Resolved once at startup.
pub enum ExecutionMode {
    Live(Arc<dyn Broker>),
    /// Decisions are only logged; nothing reaches the broker or the store.
    Simulated,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Valid { side: OrderSide, reason: String },
    Invalid { reason: String },
}

/// Re-derives the signal's intent from fresh prices. The stored reference
/// price plays no part.
pub fn validate(kind: SignalKind, quote: &Quote) -> Validation {
    let (current, yesterday) = (quote.current_price, quote.yesterday_close);
    match kind {
        SignalKind::Buy if current > yesterday => Validation::Valid {
            side: OrderSide::Buy,
            reason: format!("{} > {}", current, yesterday),
        },
        SignalKind::Buy => Validation::Invalid {
            reason: format!("{} NOT > {}", current, yesterday),
        },
        SignalKind::Sell if current < yesterday => Validation::Valid {
            side: OrderSide::Sell,
            reason: format!("{} < {}", current, yesterday),
        },
        SignalKind::Sell => Validation::Invalid {
            reason: format!("{} NOT < {}", current, yesterday),
        },
        SignalKind::Hold => Validation::Invalid {
            reason: "HOLD is not a tradable signal".to_string(),
        },
    }
}

/// Terminal state of one signal.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalOutcome {
    /// Validated; in simulation the attempt was only printed.
    Decided(TradeAttempt),
    /// Fresh prices unavailable; nothing recorded.
    DataMissing,
    /// Broker call failed; nothing recorded.
    Failed(String),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub simulated: bool,
    pub executed: usize,
    pub skipped: usize,
    pub dropped: usize,
    pub failed: usize,
}

impl ExecutionSummary {
    fn tally(&mut self, outcome: &SignalOutcome) {
        match outcome {
            SignalOutcome::Decided(a) if a.decision == TradeDecision::Executed => self.executed += 1,
            SignalOutcome::Decided(_) => self.skipped += 1,
            SignalOutcome::DataMissing => self.dropped += 1,
            SignalOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn evaluated(&self) -> usize {
        self.executed + self.skipped + self.dropped + self.failed
    }
}

impl fmt::Display for ExecutionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.simulated { "[SIMULATION] " } else { "" };
        write!(
            f,
            "{}Trade run complete: {} signals, {} executed, {} skipped, {} without data, {} failed.",
            prefix,
            self.evaluated(),
            self.executed,
            self.skipped,
            self.dropped,
            self.failed
        )
    }
}

pub struct ExecutionService {
    store: Arc<dyn Store>,
    quotes: Arc<dyn QuoteSource>,
    mode: ExecutionMode,
    account_id: String,
    order_notional: f64,
}

impl ExecutionService {
    pub fn new(
        store: Arc<dyn Store>,
        quotes: Arc<dyn QuoteSource>,
        mode: ExecutionMode,
        account_id: String,
    ) -> Self {
        Self {
            store,
            quotes,
            mode,
            account_id,
            order_notional: DEFAULT_ORDER_NOTIONAL,
        }
    }

    pub fn with_order_notional(mut self, notional: f64) -> Self {
        self.order_notional = notional;
        self
    }

    fn is_simulated(&self) -> bool {
        matches!(self.mode, ExecutionMode::Simulated)
    }

    /// Logs which account this run trades for. Never fatal.
    pub async fn check_account(&self) {
        match self.store.get_active_accounts().await {
            Ok(accounts) => match accounts.iter().find(|a| a.id == self.account_id) {
                Some(account) => info!("[{}] Trading as '{}'", self.account_id, account.name),
                None => warn!(
                    "[{}] Account is not in the active account list ({} active)",
                    self.account_id,
                    accounts.len()
                ),
            },
            Err(e) => error!("[DB-ERROR] Failed to fetch accounts: {}", e),
        }
    }

    /// Processes signals strictly in order. One signal's failure never
    /// affects the next.
    pub async fn run(&self, signals: &[Signal]) -> ExecutionSummary {
        let mut summary = ExecutionSummary {
            simulated: self.is_simulated(),
            ..Default::default()
        };
        for signal in signals {
            let outcome = self.process_signal(signal).await;
            summary.tally(&outcome);
        }
        summary
    }

    pub async fn process_signal(&self, signal: &Signal) -> SignalOutcome {
        let account = &self.account_id;
        let ticker = &signal.ticker;
        info!("[{}] Validating {} for {}...", account, signal.kind, ticker);

        let quote = match self.quotes.quote(ticker).await {
            Ok(quote) => quote,
            Err(e) => {
                warn!("[{}] Data Error for {}: {}", account, ticker, e);
                warn!("[{}] SKIPPING {}: Data missing.", account, ticker);
                return SignalOutcome::DataMissing;
            }
        };

        match (validate(signal.kind, &quote), &self.mode) {
            (Validation::Valid { reason, .. }, ExecutionMode::Simulated) => {
                info!("[{}] [SIMULATION] WOULD {} {} ({})", account, signal.kind, ticker, reason);
                SignalOutcome::Decided(self.attempt(signal, TradeDecision::Executed, &quote, None))
            }
            (Validation::Valid { side, reason }, ExecutionMode::Live(broker)) => {
                info!("[{}] EXECUTING {} {} ({})", account, signal.kind, ticker, reason);
                match self.submit(broker.as_ref(), ticker, side).await {
                    Ok(ack) => {
                        info!("[{}] Order {} for {} is {}", account, ack.order_id, ticker, ack.status);
                        let attempt = self.attempt(signal, TradeDecision::Executed, &quote, None);
                        self.record(&attempt).await;
                        SignalOutcome::Decided(attempt)
                    }
                    Err(e) => {
                        error!("[{}] Error: {} {} failed: {}", account, signal.kind, ticker, e);
                        SignalOutcome::Failed(e.to_string())
                    }
                }
            }
            (Validation::Invalid { reason }, ExecutionMode::Simulated) => {
                info!("[{}] [SIMULATION] SKIP {}: {}", account, ticker, reason);
                SignalOutcome::Decided(self.attempt(signal, TradeDecision::Skipped, &quote, Some(reason)))
            }
            (Validation::Invalid { reason }, ExecutionMode::Live(_)) => {
                info!("[{}] SKIP {}: {}", account, ticker, reason);
                let attempt = self.attempt(signal, TradeDecision::Skipped, &quote, Some(reason));
                self.record(&attempt).await;
                SignalOutcome::Decided(attempt)
            }
        }
    }

    async fn submit(&self, broker: &dyn Broker, ticker: &str, side: OrderSide) -> Result<OrderAck, BrokerError> {
        match side {
            OrderSide::Buy => {
                let order = MarketOrder {
                    ticker: ticker.to_string(),
                    notional: self.order_notional,
                    side,
                    time_in_force: TimeInForce::Day,
                };
                broker.submit_market_order(&order).await
            }
            OrderSide::Sell => broker.close_position(ticker).await,
        }
    }

    fn attempt(
        &self,
        signal: &Signal,
        decision: TradeDecision,
        quote: &Quote,
        reason: Option<String>,
    ) -> TradeAttempt {
        TradeAttempt {
            account_id: self.account_id.clone(),
            ticker: signal.ticker.clone(),
            action: signal.kind,
            decision,
            price: quote.current_price,
            reason,
        }
    }

    async fn record(&self, attempt: &TradeAttempt) {
        if let Err(e) = self.store.log_transaction(attempt).await {
            error!("[DB-ERROR] Failed to log transaction for {}: {}", attempt.ticker, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use common::models::Account;
    use market_data::MarketDataError;
    use mockall::mock;
    use storage::InMemoryStore;

    mock! {
        pub Quotes {}
        #[async_trait]
        impl QuoteSource for Quotes {
            async fn quote(&self, ticker: &str) -> Result<Quote, MarketDataError>;
        }
    }

    mock! {
        pub Brokerage {}
        #[async_trait]
        impl Broker for Brokerage {
            async fn submit_market_order(&self, order: &MarketOrder) -> Result<OrderAck, BrokerError>;
            async fn close_position(&self, ticker: &str) -> Result<OrderAck, BrokerError>;
        }
    }

    fn signal(ticker: &str, kind: SignalKind, reference_price: f64) -> Signal {
        Signal {
            ticker: ticker.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            kind,
            reference_price,
        }
    }

    fn quotes(table: Vec<(&'static str, f64, f64)>) -> MockQuotes {
        let mut quotes = MockQuotes::new();
        quotes.expect_quote().returning(move |ticker| {
            table
                .iter()
                .find(|(t, _, _)| *t == ticker)
                .map(|&(_, yesterday_close, current_price)| {
                    Ok(Quote {
                        yesterday_close,
                        current_price,
                    })
                })
                .unwrap_or_else(|| {
                    Err(MarketDataError::NoData {
                        ticker: ticker.to_string(),
                        detail: "no bars".into(),
                    })
                })
        });
        quotes
    }

    fn idle_broker() -> MockBrokerage {
        let mut broker = MockBrokerage::new();
        broker.expect_submit_market_order().never();
        broker.expect_close_position().never();
        broker
    }

    fn ack() -> OrderAck {
        OrderAck {
            order_id: "ord-1".into(),
            status: "accepted".into(),
        }
    }

    fn service(store: Arc<InMemoryStore>, quotes: MockQuotes, mode: ExecutionMode) -> ExecutionService {
        ExecutionService::new(store, Arc::new(quotes), mode, "acct-1".into())
    }

    #[test]
    fn reasons_spell_out_the_comparison() {
        let q = Quote {
            yesterday_close: 80.0,
            current_price: 85.0,
        };
        assert_eq!(
            validate(SignalKind::Sell, &q),
            Validation::Invalid {
                reason: "85 NOT < 80".into()
            }
        );
        assert_eq!(
            validate(SignalKind::Buy, &q),
            Validation::Valid {
                side: OrderSide::Buy,
                reason: "85 > 80".into()
            }
        );

        let q = Quote {
            yesterday_close: 80.5,
            current_price: 80.25,
        };
        assert_eq!(
            validate(SignalKind::Buy, &q),
            Validation::Invalid {
                reason: "80.25 NOT > 80.5".into()
            }
        );
        assert!(matches!(
            validate(SignalKind::Sell, &q),
            Validation::Valid { side: OrderSide::Sell, .. }
        ));
    }

    #[test]
    fn unchanged_price_is_never_valid() {
        let q = Quote {
            yesterday_close: 10.0,
            current_price: 10.0,
        };
        assert!(matches!(validate(SignalKind::Buy, &q), Validation::Invalid { .. }));
        assert!(matches!(validate(SignalKind::Sell, &q), Validation::Invalid { .. }));
        assert!(matches!(validate(SignalKind::Hold, &q), Validation::Invalid { .. }));
    }

    #[tokio::test]
    async fn contradicted_sell_is_skipped_and_logged() {
        let store = Arc::new(InMemoryStore::new(vec![], vec![]));
        let svc = service(
            store.clone(),
            quotes(vec![("X", 80.0, 85.0)]),
            ExecutionMode::Live(Arc::new(idle_broker())),
        );

        let summary = svc.run(&[signal("X", SignalKind::Sell, 79.0)]).await;

        assert_eq!(summary.skipped, 1);
        assert_eq!(
            store.transactions(),
            vec![TradeAttempt {
                account_id: "acct-1".into(),
                ticker: "X".into(),
                action: SignalKind::Sell,
                decision: TradeDecision::Skipped,
                price: 85.0,
                reason: Some("85 NOT < 80".into()),
            }]
        );
    }

    #[tokio::test]
    async fn stale_buy_is_rechecked_against_fresh_prices() {
        let store = Arc::new(InMemoryStore::new(vec![], vec![]));
        let svc = service(
            store.clone(),
            quotes(vec![("AAPL", 152.0, 149.0)]),
            ExecutionMode::Live(Arc::new(idle_broker())),
        );

        // Persisted as BUY at 150, but the price has since dropped below yesterday's close.
        let outcome = svc.process_signal(&signal("AAPL", SignalKind::Buy, 150.0)).await;

        let SignalOutcome::Decided(attempt) = outcome else {
            panic!("expected a decision");
        };
        assert_eq!(attempt.decision, TradeDecision::Skipped);
        assert_eq!(attempt.reason.as_deref(), Some("149 NOT > 152"));
    }

    #[tokio::test]
    async fn valid_buy_submits_fixed_notional_day_order() {
        let store = Arc::new(InMemoryStore::new(vec![], vec![]));
        let mut broker = MockBrokerage::new();
        broker
            .expect_submit_market_order()
            .withf(|order| {
                order.ticker == "NVDA"
                    && order.notional == 250.0
                    && order.side == OrderSide::Buy
                    && order.time_in_force == TimeInForce::Day
            })
            .times(1)
            .returning(|_| Ok(ack()));
        broker.expect_close_position().never();

        let svc = service(
            store.clone(),
            quotes(vec![("NVDA", 100.0, 101.0)]),
            ExecutionMode::Live(Arc::new(broker)),
        )
        .with_order_notional(250.0);

        let summary = svc.run(&[signal("NVDA", SignalKind::Buy, 100.0)]).await;

        assert_eq!(summary.executed, 1);
        let logged = store.transactions();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].decision, TradeDecision::Executed);
        assert_eq!(logged[0].price, 101.0);
        assert_eq!(logged[0].reason, None);
    }

    #[tokio::test]
    async fn valid_sell_closes_the_position() {
        let store = Arc::new(InMemoryStore::new(vec![], vec![]));
        let mut broker = MockBrokerage::new();
        broker.expect_submit_market_order().never();
        broker
            .expect_close_position()
            .withf(|ticker| ticker == "TSLA")
            .times(1)
            .returning(|_| Ok(ack()));

        let svc = service(
            store.clone(),
            quotes(vec![("TSLA", 200.0, 190.0)]),
            ExecutionMode::Live(Arc::new(broker)),
        );

        let summary = svc.run(&[signal("TSLA", SignalKind::Sell, 200.0)]).await;
        assert_eq!(summary.executed, 1);
        assert_eq!(store.transactions()[0].action, SignalKind::Sell);
    }

    #[tokio::test]
    async fn simulation_never_logs_or_trades() {
        let store = Arc::new(InMemoryStore::new(vec![], vec![]));
        let svc = service(
            store.clone(),
            quotes(vec![("AAPL", 100.0, 110.0), ("TSLA", 200.0, 210.0)]),
            ExecutionMode::Simulated,
        );

        let summary = svc
            .run(&[
                signal("AAPL", SignalKind::Buy, 150.0),
                signal("TSLA", SignalKind::Sell, 200.0),
            ])
            .await;

        assert!(summary.simulated);
        assert_eq!((summary.executed, summary.skipped), (1, 1));
        assert!(store.transactions().is_empty());
    }

    #[tokio::test]
    async fn missing_data_drops_signal_and_continues() {
        let store = Arc::new(InMemoryStore::new(vec![], vec![]));
        let svc = service(
            store.clone(),
            quotes(vec![("JPM", 190.0, 185.0)]),
            ExecutionMode::Live(Arc::new(idle_broker())),
        );

        let summary = svc
            .run(&[
                signal("GONE", SignalKind::Buy, 1.0),
                signal("JPM", SignalKind::Buy, 190.0),
            ])
            .await;

        assert_eq!(summary.dropped, 1);
        assert_eq!(summary.skipped, 1);
        let logged: Vec<_> = store.transactions().into_iter().map(|t| t.ticker).collect();
        assert_eq!(logged, vec!["JPM".to_string()]);
    }

    #[tokio::test]
    async fn broker_failure_is_isolated() {
        let store = Arc::new(InMemoryStore::new(vec![], vec![]));
        let mut broker = MockBrokerage::new();
        broker
            .expect_submit_market_order()
            .withf(|order| order.ticker == "V")
            .times(1)
            .returning(|_| {
                Err(BrokerError::Rejected {
                    status: 403,
                    body: "insufficient buying power".into(),
                })
            });
        broker
            .expect_submit_market_order()
            .withf(|order| order.ticker == "PG")
            .times(1)
            .returning(|_| Ok(ack()));

        let svc = service(
            store.clone(),
            quotes(vec![("V", 270.0, 275.0), ("PG", 160.0, 161.0)]),
            ExecutionMode::Live(Arc::new(broker)),
        );

        let summary = svc
            .run(&[signal("V", SignalKind::Buy, 270.0), signal("PG", SignalKind::Buy, 160.0)])
            .await;

        assert_eq!((summary.failed, summary.executed), (1, 1));
        let logged: Vec<_> = store.transactions().into_iter().map(|t| t.ticker).collect();
        assert_eq!(logged, vec!["PG".to_string()]);
    }

    #[tokio::test]
    async fn hold_reaching_executor_is_skipped() {
        let store = Arc::new(InMemoryStore::new(vec![], vec![]));
        let svc = service(
            store.clone(),
            quotes(vec![("JNJ", 150.0, 151.0)]),
            ExecutionMode::Live(Arc::new(idle_broker())),
        );

        svc.run(&[signal("JNJ", SignalKind::Hold, 150.0)]).await;

        let logged = store.transactions();
        assert_eq!(logged[0].decision, TradeDecision::Skipped);
        assert_eq!(logged[0].reason.as_deref(), Some("HOLD is not a tradable signal"));
    }

    #[tokio::test]
    async fn account_check_tolerates_unknown_account() {
        let store = Arc::new(InMemoryStore::new(
            vec![],
            vec![Account {
                id: "other".into(),
                name: "Other".into(),
            }],
        ));
        let svc = service(store, quotes(vec![]), ExecutionMode::Simulated);
        svc.check_account().await;
    }

    #[test]
    fn summary_message_counts_everything() {
        let summary = ExecutionSummary {
            simulated: true,
            executed: 2,
            skipped: 1,
            dropped: 1,
            failed: 0,
        };
        assert_eq!(
            summary.to_string(),
            "[SIMULATION] Trade run complete: 4 signals, 2 executed, 1 skipped, 1 without data, 0 failed."
        );
    }
}
