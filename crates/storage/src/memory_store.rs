use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use common::models::{Account, Signal, SignalInsert, SignalKind, TradeAttempt};
use tracing::info;

use crate::store::Store;
use crate::StoreError;

const CANNED_TICKERS: [&str; 10] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "TSLA", "JPM", "V", "JNJ", "PG",
];

/// Store used in mock mode. Nothing leaves the process.
pub struct InMemoryStore {
    tickers: Vec<String>,
    accounts: Vec<Account>,
    signals: Mutex<Vec<(DateTime<Utc>, Signal)>>,
    transactions: Mutex<Vec<TradeAttempt>>,
}

impl InMemoryStore {
    pub fn new(tickers: Vec<String>, accounts: Vec<Account>) -> Self {
        Self {
            tickers,
            accounts,
            signals: Mutex::new(Vec::new()),
            transactions: Mutex::new(Vec::new()),
        }
    }

    /// Fixed tickers, two accounts and two of today's signals.
    pub fn canned() -> Self {
        let store = Self::new(
            CANNED_TICKERS.iter().map(|t| t.to_string()).collect(),
            vec![
                Account {
                    id: "test-acct-1".into(),
                    name: "Mock Growth".into(),
                },
                Account {
                    id: "test-acct-2".into(),
                    name: "Mock Safe".into(),
                },
            ],
        );
        store.insert_at(Utc::now(), "AAPL", SignalKind::Buy, 150.0);
        store.insert_at(Utc::now(), "TSLA", SignalKind::Sell, 200.0);
        store
    }

    pub fn insert_at(&self, at: DateTime<Utc>, ticker: &str, kind: SignalKind, price: f64) {
        let signal = Signal {
            ticker: ticker.to_string(),
            date: at.date_naive(),
            kind,
            reference_price: price,
        };
        self.lock_signals().push((at, signal));
    }

    pub fn signals(&self) -> Vec<Signal> {
        self.lock_signals().iter().map(|(_, s)| s.clone()).collect()
    }

    pub fn transactions(&self) -> Vec<TradeAttempt> {
        self.transactions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn lock_signals(&self) -> std::sync::MutexGuard<'_, Vec<(DateTime<Utc>, Signal)>> {
        self.signals
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get_active_tickers(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.tickers.clone())
    }

    async fn save_signal(&self, signal: &SignalInsert) -> Result<(), StoreError> {
        info!(
            "[DB-MOCK] Saved Signal: {} -> {} @ ${:.2}",
            signal.ticker, signal.kind, signal.price
        );
        self.insert_at(signal.created_at, &signal.ticker, signal.kind, signal.price);
        Ok(())
    }

    async fn prune_signals_older_than(&self, days: u32) -> Result<u64, StoreError> {
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        let mut signals = self.lock_signals();
        let before = signals.len();
        signals.retain(|(at, _)| *at >= cutoff);
        let removed = (before - signals.len()) as u64;
        info!("[DB-MOCK] Pruned {} signals older than {} days.", removed, days);
        Ok(removed)
    }

    async fn clear_todays_signals(&self) -> Result<u64, StoreError> {
        let today = Utc::now().date_naive();
        let mut signals = self.lock_signals();
        let before = signals.len();
        signals.retain(|(_, s)| s.date != today);
        info!("[DB-MOCK] Cleared today's signals.");
        Ok((before - signals.len()) as u64)
    }

    async fn get_todays_signals(&self) -> Result<Vec<Signal>, StoreError> {
        let today = Utc::now().date_naive();
        Ok(self
            .lock_signals()
            .iter()
            .filter(|(_, s)| s.date == today)
            .map(|(_, s)| s.clone())
            .collect())
    }

    async fn log_transaction(&self, attempt: &TradeAttempt) -> Result<(), StoreError> {
        info!(
            "[DB-MOCK] Logged Transaction: {} | {} {} | {} | Err: {:?}",
            attempt.account_id,
            attempt.action,
            attempt.ticker,
            attempt.decision.status(),
            attempt.reason
        );
        self.transactions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(attempt.clone());
        Ok(())
    }

    async fn get_active_accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.accounts.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::TradeDecision;

    #[tokio::test]
    async fn canned_data_matches_mock_mode() {
        let store = InMemoryStore::canned();
        assert_eq!(store.get_active_tickers().await.unwrap().len(), 10);
        assert_eq!(store.get_active_accounts().await.unwrap()[0].id, "test-acct-1");

        let today = store.get_todays_signals().await.unwrap();
        let kinds: Vec<_> = today.iter().map(|s| (s.ticker.as_str(), s.kind)).collect();
        assert_eq!(kinds, vec![("AAPL", SignalKind::Buy), ("TSLA", SignalKind::Sell)]);
    }

    #[tokio::test]
    async fn prune_drops_only_expired_rows() {
        let store = InMemoryStore::new(vec![], vec![]);
        store.insert_at(Utc::now() - Duration::days(10), "OLD", SignalKind::Buy, 1.0);
        store.insert_at(Utc::now() - Duration::days(2), "RECENT", SignalKind::Sell, 2.0);

        assert_eq!(store.prune_signals_older_than(7).await.unwrap(), 1);
        let left: Vec<_> = store.signals().into_iter().map(|s| s.ticker).collect();
        assert_eq!(left, vec!["RECENT".to_string()]);
    }

    #[tokio::test]
    async fn yesterdays_rows_are_not_today() {
        let store = InMemoryStore::new(vec![], vec![]);
        store.insert_at(Utc::now() - Duration::days(1), "MSFT", SignalKind::Buy, 1.0);
        assert!(store.get_todays_signals().await.unwrap().is_empty());

        store
            .save_signal(&SignalInsert {
                ticker: "V".into(),
                kind: SignalKind::Sell,
                price: 270.0,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        assert_eq!(store.clear_todays_signals().await.unwrap(), 1);
        assert_eq!(store.signals().len(), 1);
    }

    #[tokio::test]
    async fn transactions_are_recorded() {
        let store = InMemoryStore::new(vec![], vec![]);
        let attempt = TradeAttempt {
            account_id: "acct".into(),
            ticker: "JPM".into(),
            action: SignalKind::Buy,
            decision: TradeDecision::Skipped,
            price: 190.0,
            reason: Some("190 NOT > 191".into()),
        };
        store.log_transaction(&attempt).await.unwrap();
        assert_eq!(store.transactions(), vec![attempt]);
    }
}
