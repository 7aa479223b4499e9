use async_trait::async_trait;
use chrono::Utc;
use common::config::DbConfig;
use common::identity::ManagedIdentity;
use common::models::{Account, Signal, SignalInsert, SignalKind, TradeAttempt};
use sqlx::PgPool;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db;
use crate::repositories::{
    AccountsRepository, SignalRow, SignalsRepository, StocksRepository, TransactionsRepository,
};
use crate::store::Store;
use crate::StoreError;

/// Postgres-backed store. The pool is opened on first use, so an
/// unreachable server or a failed token fetch fails that operation only and
/// the next operation tries again.
pub struct SqlStore {
    config: DbConfig,
    identity: ManagedIdentity,
    pool: OnceCell<PgPool>,
}

impl SqlStore {
    pub fn new(config: DbConfig, identity: ManagedIdentity) -> Self {
        Self {
            config,
            identity,
            pool: OnceCell::new(),
        }
    }

    async fn pool(&self) -> Result<&PgPool, StoreError> {
        self.pool
            .get_or_try_init(|| db::connect(&self.config, &self.identity))
            .await
    }
}

fn to_signal(row: SignalRow) -> Result<Signal, StoreError> {
    let (ticker, kind, price, created_at) = row;
    let kind = kind.parse::<SignalKind>().map_err(|e| StoreError::CorruptRow {
        table: "trade_signals",
        detail: format!("{} ({})", e, ticker),
    })?;
    Ok(Signal {
        ticker,
        date: created_at.date_naive(),
        kind,
        reference_price: price,
    })
}

#[async_trait]
impl Store for SqlStore {
    async fn get_active_tickers(&self) -> Result<Vec<String>, StoreError> {
        Ok(StocksRepository::active_tickers(self.pool().await?).await?)
    }

    async fn save_signal(&self, signal: &SignalInsert) -> Result<(), StoreError> {
        SignalsRepository::insert(self.pool().await?, signal).await?;
        debug!("[DB] Saved signal {} -> {}", signal.ticker, signal.kind);
        Ok(())
    }

    async fn prune_signals_older_than(&self, days: u32) -> Result<u64, StoreError> {
        let days = i32::try_from(days).unwrap_or(i32::MAX);
        let removed = SignalsRepository::delete_older_than(self.pool().await?, days).await?;
        info!("[DB] Pruned {} signals older than {} days", removed, days);
        Ok(removed)
    }

    async fn clear_todays_signals(&self) -> Result<u64, StoreError> {
        Ok(SignalsRepository::delete_today(self.pool().await?).await?)
    }

    async fn get_todays_signals(&self) -> Result<Vec<Signal>, StoreError> {
        let rows = SignalsRepository::fetch_today(self.pool().await?).await?;
        let mut signals = Vec::with_capacity(rows.len());
        for row in rows {
            match to_signal(row) {
                Ok(signal) => signals.push(signal),
                Err(e) => warn!("[DB] Ignoring row: {}", e),
            }
        }
        Ok(signals)
    }

    async fn log_transaction(&self, attempt: &TradeAttempt) -> Result<(), StoreError> {
        TransactionsRepository::insert(self.pool().await?, attempt, Uuid::new_v4(), Utc::now()).await?;
        Ok(())
    }

    async fn get_active_accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(AccountsRepository::active(self.pool().await?).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use common::config::{DbAuth, EnvSource};

    #[test]
    fn rows_map_to_signals() {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 21, 5, 0).unwrap();
        let signal = to_signal(("NVDA".into(), "SELL".into(), 901.5, at)).unwrap();
        assert_eq!(signal.kind, SignalKind::Sell);
        assert_eq!(signal.date, at.date_naive());
        assert_eq!(signal.reference_price, 901.5);
    }

    fn unreachable_identity() -> ManagedIdentity {
        ManagedIdentity::from_env(&EnvSource::from_pairs(&[
            ("IDENTITY_ENDPOINT", "http://127.0.0.1:9/token"),
            ("IDENTITY_HEADER", "h"),
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn connection_failure_surfaces_per_operation() {
        let config = DbConfig {
            host: "127.0.0.1".into(),
            port: 9,
            database: "stockdb".into(),
            auth: DbAuth::ManagedIdentity {
                username: "postgres".into(),
                resource: "https://db.example".into(),
            },
            bootstrap_schema: false,
        };
        let store = SqlStore::new(config, unreachable_identity());

        assert!(matches!(store.get_active_tickers().await, Err(StoreError::Token(_))));
        assert!(matches!(store.get_todays_signals().await, Err(StoreError::Token(_))));
        assert!(store.pool.get().is_none());
    }

    #[test]
    fn unknown_kind_is_a_corrupt_row() {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 21, 5, 0).unwrap();
        let err = to_signal(("NVDA".into(), "MAYBE".into(), 1.0, at)).unwrap_err();
        assert!(matches!(err, StoreError::CorruptRow { table: "trade_signals", .. }));
    }
}
