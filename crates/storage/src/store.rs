use std::sync::Arc;

use async_trait::async_trait;
use common::config::StoreMode;
use common::identity::ManagedIdentity;
use common::models::{Account, Signal, SignalInsert, TradeAttempt};

use crate::{InMemoryStore, SqlStore, StoreError};

/// Everything the two batch runs need from the relational store.
///
/// Implementations report failures; callers decide whether a failure is a
/// logged no-op (it always is in the batch runs).
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_active_tickers(&self) -> Result<Vec<String>, StoreError>;

    async fn save_signal(&self, signal: &SignalInsert) -> Result<(), StoreError>;

    /// Returns how many rows were removed.
    async fn prune_signals_older_than(&self, days: u32) -> Result<u64, StoreError>;

    async fn clear_todays_signals(&self) -> Result<u64, StoreError>;

    async fn get_todays_signals(&self) -> Result<Vec<Signal>, StoreError>;

    async fn log_transaction(&self, attempt: &TradeAttempt) -> Result<(), StoreError>;

    async fn get_active_accounts(&self) -> Result<Vec<Account>, StoreError>;
}

/// Never fails: the real store connects on first use.
pub fn build_store(mode: &StoreMode, identity: &ManagedIdentity) -> Arc<dyn Store> {
    match mode {
        StoreMode::Mocked => Arc::new(InMemoryStore::canned()),
        StoreMode::Real(config) => Arc::new(SqlStore::new(config.clone(), identity.clone())),
    }
}
