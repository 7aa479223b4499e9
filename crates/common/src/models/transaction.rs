use serde::{Deserialize, Serialize};
use std::fmt;

use super::SignalKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDecision {
    Executed,
    Skipped,
}

impl TradeDecision {
    /// Value written to the transaction log `status` column.
    pub fn status(self) -> &'static str {
        match self {
            Self::Executed => "SUCCESS",
            Self::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for TradeDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Executed => f.write_str("EXECUTED"),
            Self::Skipped => f.write_str("SKIPPED"),
        }
    }
}

/// The executor's verdict on one signal, as written to the transaction log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeAttempt {
    pub account_id: String,
    pub ticker: String,
    pub action: SignalKind,
    pub decision: TradeDecision,
    pub price: f64,
    pub reason: Option<String>,
}
