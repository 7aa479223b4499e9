use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalKind {
    Buy,
    Sell,
    Hold,
}

impl SignalKind {
    /// Day-over-day close comparison. Callers are expected to discard
    /// non-finite prices before classifying.
    pub fn classify(yesterday: f64, today: f64) -> Self {
        if today > yesterday {
            Self::Buy
        } else if today < yesterday {
            Self::Sell
        } else {
            Self::Hold
        }
    }

    pub fn is_actionable(self) -> bool {
        !matches!(self, Self::Hold)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown signal kind: {0}")]
pub struct UnknownSignalKind(pub String);

impl FromStr for SignalKind {
    type Err = UnknownSignalKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            "HOLD" => Ok(Self::Hold),
            _ => Err(UnknownSignalKind(s.to_string())),
        }
    }
}

/// A persisted recommendation, as read back by the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub ticker: String,
    pub date: NaiveDate,
    pub kind: SignalKind,
    pub reference_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalInsert {
    pub ticker: String,
    pub kind: SignalKind,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}
