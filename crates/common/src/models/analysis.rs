use chrono::NaiveDate;
use serde::Serialize;

use super::SignalKind;

/// One line of the nightly report. HOLD rows are included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRow {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Signal")]
    pub signal: SignalKind,
    #[serde(rename = "Price", serialize_with = "round_cents")]
    pub price: f64,
    #[serde(rename = "Yesterday_Price", serialize_with = "round_cents")]
    pub previous_price: f64,
}

/// Column headers in report order.
pub const REPORT_COLUMNS: [&str; 5] = ["Ticker", "Date", "Signal", "Price", "Yesterday_Price"];

pub fn cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round_cents<S: serde::Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(cents(*value))
}
