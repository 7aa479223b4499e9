use serde::Deserialize;

use crate::MarketDataError;
use crate::traits::RemoteResponse;

#[derive(Debug, Deserialize)]
pub struct BarsResponse {
    #[serde(default)]
    pub bars: Option<Vec<Bar>>,
    pub symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Bar {
    #[serde(rename(deserialize = "t"))]
    pub timestamp: String,
    #[serde(rename(deserialize = "c"))]
    pub close: f64,
}

impl RemoteResponse<f64> for BarsResponse {
    /// Close of the most recent bar in the window.
    fn to_domain(&self, ticker: &str) -> Result<f64, MarketDataError> {
        self.bars
            .as_deref()
            .and_then(|bars| bars.last())
            .map(|bar| bar.close)
            .filter(|close| close.is_finite())
            .ok_or_else(|| MarketDataError::NoData {
                ticker: ticker.to_string(),
                detail: "no daily bars in window".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_bar_is_yesterday() {
        let raw = r#"{"bars":[{"t":"2026-10-15T04:00:00Z","o":80,"h":81,"l":79,"c":79.5,"v":1000},
            {"t":"2026-10-16T04:00:00Z","o":79,"h":81,"l":78,"c":80.0,"v":1200}],"symbol":"X","next_page_token":null}"#;
        let resp: BarsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.to_domain("X").unwrap(), 80.0);
    }

    #[test]
    fn null_bars_is_no_data() {
        let resp: BarsResponse = serde_json::from_str(r#"{"bars":null,"symbol":"X"}"#).unwrap();
        assert!(resp.to_domain("X").is_err());
    }
}
