use serde::Deserialize;

use crate::MarketDataError;
use crate::traits::RemoteResponse;

#[derive(Debug, Deserialize)]
pub struct SnapshotResponse {
    #[serde(rename(deserialize = "latestTrade"))]
    pub latest_trade: Option<LatestTrade>,
}

#[derive(Debug, Deserialize)]
pub struct LatestTrade {
    #[serde(rename(deserialize = "p"))]
    pub price: f64,
}

impl RemoteResponse<f64> for SnapshotResponse {
    fn to_domain(&self, ticker: &str) -> Result<f64, MarketDataError> {
        self.latest_trade
            .as_ref()
            .map(|t| t.price)
            .filter(|p| p.is_finite())
            .ok_or_else(|| MarketDataError::NoData {
                ticker: ticker.to_string(),
                detail: "snapshot has no latest trade".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_latest_trade_price() {
        let raw = r#"{"symbol":"X","latestTrade":{"t":"2026-10-19T19:58:59Z","x":"V","p":85.0,"s":100},
            "latestQuote":{"ap":85.1,"bp":84.9}}"#;
        let resp: SnapshotResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.to_domain("X").unwrap(), 85.0);
    }

    #[test]
    fn missing_trade_is_no_data() {
        let resp: SnapshotResponse = serde_json::from_str(r#"{"symbol":"X"}"#).unwrap();
        assert!(resp.to_domain("X").is_err());
    }
}
