use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::MarketDataError;
use crate::remote::chart_response::ChartEnvelope;
use crate::traits::{PriceHistory, RemoteResponse};

/// Daily closing prices from the public chart endpoint.
pub struct YahooChartClient {
    client: Client,
    base_url: String,
}

impl YahooChartClient {
    pub fn new(base_url: String) -> Result<Self, MarketDataError> {
        let client = Client::builder()
            .user_agent("stock-signals/0.1.0")
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl PriceHistory for YahooChartClient {
    async fn daily_closes(&self, ticker: &str) -> Result<Vec<f64>, MarketDataError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), ticker);

        let resp = self
            .client
            .get(&url)
            .query(&[("range", "5d"), ("interval", "1d")])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        // 404 still carries a chart error payload
        if !status.is_success() && status.as_u16() != 404 {
            return Err(MarketDataError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: ChartEnvelope = serde_json::from_str(&body)?;
        let closes = envelope.to_domain(ticker)?;
        debug!("{}: {} daily closes", ticker, closes.len());
        Ok(closes)
    }
}
