use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, SecondsFormat, Utc};
use common::config::BrokerCredentials;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{error, info};

use crate::remote::bars_response::BarsResponse;
use crate::remote::order_response::{OrderRequest, OrderResponse};
use crate::remote::snapshot_response::SnapshotResponse;
use crate::traits::{Broker, QuoteSource, RemoteResponse};
use crate::{BrokerError, MarketDataError, MarketOrder, OrderAck, Quote};

/// Trading and market-data API client. Both halves share one key pair.
#[derive(Clone)]
pub struct AlpacaClient {
    client: Client,
    trading_url: String,
    data_url: String,
    api_key: String,
    secret_key: String,
}

impl AlpacaClient {
    pub fn new(
        credentials: &BrokerCredentials,
        trading_url: &str,
        data_url: &str,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent("stock-signals/0.1.0")
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            trading_url: trading_url.trim_end_matches('/').to_string(),
            data_url: data_url.trim_end_matches('/').to_string(),
            api_key: credentials.api_key.clone(),
            secret_key: credentials.secret_key.clone(),
        })
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("APCA-API-KEY-ID", &self.api_key)
            .header("APCA-API-SECRET-KEY", &self.secret_key)
    }

    async fn fetch_data<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, MarketDataError> {
        let resp = self.authed(builder).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MarketDataError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn yesterday_close(&self, ticker: &str) -> Result<f64, MarketDataError> {
        let now = Utc::now();
        let start = (now - ChronoDuration::days(5)).to_rfc3339_opts(SecondsFormat::Secs, true);
        let end = (now - ChronoDuration::days(1)).to_rfc3339_opts(SecondsFormat::Secs, true);
        let url = format!("{}/stocks/{}/bars", self.data_url, ticker);

        let bars: BarsResponse = self
            .fetch_data(self.client.get(&url).query(&[
                ("timeframe", "1Day"),
                ("start", start.as_str()),
                ("end", end.as_str()),
            ]))
            .await?;
        bars.to_domain(ticker)
    }

    async fn current_price(&self, ticker: &str) -> Result<f64, MarketDataError> {
        let url = format!("{}/stocks/{}/snapshot", self.data_url, ticker);
        let snapshot: SnapshotResponse = self.fetch_data(self.client.get(&url)).await?;
        snapshot.to_domain(ticker)
    }

    async fn read_order(resp: Response, what: &str) -> Result<OrderAck, BrokerError> {
        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            error!("Alpaca {} failed: {}", what, error_text);
            return Err(BrokerError::Rejected {
                status: status.as_u16(),
                body: error_text,
            });
        }
        let order = resp.json::<OrderResponse>().await?;
        info!("Alpaca {} accepted: {} {} ({})", what, order.symbol, order.id, order.status);
        Ok(order.into())
    }
}

#[async_trait]
impl QuoteSource for AlpacaClient {
    async fn quote(&self, ticker: &str) -> Result<Quote, MarketDataError> {
        let yesterday_close = self.yesterday_close(ticker).await?;
        let current_price = self.current_price(ticker).await?;
        Ok(Quote {
            yesterday_close,
            current_price,
        })
    }
}

#[async_trait]
impl Broker for AlpacaClient {
    async fn submit_market_order(&self, order: &MarketOrder) -> Result<OrderAck, BrokerError> {
        let url = format!("{}/orders", self.trading_url);
        let body = OrderRequest::from(order);
        info!(
            "Placing Order: {:?} ${} {}",
            order.side, body.notional, body.symbol
        );

        let resp = self
            .authed(self.client.post(&url))
            .json(&body)
            .send()
            .await?;
        Self::read_order(resp, "order").await
    }

    async fn close_position(&self, ticker: &str) -> Result<OrderAck, BrokerError> {
        let url = format!("{}/positions/{}", self.trading_url, ticker.to_uppercase());
        info!("Closing position: {}", ticker);

        let resp = self.authed(self.client.delete(&url)).send().await?;
        Self::read_order(resp, "close position").await
    }
}
