use async_trait::async_trait;

use crate::{BrokerError, MarketDataError, MarketOrder, OrderAck, Quote};

/// Wire payloads that convert into a domain value.
pub trait RemoteResponse<T> {
    fn to_domain(&self, ticker: &str) -> Result<T, MarketDataError>;
}

/// Recent daily closes, oldest first.
#[async_trait]
pub trait PriceHistory: Send + Sync {
    async fn daily_closes(&self, ticker: &str) -> Result<Vec<f64>, MarketDataError>;
}

#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn quote(&self, ticker: &str) -> Result<Quote, MarketDataError>;
}

#[async_trait]
pub trait Broker: Send + Sync {
    async fn submit_market_order(&self, order: &MarketOrder) -> Result<OrderAck, BrokerError>;

    async fn close_position(&self, ticker: &str) -> Result<OrderAck, BrokerError>;
}
