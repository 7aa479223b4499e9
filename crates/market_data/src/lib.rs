pub mod error;
pub mod models;
pub mod remote;
pub mod traits;

pub use error::{BrokerError, MarketDataError};
pub use models::{MarketOrder, OrderAck, OrderSide, Quote, TimeInForce};
pub use traits::{Broker, PriceHistory, QuoteSource};
