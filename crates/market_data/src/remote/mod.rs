pub mod alpaca_client;
pub mod bars_response;
pub mod chart_response;
pub mod order_response;
pub mod snapshot_response;
pub mod yahoo_client;

pub use alpaca_client::AlpacaClient;
pub use yahoo_client::YahooChartClient;
