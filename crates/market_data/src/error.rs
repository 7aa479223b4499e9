use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Provider answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed provider payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("No data for {ticker}: {detail}")]
    NoData { ticker: String, detail: String },
}

#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("Broker request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Broker rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },
}
