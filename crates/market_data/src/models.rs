use serde::Serialize;

/// Fresh prices used to re-validate a stored signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub yesterday_close: f64,
    pub current_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    Day,
}

/// Dollar-amount market order.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketOrder {
    pub ticker: String,
    pub notional: f64,
    pub side: OrderSide,
    pub time_in_force: TimeInForce,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAck {
    pub order_id: String,
    pub status: String,
}
