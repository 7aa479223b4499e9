use serde::{Deserialize, Serialize};

use crate::{MarketOrder, OrderAck, OrderSide, TimeInForce};

#[derive(Debug, Serialize)]
pub struct OrderRequest {
    pub symbol: String,
    /// Alpaca expects the dollar amount as a decimal string.
    pub notional: String,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: &'static str,
    pub time_in_force: TimeInForce,
}

impl From<&MarketOrder> for OrderRequest {
    fn from(order: &MarketOrder) -> Self {
        Self {
            symbol: order.ticker.to_uppercase(),
            notional: format!("{:.2}", order.notional),
            side: order.side,
            order_type: "market",
            time_in_force: order.time_in_force,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OrderResponse {
    pub id: String,
    pub symbol: String,
    pub status: String,
}

impl From<OrderResponse> for OrderAck {
    fn from(resp: OrderResponse) -> Self {
        OrderAck {
            order_id: resp.id,
            status: resp.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_body_uses_alpaca_field_names() {
        let order = MarketOrder {
            ticker: "aapl".into(),
            notional: 100.0,
            side: OrderSide::Buy,
            time_in_force: TimeInForce::Day,
        };
        let body = serde_json::to_value(OrderRequest::from(&order)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "symbol": "AAPL",
                "notional": "100.00",
                "side": "buy",
                "type": "market",
                "time_in_force": "day"
            })
        );
    }
}
