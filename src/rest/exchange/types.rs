//! Types for exchange (account and order) endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use time::OffsetDateTime;

use crate::error::UpbitError;
use crate::types::serde_helpers::rfc3339;
use crate::types::{OrderSide, OrderState, OrderType};

/// Balance of one currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Currency code (e.g. `KRW`, `BTC`)
    pub currency: String,
    /// Available balance
    pub balance: Decimal,
    /// Balance locked in open orders or withdrawals
    pub locked: Decimal,
    pub avg_buy_price: Decimal,
    pub avg_buy_price_modified: bool,
    /// Currency the average price is quoted in
    pub unit_currency: String,
}

impl Account {
    /// Available plus locked balance.
    pub fn total(&self) -> Decimal {
        self.balance + self.locked
    }
}

/// An API key and its permissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub access_key: String,
    #[serde(with = "rfc3339")]
    pub expire_at: OffsetDateTime,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// An order as reported by the exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub uuid: String,
    pub side: OrderSide,
    pub ord_type: OrderType,
    /// Limit price, or total spend for market buys
    #[serde(default)]
    pub price: Option<Decimal>,
    pub state: OrderState,
    pub market: String,
    #[serde(with = "rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub volume: Option<Decimal>,
    #[serde(default)]
    pub remaining_volume: Option<Decimal>,
    pub reserved_fee: Decimal,
    pub remaining_fee: Decimal,
    pub paid_fee: Decimal,
    pub locked: Decimal,
    pub executed_volume: Decimal,
    pub trades_count: u32,
    /// Client-assigned identifier, if one was given
    #[serde(default)]
    pub identifier: Option<String>,
}

impl Order {
    /// Whether the order can still be filled.
    pub fn is_open(&self) -> bool {
        matches!(self.state, OrderState::Wait | OrderState::Watch)
    }
}

/// Request body for placing an order.
///
/// # Example
///
/// ```rust
/// use rust_decimal::Decimal;
/// use upbit_api_client::rest::exchange::OrderRequest;
///
/// let order = OrderRequest::limit_buy("KRW-BTC", Decimal::from(50_000_000), Decimal::new(1, 2));
/// assert!(order.validate().is_ok());
/// ```
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub market: String,
    pub side: OrderSide,
    pub ord_type: OrderType,
    pub price: Option<Decimal>,
    pub volume: Option<Decimal>,
    /// Client-assigned unique identifier
    pub identifier: Option<String>,
}

impl OrderRequest {
    /// Limit order with both price and volume.
    pub fn limit(market: impl Into<String>, side: OrderSide, price: Decimal, volume: Decimal) -> Self {
        Self {
            market: market.into(),
            side,
            ord_type: OrderType::Limit,
            price: Some(price),
            volume: Some(volume),
            identifier: None,
        }
    }

    /// Limit buy.
    pub fn limit_buy(market: impl Into<String>, price: Decimal, volume: Decimal) -> Self {
        Self::limit(market, OrderSide::Bid, price, volume)
    }

    /// Limit sell.
    pub fn limit_sell(market: impl Into<String>, price: Decimal, volume: Decimal) -> Self {
        Self::limit(market, OrderSide::Ask, price, volume)
    }

    /// Market buy spending `total` of the quote currency.
    pub fn market_buy(market: impl Into<String>, total: Decimal) -> Self {
        Self {
            market: market.into(),
            side: OrderSide::Bid,
            ord_type: OrderType::Price,
            price: Some(total),
            volume: None,
            identifier: None,
        }
    }

    /// Market sell of `volume` of the base currency.
    pub fn market_sell(market: impl Into<String>, volume: Decimal) -> Self {
        Self {
            market: market.into(),
            side: OrderSide::Ask,
            ord_type: OrderType::Market,
            price: None,
            volume: Some(volume),
            identifier: None,
        }
    }

    /// Attach a client identifier.
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Check that price and volume match the order type.
    pub fn validate(&self) -> Result<(), UpbitError> {
        let positive = |v: Option<Decimal>| v.is_some_and(|v| v > Decimal::ZERO);
        let ok = match (self.side, self.ord_type) {
            (_, OrderType::Limit) => positive(self.price) && positive(self.volume),
            (OrderSide::Bid, OrderType::Price) => positive(self.price) && self.volume.is_none(),
            (OrderSide::Ask, OrderType::Market) => positive(self.volume) && self.price.is_none(),
            _ => {
                return Err(UpbitError::Validation(format!(
                    "Order type {} cannot be used for side {}",
                    self.ord_type, self.side
                )));
            }
        };
        if ok {
            Ok(())
        } else {
            Err(UpbitError::Validation(format!(
                "Invalid price/volume combination for {} order",
                self.ord_type
            )))
        }
    }
}

/// Filters for listing orders.
#[derive(Debug, Clone, Default)]
pub struct OrdersQuery {
    pub market: Option<String>,
    pub state: Option<OrderState>,
    pub states: Vec<OrderState>,
    pub uuids: Vec<String>,
    pub identifiers: Vec<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// `asc` or `desc`
    pub order_by: Option<String>,
}

impl OrdersQuery {
    /// Orders in the given market.
    pub fn market(market: impl Into<String>) -> Self {
        Self {
            market: Some(market.into()),
            ..Default::default()
        }
    }

    /// Restrict to a single state.
    pub fn state(mut self, state: OrderState) -> Self {
        self.state = Some(state);
        self
    }

    /// Restrict to several states.
    pub fn states(mut self, states: impl IntoIterator<Item = OrderState>) -> Self {
        self.states = states.into_iter().collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_request_skips_unset_fields() {
        let body = serde_json::to_value(OrderRequest::market_buy("KRW-BTC", Decimal::from(10_000)))
            .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "market": "KRW-BTC",
                "side": "bid",
                "ord_type": "price",
                "price": "10000"
            })
        );
    }

    #[test]
    fn test_order_request_validation() {
        assert!(OrderRequest::market_sell("KRW-BTC", Decimal::new(5, 1)).validate().is_ok());

        let mut bad = OrderRequest::limit_buy("KRW-BTC", Decimal::from(100), Decimal::ZERO);
        assert!(bad.validate().is_err());

        bad = OrderRequest::market_buy("KRW-BTC", Decimal::from(100));
        bad.side = OrderSide::Ask;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_order_parses() {
        let json = r#"{
            "uuid": "9ca023a5-851b-4fec-9f0a-48cd83c2eaae",
            "side": "ask",
            "ord_type": "limit",
            "price": "4280000.0",
            "state": "done",
            "market": "KRW-BTC",
            "created_at": "2019-01-04T13:48:09+09:00",
            "volume": "1.0",
            "remaining_volume": "0.0",
            "reserved_fee": "0.0",
            "remaining_fee": "0.0",
            "paid_fee": "2140.0",
            "locked": "0.0",
            "executed_volume": "1.0",
            "trades_count": 1
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.state, OrderState::Done);
        assert!(!order.is_open());
        assert_eq!(order.paid_fee, Decimal::from(2140));
    }
}
