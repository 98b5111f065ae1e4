//! Private stream messages: own orders and balances.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::serde_helpers::timestamp_ms;
use crate::types::{AskBid, StreamType};

/// Order lifecycle update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMyOrder {
    pub code: String,
    pub uuid: String,
    pub ask_bid: AskBid,
    /// `limit`, `price`, `market` or `best`
    pub order_type: String,
    /// `wait`, `watch`, `trade`, `done` or `cancel`
    pub state: String,
    #[serde(default)]
    pub trade_uuid: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub avg_price: Option<Decimal>,
    #[serde(default)]
    pub volume: Option<Decimal>,
    #[serde(default)]
    pub remaining_volume: Option<Decimal>,
    #[serde(default)]
    pub executed_volume: Option<Decimal>,
    #[serde(default)]
    pub trades_count: Option<u32>,
    #[serde(default)]
    pub reserved_fee: Option<Decimal>,
    #[serde(default)]
    pub remaining_fee: Option<Decimal>,
    #[serde(default)]
    pub paid_fee: Option<Decimal>,
    #[serde(default)]
    pub locked: Option<Decimal>,
    #[serde(default)]
    pub executed_funds: Option<Decimal>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(with = "timestamp_ms")]
    pub order_timestamp: OffsetDateTime,
    #[serde(with = "timestamp_ms")]
    pub timestamp: OffsetDateTime,
    pub stream_type: StreamType,
}

/// Balance of one currency inside a [`WsMyAsset`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsAssetBalance {
    pub currency: String,
    pub balance: Decimal,
    pub locked: Decimal,
}

/// Balance change notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMyAsset {
    pub asset_uuid: String,
    pub assets: Vec<WsAssetBalance>,
    #[serde(with = "timestamp_ms")]
    pub asset_timestamp: OffsetDateTime,
    #[serde(with = "timestamp_ms")]
    pub timestamp: OffsetDateTime,
    pub stream_type: StreamType,
}
