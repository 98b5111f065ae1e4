//! Market data stream messages.
//!
//! Stream payloads name the market `code` instead of `market` and carry a
//! `stream_type` telling snapshots from live updates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::serde_helpers::timestamp_ms;
use crate::types::{AskBid, ChangeDirection, MarketState, MarketWarning, StreamType};

/// Ticker update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsTicker {
    /// Market code (e.g. `KRW-BTC`)
    pub code: String,
    pub opening_price: Decimal,
    pub high_price: Decimal,
    pub low_price: Decimal,
    pub trade_price: Decimal,
    pub prev_closing_price: Decimal,
    pub change: ChangeDirection,
    pub change_price: Decimal,
    pub signed_change_price: Decimal,
    pub change_rate: Decimal,
    pub signed_change_rate: Decimal,
    /// Side of the most recent trade
    pub ask_bid: AskBid,
    pub trade_volume: Decimal,
    pub acc_trade_volume: Decimal,
    pub acc_trade_volume_24h: Decimal,
    pub acc_trade_price: Decimal,
    pub acc_trade_price_24h: Decimal,
    pub acc_ask_volume: Decimal,
    pub acc_bid_volume: Decimal,
    /// `YYYYMMDD`
    pub trade_date: String,
    /// `HHMMSS`
    pub trade_time: String,
    #[serde(with = "timestamp_ms")]
    pub trade_timestamp: OffsetDateTime,
    pub highest_52_week_price: Decimal,
    pub highest_52_week_date: String,
    pub lowest_52_week_price: Decimal,
    pub lowest_52_week_date: String,
    pub market_state: MarketState,
    pub is_trading_suspended: bool,
    #[serde(default)]
    pub delisting_date: Option<String>,
    #[serde(default)]
    pub market_warning: MarketWarning,
    #[serde(with = "timestamp_ms")]
    pub timestamp: OffsetDateTime,
    pub stream_type: StreamType,
}

/// One price level of a streamed order book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsOrderbookUnit {
    pub ask_price: Decimal,
    pub bid_price: Decimal,
    pub ask_size: Decimal,
    pub bid_size: Decimal,
}

/// Order book update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsOrderbook {
    pub code: String,
    #[serde(with = "timestamp_ms")]
    pub timestamp: OffsetDateTime,
    pub total_ask_size: Decimal,
    pub total_bid_size: Decimal,
    pub orderbook_units: Vec<WsOrderbookUnit>,
    pub stream_type: StreamType,
    /// Price grouping level, 0 when ungrouped
    #[serde(default)]
    pub level: Decimal,
}

impl WsOrderbook {
    /// Best (lowest) ask and best (highest) bid.
    pub fn best(&self) -> Option<(Decimal, Decimal)> {
        self.orderbook_units
            .first()
            .map(|unit| (unit.ask_price, unit.bid_price))
    }
}

/// Trade update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsTrade {
    pub code: String,
    #[serde(with = "timestamp_ms")]
    pub timestamp: OffsetDateTime,
    /// `YYYY-MM-DD`
    pub trade_date: String,
    /// `HH:MM:SS`
    pub trade_time: String,
    #[serde(with = "timestamp_ms")]
    pub trade_timestamp: OffsetDateTime,
    pub trade_price: Decimal,
    pub trade_volume: Decimal,
    pub ask_bid: AskBid,
    pub prev_closing_price: Decimal,
    pub change: ChangeDirection,
    pub change_price: Decimal,
    pub sequential_id: u64,
    #[serde(default)]
    pub best_ask_price: Option<Decimal>,
    #[serde(default)]
    pub best_ask_size: Option<Decimal>,
    #[serde(default)]
    pub best_bid_price: Option<Decimal>,
    #[serde(default)]
    pub best_bid_size: Option<Decimal>,
    pub stream_type: StreamType,
}
