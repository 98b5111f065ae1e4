//! Types for quotation (market data) endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::types::serde_helpers::{naive_iso, timestamp_ms};
use crate::types::{AskBid, ChangeDirection, MarketWarning};

/// A tradable market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    /// Market code (e.g. `KRW-BTC`)
    pub market: String,
    /// Korean display name
    pub korean_name: String,
    /// English display name
    pub english_name: String,
    /// Warning flag, only present when requested with details
    #[serde(default)]
    pub market_warning: Option<MarketWarning>,
}

impl Market {
    /// Quote currency of the market (`KRW` for `KRW-BTC`).
    pub fn quote_currency(&self) -> &str {
        self.market.split('-').next().unwrap_or(&self.market)
    }
}

/// Allowed minute candle units.
pub const MINUTE_UNITS: [u32; 8] = [1, 3, 5, 10, 15, 30, 60, 240];

/// Parameters shared by all candle requests.
#[derive(Debug, Clone, Default)]
pub struct CandlesRequest {
    /// Market code
    pub market: String,
    /// Return candles before this time (ISO 8601, exclusive)
    pub to: Option<String>,
    /// Number of candles (max 200)
    pub count: Option<u32>,
}

impl CandlesRequest {
    /// Request the most recent candles for a market.
    pub fn new(market: impl Into<String>) -> Self {
        Self {
            market: market.into(),
            ..Default::default()
        }
    }

    /// Only return candles before `to`.
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Limit the number of candles returned.
    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }
}

/// A minute candle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinuteCandle {
    pub market: String,
    #[serde(with = "naive_iso")]
    pub candle_date_time_utc: PrimitiveDateTime,
    #[serde(with = "naive_iso")]
    pub candle_date_time_kst: PrimitiveDateTime,
    pub opening_price: Decimal,
    pub high_price: Decimal,
    pub low_price: Decimal,
    pub trade_price: Decimal,
    /// Time of the last trade in the candle
    #[serde(with = "timestamp_ms")]
    pub timestamp: OffsetDateTime,
    pub candle_acc_trade_price: Decimal,
    pub candle_acc_trade_volume: Decimal,
    /// Minute unit of the candle
    pub unit: u32,
}

/// A day candle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayCandle {
    pub market: String,
    #[serde(with = "naive_iso")]
    pub candle_date_time_utc: PrimitiveDateTime,
    #[serde(with = "naive_iso")]
    pub candle_date_time_kst: PrimitiveDateTime,
    pub opening_price: Decimal,
    pub high_price: Decimal,
    pub low_price: Decimal,
    pub trade_price: Decimal,
    #[serde(with = "timestamp_ms")]
    pub timestamp: OffsetDateTime,
    pub candle_acc_trade_price: Decimal,
    pub candle_acc_trade_volume: Decimal,
    pub prev_closing_price: Decimal,
    pub change_price: Decimal,
    pub change_rate: Decimal,
    /// Close converted to the requested currency, when one was given
    #[serde(default)]
    pub converted_trade_price: Option<Decimal>,
}

/// A week or month candle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodCandle {
    pub market: String,
    #[serde(with = "naive_iso")]
    pub candle_date_time_utc: PrimitiveDateTime,
    #[serde(with = "naive_iso")]
    pub candle_date_time_kst: PrimitiveDateTime,
    pub opening_price: Decimal,
    pub high_price: Decimal,
    pub low_price: Decimal,
    pub trade_price: Decimal,
    #[serde(with = "timestamp_ms")]
    pub timestamp: OffsetDateTime,
    pub candle_acc_trade_price: Decimal,
    pub candle_acc_trade_volume: Decimal,
    /// First day of the period (`YYYY-MM-DD`)
    pub first_day_of_period: String,
}

/// Ticker snapshot for a market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticker {
    pub market: String,
    /// Last trade date UTC (`YYYYMMDD`)
    pub trade_date: String,
    /// Last trade time UTC (`HHMMSS`)
    pub trade_time: String,
    pub trade_date_kst: String,
    pub trade_time_kst: String,
    #[serde(with = "timestamp_ms")]
    pub trade_timestamp: OffsetDateTime,
    pub opening_price: Decimal,
    pub high_price: Decimal,
    pub low_price: Decimal,
    pub trade_price: Decimal,
    pub prev_closing_price: Decimal,
    pub change: ChangeDirection,
    pub change_price: Decimal,
    pub change_rate: Decimal,
    pub signed_change_price: Decimal,
    pub signed_change_rate: Decimal,
    pub trade_volume: Decimal,
    /// Accumulated traded value since 00:00 UTC
    pub acc_trade_price: Decimal,
    /// Accumulated traded value over the last 24 hours
    #[serde(default)]
    pub acc_trade_price_24h: Option<Decimal>,
    pub acc_trade_volume: Decimal,
    #[serde(default)]
    pub acc_trade_volume_24h: Option<Decimal>,
    #[serde(with = "timestamp_ms")]
    pub timestamp: OffsetDateTime,
}

/// One price level of an order book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderbookUnit {
    pub ask_price: Decimal,
    pub bid_price: Decimal,
    pub ask_size: Decimal,
    pub bid_size: Decimal,
}

/// Order book snapshot for a market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Orderbook {
    pub market: String,
    #[serde(with = "timestamp_ms")]
    pub timestamp: OffsetDateTime,
    pub total_ask_size: Decimal,
    pub total_bid_size: Decimal,
    /// Levels ordered from the best price outwards
    pub orderbook_units: Vec<OrderbookUnit>,
}

/// Parameters for the recent trades request.
#[derive(Debug, Clone, Default)]
pub struct TradesRequest {
    /// Market code
    pub market: String,
    /// Only trades before this time (`HHmmss` or `HH:mm:ss`)
    pub to: Option<String>,
    /// Number of trades
    pub count: Option<u32>,
    /// Pagination cursor (`sequential_id`)
    pub cursor: Option<String>,
    /// Look back this many days (1-7)
    pub days_ago: Option<u32>,
}

impl TradesRequest {
    /// Request the most recent trades for a market.
    pub fn new(market: impl Into<String>) -> Self {
        Self {
            market: market.into(),
            ..Default::default()
        }
    }

    /// Limit the number of trades returned.
    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Continue after the given `sequential_id`.
    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Query a previous day.
    pub fn days_ago(mut self, days: u32) -> Self {
        self.days_ago = Some(days);
        self
    }
}

/// A completed trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub market: String,
    /// Trade date UTC (`YYYY-MM-DD`)
    pub trade_date_utc: String,
    /// Trade time UTC (`HH:MM:SS`)
    pub trade_time_utc: String,
    #[serde(with = "timestamp_ms")]
    pub timestamp: OffsetDateTime,
    pub trade_price: Decimal,
    pub trade_volume: Decimal,
    pub prev_closing_price: Decimal,
    pub change_price: Decimal,
    pub ask_bid: AskBid,
    /// Unique, increasing trade number
    pub sequential_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_accepts_numbers() {
        let json = r#"{
            "market": "KRW-BTC",
            "trade_date": "20240101",
            "trade_time": "000000",
            "trade_date_kst": "20240101",
            "trade_time_kst": "090000",
            "trade_timestamp": 1704067200000,
            "opening_price": 58000000,
            "high_price": 59000000.0,
            "low_price": 57500000,
            "trade_price": 58500000,
            "prev_closing_price": 58000000,
            "change": "RISE",
            "change_price": 500000,
            "change_rate": 0.0086206897,
            "signed_change_price": 500000,
            "signed_change_rate": 0.0086206897,
            "trade_volume": 0.01,
            "acc_trade_price": 123456789.5,
            "acc_trade_volume": 2.5,
            "timestamp": 1704067200123
        }"#;
        let ticker: Ticker = serde_json::from_str(json).unwrap();
        assert_eq!(ticker.trade_price, Decimal::from(58_500_000));
        assert_eq!(ticker.trade_volume.to_string(), "0.01");
        assert_eq!(ticker.change, ChangeDirection::Rise);
        assert!(ticker.acc_trade_price_24h.is_none());
    }

    #[test]
    fn test_minute_candle_parses_naive_times() {
        let json = r#"{
            "market": "KRW-BTC",
            "candle_date_time_utc": "2024-01-01T00:00:00",
            "candle_date_time_kst": "2024-01-01T09:00:00",
            "opening_price": 1, "high_price": 2, "low_price": 1, "trade_price": 2,
            "timestamp": 1704067259000,
            "candle_acc_trade_price": 10, "candle_acc_trade_volume": 5,
            "unit": 1
        }"#;
        let candle: MinuteCandle = serde_json::from_str(json).unwrap();
        assert_eq!(candle.candle_date_time_kst.hour(), 9);
        assert_eq!(candle.unit, 1);
    }

    #[test]
    fn test_market_quote_currency() {
        let market: Market = serde_json::from_str(
            r#"{"market":"BTC-ETH","korean_name":"이더리움","english_name":"Ethereum"}"#,
        )
        .unwrap();
        assert_eq!(market.quote_currency(), "BTC");
        assert!(market.market_warning.is_none());
    }
}
