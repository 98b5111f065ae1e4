//! Common domain types for the Upbit API.

use serde::{Deserialize, Serialize};

/// Side of an order: `bid` buys, `ask` sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// Buy order
    Bid,
    /// Sell order
    Ask,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Bid => write!(f, "bid"),
            OrderSide::Ask => write!(f, "ask"),
        }
    }
}

/// Order type for trading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Limit order, requires both price and volume
    Limit,
    /// Market buy by total spend, requires price only
    Price,
    /// Market sell by volume, requires volume only
    Market,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Limit => write!(f, "limit"),
            OrderType::Price => write!(f, "price"),
            OrderType::Market => write!(f, "market"),
        }
    }
}

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    /// Waiting to be filled
    Wait,
    /// Reserved (stop orders)
    Watch,
    /// Fully filled
    Done,
    /// Cancelled
    Cancel,
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderState::Wait => write!(f, "wait"),
            OrderState::Watch => write!(f, "watch"),
            OrderState::Done => write!(f, "done"),
            OrderState::Cancel => write!(f, "cancel"),
        }
    }
}

/// Price change relative to the previous close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeDirection {
    Rise,
    Even,
    Fall,
}

/// Aggressor side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AskBid {
    Ask,
    Bid,
}

/// Whether a streamed message is an initial snapshot or a live update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StreamType {
    Snapshot,
    Realtime,
}

/// Trading state of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketState {
    Preview,
    Active,
    Delisted,
}

/// Investment warning flag attached to a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketWarning {
    #[default]
    None,
    Caution,
}
