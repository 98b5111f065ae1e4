//! WebSocket message types.

mod market_data;
mod private;
mod subscribe;

pub use market_data::*;
pub use private::*;
pub use subscribe::*;

use serde_json::Value;

use crate::error::UpbitError;

/// A decoded inbound message.
#[derive(Debug, Clone)]
pub enum WsEvent {
    Ticker(WsTicker),
    Orderbook(WsOrderbook),
    Trade(WsTrade),
    MyOrder(WsMyOrder),
    MyAsset(WsMyAsset),
    /// Anything without a known `type`, e.g. `{"status":"UP"}`.
    Unknown(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventKind {
    Ticker,
    Orderbook,
    Trade,
    MyOrder,
    MyAsset,
}

const DISCRIMINATORS: [(&str, EventKind); 5] = [
    (channels::TICKER, EventKind::Ticker),
    (channels::ORDERBOOK, EventKind::Orderbook),
    (channels::TRADE, EventKind::Trade),
    (channels::MY_ORDER, EventKind::MyOrder),
    (channels::MY_ASSET, EventKind::MyAsset),
];

fn lookup(discriminator: &str) -> Option<EventKind> {
    DISCRIMINATORS
        .iter()
        .find(|(name, _)| *name == discriminator)
        .map(|(_, kind)| *kind)
}

impl WsEvent {
    /// Decode a text frame.
    pub fn from_text(text: &str) -> Result<Self, UpbitError> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Decode a binary frame holding UTF-8 JSON.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, UpbitError> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    /// Classify a JSON payload by its `type` field.
    ///
    /// A known `type` with fields that do not fit the typed model is an error.
    pub fn from_value(value: Value) -> Result<Self, UpbitError> {
        let kind = value.get("type").and_then(Value::as_str).and_then(lookup);
        let event = match kind {
            Some(EventKind::Ticker) => WsEvent::Ticker(serde_json::from_value(value)?),
            Some(EventKind::Orderbook) => WsEvent::Orderbook(serde_json::from_value(value)?),
            Some(EventKind::Trade) => WsEvent::Trade(serde_json::from_value(value)?),
            Some(EventKind::MyOrder) => WsEvent::MyOrder(serde_json::from_value(value)?),
            Some(EventKind::MyAsset) => WsEvent::MyAsset(serde_json::from_value(value)?),
            None => WsEvent::Unknown(value),
        };
        Ok(event)
    }

    /// Channel name of the event, `None` for unknown payloads.
    pub fn channel(&self) -> Option<&'static str> {
        match self {
            WsEvent::Ticker(_) => Some(channels::TICKER),
            WsEvent::Orderbook(_) => Some(channels::ORDERBOOK),
            WsEvent::Trade(_) => Some(channels::TRADE),
            WsEvent::MyOrder(_) => Some(channels::MY_ORDER),
            WsEvent::MyAsset(_) => Some(channels::MY_ASSET),
            WsEvent::Unknown(_) => None,
        }
    }
}
