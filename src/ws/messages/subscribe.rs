//! Outbound subscription frames.

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use serde_with::skip_serializing_none;

use crate::auth::{Credentials, sign};
use crate::error::UpbitError;

/// Channel names.
pub mod channels {
    /// Current price.
    pub const TICKER: &str = "ticker";
    /// Order book.
    pub const ORDERBOOK: &str = "orderbook";
    /// Trades.
    pub const TRADE: &str = "trade";
    /// Own order updates (private).
    pub const MY_ORDER: &str = "myOrder";
    /// Own balance updates (private).
    pub const MY_ASSET: &str = "myAsset";

    /// Channels that need an authenticated ticket.
    pub const PRIVATE: [&str; 2] = [MY_ORDER, MY_ASSET];
}

/// One channel request inside a subscription frame.
///
/// Optional fields are only sent when set.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSpec {
    /// Channel name, see [`channels`].
    #[serde(rename = "type")]
    pub channel: String,
    /// Market codes (e.g. `KRW-BTC`)
    pub codes: Option<Vec<String>>,
    /// Only receive live updates
    #[serde(rename = "isOnlyRealtime")]
    pub only_realtime: Option<bool>,
    /// Only receive the initial snapshot
    #[serde(rename = "isOnlySnapshot")]
    pub only_snapshot: Option<bool>,
}

impl ChannelSpec {
    /// A channel with no options set.
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            codes: None,
            only_realtime: None,
            only_snapshot: None,
        }
    }

    /// Ticker channel for `codes`.
    pub fn ticker<S: Into<String>>(codes: impl IntoIterator<Item = S>) -> Self {
        Self::new(channels::TICKER).codes(codes)
    }

    /// Order book channel for `codes`.
    pub fn orderbook<S: Into<String>>(codes: impl IntoIterator<Item = S>) -> Self {
        Self::new(channels::ORDERBOOK).codes(codes)
    }

    /// Trade channel for `codes`.
    pub fn trade<S: Into<String>>(codes: impl IntoIterator<Item = S>) -> Self {
        Self::new(channels::TRADE).codes(codes)
    }

    /// Own order updates for all markets.
    pub fn my_order() -> Self {
        Self::new(channels::MY_ORDER)
    }

    /// Own balance updates.
    pub fn my_asset() -> Self {
        Self::new(channels::MY_ASSET)
    }

    /// Restrict to the given market codes.
    pub fn codes<S: Into<String>>(mut self, codes: impl IntoIterator<Item = S>) -> Self {
        self.codes = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    /// Only receive live updates.
    pub fn only_realtime(mut self, value: bool) -> Self {
        self.only_realtime = Some(value);
        self
    }

    /// Only receive the initial snapshot.
    pub fn only_snapshot(mut self, value: bool) -> Self {
        self.only_snapshot = Some(value);
        self
    }

    /// Whether this channel needs an authenticated ticket.
    pub fn is_private(&self) -> bool {
        channels::PRIVATE.contains(&self.channel.as_str())
    }
}

/// A complete subscription frame:
/// `[{ticket, auth?}, {type, ...}, ..., {format: "DEFAULT"}]`.
///
/// # Example
///
/// ```rust
/// use upbit_api_client::ws::messages::{ChannelSpec, SubscribeFrame};
///
/// let frame = SubscribeFrame::new("ticket-1", vec![ChannelSpec::ticker(["KRW-BTC"])]);
/// assert_eq!(
///     frame.to_json().unwrap(),
///     r#"[{"ticket":"ticket-1"},{"type":"ticker","codes":["KRW-BTC"]},{"format":"DEFAULT"}]"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeFrame {
    ticket: String,
    auth: Option<String>,
    channels: Vec<ChannelSpec>,
}

/// Response format requested for every subscription.
pub const FORMAT_DEFAULT: &str = "DEFAULT";

#[skip_serializing_none]
#[derive(Serialize)]
struct TicketField<'a> {
    ticket: &'a str,
    auth: Option<&'a str>,
}

#[derive(Serialize)]
struct FormatField {
    format: &'static str,
}

impl SubscribeFrame {
    /// Unauthenticated frame.
    pub fn new(ticket: impl Into<String>, channels: Vec<ChannelSpec>) -> Self {
        Self {
            ticket: ticket.into(),
            auth: None,
            channels,
        }
    }

    /// Build a frame, attaching a freshly signed token when credentials are
    /// given and at least one channel is private.
    pub fn signed(
        ticket: impl Into<String>,
        channels: Vec<ChannelSpec>,
        credentials: Option<&Credentials>,
    ) -> Result<Self, UpbitError> {
        let mut frame = Self::new(ticket, channels);
        if let Some(credentials) = credentials {
            if frame.requires_auth() {
                frame.auth = Some(sign(credentials, &[], None)?);
            }
        }
        Ok(frame)
    }

    /// Attach an authentication token.
    pub fn with_auth(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(token.into());
        self
    }

    /// Whether any requested channel is private.
    pub fn requires_auth(&self) -> bool {
        self.channels.iter().any(ChannelSpec::is_private)
    }

    /// The ticket.
    pub fn ticket(&self) -> &str {
        &self.ticket
    }

    /// The attached token, if any.
    pub fn auth(&self) -> Option<&str> {
        self.auth.as_deref()
    }

    /// The channel requests.
    pub fn channels(&self) -> &[ChannelSpec] {
        &self.channels
    }

    /// Serialize to the wire format.
    pub fn to_json(&self) -> Result<String, UpbitError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for SubscribeFrame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.channels.len() + 2))?;
        seq.serialize_element(&TicketField {
            ticket: &self.ticket,
            auth: self.auth.as_deref(),
        })?;
        for channel in &self.channels {
            seq.serialize_element(channel)?;
        }
        seq.serialize_element(&FormatField {
            format: FORMAT_DEFAULT,
        })?;
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn frame_value(frame: &SubscribeFrame) -> Value {
        serde_json::from_str(&frame.to_json().unwrap()).unwrap()
    }

    #[test]
    fn test_public_frame_has_no_auth() {
        let creds = Credentials::new("access", "secret");
        let frame = SubscribeFrame::signed(
            "t1",
            vec![ChannelSpec::ticker(["KRW-BTC"])],
            Some(&creds),
        )
        .unwrap();
        assert!(frame.auth().is_none());
        assert_eq!(frame_value(&frame)[0], json!({"ticket": "t1"}));
    }

    #[test]
    fn test_private_frame_without_credentials_is_unsigned() {
        let frame = SubscribeFrame::signed("t1", vec![ChannelSpec::my_order()], None).unwrap();
        assert!(frame.requires_auth());
        assert!(frame.auth().is_none());
    }

    #[test]
    fn test_private_frame_is_signed() {
        let creds = Credentials::new("access", "secret");
        let frame = SubscribeFrame::signed(
            "t1",
            vec![ChannelSpec::ticker(["KRW-BTC"]), ChannelSpec::my_asset()],
            Some(&creds),
        )
        .unwrap();
        let value = frame_value(&frame);
        let token = value[0]["auth"].as_str().unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(value.as_array().unwrap().len(), 4);
        assert_eq!(value[2], json!({"type": "myAsset"}));
    }

    #[test]
    fn test_options_only_when_set() {
        let frame = SubscribeFrame::new(
            "t2",
            vec![
                ChannelSpec::ticker(["KRW-BTC"]).only_realtime(true),
                ChannelSpec::orderbook(["KRW-ETH"]).only_snapshot(false),
            ],
        );
        assert_eq!(
            frame_value(&frame),
            json!([
                {"ticket": "t2"},
                {"type": "ticker", "codes": ["KRW-BTC"], "isOnlyRealtime": true},
                {"type": "orderbook", "codes": ["KRW-ETH"], "isOnlySnapshot": false},
                {"format": "DEFAULT"}
            ])
        );
    }

    #[test]
    fn test_channel_spec_roundtrips_wire_names() {
        let spec: ChannelSpec =
            serde_json::from_str(r#"{"type":"trade","codes":["KRW-XRP"],"isOnlyRealtime":true}"#)
                .unwrap();
        assert_eq!(spec, ChannelSpec::trade(["KRW-XRP"]).only_realtime(true));
        assert!(!spec.is_private());
    }
}
