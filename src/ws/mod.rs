//! Upbit WebSocket streaming.
//!
//! A [`StreamSession`] owns one connection, the list of subscriptions that
//! should be active on it, and the reconnect state. Its [`run`] loop decodes
//! each inbound frame into a [`WsEvent`] and awaits the callback before
//! reading the next one. When the connection drops, the session waits
//! (1s, 2s, 4s, ... up to 60s), reconnects and replays every tracked
//! subscription.
//!
//! Public channels (`ticker`, `orderbook`, `trade`) need no credentials.
//! Private channels (`myOrder`, `myAsset`) are signed with a fresh token on
//! every subscribe when the session has credentials.
//!
//! [`run`]: StreamSession::run

mod client;
pub mod messages;
mod session;
mod transport;

pub use client::{WsConfig, WsConfigBuilder, endpoints};
pub use messages::WsEvent;
pub use session::{SessionHandle, StreamSession, Subscription};
pub use tokio_tungstenite::tungstenite::Message;
pub use transport::{Connection, Transport, TungsteniteConnection, TungsteniteTransport};
