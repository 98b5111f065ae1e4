//! The network seam of a stream session.
//!
//! [`StreamSession`](crate::ws::StreamSession) only talks to a
//! [`Transport`], which opens [`Connection`]s. The default
//! [`TungsteniteTransport`] uses `tokio-tungstenite`; tests plug in scripted
//! in-memory transports.

use std::future::Future;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::error::UpbitError;
use crate::ws::client::endpoints;

/// An open, duplex message connection.
pub trait Connection: Send {
    /// Send one frame.
    fn send(&mut self, message: Message) -> impl Future<Output = Result<(), UpbitError>> + Send;

    /// Receive the next frame; `None` once the peer has closed the connection.
    fn recv(&mut self) -> impl Future<Output = Option<Result<Message, UpbitError>>> + Send;

    /// Close the connection.
    fn close(&mut self) -> impl Future<Output = Result<(), UpbitError>> + Send;
}

/// Opens connections.
pub trait Transport: Send + Sync {
    /// Connection type produced by this transport.
    type Conn: Connection;

    /// Open a connection to `url`.
    fn connect(&self, url: &str) -> impl Future<Output = Result<Self::Conn, UpbitError>> + Send;
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// `tokio-tungstenite` transport.
#[derive(Debug, Clone)]
pub struct TungsteniteTransport {
    connect_timeout: Duration,
}

impl TungsteniteTransport {
    /// Create a transport with the given connect timeout.
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for TungsteniteTransport {
    fn default() -> Self {
        Self::new(endpoints::CONNECT_TIMEOUT)
    }
}

impl Transport for TungsteniteTransport {
    type Conn = TungsteniteConnection;

    async fn connect(&self, url: &str) -> Result<Self::Conn, UpbitError> {
        let (stream, _) = tokio::time::timeout(self.connect_timeout, connect_async(url))
            .await
            .map_err(|_| {
                UpbitError::Connection(format!(
                    "Timed out after {:?} connecting to {}",
                    self.connect_timeout, url
                ))
            })?
            .map_err(|e| UpbitError::Connection(format!("Failed to connect to {}: {}", url, e)))?;
        Ok(TungsteniteConnection { stream })
    }
}

/// A live `tokio-tungstenite` connection.
pub struct TungsteniteConnection {
    stream: WsStream,
}

impl std::fmt::Debug for TungsteniteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TungsteniteConnection").finish_non_exhaustive()
    }
}

impl Connection for TungsteniteConnection {
    async fn send(&mut self, message: Message) -> Result<(), UpbitError> {
        self.stream.send(message).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<Message, UpbitError>> {
        self.stream
            .next()
            .await
            .map(|result| result.map_err(UpbitError::from))
    }

    async fn close(&mut self) -> Result<(), UpbitError> {
        self.stream.close(None).await?;
        Ok(())
    }
}
