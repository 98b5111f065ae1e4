//! Long-lived streaming session with reconnect and re-subscription.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;

use crate::auth::CredentialsProvider;
use crate::error::UpbitError;
use crate::ws::client::WsConfig;
use crate::ws::messages::{ChannelSpec, SubscribeFrame, WsEvent};
use crate::ws::transport::{Connection, Transport, TungsteniteTransport};

/// A tracked subscription, replayed after every reconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub ticket: String,
    pub channels: Vec<ChannelSpec>,
}

/// Stops a running session from another task.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    running: Arc<AtomicBool>,
    stop: Arc<Notify>,
}

impl SessionHandle {
    /// Ask the receive loop to exit. The loop closes its connection on the way out.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.stop.notify_one();
    }

    /// Whether the session's receive loop should keep going.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

type ErrorHook = Arc<dyn Fn(&UpbitError) + Send + Sync>;

/// Clears the running flag when `run` returns or its future is dropped.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// One logical WebSocket connection and the subscriptions it should carry.
///
/// Subscriptions are the durable state; the connection is disposable and
/// replaced on every reconnect.
///
/// # Example
///
/// ```rust,no_run
/// use upbit_api_client::ws::{StreamSession, WsConfig, WsEvent};
/// use upbit_api_client::ws::messages::ChannelSpec;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut session = StreamSession::new(WsConfig::default());
///     session.connect().await?;
///     session
///         .subscribe("my-ticket", vec![ChannelSpec::ticker(["KRW-BTC"])])
///         .await?;
///
///     session
///         .run(|event| async move {
///             if let WsEvent::Ticker(ticker) = event {
///                 println!("{} {}", ticker.code, ticker.trade_price);
///             }
///         })
///         .await?;
///     Ok(())
/// }
/// ```
pub struct StreamSession<T: Transport = TungsteniteTransport> {
    transport: T,
    config: WsConfig,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    connection: Option<T::Conn>,
    subscriptions: Vec<Subscription>,
    running: Arc<AtomicBool>,
    stop: Arc<Notify>,
    reconnect_delay: Duration,
    on_error: Option<ErrorHook>,
}

impl StreamSession<TungsteniteTransport> {
    /// Create a session using `tokio-tungstenite`.
    pub fn new(config: WsConfig) -> Self {
        let transport = TungsteniteTransport::new(config.connect_timeout);
        Self::with_transport(transport, config)
    }
}

impl<T: Transport> StreamSession<T> {
    /// Create a session on a custom transport.
    pub fn with_transport(transport: T, config: WsConfig) -> Self {
        let reconnect_delay = config.reconnect_delay;
        Self {
            transport,
            config,
            credentials: None,
            connection: None,
            subscriptions: Vec::new(),
            running: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(Notify::new()),
            reconnect_delay,
            on_error: None,
        }
    }

    /// Set credentials, needed for private channels.
    pub fn credentials(mut self, credentials: Arc<dyn CredentialsProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Observe failures the receive loop recovers from.
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&UpbitError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(hook));
        self
    }

    /// The session configuration.
    pub fn config(&self) -> &WsConfig {
        &self.config
    }

    /// A handle that can stop [`run`](Self::run) from another task.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            running: self.running.clone(),
            stop: self.stop.clone(),
        }
    }

    /// Tracked subscriptions, in subscription order.
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Delay before the next reconnect attempt.
    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }

    /// Open the connection.
    ///
    /// Failures are returned to the caller without retrying.
    pub async fn connect(&mut self) -> Result<(), UpbitError> {
        let connection = self.transport.connect(&self.config.url).await?;
        self.connection = Some(connection);
        self.running.store(true, Ordering::SeqCst);
        self.reconnect_delay = self.config.reconnect_delay;
        tracing::info!(url = %self.config.url, "WebSocket connected");
        Ok(())
    }

    /// Subscribe to `channels` under `ticket` and track the subscription.
    pub async fn subscribe(
        &mut self,
        ticket: impl Into<String>,
        channels: Vec<ChannelSpec>,
    ) -> Result<(), UpbitError> {
        let ticket = ticket.into();
        self.send_subscription(&ticket, &channels).await?;
        self.subscriptions.push(Subscription { ticket, channels });
        Ok(())
    }

    /// Stop tracking every subscription under `ticket`.
    ///
    /// Nothing is sent: the feed keeps flowing until the next reconnect.
    pub fn unsubscribe(&mut self, ticket: &str) {
        self.subscriptions.retain(|s| s.ticket != ticket);
    }

    /// Receive messages and hand them to `callback`, one at a time, until
    /// stopped.
    ///
    /// Closed connections and receive failures are retried with exponential
    /// backoff. Returns once [`SessionHandle::stop`] is called, or
    /// immediately if the session was never connected.
    pub async fn run<F, Fut>(&mut self, mut callback: F) -> Result<(), UpbitError>
    where
        F: FnMut(WsEvent) -> Fut,
        Fut: Future<Output = ()>,
    {
        let _guard = RunningGuard(self.running.clone());

        while self.is_running() {
            if let Err(err) = self.receive(&mut callback).await {
                if !self.is_running() {
                    return Err(err);
                }
                tracing::warn!(error = %err, "WebSocket receive loop failed");
                if let Some(hook) = &self.on_error {
                    hook(&err);
                }
            }
            if !self.is_running() {
                break;
            }

            self.connection = None;
            tracing::info!(delay = ?self.reconnect_delay, "WebSocket reconnecting");
            self.backoff().await;
        }

        if let Some(mut connection) = self.connection.take() {
            if let Err(err) = connection.close().await {
                tracing::debug!(error = %err, "error closing WebSocket");
            }
        }
        Ok(())
    }

    /// Stop the session and close the connection. Safe to call repeatedly.
    pub async fn close(&mut self) -> Result<(), UpbitError> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(mut connection) = self.connection.take() {
            connection.close().await?;
            tracing::info!("WebSocket closed");
        }
        Ok(())
    }

    async fn send_subscription(
        &mut self,
        ticket: &str,
        channels: &[ChannelSpec],
    ) -> Result<(), UpbitError> {
        if self.connection.is_none() {
            return Err(not_connected());
        }
        let credentials = self.credentials.as_ref().map(|p| p.get_credentials());
        let frame = SubscribeFrame::signed(ticket, channels.to_vec(), credentials)?;
        let json = frame.to_json()?;

        tracing::debug!(ticket, channels = channels.len(), "subscribing");
        let connection = self.connection.as_mut().ok_or_else(not_connected)?;
        connection.send(Message::Text(json.into())).await
    }

    async fn replay_subscriptions(&mut self) -> Result<(), UpbitError> {
        let snapshot = self.subscriptions.clone();
        for subscription in &snapshot {
            self.send_subscription(&subscription.ticket, &subscription.channels)
                .await?;
        }
        Ok(())
    }

    /// Wait out the current delay, then double it up to the maximum.
    async fn backoff(&mut self) {
        let deadline = Instant::now() + self.reconnect_delay;
        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => break,
                _ = self.stop.notified() => {
                    if !self.running.load(Ordering::SeqCst) {
                        break;
                    }
                }
            }
        }
        self.reconnect_delay = (self.reconnect_delay * 2).min(self.config.max_reconnect_delay);
    }

    /// Connect if needed, then pump one connection until it closes (`Ok`) or
    /// fails (`Err`).
    async fn receive<F, Fut>(&mut self, callback: &mut F) -> Result<(), UpbitError>
    where
        F: FnMut(WsEvent) -> Fut,
        Fut: Future<Output = ()>,
    {
        if self.connection.is_none() {
            self.connect().await?;
            self.replay_subscriptions().await?;
        }

        let idle_timeout = self.config.idle_timeout();
        let ping_interval = self.config.ping_interval;
        let mut ping = tokio::time::interval_at(Instant::now() + ping_interval, ping_interval);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_inbound = Instant::now();

        loop {
            if !self.running.load(Ordering::SeqCst) {
                return Ok(());
            }
            let connection = self.connection.as_mut().ok_or_else(not_connected)?;

            let received = tokio::select! {
                _ = self.stop.notified() => continue,
                _ = ping.tick() => {
                    connection.send(Message::Ping(Default::default())).await?;
                    continue;
                }
                received = tokio::time::timeout_at(last_inbound + idle_timeout, connection.recv()) => received,
            };

            let message = match received {
                Err(_) => {
                    return Err(UpbitError::Connection(format!(
                        "No frames received for {:?}",
                        idle_timeout
                    )));
                }
                Ok(None) => {
                    tracing::info!("WebSocket closed by peer");
                    return Ok(());
                }
                Ok(Some(result)) => result?,
            };
            last_inbound = Instant::now();

            let event = match message {
                Message::Text(text) => WsEvent::from_text(text.as_str())?,
                Message::Binary(bytes) => WsEvent::from_bytes(&bytes)?,
                Message::Close(frame) => {
                    tracing::info!(?frame, "WebSocket close frame received");
                    return Ok(());
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            };
            callback(event).await;
        }
    }
}

impl<T: Transport> std::fmt::Debug for StreamSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSession")
            .field("url", &self.config.url)
            .field("connected", &self.connection.is_some())
            .field("running", &self.is_running())
            .field("subscriptions", &self.subscriptions.len())
            .field("reconnect_delay", &self.reconnect_delay)
            .finish()
    }
}

fn not_connected() -> UpbitError {
    UpbitError::Connection("Not connected to WebSocket".to_string())
}
