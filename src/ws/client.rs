//! WebSocket connection configuration.

use std::time::Duration;

use url::Url;

use crate::error::UpbitError;

/// WebSocket endpoint URLs and timing defaults.
pub mod endpoints {
    use std::time::Duration;

    /// Public market data endpoint.
    pub const WS_PUBLIC: &str = "wss://api.upbit.com/websocket/v1";
    /// Private (myOrder/myAsset) endpoint.
    pub const WS_PRIVATE: &str = "wss://api.upbit.com/websocket/v1/private";

    /// Interval between keepalive pings.
    pub const PING_INTERVAL: Duration = Duration::from_secs(30);
    /// Grace period after a missed ping before the connection is considered dead.
    pub const PING_TIMEOUT: Duration = Duration::from_secs(10);
    /// First reconnect delay.
    pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);
    /// Upper bound for the reconnect delay.
    pub const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(60);
    /// Timeout for opening a connection.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
}

/// Configuration for a [`StreamSession`](crate::ws::StreamSession).
///
/// Built through [`WsConfig::builder`], so every instance has a `ws`/`wss`
/// URL, a non-zero ping interval and a non-zero reconnect delay no larger
/// than its maximum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsConfig {
    pub(crate) url: String,
    pub(crate) ping_interval: Duration,
    pub(crate) ping_timeout: Duration,
    pub(crate) reconnect_delay: Duration,
    pub(crate) max_reconnect_delay: Duration,
    pub(crate) connect_timeout: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: endpoints::WS_PUBLIC.to_string(),
            ping_interval: endpoints::PING_INTERVAL,
            ping_timeout: endpoints::PING_TIMEOUT,
            reconnect_delay: endpoints::RECONNECT_DELAY,
            max_reconnect_delay: endpoints::MAX_RECONNECT_DELAY,
            connect_timeout: endpoints::CONNECT_TIMEOUT,
        }
    }
}

impl WsConfig {
    /// Create a new configuration builder.
    pub fn builder() -> WsConfigBuilder {
        WsConfigBuilder::new()
    }

    /// Default configuration pointed at the private endpoint.
    pub fn private() -> Self {
        Self {
            url: endpoints::WS_PRIVATE.to_string(),
            ..Self::default()
        }
    }

    /// Endpoint to connect to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Interval between keepalive pings.
    pub fn ping_interval(&self) -> Duration {
        self.ping_interval
    }

    /// Extra time allowed for any inbound frame after a ping interval elapses.
    pub fn ping_timeout(&self) -> Duration {
        self.ping_timeout
    }

    /// First reconnect delay, restored after every successful connect.
    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }

    /// Upper bound for the reconnect delay.
    pub fn max_reconnect_delay(&self) -> Duration {
        self.max_reconnect_delay
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// How long the connection may stay silent before it is treated as dead.
    pub fn idle_timeout(&self) -> Duration {
        self.ping_interval + self.ping_timeout
    }
}

/// Builder for [`WsConfig`].
#[derive(Debug, Clone, Default)]
pub struct WsConfigBuilder {
    config: WsConfig,
}

impl WsConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: WsConfig::default(),
        }
    }

    /// Set the endpoint URL (useful for testing against a local server).
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    /// Use the private endpoint.
    pub fn private(mut self) -> Self {
        self.config.url = endpoints::WS_PRIVATE.to_string();
        self
    }

    /// Set the keepalive parameters.
    pub fn ping(mut self, interval: Duration, timeout: Duration) -> Self {
        self.config.ping_interval = interval;
        self.config.ping_timeout = timeout;
        self
    }

    /// Set the reconnection backoff parameters.
    pub fn reconnect_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.config.reconnect_delay = initial;
        self.config.max_reconnect_delay = max;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Build the configuration.
    ///
    /// Fails when the URL is not a `ws`/`wss` URL, the ping interval or
    /// the reconnect delay is zero, or the backoff bounds are inverted.
    pub fn build(self) -> Result<WsConfig, UpbitError> {
        let url = Url::parse(&self.config.url)?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(UpbitError::Validation(format!(
                "WebSocket URL must use ws or wss, got {}",
                url.scheme()
            )));
        }
        if self.config.ping_interval.is_zero() {
            return Err(UpbitError::Validation(
                "Ping interval must be non-zero".to_string(),
            ));
        }
        if self.config.reconnect_delay.is_zero() {
            return Err(UpbitError::Validation(
                "Reconnect delay must be non-zero".to_string(),
            ));
        }
        if self.config.reconnect_delay > self.config.max_reconnect_delay {
            return Err(UpbitError::Validation(
                "Reconnect delay exceeds the maximum reconnect delay".to_string(),
            ));
        }
        Ok(self.config)
    }
}
