//! Thread-safe limiter handles used by the REST client.

use std::sync::Arc;

use reqwest::header::HeaderMap;
use tokio::sync::Mutex;

use crate::error::UpbitError;
use crate::rate_limit::{Admission, RateLimiter, RateLimiterConfig};

/// A [`RateLimiter`] shared between concurrent callers.
///
/// The lock is held only while deciding admission; it is released while a
/// caller sleeps so other callers and header updates can proceed.
#[derive(Debug, Clone)]
pub struct SharedRateLimiter {
    inner: Arc<Mutex<RateLimiter>>,
}

impl SharedRateLimiter {
    /// Wrap a limiter for shared use.
    pub fn new(limiter: RateLimiter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(limiter)),
        }
    }

    /// Wait until a request may proceed.
    pub async fn acquire(&self) -> Result<(), UpbitError> {
        loop {
            let mut limiter = self.inner.lock().await;
            match limiter.check()? {
                Admission::Admitted => return Ok(()),
                Admission::Wait(delay) => {
                    let group = limiter.group().to_string();
                    drop(limiter);
                    tracing::warn!(%group, ?delay, "rate limit reached, backing off");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Feed response headers back into the limiter.
    pub async fn observe(&self, headers: &HeaderMap) {
        self.inner.lock().await.observe(headers);
    }

    /// Reset the limiter to its initial state.
    pub async fn reset(&self) {
        self.inner.lock().await.reset();
    }

    /// Lock the limiter for direct inspection.
    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, RateLimiter> {
        self.inner.lock().await
    }
}

/// Quotation (market data) group name.
pub const QUOTATION_GROUP: &str = "quotation";
/// Exchange (account, order, deposit, withdrawal) group name.
pub const EXCHANGE_GROUP: &str = "exchange";

/// Default per-second capacity for quotation endpoints.
pub const QUOTATION_CAPACITY: u32 = 30;
/// Default per-second capacity for exchange endpoints.
pub const EXCHANGE_CAPACITY: u32 = 8;

/// Path prefixes served by the exchange group.
pub const EXCHANGE_PREFIXES: &[&str] = &[
    "/v1/orders",
    "/v1/order",
    "/v1/accounts",
    "/v1/withdraws",
    "/v1/withdraw",
    "/v1/deposits",
    "/v1/deposit",
];

/// Group names the server reports for quotation endpoints.
const QUOTATION_SERVER_GROUPS: &[&str] = &["market", "candles", "ticker", "orderbook", "trades"];
/// Group names the server reports for exchange endpoints.
const EXCHANGE_SERVER_GROUPS: &[&str] = &["default", "order", "order-cancel-all"];

/// The pair of limiters a REST client routes requests through.
#[derive(Debug, Clone)]
pub struct RateLimiters {
    /// Limiter for market data endpoints.
    pub quotation: SharedRateLimiter,
    /// Limiter for private endpoints.
    pub exchange: SharedRateLimiter,
}

impl RateLimiters {
    /// Create both limiters with the given capacities.
    pub fn new(quotation_capacity: u32, exchange_capacity: u32, auto_wait: bool) -> Self {
        let config = |capacity| RateLimiterConfig {
            capacity,
            auto_wait,
            ..RateLimiterConfig::default()
        };
        Self {
            quotation: SharedRateLimiter::new(
                RateLimiter::with_config(QUOTATION_GROUP, config(quotation_capacity))
                    .with_aliases(QUOTATION_SERVER_GROUPS.iter().copied()),
            ),
            exchange: SharedRateLimiter::new(
                RateLimiter::with_config(EXCHANGE_GROUP, config(exchange_capacity))
                    .with_aliases(EXCHANGE_SERVER_GROUPS.iter().copied()),
            ),
        }
    }

    /// Pick the limiter responsible for a request path.
    pub fn for_path(&self, path: &str) -> &SharedRateLimiter {
        if is_exchange_path(path) {
            &self.exchange
        } else {
            &self.quotation
        }
    }
}

impl Default for RateLimiters {
    fn default() -> Self {
        Self::new(QUOTATION_CAPACITY, EXCHANGE_CAPACITY, true)
    }
}

/// Whether `path` belongs to the exchange group.
///
/// Prefixes match whole path segments only, so `/v1/orderbook` stays in the
/// quotation group.
pub fn is_exchange_path(path: &str) -> bool {
    EXCHANGE_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'))
    })
}
