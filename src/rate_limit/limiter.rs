//! Adaptive leaky-bucket rate limiter.
//!
//! Each limiter guards one endpoint group. Admitted requests are recorded in
//! a trailing one-second window; the number of entries in the window may not
//! exceed the effective capacity, which is the configured capacity lowered to
//! the last `sec` quota the server reported for this group. A reported quota
//! describes the server's current second only and lapses one window after it
//! was observed.
//!
//! # Example
//!
//! ```rust
//! use upbit_api_client::rate_limit::RateLimiter;
//!
//! # async fn run() -> Result<(), upbit_api_client::UpbitError> {
//! let mut limiter = RateLimiter::new("quotation", 30);
//! limiter.acquire().await?;
//! limiter.observe_value("group=quotation; min=1799; sec=29");
//! assert_eq!(limiter.server_remaining(), Some(29));
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use reqwest::header::HeaderMap;
use tokio::time::Instant;

use crate::error::UpbitError;
use crate::rate_limit::{REMAINING_REQ_HEADER, RemainingReq};

/// Tunables for a [`RateLimiter`].
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum requests admitted per window.
    pub capacity: u32,
    /// Sleep and retry when at capacity instead of failing.
    pub auto_wait: bool,
    /// Length of the trailing window.
    pub window: Duration,
    /// Backoff unit added to every wait before scaling.
    pub base_delay: Duration,
    /// Upper bound for a single wait.
    pub max_delay: Duration,
    /// Cap on the backoff exponent.
    pub max_retries: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            capacity: 30,
            auto_wait: true,
            window: Duration::from_secs(1),
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            max_retries: 5,
        }
    }
}

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request was recorded and may proceed.
    Admitted,
    /// The window is full; check again after this long.
    Wait(Duration),
}

/// A `sec` quota and when it was reported.
#[derive(Debug, Clone, Copy)]
struct ServerQuota {
    remaining: u32,
    observed_at: Instant,
}

/// Per-group admission control combining a local window with server feedback.
#[derive(Debug)]
pub struct RateLimiter {
    group: String,
    aliases: Vec<String>,
    config: RateLimiterConfig,
    server_remaining: Option<ServerQuota>,
    window: VecDeque<Instant>,
    consecutive_waits: u32,
}

impl RateLimiter {
    /// Create a limiter with the given capacity and default backoff settings.
    pub fn new(group: impl Into<String>, capacity: u32) -> Self {
        Self::with_config(
            group,
            RateLimiterConfig {
                capacity,
                ..RateLimiterConfig::default()
            },
        )
    }

    /// Create a limiter from a full configuration.
    pub fn with_config(group: impl Into<String>, config: RateLimiterConfig) -> Self {
        Self {
            group: group.into(),
            aliases: Vec::new(),
            window: VecDeque::with_capacity(config.capacity as usize),
            config,
            server_remaining: None,
            consecutive_waits: 0,
        }
    }

    /// Also accept server feedback reported under these group names.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable waiting when at capacity.
    pub fn set_auto_wait(&mut self, auto_wait: bool) {
        self.config.auto_wait = auto_wait;
    }

    /// Group name this limiter answers to.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Configured capacity per window.
    pub fn static_capacity(&self) -> u32 {
        self.config.capacity
    }

    /// Last per-second quota reported by the server, if any.
    pub fn server_remaining(&self) -> Option<u32> {
        self.server_remaining.map(|quota| quota.remaining)
    }

    /// Capacity currently enforced.
    pub fn effective_capacity(&self) -> u32 {
        self.capacity_at(Instant::now())
    }

    fn capacity_at(&self, now: Instant) -> u32 {
        match self.binding_quota(now) {
            Some(quota) => quota.remaining,
            None => self.config.capacity,
        }
    }

    /// The server quota, while it is fresh and tighter than the static cap.
    fn binding_quota(&self, now: Instant) -> Option<ServerQuota> {
        self.server_remaining.filter(|quota| {
            quota.remaining < self.config.capacity
                && now.saturating_duration_since(quota.observed_at) < self.config.window
        })
    }

    /// Number of admissions recorded in the window (including expired ones
    /// not yet evicted).
    pub fn in_window(&self) -> usize {
        self.window.len()
    }

    /// Number of back-to-back checks that had to wait.
    pub fn consecutive_waits(&self) -> u32 {
        self.consecutive_waits
    }

    /// Whether the limiter sleeps instead of failing when full.
    pub fn auto_wait(&self) -> bool {
        self.config.auto_wait
    }

    /// Run one admission check at the current time.
    pub fn check(&mut self) -> Result<Admission, UpbitError> {
        self.check_at(Instant::now())
    }

    /// Run one admission check at `now`.
    ///
    /// Admission records `now` in the window. When the window is full this
    /// either fails (auto-wait disabled) or returns the backoff to sleep
    /// before checking again.
    pub fn check_at(&mut self, now: Instant) -> Result<Admission, UpbitError> {
        let window = self.config.window;
        while let Some(&oldest) = self.window.front() {
            if now.saturating_duration_since(oldest) >= window {
                self.window.pop_front();
            } else {
                break;
            }
        }

        let capacity = self.capacity_at(now);
        let occupied = self.window.len();
        if occupied < capacity as usize {
            self.window.push_back(now);
            self.consecutive_waits = 0;
            return Ok(Admission::Admitted);
        }

        let slot_frees = self
            .window
            .front()
            .map(|&oldest| window.saturating_sub(now.saturating_duration_since(oldest)));
        let quota_lapses = self
            .binding_quota(now)
            .map(|quota| window.saturating_sub(now.saturating_duration_since(quota.observed_at)));
        let until_free = match (slot_frees, quota_lapses) {
            (Some(slot), Some(quota)) => slot.min(quota),
            (Some(wait), None) | (None, Some(wait)) => wait,
            (None, None) => Duration::ZERO,
        };

        if !self.config.auto_wait {
            return Err(UpbitError::RateLimitExceeded {
                message: format!(
                    "Rate limit exceeded for {}: {}/{} requests/sec",
                    self.group, occupied, capacity
                ),
                retry_after_ms: Some(until_free.as_millis() as u64),
            });
        }

        let multiplier = 2u32.saturating_pow(self.consecutive_waits);
        let delay = (until_free + self.config.base_delay)
            .saturating_mul(multiplier)
            .min(self.config.max_delay);
        self.consecutive_waits = (self.consecutive_waits + 1).min(self.config.max_retries);

        Ok(Admission::Wait(delay))
    }

    /// Wait until a request may proceed.
    ///
    /// Re-checks after every sleep, so quota updates and window expiry that
    /// happen while waiting are taken into account.
    pub async fn acquire(&mut self) -> Result<(), UpbitError> {
        loop {
            match self.check()? {
                Admission::Admitted => return Ok(()),
                Admission::Wait(delay) => {
                    tracing::warn!(
                        group = %self.group,
                        delay_ms = delay.as_millis() as u64,
                        "rate limit reached, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Update the server quota from response headers.
    ///
    /// Missing, malformed or foreign-group headers are ignored.
    pub fn observe(&mut self, headers: &HeaderMap) {
        let Some(value) = headers
            .get(REMAINING_REQ_HEADER)
            .and_then(|v| v.to_str().ok())
        else {
            return;
        };
        self.observe_value(value);
    }

    /// Update the server quota from a raw `Remaining-Req` value.
    pub fn observe_value(&mut self, value: &str) {
        self.observe_value_at(value, Instant::now());
    }

    /// Update the server quota from a raw `Remaining-Req` value reported at `now`.
    pub fn observe_value_at(&mut self, value: &str, now: Instant) {
        let parsed = match value.parse::<RemainingReq>() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Ignoring Remaining-Req header {:?}: {}", value, e);
                return;
            }
        };

        if !self.answers_to(&parsed.group) {
            return;
        }
        if let Some(sec) = parsed.sec {
            self.server_remaining = Some(ServerQuota {
                remaining: sec,
                observed_at: now,
            });
        }
    }

    /// Forget all recorded admissions, backoff state and server feedback.
    pub fn reset(&mut self) {
        self.window.clear();
        self.consecutive_waits = 0;
        self.server_remaining = None;
    }

    fn answers_to(&self, group: &str) -> bool {
        self.group == group || self.aliases.iter().any(|alias| alias == group)
    }
}
