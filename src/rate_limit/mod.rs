//! Rate limiting for Upbit API.
//!
//! Upbit enforces per-second request quotas per endpoint group and reports
//! the caller's remaining quota in the `Remaining-Req` header of every
//! response. This module keeps a local leaky-bucket estimate per group and
//! tightens it whenever the server reports less headroom than configured.
//!
//! ## Groups
//!
//! - **quotation**: market data endpoints (30 requests/sec by default)
//! - **exchange**: accounts, orders, deposits and withdrawals (8 requests/sec)
//!
//! ## Example
//!
//! ```rust
//! use upbit_api_client::rate_limit::{RateLimiter, RateLimiterConfig};
//!
//! let mut limiter = RateLimiter::with_config(
//!     "exchange",
//!     RateLimiterConfig {
//!         capacity: 8,
//!         auto_wait: false,
//!         ..RateLimiterConfig::default()
//!     },
//! );
//!
//! for _ in 0..8 {
//!     assert!(limiter.check().is_ok());
//! }
//! assert!(limiter.check().unwrap_err().is_rate_limit());
//! ```

mod header;
mod limiter;
mod shared;

pub use header::{REMAINING_REQ_HEADER, RemainingReq};
pub use limiter::{Admission, RateLimiter, RateLimiterConfig};
pub use shared::{
    EXCHANGE_CAPACITY, EXCHANGE_GROUP, EXCHANGE_PREFIXES, QUOTATION_CAPACITY, QUOTATION_GROUP,
    RateLimiters, SharedRateLimiter, is_exchange_path,
};
