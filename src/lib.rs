//! # Upbit Client
//!
//! An async Rust client library for the Upbit exchange REST and WebSocket APIs.
//!
//! ## Features
//!
//! - Quotation, exchange, deposit and withdrawal REST endpoints
//! - JWT request signing with query/body hashing
//! - Adaptive rate limiting driven by the `Remaining-Req` response header
//! - WebSocket streaming with automatic reconnection and re-subscription
//! - Financial precision with `rust_decimal`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use upbit_api_client::rest::UpbitRestClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = UpbitRestClient::new();
//!     let tickers = client.tickers(&["KRW-BTC"]).await?;
//!     println!("Last price: {}", tickers[0].trade_price);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod error;
pub mod rate_limit;
pub mod rest;
pub mod types;
pub mod ws;

// Re-export commonly used types at crate root
pub use error::UpbitError;
pub use types::common::{OrderSide, OrderState, OrderType, StreamType};

/// Result type alias using UpbitError
pub type Result<T> = std::result::Result<T, UpbitError>;
