//! Upbit REST API client.
//!
//! Endpoints are grouped by service, each adding methods to
//! [`UpbitRestClient`]:
//!
//! - [`quotation`] - markets, candles, tickers, order books and trades (public)
//! - [`exchange`] - balances, API keys and orders
//! - [`deposit`] - deposits and deposit addresses
//! - [`withdrawal`] - withdrawals and withdrawal limits
//!
//! Private services require credentials; calling them without any fails
//! with [`UpbitError::MissingCredentials`](crate::UpbitError::MissingCredentials)
//! before a request is sent.

mod client;
pub mod endpoints;
pub mod deposit;
pub mod exchange;
pub mod quotation;
pub mod withdrawal;

pub use client::{UpbitRestClient, UpbitRestClientBuilder};
pub use endpoints::UPBIT_BASE_URL;
