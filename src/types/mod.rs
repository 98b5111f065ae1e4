//! Common types used across the Upbit client library.

pub mod common;
pub mod serde_helpers;

pub use common::*;
