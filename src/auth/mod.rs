//! Authentication module for Upbit API.
//!
//! This module provides:
//! - Credential management with secure secret storage
//! - UUID nonce generation for replay attack prevention
//! - HS256 JWT generation with SHA-512 query/body hashing

mod credentials;
mod nonce;
mod token;

pub use credentials::{
    ACCESS_KEY_ENV, Credentials, CredentialsProvider, EnvCredentials, SECRET_KEY_ENV,
    StaticCredentials,
};
pub use nonce::{NonceProvider, UuidNonce};
pub use token::{
    QUERY_HASH_ALG, authorization_header, canonical_body, canonical_query, sign, sign_using,
    sign_with,
};
