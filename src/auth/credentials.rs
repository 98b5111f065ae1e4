//! Upbit Open API key pairs.
//!
//! An Upbit key pair is issued together: the access key identifies the
//! caller and travels inside every token as the `access_key` claim, while
//! the secret key only ever keys the HS256 signature and never leaves the
//! process.

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

/// Environment variable read by [`EnvCredentials::try_from_env`] for the access key.
pub const ACCESS_KEY_ENV: &str = "UPBIT_ACCESS_KEY";
/// Environment variable read by [`EnvCredentials::try_from_env`] for the secret key.
pub const SECRET_KEY_ENV: &str = "UPBIT_SECRET_KEY";

/// An Upbit access/secret key pair.
#[derive(Clone)]
pub struct Credentials {
    /// Sent in clear as the token's `access_key` claim.
    pub access_key: String,
    secret_key: SecretString,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: SecretString::from(secret_key.into()),
        }
    }

    /// The HMAC key for token signatures.
    pub fn expose_secret(&self) -> &str {
        self.secret_key.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// Source of the key pair used to sign private REST calls and private
/// stream subscriptions.
///
/// Consulted once per signed request, so an implementation backed by a
/// vault or a rotating store can hand out the current pair each time.
pub trait CredentialsProvider: Send + Sync {
    fn get_credentials(&self) -> &Credentials;
}

impl CredentialsProvider for Credentials {
    fn get_credentials(&self) -> &Credentials {
        self
    }
}

/// A fixed key pair known at construction time.
#[derive(Clone)]
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(access_key, secret_key),
        }
    }
}

impl CredentialsProvider for StaticCredentials {
    fn get_credentials(&self) -> &Credentials {
        &self.credentials
    }
}

impl CredentialsProvider for Arc<StaticCredentials> {
    fn get_credentials(&self) -> &Credentials {
        &self.credentials
    }
}

/// A key pair loaded once from the process environment.
///
/// Blank values count as unset, so a `.env` template with empty
/// `UPBIT_ACCESS_KEY=` lines yields no credentials instead of a key pair
/// that every private endpoint would reject.
pub struct EnvCredentials {
    credentials: Credentials,
}

impl EnvCredentials {
    /// Read `UPBIT_ACCESS_KEY` and `UPBIT_SECRET_KEY`.
    pub fn try_from_env() -> Option<Self> {
        Self::try_from_env_vars(ACCESS_KEY_ENV, SECRET_KEY_ENV)
    }

    /// Read the key pair from the named variables, `None` unless both are
    /// set and non-empty.
    pub fn try_from_env_vars(access_var: &str, secret_var: &str) -> Option<Self> {
        let non_empty = |var: &str| std::env::var(var).ok().filter(|v| !v.trim().is_empty());
        let access_key = non_empty(access_var)?;
        let secret_key = non_empty(secret_var)?;

        Some(Self {
            credentials: Credentials::new(access_key, secret_key),
        })
    }
}

impl CredentialsProvider for EnvCredentials {
    fn get_credentials(&self) -> &Credentials {
        &self.credentials
    }
}
