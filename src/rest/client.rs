//! Upbit REST API client implementation.

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use reqwest_tracing::TracingMiddleware;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::{
    CredentialsProvider, NonceProvider, UuidNonce, authorization_header, canonical_body,
    canonical_query, sign_using,
};
use crate::error::UpbitError;
use crate::rate_limit::{EXCHANGE_CAPACITY, QUOTATION_CAPACITY, RateLimiters};
use crate::rest::endpoints::UPBIT_BASE_URL;

/// The Upbit REST API client.
///
/// Every request passes through the rate limiter for its endpoint group,
/// is signed when it targets a private endpoint, and feeds the
/// `Remaining-Req` header of the response back into the limiter.
///
/// # Example
///
/// ```rust,no_run
/// use upbit_api_client::rest::UpbitRestClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Create a client for quotation endpoints only
///     let client = UpbitRestClient::new();
///
///     let books = client.orderbooks(&["KRW-BTC"]).await?;
///     println!("Best ask: {}", books[0].orderbook_units[0].ask_price);
///
///     Ok(())
/// }
/// ```
///
/// For private endpoints, provide credentials:
///
/// ```rust,no_run
/// use upbit_api_client::rest::UpbitRestClient;
/// use upbit_api_client::auth::StaticCredentials;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let credentials = Arc::new(StaticCredentials::new("access_key", "secret_key"));
///     let client = UpbitRestClient::builder()
///         .credentials(credentials)
///         .build();
///
///     let accounts = client.accounts().await?;
///     println!("Accounts: {:?}", accounts);
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct UpbitRestClient {
    http_client: ClientWithMiddleware,
    base_url: String,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    nonce_provider: Arc<dyn NonceProvider>,
    limiters: RateLimiters,
}

impl UpbitRestClient {
    /// Create a new client with default settings.
    ///
    /// This client can only access quotation endpoints.
    /// Use [`UpbitRestClient::builder()`] to configure credentials for private endpoints.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new client builder.
    pub fn builder() -> UpbitRestClientBuilder {
        UpbitRestClientBuilder::new()
    }

    /// The rate limiters this client routes requests through.
    pub fn rate_limiters(&self) -> &RateLimiters {
        &self.limiters
    }

    /// Whether credentials are configured.
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Make an unauthenticated GET request.
    pub(crate) async fn public_get<T>(&self, path: &str, query: QueryParams) -> Result<T, UpbitError>
    where
        T: DeserializeOwned,
    {
        self.execute(Method::GET, path, query, None, false).await
    }

    /// Make an authenticated GET request.
    pub(crate) async fn private_get<T>(&self, path: &str, query: QueryParams) -> Result<T, UpbitError>
    where
        T: DeserializeOwned,
    {
        self.execute(Method::GET, path, query, None, true).await
    }

    /// Make an authenticated DELETE request.
    pub(crate) async fn private_delete<T>(
        &self,
        path: &str,
        query: QueryParams,
    ) -> Result<T, UpbitError>
    where
        T: DeserializeOwned,
    {
        self.execute(Method::DELETE, path, query, None, true).await
    }

    /// Make an authenticated POST request with a JSON body.
    pub(crate) async fn private_post<T, B>(&self, path: &str, body: &B) -> Result<T, UpbitError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.execute(Method::POST, path, QueryParams::new(), Some(body), true)
            .await
    }

    async fn execute<T>(
        &self,
        method: Method,
        path: &str,
        query: QueryParams,
        body: Option<Value>,
        signed: bool,
    ) -> Result<T, UpbitError>
    where
        T: DeserializeOwned,
    {
        let credentials = if signed {
            Some(
                self.credentials
                    .as_ref()
                    .ok_or(UpbitError::MissingCredentials)?,
            )
        } else {
            None
        };

        let limiter = self.limiters.for_path(path);
        limiter.acquire().await?;

        let pairs = query.into_pairs();
        let query_string = canonical_query(&pairs)?;
        let url = if query_string.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}{}?{}", self.base_url, path, query_string)
        };

        let mut request = self.http_client.request(method.clone(), &url);

        if let Some(provider) = credentials {
            // Fresh token per request: nonces are single use.
            let token = sign_using(
                self.nonce_provider.as_ref(),
                provider.get_credentials(),
                &pairs,
                body.as_ref(),
            )?;
            request = request.header(AUTHORIZATION, authorization_header(&token));
        }

        if let Some(body) = &body {
            request = request
                .header(CONTENT_TYPE, "application/json; charset=utf-8")
                .body(canonical_body(body)?);
        }

        tracing::debug!(%method, path, "sending request");
        let response = request.send().await?;

        limiter.observe(response.headers()).await;

        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await?;

        if let Some(err) = UpbitError::from_status(status, &headers, &text) {
            tracing::warn!(%method, path, status = status.as_u16(), "request failed: {}", err);
            return Err(err);
        }

        serde_json::from_str(&text).map_err(|e| {
            UpbitError::InvalidResponse(format!("Failed to parse response: {}. Body: {}", e, text))
        })
    }
}

impl Default for UpbitRestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UpbitRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpbitRestClient")
            .field("base_url", &self.base_url)
            .field("has_credentials", &self.credentials.is_some())
            .finish()
    }
}

/// Builder for [`UpbitRestClient`].
pub struct UpbitRestClientBuilder {
    base_url: String,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    nonce_provider: Option<Arc<dyn NonceProvider>>,
    user_agent: Option<String>,
    max_retries: u32,
    quotation_capacity: u32,
    exchange_capacity: u32,
    auto_wait: bool,
    limiters: Option<RateLimiters>,
}

impl UpbitRestClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: UPBIT_BASE_URL.to_string(),
            credentials: None,
            nonce_provider: None,
            user_agent: None,
            max_retries: 3,
            quotation_capacity: QUOTATION_CAPACITY,
            exchange_capacity: EXCHANGE_CAPACITY,
            auto_wait: true,
            limiters: None,
        }
    }

    /// Set the base URL (useful for testing with a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the credentials provider for authenticated requests.
    pub fn credentials(mut self, credentials: Arc<dyn CredentialsProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set a custom nonce provider.
    pub fn nonce_provider(mut self, provider: Arc<dyn NonceProvider>) -> Self {
        self.nonce_provider = Some(provider);
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the maximum number of retries for transient failures.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the per-second capacities of the quotation and exchange groups.
    pub fn rate_limits(mut self, quotation: u32, exchange: u32) -> Self {
        self.quotation_capacity = quotation;
        self.exchange_capacity = exchange;
        self
    }

    /// Fail with [`UpbitError::RateLimitExceeded`] instead of waiting when a
    /// group is at capacity.
    pub fn auto_wait(mut self, auto_wait: bool) -> Self {
        self.auto_wait = auto_wait;
        self
    }

    /// Share existing limiters, e.g. between several clients using the same key.
    pub fn rate_limiters(mut self, limiters: RateLimiters) -> Self {
        self.limiters = Some(limiters);
        self
    }

    /// Build the client.
    pub fn build(self) -> UpbitRestClient {
        // Build default headers.
        let mut headers = HeaderMap::new();
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("upbit-api-client/{}", env!("CARGO_PKG_VERSION")));
        let header_value = HeaderValue::from_str(&user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("upbit-api-client"));
        headers.insert(USER_AGENT, header_value);

        // Build the HTTP client with middleware.
        let reqwest_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(self.max_retries);

        let client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let nonce_provider = self
            .nonce_provider
            .unwrap_or_else(|| Arc::new(UuidNonce::new()));

        let limiters = self.limiters.unwrap_or_else(|| {
            RateLimiters::new(self.quotation_capacity, self.exchange_capacity, self.auto_wait)
        });

        UpbitRestClient {
            http_client: client,
            base_url: self.base_url,
            credentials: self.credentials,
            nonce_provider,
            limiters,
        }
    }
}

impl Default for UpbitRestClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered query parameters for a request.
///
/// `None` values are skipped, booleans are sent as `true`/`false` and
/// array parameters repeat their `key[]` name once per value.
#[derive(Debug, Clone, Default)]
pub(crate) struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    pub(crate) fn push_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.push(key, value),
            None => self,
        }
    }

    /// Join values with commas under a single key (e.g. `markets=KRW-BTC,KRW-ETH`).
    pub(crate) fn push_joined<V: AsRef<str>>(self, key: &str, values: &[V]) -> Self {
        if values.is_empty() {
            return self;
        }
        let joined = values
            .iter()
            .map(|v| v.as_ref())
            .collect::<Vec<_>>()
            .join(",");
        self.push(key, joined)
    }

    /// Repeat `key` once per value (e.g. `states[]=wait&states[]=done`).
    pub(crate) fn push_each<V: ToString>(mut self, key: &str, values: &[V]) -> Self {
        for value in values {
            self.pairs.push((key.to_string(), value.to_string()));
        }
        self
    }

    pub(crate) fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }
}

/// Require one of two alternative identifiers.
pub(crate) fn require_either(
    first: (&str, Option<&str>),
    second: (&str, Option<&str>),
) -> Result<QueryParams, UpbitError> {
    if first.1.is_none() && second.1.is_none() {
        return Err(UpbitError::Validation(format!(
            "Either {} or {} must be provided",
            first.0, second.0
        )));
    }
    Ok(QueryParams::new()
        .push_opt(first.0, first.1)
        .push_opt(second.0, second.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params_encoding_rules() {
        let pairs = QueryParams::new()
            .push("market", "KRW-BTC")
            .push_opt::<u32>("count", None)
            .push_opt("isDetails", Some(true))
            .push_joined("markets", &["KRW-BTC", "KRW-ETH"])
            .push_each("states[]", &["wait", "done"])
            .into_pairs();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["market", "isDetails", "markets", "states[]", "states[]"]);
        assert_eq!(pairs[1].1, "true");
        assert_eq!(pairs[2].1, "KRW-BTC,KRW-ETH");
    }

    #[test]
    fn test_require_either() {
        let err = require_either(("uuid", None), ("identifier", None)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Either uuid or identifier must be provided"
        );
        let pairs = require_either(("uuid", Some("abc")), ("identifier", None))
            .unwrap()
            .into_pairs();
        assert_eq!(pairs, vec![("uuid".to_string(), "abc".to_string())]);
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = UpbitRestClient::builder()
            .base_url("http://localhost:1234/")
            .build();
        assert_eq!(client.base_url, "http://localhost:1234");
        assert!(!client.has_credentials());
    }
}
