//! Exchange REST endpoints: balances, API keys and orders.
//!
//! All calls require credentials and are routed through the exchange
//! rate limit group.

mod tick;
mod types;

pub use tick::{tick_size, validate_price_tick};
pub use types::*;

use rust_decimal::Decimal;

use crate::error::UpbitError;
use crate::rest::UpbitRestClient;
use crate::rest::client::{QueryParams, require_either};
use crate::rest::endpoints::exchange;

impl UpbitRestClient {
    /// Get balances of all currencies held.
    pub async fn accounts(&self) -> Result<Vec<Account>, UpbitError> {
        self.private_get(exchange::ACCOUNTS, QueryParams::new())
            .await
    }

    /// List API keys and their expiry.
    pub async fn api_keys(&self) -> Result<Vec<ApiKey>, UpbitError> {
        self.private_get(exchange::API_KEYS, QueryParams::new())
            .await
    }

    /// Place an order.
    ///
    /// The request is validated locally before anything is sent.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use rust_decimal::Decimal;
    /// use upbit_api_client::auth::EnvCredentials;
    /// use upbit_api_client::rest::UpbitRestClient;
    /// use upbit_api_client::rest::exchange::OrderRequest;
    /// use std::sync::Arc;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let credentials = EnvCredentials::try_from_env().ok_or("missing credentials")?;
    ///     let client = UpbitRestClient::builder()
    ///         .credentials(Arc::new(credentials))
    ///         .build();
    ///
    ///     let request = OrderRequest::market_buy("KRW-BTC", Decimal::from(10_000));
    ///     let order = client.place_order(&request).await?;
    ///     println!("Placed {}", order.uuid);
    ///     Ok(())
    /// }
    /// ```
    pub async fn place_order(&self, request: &OrderRequest) -> Result<Order, UpbitError> {
        request.validate()?;
        self.private_post(exchange::ORDERS, request).await
    }

    /// Place a limit buy, rejecting prices that are off the tick grid.
    pub async fn buy_limit(
        &self,
        market: &str,
        price: Decimal,
        volume: Decimal,
    ) -> Result<Order, UpbitError> {
        ensure_tick(market, price)?;
        self.place_order(&OrderRequest::limit_buy(market, price, volume))
            .await
    }

    /// Place a limit sell, rejecting prices that are off the tick grid.
    pub async fn sell_limit(
        &self,
        market: &str,
        price: Decimal,
        volume: Decimal,
    ) -> Result<Order, UpbitError> {
        ensure_tick(market, price)?;
        self.place_order(&OrderRequest::limit_sell(market, price, volume))
            .await
    }

    /// Buy at market price, spending `price` of the quote currency.
    pub async fn buy_market(&self, market: &str, price: Decimal) -> Result<Order, UpbitError> {
        self.place_order(&OrderRequest::market_buy(market, price))
            .await
    }

    /// Sell `volume` at market price.
    pub async fn sell_market(&self, market: &str, volume: Decimal) -> Result<Order, UpbitError> {
        self.place_order(&OrderRequest::market_sell(market, volume))
            .await
    }

    /// Get a single order by uuid or client identifier.
    pub async fn order(
        &self,
        uuid: Option<&str>,
        identifier: Option<&str>,
    ) -> Result<Order, UpbitError> {
        let query = require_either(("uuid", uuid), ("identifier", identifier))?;
        self.private_get(exchange::ORDER, query).await
    }

    /// List orders matching `query`.
    pub async fn orders(&self, query: &OrdersQuery) -> Result<Vec<Order>, UpbitError> {
        let params = QueryParams::new()
            .push_opt("market", query.market.as_deref())
            .push_opt("state", query.state)
            .push_each("states[]", &query.states)
            .push_each("uuids[]", &query.uuids)
            .push_each("identifiers[]", &query.identifiers)
            .push_opt("page", query.page)
            .push_opt("limit", query.limit)
            .push_opt("order_by", query.order_by.as_deref());
        self.private_get(exchange::ORDERS, params).await
    }

    /// Cancel an order by uuid or client identifier.
    pub async fn cancel_order(
        &self,
        uuid: Option<&str>,
        identifier: Option<&str>,
    ) -> Result<Order, UpbitError> {
        let query = require_either(("uuid", uuid), ("identifier", identifier))?;
        tracing::info!(?uuid, ?identifier, "cancelling order");
        self.private_delete(exchange::ORDER, query).await
    }
}

fn ensure_tick(market: &str, price: Decimal) -> Result<(), UpbitError> {
    if validate_price_tick(market, price) {
        Ok(())
    } else {
        Err(UpbitError::Validation(format!(
            "Price {price} doesn't match tick size for {market}"
        )))
    }
}
