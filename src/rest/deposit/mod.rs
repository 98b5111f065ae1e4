//! Deposit REST endpoints.

mod types;

pub use types::*;

use rust_decimal::Decimal;

use crate::error::UpbitError;
use crate::rest::UpbitRestClient;
use crate::rest::client::{QueryParams, require_either};
use crate::rest::endpoints::deposit;

impl UpbitRestClient {
    /// List deposits.
    pub async fn deposits(&self, query: &DepositsQuery) -> Result<Vec<Deposit>, UpbitError> {
        let params = QueryParams::new()
            .push_opt("currency", query.currency.as_deref())
            .push_opt("state", query.state.as_deref())
            .push_each("uuids[]", &query.uuids)
            .push_each("txids[]", &query.txids)
            .push_opt("limit", query.limit)
            .push_opt("page", query.page)
            .push_opt("order_by", query.order_by.as_deref());
        self.private_get(deposit::DEPOSITS, params).await
    }

    /// Get a single deposit by uuid or transaction id.
    pub async fn deposit(
        &self,
        uuid: Option<&str>,
        txid: Option<&str>,
    ) -> Result<Deposit, UpbitError> {
        let query = require_either(("uuid", uuid), ("txid", txid))?;
        self.private_get(deposit::DEPOSIT, query).await
    }

    /// Request a deposit address for `currency` on `net_type`.
    pub async fn generate_coin_address(
        &self,
        currency: &str,
        net_type: &str,
    ) -> Result<GenerateAddressResponse, UpbitError> {
        let body = AddressRequest { currency, net_type };
        self.private_post(deposit::GENERATE_COIN_ADDRESS, &body)
            .await
    }

    /// List all issued deposit addresses.
    pub async fn coin_addresses(&self) -> Result<Vec<DepositAddress>, UpbitError> {
        self.private_get(deposit::COIN_ADDRESSES, QueryParams::new())
            .await
    }

    /// Get the deposit address for one currency.
    pub async fn coin_address(
        &self,
        currency: &str,
        net_type: Option<&str>,
    ) -> Result<DepositAddress, UpbitError> {
        let query = QueryParams::new()
            .push("currency", currency)
            .push_opt("net_type", net_type);
        self.private_get(deposit::COIN_ADDRESS, query).await
    }

    /// Deposit KRW from the registered bank account.
    pub async fn deposit_krw(&self, amount: Decimal) -> Result<Deposit, UpbitError> {
        self.private_post(deposit::KRW, &KrwAmount { amount }).await
    }
}
