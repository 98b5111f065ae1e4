//! Withdrawal REST endpoints.

mod types;

pub use types::*;

use rust_decimal::Decimal;

use crate::error::UpbitError;
use crate::rest::UpbitRestClient;
use crate::rest::client::{QueryParams, require_either};
use crate::rest::endpoints::withdrawal;

impl UpbitRestClient {
    /// List withdrawals.
    pub async fn withdraws(&self, query: &WithdrawsQuery) -> Result<Vec<Withdrawal>, UpbitError> {
        let params = QueryParams::new()
            .push_opt("currency", query.currency.as_deref())
            .push_opt("state", query.state.as_deref())
            .push_each("uuids[]", &query.uuids)
            .push_each("txids[]", &query.txids)
            .push_opt("limit", query.limit)
            .push_opt("page", query.page)
            .push_opt("order_by", query.order_by.as_deref());
        self.private_get(withdrawal::WITHDRAWS, params).await
    }

    /// Get a single withdrawal by uuid or transaction id.
    pub async fn withdraw(
        &self,
        uuid: Option<&str>,
        txid: Option<&str>,
    ) -> Result<Withdrawal, UpbitError> {
        let query = require_either(("uuid", uuid), ("txid", txid))?;
        self.private_get(withdrawal::WITHDRAW, query).await
    }

    /// Get withdrawal limits, fees and balance for a currency.
    pub async fn withdraw_chance(
        &self,
        currency: &str,
        net_type: Option<&str>,
    ) -> Result<WithdrawalChance, UpbitError> {
        let query = QueryParams::new()
            .push("currency", currency)
            .push_opt("net_type", net_type);
        self.private_get(withdrawal::CHANCE, query).await
    }

    /// Withdraw a digital asset to a registered address.
    pub async fn withdraw_coin(&self, request: &WithdrawRequest) -> Result<Withdrawal, UpbitError> {
        request.validate()?;
        tracing::info!(
            currency = %request.currency,
            amount = %request.amount,
            "requesting withdrawal"
        );
        self.private_post(withdrawal::COIN, request).await
    }

    /// Withdraw KRW to the registered bank account.
    pub async fn withdraw_krw(&self, amount: Decimal) -> Result<Withdrawal, UpbitError> {
        if amount <= Decimal::ZERO {
            return Err(UpbitError::Validation(
                "Withdrawal amount must be positive".to_string(),
            ));
        }
        self.private_post(withdrawal::KRW, &KrwAmount { amount })
            .await
    }
}
