//! Types for withdrawal endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use time::OffsetDateTime;

use crate::error::UpbitError;
use crate::types::serde_helpers::rfc3339;

/// A withdrawal record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Withdrawal {
    /// Always `withdraw`
    #[serde(rename = "type")]
    pub kind: String,
    pub uuid: String,
    pub currency: String,
    #[serde(default)]
    pub net_type: Option<String>,
    #[serde(default)]
    pub txid: Option<String>,
    /// Processing state (e.g. `WAITING`, `PROCESSING`, `DONE`, `CANCELED`)
    pub state: String,
    #[serde(with = "rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "rfc3339::option")]
    pub done_at: Option<OffsetDateTime>,
    pub amount: Decimal,
    pub fee: Decimal,
    /// `default` or `internal`
    pub transaction_type: String,
    #[serde(default)]
    pub is_cancelable: bool,
}

/// Account verification and fee level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberLevel {
    pub security_level: u32,
    pub fee_level: u32,
    pub email_verified: bool,
    pub identity_verified: bool,
    pub bank_account_verified: bool,
    pub kakao_pay_auth_verified: bool,
    pub second_auth_verified: bool,
    #[serde(default)]
    pub deposit_user_level: Option<u32>,
}

/// Withdrawal properties of a currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalCurrency {
    pub code: String,
    pub withdraw_fee: Decimal,
    pub is_coin: bool,
    pub wallet_state: String,
    #[serde(default)]
    pub wallet_support: Vec<String>,
}

/// Balance of the currency being withdrawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalAccount {
    pub currency: String,
    pub balance: Decimal,
    pub locked: Decimal,
    pub avg_buy_price: Decimal,
    pub avg_buy_price_modified: bool,
    pub unit_currency: String,
}

/// Withdrawal limits for a currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalLimit {
    pub currency: String,
    #[serde(default)]
    pub minimum: Option<Decimal>,
    #[serde(default)]
    pub onetime: Option<Decimal>,
    #[serde(default)]
    pub daily: Option<Decimal>,
    #[serde(default, alias = "remain_daily")]
    pub remaining_daily: Option<Decimal>,
    #[serde(default)]
    pub remaining_daily_krw: Option<Decimal>,
    /// Decimal places allowed in the amount
    #[serde(default)]
    pub fixed: Option<u32>,
    pub can_withdraw: bool,
    #[serde(default)]
    pub maximum: Option<Decimal>,
}

/// Everything needed to decide whether a withdrawal is possible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalChance {
    pub member_level: MemberLevel,
    pub currency: WithdrawalCurrency,
    pub account: WithdrawalAccount,
    #[serde(alias = "withdraw_limit")]
    pub withdrawal_limit: WithdrawalLimit,
}

/// Request body for a digital asset withdrawal.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub currency: String,
    pub net_type: Option<String>,
    pub amount: Decimal,
    /// Destination address, which must be registered for withdrawals
    pub address: String,
    /// Memo or destination tag
    pub secondary_address: Option<String>,
    /// `default` or `internal`
    pub transaction_type: String,
}

impl WithdrawRequest {
    /// Withdraw `amount` of `currency` to `address`.
    pub fn new(currency: impl Into<String>, amount: Decimal, address: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            net_type: None,
            amount,
            address: address.into(),
            secondary_address: None,
            transaction_type: "default".to_string(),
        }
    }

    /// Set the network.
    pub fn net_type(mut self, net_type: impl Into<String>) -> Self {
        self.net_type = Some(net_type.into());
        self
    }

    /// Set the memo or destination tag.
    pub fn secondary_address(mut self, secondary: impl Into<String>) -> Self {
        self.secondary_address = Some(secondary.into());
        self
    }

    /// Use an internal (same-exchange) transfer.
    pub fn internal(mut self) -> Self {
        self.transaction_type = "internal".to_string();
        self
    }

    pub(super) fn validate(&self) -> Result<(), UpbitError> {
        if self.amount <= Decimal::ZERO {
            return Err(UpbitError::Validation(
                "Withdrawal amount must be positive".to_string(),
            ));
        }
        if self.address.is_empty() {
            return Err(UpbitError::Validation(
                "Withdrawal address must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Filters for listing withdrawals.
#[derive(Debug, Clone, Default)]
pub struct WithdrawsQuery {
    pub currency: Option<String>,
    pub state: Option<String>,
    pub uuids: Vec<String>,
    pub txids: Vec<String>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
    pub order_by: Option<String>,
}

impl WithdrawsQuery {
    /// Withdrawals of one currency.
    pub fn currency(currency: impl Into<String>) -> Self {
        Self {
            currency: Some(currency.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct KrwAmount {
    pub amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_withdraw_request_body() {
        let body = serde_json::to_value(
            WithdrawRequest::new("XRP", Decimal::from(20), "rAddr").secondary_address("1234"),
        )
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "currency": "XRP",
                "amount": "20",
                "address": "rAddr",
                "secondary_address": "1234",
                "transaction_type": "default"
            })
        );
    }

    #[test]
    fn test_withdraw_request_validation() {
        assert!(WithdrawRequest::new("BTC", Decimal::ZERO, "addr").validate().is_err());
        assert!(WithdrawRequest::new("BTC", Decimal::ONE, "").validate().is_err());
        assert!(WithdrawRequest::new("BTC", Decimal::ONE, "addr").validate().is_ok());
    }

    #[test]
    fn test_withdrawal_chance_parses() {
        let json = r#"{
            "member_level": {
                "security_level": 3, "fee_level": 0,
                "email_verified": true, "identity_verified": true,
                "bank_account_verified": true, "kakao_pay_auth_verified": false,
                "locked": false, "wallet_locked": false,
                "second_auth_verified": true
            },
            "currency": {
                "code": "BTC", "withdraw_fee": "0.0005", "is_coin": true,
                "wallet_state": "working", "wallet_support": ["deposit", "withdraw"]
            },
            "account": {
                "currency": "BTC", "balance": "10.0", "locked": "0.0",
                "avg_buy_price": "8042000", "avg_buy_price_modified": false,
                "unit_currency": "KRW"
            },
            "withdraw_limit": {
                "currency": "BTC", "minimum": null, "onetime": null, "daily": "10.0",
                "remaining_daily": "10.0", "remaining_daily_krw": "0.0",
                "fixed": null, "can_withdraw": true
            }
        }"#;
        let chance: WithdrawalChance = serde_json::from_str(json).unwrap();
        assert!(chance.withdrawal_limit.can_withdraw);
        assert_eq!(chance.currency.wallet_support.len(), 2);
        assert_eq!(chance.withdrawal_limit.daily, Some(Decimal::from(10)));
        assert!(chance.member_level.deposit_user_level.is_none());
    }
}
