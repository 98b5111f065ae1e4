//! Types for deposit endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::serde_helpers::rfc3339;

/// A deposit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deposit {
    /// Always `deposit`
    #[serde(rename = "type")]
    pub kind: String,
    pub uuid: String,
    pub currency: String,
    #[serde(default)]
    pub net_type: Option<String>,
    /// On-chain transaction id
    #[serde(default)]
    pub txid: Option<String>,
    /// Processing state (e.g. `PROCESSING`, `ACCEPTED`, `REJECTED`)
    pub state: String,
    #[serde(with = "rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "rfc3339::option")]
    pub done_at: Option<OffsetDateTime>,
    pub amount: Decimal,
    pub fee: Decimal,
    /// `default` or `internal`
    pub transaction_type: String,
}

/// A deposit address for one currency and network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositAddress {
    pub currency: String,
    #[serde(default)]
    pub net_type: Option<String>,
    /// `None` while the address is still being issued
    #[serde(default)]
    pub deposit_address: Option<String>,
    /// Memo or destination tag
    #[serde(default)]
    pub secondary_address: Option<String>,
}

/// Response to an address generation request.
///
/// Addresses are issued asynchronously: the first call usually returns a
/// status message and the address becomes available later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerateAddressResponse {
    /// Address is already available.
    Address(DepositAddress),
    /// Issuance has been requested.
    Pending { success: bool, message: String },
}

/// Filters for listing deposits.
#[derive(Debug, Clone, Default)]
pub struct DepositsQuery {
    pub currency: Option<String>,
    pub state: Option<String>,
    pub uuids: Vec<String>,
    pub txids: Vec<String>,
    /// Page size (max 100)
    pub limit: Option<u32>,
    pub page: Option<u32>,
    /// `asc` or `desc`
    pub order_by: Option<String>,
}

impl DepositsQuery {
    /// Deposits of one currency.
    pub fn currency(currency: impl Into<String>) -> Self {
        Self {
            currency: Some(currency.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct AddressRequest<'a> {
    pub currency: &'a str,
    pub net_type: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct KrwAmount {
    pub amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_address_variants() {
        let pending: GenerateAddressResponse = serde_json::from_str(
            r#"{"success":true,"message":"BTC 입금주소를 생성중입니다."}"#,
        )
        .unwrap();
        assert!(matches!(pending, GenerateAddressResponse::Pending { success: true, .. }));

        let ready: GenerateAddressResponse = serde_json::from_str(
            r#"{"currency":"BTC","net_type":"BTC","deposit_address":"3EusRwybuZUhVDeHL7gh3HSLmbhLcy7NqD","secondary_address":null}"#,
        )
        .unwrap();
        match ready {
            GenerateAddressResponse::Address(addr) => {
                assert_eq!(addr.currency, "BTC");
                assert!(addr.secondary_address.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_deposit_without_done_at() {
        let json = r#"{
            "type": "deposit",
            "uuid": "94332e99-3a87-4a35-ad98-28b0c969f830",
            "currency": "KRW",
            "txid": "9e37c537-6849-4c8b-a134-57313f5dfc5a",
            "state": "PROCESSING",
            "created_at": "2017-12-08T15:38:02+09:00",
            "done_at": null,
            "amount": "10000.0",
            "fee": "0.0",
            "transaction_type": "default"
        }"#;
        let deposit: Deposit = serde_json::from_str(json).unwrap();
        assert_eq!(deposit.kind, "deposit");
        assert!(deposit.done_at.is_none());
        assert!(deposit.net_type.is_none());
        assert_eq!(deposit.amount, Decimal::from(10_000));
    }
}
