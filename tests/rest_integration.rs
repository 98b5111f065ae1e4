use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rust_decimal::Decimal;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use upbit_api_client::auth::StaticCredentials;
use upbit_api_client::rest::UpbitRestClient;
use upbit_api_client::rest::deposit::GenerateAddressResponse;
use upbit_api_client::rest::exchange::{OrderRequest, OrdersQuery};
use upbit_api_client::{OrderState, UpbitError};

fn build_client(server: &MockServer) -> UpbitRestClient {
    let credentials = Arc::new(StaticCredentials::new("test_access", "test_secret"));
    UpbitRestClient::builder()
        .base_url(server.uri())
        .credentials(credentials)
        .max_retries(0)
        .build()
}

fn build_public_client(server: &MockServer) -> UpbitRestClient {
    UpbitRestClient::builder()
        .base_url(server.uri())
        .max_retries(0)
        .build()
}

fn order_json(state: &str) -> serde_json::Value {
    serde_json::json!({
        "uuid": "cdd92199-2897-4e14-9448-f923320408ad",
        "side": "bid",
        "ord_type": "limit",
        "price": "100.0",
        "state": state,
        "market": "KRW-BTC",
        "created_at": "2018-04-10T15:42:23+09:00",
        "volume": "0.01",
        "remaining_volume": "0.01",
        "reserved_fee": "0.0015",
        "remaining_fee": "0.0015",
        "paid_fee": "0.0",
        "locked": "1.0015",
        "executed_volume": "0.0",
        "trades_count": 0
    })
}

/// Decode the claims of the bearer token attached to a request.
fn bearer_claims(request: &wiremock::Request) -> serde_json::Value {
    let header = request
        .headers
        .get("authorization")
        .expect("authorization header")
        .to_str()
        .unwrap();
    let token = header.strip_prefix("Bearer ").expect("bearer scheme");
    let payload = token.split('.').nth(1).unwrap();
    serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap()
}

#[tokio::test]
async fn test_tickers_are_public_and_parsed() {
    let server = MockServer::start().await;
    let response = serde_json::json!([{
        "market": "KRW-BTC",
        "trade_date": "20240101", "trade_time": "000000",
        "trade_date_kst": "20240101", "trade_time_kst": "090000",
        "trade_timestamp": 1704067200000_u64,
        "opening_price": 58000000.0, "high_price": 59000000.0,
        "low_price": 57500000.0, "trade_price": 58500000.0,
        "prev_closing_price": 58000000.0, "change": "RISE",
        "change_price": 500000.0, "change_rate": 0.0086,
        "signed_change_price": 500000.0, "signed_change_rate": 0.0086,
        "trade_volume": 0.01, "acc_trade_price": 1000000.0,
        "acc_trade_price_24h": 2000000.0, "acc_trade_volume": 2.5,
        "acc_trade_volume_24h": 5.0, "timestamp": 1704067200123_u64
    }]);

    Mock::given(method("GET"))
        .and(path("/v1/ticker"))
        .and(query_param("markets", "KRW-BTC,KRW-ETH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&server)
        .await;

    let client = build_public_client(&server);
    let tickers = assert_ok!(client.tickers(&["KRW-BTC", "KRW-ETH"]).await);
    assert_eq!(tickers.len(), 1);
    assert_eq!(tickers[0].trade_price, Decimal::from(58_500_000));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_accounts_are_signed() {
    let server = MockServer::start().await;
    let response = serde_json::json!([{
        "currency": "KRW",
        "balance": "1000000.0",
        "locked": "0.0",
        "avg_buy_price": "0",
        "avg_buy_price_modified": false,
        "unit_currency": "KRW"
    }]);

    Mock::given(method("GET"))
        .and(path("/v1/accounts"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&server)
        .await;

    let client = build_client(&server);
    let accounts = assert_ok!(client.accounts().await);
    assert_eq!(accounts[0].currency, "KRW");
    assert_eq!(accounts[0].total(), Decimal::from(1_000_000));

    let requests = server.received_requests().await.unwrap();
    let claims = bearer_claims(&requests[0]);
    assert_eq!(claims["access_key"], "test_access");
    assert!(claims["nonce"].is_string());
    assert!(claims.get("query_hash").is_none());
}

#[tokio::test]
async fn test_orders_query_repeats_array_keys_and_hashes_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/orders"))
        .and(query_param("market", "KRW-BTC"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([order_json("wait")])),
        )
        .mount(&server)
        .await;

    let client = build_client(&server);
    let query = OrdersQuery::market("KRW-BTC").states([OrderState::Wait, OrderState::Watch]);
    let orders = assert_ok!(client.orders(&query).await);
    assert_eq!(orders.len(), 1);
    assert!(orders[0].is_open());

    let requests = server.received_requests().await.unwrap();
    let query_string = requests[0].url.query().unwrap();
    assert_eq!(
        query_string,
        "market=KRW-BTC&states%5B%5D=wait&states%5B%5D=watch"
    );
    let claims = bearer_claims(&requests[0]);
    assert_eq!(claims["query_hash_alg"], "SHA512");
    assert_eq!(claims["query_hash"].as_str().unwrap().len(), 128);
}

#[tokio::test]
async fn test_place_order_sends_sorted_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(order_json("wait")))
        .mount(&server)
        .await;

    let client = build_client(&server);
    let request = OrderRequest::limit_buy("KRW-BTC", Decimal::from(100), Decimal::new(1, 2));
    let order = assert_ok!(client.place_order(&request).await);
    assert_eq!(order.market, "KRW-BTC");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        String::from_utf8(requests[0].body.clone()).unwrap(),
        r#"{"market":"KRW-BTC","ord_type":"limit","price":"100","side":"bid","volume":"0.01"}"#
    );
    assert!(bearer_claims(&requests[0])["query_hash"].is_string());
}

#[tokio::test]
async fn test_buy_limit_rejects_off_tick_price() {
    let server = MockServer::start().await;
    let client = build_client(&server);

    let err = assert_err!(
        client
            .buy_limit("KRW-BTC", Decimal::from(50_000_500), Decimal::ONE)
            .await
    );
    assert_eq!(
        err.to_string(),
        "Validation error: Price 50000500 doesn't match tick size for KRW-BTC"
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_order_requires_an_identifier() {
    let server = MockServer::start().await;
    let client = build_client(&server);

    let err = assert_err!(client.order(None, None).await);
    assert!(matches!(err, UpbitError::Validation(ref m) if m == "Either uuid or identifier must be provided"));

    let err = assert_err!(client.cancel_order(None, None).await);
    assert!(matches!(err, UpbitError::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_private_call_without_credentials() {
    let server = MockServer::start().await;
    let client = build_public_client(&server);

    let err = assert_err!(client.accounts().await);
    assert!(matches!(err, UpbitError::MissingCredentials));
    assert!(err.is_auth());
}

#[tokio::test]
async fn test_too_many_requests_maps_to_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/orderbook"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "1.5")
                .set_body_json(serde_json::json!({
                    "error": {"name": "too_many_requests", "message": "Too many API requests."}
                })),
        )
        .mount(&server)
        .await;

    let client = build_public_client(&server);
    let err = assert_err!(client.orderbooks(&["KRW-BTC"]).await);
    match err {
        UpbitError::RateLimitExceeded {
            message,
            retry_after_ms,
        } => {
            assert_eq!(message, "Too many API requests.");
            assert_eq!(retry_after_ms, Some(1500));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized_maps_to_auth() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/accounts"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"name": "invalid_access_key", "message": "잘못된 엑세스 키입니다."}
        })))
        .mount(&server)
        .await;

    let client = build_client(&server);
    let err = assert_err!(client.accounts().await);
    assert!(matches!(err, UpbitError::Auth(_)));
}

#[tokio::test]
async fn test_api_error_carries_server_name() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {"name": "insufficient_funds_bid", "message": "매수가능 금액이 부족합니다."}
        })))
        .mount(&server)
        .await;

    let client = build_client(&server);
    let err = assert_err!(
        client
            .buy_market("KRW-BTC", Decimal::from(10_000))
            .await
    );
    match err {
        UpbitError::Api { status, name, .. } => {
            assert_eq!(status, 400);
            assert_eq!(name.as_deref(), Some("insufficient_funds_bid"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_remaining_req_header_tightens_limiter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/accounts"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Remaining-Req", "group=default; min=1800; sec=3")
                .set_body_json(serde_json::json!([])),
        )
        .mount(&server)
        .await;

    let client = build_client(&server);
    assert_ok!(client.accounts().await);

    let exchange = client.rate_limiters().exchange.lock().await;
    assert_eq!(exchange.server_remaining(), Some(3));
    assert_eq!(exchange.effective_capacity(), 3);
    drop(exchange);

    let quotation = client.rate_limiters().quotation.lock().await;
    assert_eq!(quotation.server_remaining(), None);
}

#[tokio::test]
async fn test_local_limit_fails_fast_without_auto_wait() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/market/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let client = UpbitRestClient::builder()
        .base_url(server.uri())
        .max_retries(0)
        .rate_limits(1, 8)
        .auto_wait(false)
        .build();

    assert_ok!(client.markets(false).await);
    let err = assert_err!(client.markets(false).await);
    assert!(err.is_rate_limit());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_withdraw_chance_passes_net_type() {
    let server = MockServer::start().await;
    let response = serde_json::json!({
        "member_level": {
            "security_level": 3, "fee_level": 0, "email_verified": true,
            "identity_verified": true, "bank_account_verified": true,
            "kakao_pay_auth_verified": false, "second_auth_verified": true
        },
        "currency": {
            "code": "XRP", "withdraw_fee": "1", "is_coin": true,
            "wallet_state": "working", "wallet_support": ["deposit", "withdraw"]
        },
        "account": {
            "currency": "XRP", "balance": "100.0", "locked": "0.0",
            "avg_buy_price": "700", "avg_buy_price_modified": false, "unit_currency": "KRW"
        },
        "withdraw_limit": {
            "currency": "XRP", "minimum": "21", "onetime": null, "daily": null,
            "remaining_daily": null, "remaining_daily_krw": "1000000",
            "fixed": 6, "can_withdraw": true
        }
    });

    Mock::given(method("GET"))
        .and(path("/v1/withdraws/chance"))
        .and(query_param("currency", "XRP"))
        .and(query_param("net_type", "XRP"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&server)
        .await;

    let client = build_client(&server);
    let chance = assert_ok!(client.withdraw_chance("XRP", Some("XRP")).await);
    assert_eq!(chance.withdrawal_limit.minimum, Some(Decimal::from(21)));
    assert_eq!(chance.withdrawal_limit.fixed, Some(6));
}

#[tokio::test]
async fn test_generate_coin_address_pending() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/deposits/generate_coin_address"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "success": true,
            "message": "BTC 입금주소를 생성중입니다."
        })))
        .mount(&server)
        .await;

    let client = build_client(&server);
    let response = assert_ok!(client.generate_coin_address("BTC", "BTC").await);
    assert!(matches!(response, GenerateAddressResponse::Pending { success: true, .. }));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        String::from_utf8(requests[0].body.clone()).unwrap(),
        r#"{"currency":"BTC","net_type":"BTC"}"#
    );
}

#[tokio::test]
async fn test_minute_candles_rejects_unknown_unit() {
    let server = MockServer::start().await;
    let client = build_public_client(&server);

    let request = upbit_api_client::rest::quotation::CandlesRequest::new("KRW-BTC");
    let err = assert_err!(client.minute_candles(2, &request).await);
    assert!(matches!(err, UpbitError::Validation(_)));
}
