//! JWT generation for Upbit API authentication.
//!
//! Every private request (and every private WebSocket subscription) carries
//! `Authorization: Bearer <token>` where the token is an HS256 JWT:
//!
//! ```text
//! base64url(header) . base64url(payload) . base64url(HMAC-SHA256(secret, header.payload))
//! ```
//!
//! The payload always holds `access_key`, a single-use `nonce` and a
//! millisecond `timestamp`. Requests with parameters add `query_hash`, the
//! SHA-512 hex digest of the alphabetically sorted, URL-encoded query string,
//! or of the compact sorted-key JSON body when a body is sent.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256, Sha512};

use crate::auth::{Credentials, NonceProvider, UuidNonce};
use crate::error::UpbitError;

type HmacSha256 = Hmac<Sha256>;

/// Algorithm name advertised in `query_hash_alg`.
pub const QUERY_HASH_ALG: &str = "SHA512";

#[derive(Serialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
}

const HEADER: Header = Header {
    alg: "HS256",
    typ: "JWT",
};

#[derive(Serialize)]
struct Claims<'a> {
    access_key: &'a str,
    nonce: &'a str,
    timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_hash_alg: Option<&'static str>,
}

/// Sort query pairs by key and URL-encode them.
///
/// The sort is stable, so repeated array keys (`states[]=wait&states[]=done`)
/// keep their relative order. The result is what both the request URL and the
/// `query_hash` are built from.
pub fn canonical_query(pairs: &[(String, String)]) -> Result<String, UpbitError> {
    let mut sorted: Vec<&(String, String)> = pairs.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    serde_urlencoded::to_string(sorted)
        .map_err(|e| UpbitError::Validation(format!("Failed to encode query: {e}")))
}

/// Serialize a JSON body compactly with object keys sorted at every level.
pub fn canonical_body(body: &Value) -> Result<String, UpbitError> {
    Ok(serde_json::to_string(&sort_keys(body))?)
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, sort_keys(v))).collect();
            let mut out = Map::new();
            for (k, v) in sorted {
                out.insert(k.clone(), v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

fn sha512_hex(data: &str) -> String {
    let digest = Sha512::digest(data.as_bytes());
    format!("{:x}", digest)
}

fn is_empty_body(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Build a token with an explicit nonce and timestamp.
///
/// Deterministic for identical inputs; [`sign`] is the everyday entry point.
///
/// # Example
///
/// ```rust
/// use upbit_api_client::auth::{Credentials, sign_with};
///
/// let credentials = Credentials::new("access", "secret");
/// let query = vec![("market".to_string(), "KRW-BTC".to_string())];
/// let token = sign_with(&credentials, "nonce-1", 1_700_000_000_000, &query, None).unwrap();
/// assert_eq!(token.split('.').count(), 3);
/// ```
pub fn sign_with(
    credentials: &Credentials,
    nonce: &str,
    timestamp_ms: u64,
    query: &[(String, String)],
    body: Option<&Value>,
) -> Result<String, UpbitError> {
    // A body hash takes precedence over the query hash.
    let query_hash = match body.filter(|b| !is_empty_body(b)) {
        Some(body) => Some(sha512_hex(&canonical_body(body)?)),
        None if !query.is_empty() => Some(sha512_hex(&canonical_query(query)?)),
        None => None,
    };

    let claims = Claims {
        access_key: &credentials.access_key,
        nonce,
        timestamp: timestamp_ms,
        query_hash_alg: query_hash.as_ref().map(|_| QUERY_HASH_ALG),
        query_hash,
    };

    let header = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&HEADER)?);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
    let signing_input = format!("{header}.{payload}");

    let mut mac = HmacSha256::new_from_slice(credentials.expose_secret().as_bytes())
        .map_err(|_| UpbitError::Auth("Invalid secret key length".to_string()))?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{signature}"))
}

/// Build a token with a fresh UUID nonce and the current time.
pub fn sign(
    credentials: &Credentials,
    query: &[(String, String)],
    body: Option<&Value>,
) -> Result<String, UpbitError> {
    sign_using(&UuidNonce, credentials, query, body)
}

/// Build a token with a nonce from `nonces` and the current time.
pub fn sign_using(
    nonces: &dyn NonceProvider,
    credentials: &Credentials,
    query: &[(String, String)],
    body: Option<&Value>,
) -> Result<String, UpbitError> {
    let timestamp_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    sign_with(credentials, &nonces.next_nonce(), timestamp_ms, query, body)
}

/// Format a token as an `Authorization` header value.
pub fn authorization_header(token: &str) -> String {
    format!("Bearer {token}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode_part(part: &str) -> Value {
        let bytes = URL_SAFE_NO_PAD.decode(part).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_token_without_payload_has_no_hash() {
        let creds = Credentials::new("access", "secret");
        let token = sign_with(&creds, "n", 1_700_000_000_000, &[], None).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        assert_eq!(decode_part(parts[0]), json!({"alg": "HS256", "typ": "JWT"}));
        let claims = decode_part(parts[1]);
        assert_eq!(claims["access_key"], "access");
        assert_eq!(claims["nonce"], "n");
        assert_eq!(claims["timestamp"], 1_700_000_000_000u64);
        assert!(claims.get("query_hash").is_none());
        assert!(claims.get("query_hash_alg").is_none());
        assert!(!token.contains('='));
    }

    #[test]
    fn test_query_hash_is_order_independent() {
        let creds = Credentials::new("access", "secret");
        let a = sign_with(
            &creds,
            "n",
            1,
            &pairs(&[("market", "KRW-BTC"), ("count", "10")]),
            None,
        )
        .unwrap();
        let b = sign_with(
            &creds,
            "n",
            1,
            &pairs(&[("count", "10"), ("market", "KRW-BTC")]),
            None,
        )
        .unwrap();
        assert_eq!(a, b);

        let claims = decode_part(a.split('.').nth(1).unwrap());
        assert_eq!(
            claims["query_hash"],
            sha512_hex("count=10&market=KRW-BTC")
        );
        assert_eq!(claims["query_hash"].as_str().unwrap().len(), 128);
        assert_eq!(claims["query_hash_alg"], "SHA512");
    }

    #[test]
    fn test_body_hash_takes_precedence() {
        let creds = Credentials::new("access", "secret");
        let body = json!({"side": "bid", "market": "KRW-BTC"});
        let token = sign_with(&creds, "n", 1, &pairs(&[("x", "1")]), Some(&body)).unwrap();
        let claims = decode_part(token.split('.').nth(1).unwrap());
        assert_eq!(
            claims["query_hash"],
            sha512_hex(r#"{"market":"KRW-BTC","side":"bid"}"#)
        );
    }

    #[test]
    fn test_signature_verifies() {
        let creds = Credentials::new("access", "secret");
        let token = sign_with(&creds, "n", 1, &[], None).unwrap();
        let (input, signature) = token.rsplit_once('.').unwrap();

        let mut mac = HmacSha256::new_from_slice(b"secret").unwrap();
        mac.update(input.as_bytes());
        let expected = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        assert_eq!(signature, expected);
    }

    #[test]
    fn test_fresh_tokens_differ() {
        let creds = Credentials::new("access", "secret");
        let a = sign(&creds, &[], None).unwrap();
        let b = sign(&creds, &[], None).unwrap();
        assert_ne!(a, b);

        let claims = decode_part(a.split('.').nth(1).unwrap());
        assert_eq!(claims["nonce"].as_str().unwrap().len(), 36);
    }

    #[test]
    fn test_canonical_query_keeps_array_order() {
        let query = canonical_query(&pairs(&[
            ("states[]", "wait"),
            ("market", "KRW-BTC"),
            ("states[]", "done"),
        ]))
        .unwrap();
        assert_eq!(query, "market=KRW-BTC&states%5B%5D=wait&states%5B%5D=done");
    }

    #[test]
    fn test_authorization_header() {
        assert_eq!(authorization_header("abc"), "Bearer abc");
    }
}
