//! Custom serde helpers for Upbit's timestamp formats.
//!
//! Upbit mixes three encodings for points in time: Unix milliseconds
//! (`timestamp`, `trade_timestamp`), naive ISO-8601 without an offset
//! (`candle_date_time_utc`, `candle_date_time_kst`) and RFC 3339 with a
//! `+09:00` offset (`created_at`, `done_at`).

use std::fmt;

use serde::{Deserialize, Deserializer, Serializer, de};
use time::format_description::FormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

const NAIVE_ISO: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

fn from_unix_millis<E: de::Error>(ms: i64) -> Result<OffsetDateTime, E> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000).map_err(E::custom)
}

/// Milliseconds since the Unix epoch as an [`OffsetDateTime`].
///
/// # Example
///
/// ```rust
/// use serde::Deserialize;
/// use time::OffsetDateTime;
/// use upbit_api_client::types::serde_helpers::timestamp_ms;
///
/// #[derive(Deserialize)]
/// struct Tick {
///     #[serde(with = "timestamp_ms")]
///     timestamp: OffsetDateTime,
/// }
///
/// let tick: Tick = serde_json::from_str(r#"{"timestamp":1704067200000}"#).unwrap();
/// assert_eq!(tick.timestamp.unix_timestamp(), 1_704_067_200);
/// ```
pub mod timestamp_ms {
    use super::*;

    /// Serialize as integer milliseconds.
    pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let ms = value.unix_timestamp_nanos() / 1_000_000;
        serializer.serialize_i64(ms as i64)
    }

    /// Deserialize from integer (or integral float) milliseconds.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MillisVisitor;

        impl<'de> de::Visitor<'de> for MillisVisitor {
            type Value = OffsetDateTime;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a unix timestamp in milliseconds")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                from_unix_millis(v)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                let v = i64::try_from(v).map_err(E::custom)?;
                from_unix_millis(v)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                from_unix_millis(v as i64)
            }
        }

        deserializer.deserialize_any(MillisVisitor)
    }
}

/// Naive `YYYY-MM-DDTHH:MM:SS` timestamps, as used by candle endpoints.
pub mod naive_iso {
    use super::*;

    /// Serialize without an offset.
    pub fn serialize<S>(value: &PrimitiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = value.format(NAIVE_ISO).map_err(<S::Error as serde::ser::Error>::custom)?;
        serializer.serialize_str(&s)
    }

    /// Deserialize, ignoring any fractional seconds.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<PrimitiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let trimmed = s.split('.').next().unwrap_or(&s);
        PrimitiveDateTime::parse(trimmed, NAIVE_ISO).map_err(de::Error::custom)
    }
}

/// RFC 3339 timestamps such as `2024-01-01T09:00:00+09:00`.
pub mod rfc3339 {
    use super::*;

    /// Serialize as RFC 3339.
    pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = value.format(&Rfc3339).map_err(<S::Error as serde::ser::Error>::custom)?;
        serializer.serialize_str(&s)
    }

    /// Deserialize from RFC 3339.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&s, &Rfc3339).map_err(de::Error::custom)
    }

    /// Optional variant; `null` and absent fields become `None`.
    pub mod option {
        use super::*;

        pub fn serialize<S>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s: Option<String> = Option::deserialize(deserializer)?;
            s.map(|s| OffsetDateTime::parse(&s, &Rfc3339).map_err(de::Error::custom))
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Serialize, Deserialize)]
    struct Candle {
        #[serde(with = "naive_iso")]
        at: PrimitiveDateTime,
    }

    #[derive(Debug, Deserialize)]
    struct Order {
        #[serde(with = "rfc3339")]
        created_at: OffsetDateTime,
        #[serde(with = "rfc3339::option", default)]
        done_at: Option<OffsetDateTime>,
    }

    #[test]
    fn test_naive_iso_roundtrip() {
        let candle: Candle = serde_json::from_str(r#"{"at":"2024-01-02T03:04:05"}"#).unwrap();
        assert_eq!(candle.at.hour(), 3);
        assert_eq!(
            serde_json::to_string(&candle).unwrap(),
            r#"{"at":"2024-01-02T03:04:05"}"#
        );
    }

    #[test]
    fn test_rfc3339_with_kst_offset() {
        let order: Order =
            serde_json::from_str(r#"{"created_at":"2024-01-01T09:00:00+09:00","done_at":null}"#)
                .unwrap();
        assert_eq!(order.created_at.unix_timestamp(), 1_704_067_200);
        assert!(order.done_at.is_none());
    }

    #[test]
    fn test_timestamp_ms_rejects_strings() {
        #[derive(Debug, Deserialize)]
        struct Tick {
            #[serde(with = "timestamp_ms")]
            #[allow(dead_code)]
            timestamp: OffsetDateTime,
        }
        assert!(serde_json::from_str::<Tick>(r#"{"timestamp":"soon"}"#).is_err());
    }
}
