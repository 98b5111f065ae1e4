//! Parsing of Upbit's `Remaining-Req` response header.
//!
//! Every REST response carries the caller's remaining quota for the group the
//! endpoint belongs to:
//!
//! ```text
//! Remaining-Req: group=market; min=598; sec=9
//! ```

use std::str::FromStr;

use crate::error::UpbitError;

/// Name of the quota header (`Remaining-Req`), lowercased.
pub const REMAINING_REQ_HEADER: &str = "remaining-req";

/// A parsed `Remaining-Req` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemainingReq {
    /// Rate limit group the quota applies to.
    pub group: String,
    /// Requests remaining in the current minute.
    pub min: Option<u32>,
    /// Requests remaining in the current second.
    pub sec: Option<u32>,
}

impl FromStr for RemainingReq {
    type Err = UpbitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(UpbitError::Validation(
                "Empty Remaining-Req header".to_string(),
            ));
        }

        let mut group = None;
        let mut min = None;
        let mut sec = None;

        for part in s.split(';') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            match key {
                "min" | "sec" => {
                    let parsed: u32 = value.parse().map_err(|_| {
                        UpbitError::Validation(format!("Invalid numeric value for {key}: {value}"))
                    })?;
                    if key == "min" {
                        min = Some(parsed);
                    } else {
                        sec = Some(parsed);
                    }
                }
                "group" => group = Some(value.to_string()),
                _ => {}
            }
        }

        let group = group.ok_or_else(|| {
            UpbitError::Validation("Missing 'group' in Remaining-Req header".to_string())
        })?;
        if min.is_none() && sec.is_none() {
            return Err(UpbitError::Validation(
                "Missing rate limit values in Remaining-Req header".to_string(),
            ));
        }

        Ok(Self { group, min, sec })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_header() {
        let parsed: RemainingReq = "group=market; min=598; sec=9".parse().unwrap();
        assert_eq!(
            parsed,
            RemainingReq {
                group: "market".to_string(),
                min: Some(598),
                sec: Some(9),
            }
        );
    }

    #[test]
    fn test_parse_tolerates_whitespace_and_junk() {
        let parsed: RemainingReq = "  sec = 3 ;garbage; group= order ".parse().unwrap();
        assert_eq!(parsed.group, "order");
        assert_eq!(parsed.sec, Some(3));
        assert_eq!(parsed.min, None);
    }

    #[test]
    fn test_parse_only_min() {
        let parsed: RemainingReq = "group=default; min=10".parse().unwrap();
        assert_eq!(parsed.min, Some(10));
        assert_eq!(parsed.sec, None);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("".parse::<RemainingReq>().is_err());
        assert!("min=1; sec=2".parse::<RemainingReq>().is_err());
        assert!("group=market".parse::<RemainingReq>().is_err());
        assert!("group=market; sec=nine".parse::<RemainingReq>().is_err());
        assert!("group=market; sec=-1".parse::<RemainingReq>().is_err());
    }
}
