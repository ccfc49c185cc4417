//! # Reddit Data Model
//!
//! Types flowing from the upstream listing to the push payload. Listing items
//! stay opaque JSON; only the author is ever inspected.

use std::fmt;
use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::topcontributors::rank_contributors;

/// Response header carrying the number of requests left in the current window.
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";
/// Response header carrying the epoch second at which the window resets.
pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// A short-lived bearer token obtained from the credential exchange.
///
/// Tokens are used for exactly one polling cycle and never cached. `Debug`
/// output is redacted so tokens do not end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building the `Authorization` header.
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// One entry of the upstream listing, passed through untouched.
///
/// Reddit listing children look like `{"kind": "t3", "data": {"author": ..}}`;
/// a bare `{"author": ..}` record is accepted as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankedItem(Value);

impl RankedItem {
    /// Wraps a raw listing entry.
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// The item's author, read from `data.author` or a top-level `author`.
    pub fn author(&self) -> Option<&str> {
        self.0
            .pointer("/data/author")
            .or_else(|| self.0.get("author"))
            .and_then(Value::as_str)
    }

    /// The untouched JSON record.
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for RankedItem {
    fn from(raw: Value) -> Self {
        Self(raw)
    }
}

/// Rate-limit window reported by the upstream on a single response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStatus {
    /// Requests left in the current window.
    pub remaining: i64,
    /// Epoch second at which the window resets.
    pub reset_epoch_seconds: i64,
}

impl RateLimitStatus {
    /// Reads both rate-limit headers. Returns `None` unless both are present
    /// and numeric. Reddit sends floats: `remaining` is rounded up, so only a
    /// value `<= 0` counts as exhausted, and the reset epoch is floored.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let read = |name: &str| -> Option<f64> {
            let raw = headers.get(name)?.to_str().ok()?.trim();
            raw.parse::<f64>().ok().filter(|value| value.is_finite())
        };

        Some(Self {
            remaining: read(RATE_LIMIT_REMAINING_HEADER)?.ceil() as i64,
            reset_epoch_seconds: read(RATE_LIMIT_RESET_HEADER)?.floor() as i64,
        })
    }

    /// How long a caller must hold back before returning, given the current
    /// epoch second. `None` while requests remain or once the reset has passed.
    pub fn throttle_delay(&self, now_epoch_seconds: i64) -> Option<Duration> {
        if self.remaining > 0 {
            return None;
        }
        let wait_millis = self
            .reset_epoch_seconds
            .saturating_sub(now_epoch_seconds)
            .saturating_mul(1000);
        (wait_millis > 0).then(|| Duration::from_millis(wait_millis as u64))
    }
}

/// Validated result of one listing fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct TopItems {
    /// Listing entries in upstream rank order.
    pub items: Vec<RankedItem>,
    /// Rate-limit window, when the upstream reported one.
    pub rate_limit: Option<RateLimitStatus>,
}

/// Number of listing items authored by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorCount {
    /// Author name as reported by the upstream.
    pub user: String,
    /// Items authored in the listing.
    pub count: usize,
}

/// Message pushed to a real-time client on every successful cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastPayload {
    /// The listing, verbatim.
    pub top_items: Vec<RankedItem>,
    /// Authors ranked by item count, most active first.
    pub top_contributors: Vec<ContributorCount>,
}

impl BroadcastPayload {
    /// Builds the payload, deriving the contributor ranking from `items`.
    pub fn from_items(items: Vec<RankedItem>) -> Self {
        let top_contributors = rank_contributors(&items);
        Self {
            top_items: items,
            top_contributors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn headers(remaining: &'static str, reset: &'static str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(RATE_LIMIT_REMAINING_HEADER, HeaderValue::from_static(remaining));
        h.insert(RATE_LIMIT_RESET_HEADER, HeaderValue::from_static(reset));
        h
    }

    #[test]
    fn credential_debug_is_redacted() {
        let c = Credential::new("super-secret");
        assert_eq!(format!("{:?}", c), "Credential(<redacted>)");
        assert_eq!(c.secret(), "super-secret");
    }

    #[test]
    fn author_prefers_nested_data() {
        let nested = RankedItem::new(json!({"kind": "t3", "data": {"author": "alice"}}));
        let flat = RankedItem::new(json!({"author": "bob"}));
        let none = RankedItem::new(json!({"data": {"title": "x"}}));
        assert_eq!(nested.author(), Some("alice"));
        assert_eq!(flat.author(), Some("bob"));
        assert_eq!(none.author(), None);
    }

    #[test]
    fn rate_limit_headers_parse_reddit_floats() {
        let status = RateLimitStatus::from_headers(&headers("598.0", "1700000042.7")).unwrap();
        assert_eq!(status.remaining, 598);
        assert_eq!(status.reset_epoch_seconds, 1_700_000_042);
    }

    #[test]
    fn fractional_remaining_is_not_exhausted() {
        let now = 1_700_000_000;
        let half = RateLimitStatus::from_headers(&headers("0.5", "1700000005")).unwrap();
        assert_eq!(half.remaining, 1);
        assert_eq!(half.throttle_delay(now), None);

        let zero = RateLimitStatus::from_headers(&headers("0.0", "1700000005")).unwrap();
        assert_eq!(zero.throttle_delay(now), Some(Duration::from_millis(5000)));

        let overdrawn = RateLimitStatus::from_headers(&headers("-0.5", "1700000005")).unwrap();
        assert_eq!(overdrawn.throttle_delay(now), Some(Duration::from_millis(5000)));
    }

    #[test]
    fn missing_or_garbled_headers_mean_unknown() {
        assert_eq!(RateLimitStatus::from_headers(&HeaderMap::new()), None);
        assert_eq!(RateLimitStatus::from_headers(&headers("lots", "1700000000")), None);
    }

    #[test]
    fn throttle_only_when_exhausted_and_reset_in_future() {
        let now = 1_700_000_000;
        let exhausted = RateLimitStatus { remaining: 0, reset_epoch_seconds: now + 5 };
        assert_eq!(exhausted.throttle_delay(now), Some(Duration::from_millis(5000)));

        let negative = RateLimitStatus { remaining: -3, reset_epoch_seconds: now + 1 };
        assert_eq!(negative.throttle_delay(now), Some(Duration::from_millis(1000)));

        let plenty = RateLimitStatus { remaining: 10, reset_epoch_seconds: now + 5 };
        assert_eq!(plenty.throttle_delay(now), None);

        let already_reset = RateLimitStatus { remaining: 0, reset_epoch_seconds: now };
        assert_eq!(already_reset.throttle_delay(now), None);

        let past = RateLimitStatus { remaining: 0, reset_epoch_seconds: now - 30 };
        assert_eq!(past.throttle_delay(now), None);
    }

    #[test]
    fn payload_serializes_with_camel_case_keys() {
        let payload = BroadcastPayload::from_items(vec![
            RankedItem::new(json!({"data": {"author": "a", "title": "t1"}})),
            RankedItem::new(json!({"data": {"author": "a", "title": "t2"}})),
        ]);
        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(v["topItems"][1]["data"]["title"], "t2");
        assert_eq!(v["topContributors"], json!([{"user": "a", "count": 2}]));
    }
}
