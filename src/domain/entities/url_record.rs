//! URL record entity: the stored state behind every short token.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_with::{DurationNanoSeconds, serde_as};
use std::fmt;
use std::time::Duration;

/// Wire value used for "no limit" in stored records and form input.
const UNLIMITED_RAW: i64 = -1;

/// An optional usage cap.
///
/// Serialized as a plain integer where `-1` means [`Limit::Unlimited`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limit {
    #[default]
    Unlimited,
    AtMost(u64),
}

impl Limit {
    /// Converts the integer encoding into a limit.
    ///
    /// Returns `None` for negative values other than `-1`.
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            UNLIMITED_RAW => Some(Self::Unlimited),
            n if n >= 0 => Some(Self::AtMost(n as u64)),
            _ => None,
        }
    }

    /// Integer encoding of the limit (`-1` when unlimited).
    pub fn as_raw(self) -> i64 {
        match self {
            Self::Unlimited => UNLIMITED_RAW,
            Self::AtMost(n) => i64::try_from(n).unwrap_or(i64::MAX),
        }
    }

    pub fn is_unlimited(self) -> bool {
        matches!(self, Self::Unlimited)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => write!(f, "unlimited"),
            Self::AtMost(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_raw())
    }
}

impl<'de> Deserialize<'de> for Limit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Limit::from_raw(raw).ok_or_else(|| D::Error::custom(format!("invalid limit value {raw}")))
    }
}

/// Input data for creating a new record.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub long_url: String,
    pub max_access: Limit,
    pub max_per_hour: Limit,
    /// Lifetime of the record; also the TTL applied on every store write.
    pub max_age: Duration,
}

/// A short-URL record together with its usage counters.
///
/// Timestamps are stored as RFC 3339 strings at whole-second precision and
/// `age_duration` as integer nanoseconds.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub token: String,
    pub long_url: String,
    pub max_access: Limit,
    pub current_access_count: u64,
    pub max_per_hour: Limit,
    pub hourly_access_count: u64,
    #[serde(with = "rfc3339_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339_seconds")]
    pub last_accessed_at: DateTime<Utc>,
    #[serde(with = "rfc3339_seconds")]
    pub last_hourly_reset_at: DateTime<Utc>,
    #[serde_as(as = "DurationNanoSeconds<u64>")]
    pub age_duration: Duration,
}

impl UrlRecord {
    /// Creates a fresh record with zeroed counters, stamped with `now`.
    pub fn new(token: String, new_link: NewLink, now: DateTime<Utc>) -> Self {
        Self {
            token,
            long_url: new_link.long_url,
            max_access: new_link.max_access,
            current_access_count: 0,
            max_per_hour: new_link.max_per_hour,
            hourly_access_count: 0,
            created_at: now,
            last_accessed_at: now,
            last_hourly_reset_at: now,
            age_duration: new_link.max_age,
        }
    }

    /// Serializes the record into its JSON storage form.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parses a record from its JSON storage form.
    pub fn decode(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

mod rfc3339_seconds {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;

    fn sample_record() -> UrlRecord {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        UrlRecord::new(
            "aB3dE6gH".to_string(),
            NewLink {
                long_url: "https://example.com/some/path".to_string(),
                max_access: Limit::AtMost(10),
                max_per_hour: Limit::Unlimited,
                max_age: Duration::from_secs(3600),
            },
            now,
        )
    }

    #[test]
    fn test_new_record_starts_with_zero_counters() {
        let record = sample_record();

        assert_eq!(record.current_access_count, 0);
        assert_eq!(record.hourly_access_count, 0);
        assert_eq!(record.created_at, record.last_accessed_at);
        assert_eq!(record.created_at, record.last_hourly_reset_at);
    }

    #[test]
    fn test_limit_raw_conversion() {
        assert_eq!(Limit::from_raw(-1), Some(Limit::Unlimited));
        assert_eq!(Limit::from_raw(0), Some(Limit::AtMost(0)));
        assert_eq!(Limit::from_raw(25), Some(Limit::AtMost(25)));
        assert_eq!(Limit::from_raw(-2), None);

        assert_eq!(Limit::Unlimited.as_raw(), -1);
        assert_eq!(Limit::AtMost(7).as_raw(), 7);
    }

    #[test]
    fn test_encoded_field_layout() {
        let record = sample_record();
        let json: Value = serde_json::from_str(&record.encode().unwrap()).unwrap();

        assert_eq!(json["token"], "aB3dE6gH");
        assert_eq!(json["long_url"], "https://example.com/some/path");
        assert_eq!(json["max_access"], 10);
        assert_eq!(json["current_access_count"], 0);
        assert_eq!(json["max_per_hour"], -1);
        assert_eq!(json["hourly_access_count"], 0);
        assert_eq!(json["created_at"], "2024-03-01T12:30:45Z");
        assert_eq!(json["last_accessed_at"], "2024-03-01T12:30:45Z");
        assert_eq!(json["last_hourly_reset_at"], "2024-03-01T12:30:45Z");
        assert_eq!(json["age_duration"], 3_600_000_000_000u64);
    }

    #[test]
    fn test_decode_preserves_fields() {
        let mut record = sample_record();
        record.current_access_count = 4;
        record.hourly_access_count = 2;

        let decoded = UrlRecord::decode(&record.encode().unwrap()).unwrap();

        assert_eq!(decoded, record);
    }

    #[test]
    fn test_timestamps_truncated_to_whole_seconds() {
        let precise = Utc.timestamp_opt(1_700_000_000, 987_654_321).unwrap();
        let mut record = sample_record();
        record.last_accessed_at = precise;

        let decoded = UrlRecord::decode(&record.encode().unwrap()).unwrap();

        assert_eq!(decoded.last_accessed_at.timestamp(), precise.timestamp());
        assert_eq!(decoded.last_accessed_at.timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn test_decode_accepts_offset_timestamps() {
        let raw = r#"{
            "token": "Zz9Yy8Xx",
            "long_url": "https://example.org",
            "max_access": -1,
            "current_access_count": 3,
            "max_per_hour": 5,
            "hourly_access_count": 1,
            "created_at": "2024-01-01T10:00:00+03:00",
            "last_accessed_at": "2024-01-01T10:05:00+03:00",
            "last_hourly_reset_at": "2024-01-01T10:00:00+03:00",
            "age_duration": 60000000000
        }"#;

        let record = UrlRecord::decode(raw).unwrap();

        assert_eq!(record.max_access, Limit::Unlimited);
        assert_eq!(record.max_per_hour, Limit::AtMost(5));
        assert_eq!(
            record.created_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap()
        );
        assert_eq!(record.age_duration, Duration::from_secs(60));
    }

    #[test]
    fn test_decode_rejects_invalid_limit() {
        let mut json: Value = serde_json::from_str(&sample_record().encode().unwrap()).unwrap();
        json["max_access"] = Value::from(-5);

        assert!(UrlRecord::decode(&json.to_string()).is_err());
    }
}
