//! Custom serde helpers for backend wire formats.
//!
//! The data service is backed by pandas frames, so numbers and timestamps
//! arrive in whichever shape the frame serialised them: prices as JSON
//! numbers or strings, times as epoch millis or ISO 8601 strings.

/// Deserializes a Unix-millis integer or an ISO 8601 string into `DateTime<Utc>`.
///
/// Naive strings (no offset, e.g. `"2025-01-01 08:00:00"`) are taken as UTC.
pub mod flexible_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Float(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Raw::deserialize(deserializer)?;
        parse(raw).map_err(serde::de::Error::custom)
    }

    fn parse(raw: Raw) -> Result<DateTime<Utc>, String> {
        match raw {
            Raw::Millis(ms) => DateTime::<Utc>::from_timestamp_millis(ms)
                .ok_or_else(|| format!("Invalid timestamp: {}", ms)),
            Raw::Float(ms) => DateTime::<Utc>::from_timestamp_millis(ms as i64)
                .ok_or_else(|| format!("Invalid timestamp: {}", ms)),
            Raw::Text(s) => {
                if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
                    return Ok(dt.with_timezone(&Utc));
                }
                for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
                    if let Ok(naive) = NaiveDateTime::parse_from_str(&s, pattern) {
                        return Ok(naive.and_utc());
                    }
                }
                Err(format!("Invalid timestamp: {}", s))
            }
        }
    }

    /// Same as the parent module, for `Option<DateTime<Utc>>` fields.
    pub mod option {
        use super::Raw;
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer};

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<Raw>::deserialize(deserializer)? {
                Some(raw) => super::parse(raw)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}

/// Deserializes a JSON number or numeric string into `Decimal`.
pub mod flexible_decimal {
    use rust_decimal::prelude::*;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    pub(super) fn parse(raw: Raw) -> Result<Decimal, String> {
        match raw {
            Raw::Int(i) => Ok(Decimal::from(i)),
            Raw::Float(f) => Decimal::from_f64(f).ok_or_else(|| format!("Invalid decimal: {}", f)),
            Raw::Text(s) => Decimal::from_str(s.trim()).map_err(|e| format!("Invalid decimal {:?}: {}", s, e)),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        parse(Raw::deserialize(deserializer)?).map_err(serde::de::Error::custom)
    }

    /// Same as the parent module, for `Option<Decimal>` fields.
    pub mod option {
        use super::Raw;
        use rust_decimal::Decimal;
        use serde::{Deserialize, Deserializer};

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<Raw>::deserialize(deserializer)? {
                Some(raw) => super::parse(raw)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}
