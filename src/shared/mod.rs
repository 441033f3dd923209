//! Shared newtypes and utilities used across all domain modules.
//!
//! These types are serialization-transparent: they serialize/deserialize identically
//! to the raw format the backend sends, so they can be used directly in wire types
//! without conversion overhead.

pub mod fmt;
pub mod serde_util;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Fallback candle duration when an interval code is not recognised (one hour).
pub const DEFAULT_INTERVAL_MS: u64 = 60 * 60 * 1000;

// ─── Symbol ──────────────────────────────────────────────────────────────────

/// Newtype for trading pair identifiers (e.g. `"BTC-USDT"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Symbol(s.to_string()))
    }
}

impl Serialize for Symbol {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Symbol(s))
    }
}

// ─── Interval ────────────────────────────────────────────────────────────────

/// Candle interval code as used by the collection service (`"1m"`, `"1h"`, ...).
///
/// Kept as an open string because the service publishes its own list via
/// `/api/data-collection/intervals`. The well-known codes expose their
/// duration through [`Interval::millis`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval(String);

impl Interval {
    pub const MINUTE_1: &'static str = "1m";
    pub const MINUTE_5: &'static str = "5m";
    pub const MINUTE_15: &'static str = "15m";
    pub const MINUTE_30: &'static str = "30m";
    pub const HOUR_1: &'static str = "1h";
    pub const HOUR_4: &'static str = "4h";
    pub const DAY_1: &'static str = "1d";

    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Duration of one candle in milliseconds, for the well-known codes.
    pub fn millis(&self) -> Option<u64> {
        const MINUTE: u64 = 60 * 1000;
        match self.0.as_str() {
            Self::MINUTE_1 => Some(MINUTE),
            Self::MINUTE_5 => Some(5 * MINUTE),
            Self::MINUTE_15 => Some(15 * MINUTE),
            Self::MINUTE_30 => Some(30 * MINUTE),
            Self::HOUR_1 => Some(60 * MINUTE),
            Self::HOUR_4 => Some(4 * 60 * MINUTE),
            Self::DAY_1 => Some(24 * 60 * MINUTE),
            _ => None,
        }
    }

    /// Duration in milliseconds, falling back to one hour for unknown codes.
    pub fn millis_or_default(&self) -> u64 {
        self.millis().unwrap_or(DEFAULT_INTERVAL_MS)
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Interval {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Interval {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for Interval {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Interval(s.to_string()))
    }
}

impl Serialize for Interval {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Interval(s))
    }
}
