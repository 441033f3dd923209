//! Network defaults for the collection service.

/// Default REST API base URL (the collector backend's development port).
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Environment variable that overrides the base URL in `CollectorClientBuilder::from_env`.
pub const API_URL_ENV: &str = "KLINE_COLLECTOR_API_URL";

/// Environment variable holding the request timeout in whole seconds.
pub const TIMEOUT_SECS_ENV: &str = "KLINE_COLLECTOR_TIMEOUT_SECS";

/// Default per-request timeout in seconds (native targets only).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
