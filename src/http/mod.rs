//! HTTP client layer: `CollectorHttp` with per-endpoint retry policies.

pub mod client;
pub mod retry;

pub use client::CollectorHttp;
pub use retry::{RetryConfig, RetryPolicy};
