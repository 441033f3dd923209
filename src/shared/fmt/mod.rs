//! Human-readable formatting helpers.

pub mod num;

pub use num::{display_count, display_with_decimals, round_to};
