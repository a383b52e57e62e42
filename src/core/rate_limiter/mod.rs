//! Per-provider rate accounting
//!
//! Sliding per-minute window plus fixed per-day and per-month windows, all
//! checked in one lock acquisition so reserve is atomic under concurrent
//! requests.

mod limiter;
mod types;


// Re-export public types
pub use limiter::{RateLimitTracker, WARN_UTILIZATION};
pub use types::{QuotaLimits, RateLimitSnapshot};
