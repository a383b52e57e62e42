//! Rate tracker types and window bookkeeping

use crate::config::models::QuotaConfig;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Quota limits for one provider, one value per window
#[derive(Debug, Clone, Copy)]
pub struct QuotaLimits {
    /// Requests per minute
    pub per_minute: u32,
    /// Requests per day
    pub per_day: u32,
    /// Requests per 30 days
    pub per_month: u32,
}

impl From<QuotaConfig> for QuotaLimits {
    fn from(config: QuotaConfig) -> Self {
        Self {
            per_minute: config.per_minute,
            per_day: config.per_day,
            per_month: config.per_month,
        }
    }
}

/// Fixed window with time-driven reset
#[derive(Debug)]
pub(super) struct FixedWindow {
    pub(super) count: u32,
    window_start: Instant,
    period: Duration,
}

impl FixedWindow {
    pub(super) fn new(period: Duration) -> Self {
        Self {
            count: 0,
            window_start: Instant::now(),
            period,
        }
    }

    /// Reset the counter when the window has elapsed
    pub(super) fn roll(&mut self, now: Instant) {
        if now.duration_since(self.window_start) >= self.period {
            self.window_start = now;
            self.count = 0;
        }
    }

    pub(super) fn release(&mut self) {
        self.count = self.count.saturating_sub(1);
    }

    pub(super) fn utilization(&self, limit: u32) -> f64 {
        if limit == 0 {
            return 1.0;
        }
        f64::from(self.count) / f64::from(limit)
    }
}

/// All quota windows for one provider. Guarded by a single mutex in the
/// tracker so check-and-reserve is one atomic step.
#[derive(Debug)]
pub(super) struct ProviderWindows {
    /// Request timestamps in the sliding per-minute window
    pub(super) minute: Vec<Instant>,
    pub(super) day: FixedWindow,
    pub(super) month: FixedWindow,
}

impl ProviderWindows {
    pub(super) fn new() -> Self {
        Self {
            minute: Vec::new(),
            day: FixedWindow::new(Duration::from_secs(24 * 60 * 60)),
            month: FixedWindow::new(Duration::from_secs(30 * 24 * 60 * 60)),
        }
    }

    /// Drop timestamps that have left the sliding window
    pub(super) fn prune_minute(&mut self, now: Instant, window: Duration) {
        self.minute
            .retain(|stamp| now.duration_since(*stamp) < window);
    }
}

/// Point-in-time view of one provider's quota windows
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitSnapshot {
    /// Provider name
    pub provider: String,
    /// Requests used in the current minute window
    pub minute_used: u32,
    /// Per-minute limit
    pub minute_limit: u32,
    /// Requests used in the current day window
    pub day_used: u32,
    /// Per-day limit
    pub day_limit: u32,
    /// Requests used in the current month window
    pub month_used: u32,
    /// Per-month limit
    pub month_limit: u32,
    /// Highest utilization across the three windows
    pub utilization: f64,
}
