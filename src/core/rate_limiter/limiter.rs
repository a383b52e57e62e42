//! Rate limit tracker
//!
//! Per-provider sliding-window and fixed-window request accounting, purely
//! local bookkeeping. The tracker is intentionally decoupled from whether
//! the HTTP call succeeds: the orchestrator alone decides when a
//! reservation is released, so accounting cannot desynchronize from actual
//! attempts.

use super::types::{ProviderWindows, QuotaLimits, RateLimitSnapshot};
use crate::config::models::ProviderConfig;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Utilization at which the "approaching limit" warning flag is set
pub const WARN_UTILIZATION: f64 = 0.8;

struct ProviderSlot {
    limits: QuotaLimits,
    windows: Mutex<ProviderWindows>,
}

/// Concurrency-safe request accounting across all providers
pub struct RateLimitTracker {
    providers: HashMap<String, ProviderSlot>,
    minute_window: Duration,
}

impl RateLimitTracker {
    /// Build a tracker with one window set per configured provider
    pub fn new(configs: &[ProviderConfig]) -> Self {
        Self::with_minute_window(configs, Duration::from_secs(60))
    }

    /// Build a tracker with a custom sliding-window duration. Used by tests
    /// to observe window rollover without waiting a minute.
    pub fn with_minute_window(configs: &[ProviderConfig], minute_window: Duration) -> Self {
        let providers = configs
            .iter()
            .map(|config| {
                (
                    config.name.clone(),
                    ProviderSlot {
                        limits: config.quotas.into(),
                        windows: Mutex::new(ProviderWindows::new()),
                    },
                )
            })
            .collect();

        Self {
            providers,
            minute_window,
        }
    }

    /// Atomically check all of the provider's windows and reserve one unit
    /// of quota if every window has headroom. Returns `false` for unknown
    /// providers.
    pub fn try_reserve(&self, provider: &str) -> bool {
        let Some(slot) = self.providers.get(provider) else {
            return false;
        };

        let now = Instant::now();
        let mut windows = slot.windows.lock();
        windows.prune_minute(now, self.minute_window);
        windows.day.roll(now);
        windows.month.roll(now);

        let minute_full = windows.minute.len() as u32 >= slot.limits.per_minute;
        let day_full = windows.day.count >= slot.limits.per_day;
        let month_full = windows.month.count >= slot.limits.per_month;

        if minute_full || day_full || month_full {
            debug!(
                provider,
                minute_full, day_full, month_full, "quota reservation denied"
            );
            return false;
        }

        windows.minute.push(now);
        windows.day.count += 1;
        windows.month.count += 1;
        true
    }

    /// Roll back a reservation that produced no billable call. Saturates at
    /// zero; releasing without a matching reservation is a no-op.
    pub fn release(&self, provider: &str) {
        let Some(slot) = self.providers.get(provider) else {
            return;
        };

        let mut windows = slot.windows.lock();
        windows.minute.pop();
        windows.day.release();
        windows.month.release();
    }

    /// Highest utilization across the provider's windows, in `[0.0, 1.0]`.
    /// Unknown providers report full utilization.
    pub fn utilization(&self, provider: &str) -> f64 {
        let Some(slot) = self.providers.get(provider) else {
            return 1.0;
        };

        let now = Instant::now();
        let mut windows = slot.windows.lock();
        windows.prune_minute(now, self.minute_window);
        windows.day.roll(now);
        windows.month.roll(now);

        let minute = if slot.limits.per_minute == 0 {
            1.0
        } else {
            windows.minute.len() as f64 / f64::from(slot.limits.per_minute)
        };
        minute
            .max(windows.day.utilization(slot.limits.per_day))
            .max(windows.month.utilization(slot.limits.per_month))
    }

    /// Whether any window is at or above [`WARN_UTILIZATION`]
    pub fn approaching_limit(&self, provider: &str) -> bool {
        self.utilization(provider) >= WARN_UTILIZATION
    }

    /// Point-in-time view of every provider's windows
    pub fn snapshot(&self) -> Vec<RateLimitSnapshot> {
        let now = Instant::now();
        let mut result: Vec<RateLimitSnapshot> = self
            .providers
            .iter()
            .map(|(name, slot)| {
                let mut windows = slot.windows.lock();
                windows.prune_minute(now, self.minute_window);
                windows.day.roll(now);
                windows.month.roll(now);

                let minute_used = windows.minute.len() as u32;
                let minute = if slot.limits.per_minute == 0 {
                    1.0
                } else {
                    f64::from(minute_used) / f64::from(slot.limits.per_minute)
                };
                let utilization = minute
                    .max(windows.day.utilization(slot.limits.per_day))
                    .max(windows.month.utilization(slot.limits.per_month));

                RateLimitSnapshot {
                    provider: name.clone(),
                    minute_used,
                    minute_limit: slot.limits.per_minute,
                    day_used: windows.day.count,
                    day_limit: slot.limits.per_day,
                    month_used: windows.month.count,
                    month_limit: slot.limits.per_month,
                    utilization,
                }
            })
            .collect();

        result.sort_by(|a, b| a.provider.cmp(&b.provider));
        result
    }
}
