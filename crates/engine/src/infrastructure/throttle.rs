//! Per-document write throttling.
//!
//! Each document id gets a minimum interval between writes (cooldown) and,
//! after failed writes, an exponential backoff window:
//!
//! ```text
//! delay = base * 2^(failures - 1), capped at max
//! ```
//!
//! State lives in the throttle instance, so independent servers (and tests)
//! never share timing.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;

use crate::infrastructure::ports::ClockPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteThrottleConfig {
    /// Minimum interval between two writes to the same document
    pub cooldown: Duration,
    /// Backoff after the first failed write
    pub backoff_base: Duration,
    /// Upper bound for the backoff window
    pub backoff_max: Duration,
}

impl Default for WriteThrottleConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_millis(1000),
            backoff_base: Duration::from_millis(500),
            backoff_max: Duration::from_millis(30_000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThrottleError {
    #[error("Writes to {key} are cooling down, retry after {retry_after:?}")]
    CoolingDown { key: String, retry_after: Duration },

    #[error("Writes to {key} are backing off after {failures} failed attempts, retry after {retry_after:?}")]
    BackingOff {
        key: String,
        failures: u32,
        retry_after: Duration,
    },
}

impl ThrottleError {
    pub fn retry_after(&self) -> Duration {
        match self {
            Self::CoolingDown { retry_after, .. } | Self::BackingOff { retry_after, .. } => {
                *retry_after
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
struct WriteState {
    last_write: Option<DateTime<Utc>>,
    consecutive_failures: u32,
    blocked_until: Option<DateTime<Utc>>,
}

pub struct WriteThrottle {
    config: WriteThrottleConfig,
    clock: Arc<dyn ClockPort>,
    state: DashMap<String, WriteState>,
}

impl WriteThrottle {
    pub fn new(config: WriteThrottleConfig, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            config,
            clock,
            state: DashMap::new(),
        }
    }

    pub fn config(&self) -> &WriteThrottleConfig {
        &self.config
    }

    /// Ask permission to write `key` now.
    ///
    /// A granted check starts the cooldown for that key.
    pub fn check(&self, key: &str) -> Result<(), ThrottleError> {
        let now = self.clock.now();
        let mut entry = self.state.entry(key.to_string()).or_default();

        if let Some(until) = entry.blocked_until.filter(|until| *until > now) {
            let retry_after = remaining(until, now);
            tracing::warn!(
                key,
                failures = entry.consecutive_failures,
                retry_after_ms = retry_after.as_millis() as u64,
                "Write rejected: backing off after failures"
            );
            return Err(ThrottleError::BackingOff {
                key: key.to_string(),
                failures: entry.consecutive_failures,
                retry_after,
            });
        }

        if let Some(last) = entry.last_write {
            let ready_at = add(last, self.config.cooldown);
            if ready_at > now {
                let retry_after = remaining(ready_at, now);
                tracing::warn!(
                    key,
                    retry_after_ms = retry_after.as_millis() as u64,
                    "Write rejected: cooling down"
                );
                return Err(ThrottleError::CoolingDown {
                    key: key.to_string(),
                    retry_after,
                });
            }
        }

        entry.last_write = Some(now);
        Ok(())
    }

    pub fn record_success(&self, key: &str) {
        if let Some(mut entry) = self.state.get_mut(key) {
            entry.consecutive_failures = 0;
            entry.blocked_until = None;
        }
    }

    pub fn record_failure(&self, key: &str) {
        let now = self.clock.now();
        let mut entry = self.state.entry(key.to_string()).or_default();
        entry.consecutive_failures = entry.consecutive_failures.saturating_add(1);
        let delay = self.backoff_delay(entry.consecutive_failures);
        entry.blocked_until = Some(add(now, delay));
        tracing::debug!(
            key,
            failures = entry.consecutive_failures,
            backoff_ms = delay.as_millis() as u64,
            "Write failed, backing off"
        );
    }

    /// Drop all state for `key`, e.g. once the document is deleted.
    pub fn forget(&self, key: &str) {
        self.state.remove(key);
    }

    /// Backoff window after `failures` consecutive failed writes.
    pub fn backoff_delay(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }
        let base = self.config.backoff_base.as_millis() as u64;
        let max = self.config.backoff_max.as_millis() as u64;
        let exponential = base.saturating_mul(2u64.saturating_pow(failures - 1));
        Duration::from_millis(exponential.min(max))
    }
}

fn add(at: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(by)
        .ok()
        .and_then(|delta| at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn remaining(until: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (until - now).to_std().unwrap_or_default()
}
