//! Exponential backoff with jitter for startup reconnects.

use std::time::Duration;

use rand::Rng;

use crate::config::StartupConfig;

/// Delay schedule between connection attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
}

impl Backoff {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self { base_ms, max_ms: max_ms.max(base_ms) }
    }

    pub fn from_config(config: &StartupConfig) -> Self {
        Self::new(config.base_delay_ms, config.max_delay_ms)
    }

    /// Delay to wait before retry number `retry` (1-based); zero for 0.
    ///
    /// `base * 2^(retry-1)`, capped at `max`, plus up to 10% jitter.
    pub fn delay(&self, retry: u32) -> Duration {
        let capped = self.ceiling(retry);
        let jitter_range = capped / 10;
        let jitter = if jitter_range > 0 {
            rand::thread_rng().gen_range(0..jitter_range)
        } else {
            0
        };
        Duration::from_millis(capped + jitter)
    }

    fn ceiling(&self, retry: u32) -> u64 {
        if retry == 0 {
            return 0;
        }
        let factor = 1u64.checked_shl(retry - 1).unwrap_or(u64::MAX);
        self.base_ms.saturating_mul(factor).min(self.max_ms)
    }
}
