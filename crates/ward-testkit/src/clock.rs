//! Manually advanced clock

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use ward_core::effects::ClockEffects;

/// Clock that only moves when a test tells it to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Create a clock frozen at the given epoch second
    pub fn at(epoch_secs: u64) -> Self {
        Self {
            now: AtomicU64::new(epoch_secs),
        }
    }

    /// Jump to an absolute epoch second
    pub fn set(&self, epoch_secs: u64) {
        self.now.store(epoch_secs, Ordering::SeqCst);
    }

    /// Advance by a number of seconds
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClockEffects for ManualClock {
    async fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
