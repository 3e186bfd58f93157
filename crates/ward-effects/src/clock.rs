//! System wall-clock handler

use async_trait::async_trait;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use ward_core::effects::ClockEffects;

/// Production clock delegating to the operating system
///
/// Stateless; this handler layer is the one place system time is read.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ClockEffects for SystemClock {
    async fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs()
    }
}
