//! Injected wall-clock time
//!
//! The waiting-period check and every audit timestamp go through this
//! trait so tests can drive time deterministically.

use async_trait::async_trait;
use std::sync::Arc;

/// Wall-clock provider, epoch seconds
#[async_trait]
pub trait ClockEffects: Send + Sync {
    /// Current Unix timestamp in seconds
    async fn now(&self) -> u64;
}

#[async_trait]
impl<T: ClockEffects + ?Sized> ClockEffects for Arc<T> {
    async fn now(&self) -> u64 {
        (**self).now().await
    }
}
