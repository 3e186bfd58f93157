//! Tracing-backed notification handler
//!
//! Content rendering and transport are the surrounding system's concern;
//! this handler records that a dispatch happened and acknowledges it.
//! Payloads carry live capability tokens, so only the channel and event
//! kind are logged, never the payload or the address.

use async_trait::async_trait;
use tracing::info;
use ward_core::effects::{Notification, NotifierEffects, Recipient};
use ward_core::Result;

/// Notifier that logs deliveries through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    /// Create a new tracing notifier
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifierEffects for TracingNotifier {
    async fn notify(&self, recipient: Recipient, notification: Notification) -> Result<()> {
        let channel = match recipient {
            Recipient::Email(_) => "email",
            Recipient::Sms(_) => "sms",
        };
        info!(
            channel,
            kind = ?notification.kind,
            identity = %notification.identity_id,
            "notification dispatched"
        );
        Ok(())
    }
}
