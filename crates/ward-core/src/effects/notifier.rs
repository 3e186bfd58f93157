//! Outbound user notification
//!
//! The engine fires one call per notification and never blocks on
//! delivery; content rendering and transport are the surrounding system's
//! concern. Payloads are structured JSON so the caller can template
//! messages and feed audit pipelines from the same values.

use crate::errors::Result;
use crate::identifiers::IdentityId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Delivery channel plus address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipient {
    /// Confirmed email address
    Email(String),
    /// Confirmed phone number, SMS channel
    Sms(String),
}

/// What happened, from the user's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// An account reset was requested; carries the cancellation capability
    ResetRequested,
    /// The pending reset was cancelled
    ResetCancelled,
    /// The waiting period elapsed and the reset is ready to complete
    ResetGranted,
    /// The factor set was replaced
    ResetCompleted,
    /// A configured factor was revoked
    FactorRevoked,
}

/// One outbound notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Event being notified
    pub kind: NotificationKind,
    /// Identity the event concerns
    pub identity_id: IdentityId,
    /// Structured event payload (tokens, audit counts, timestamps)
    pub payload: serde_json::Value,
}

impl Notification {
    /// Build a notification with a structured payload
    pub fn new(kind: NotificationKind, identity_id: IdentityId, payload: serde_json::Value) -> Self {
        Self {
            kind,
            identity_id,
            payload,
        }
    }
}

/// Fire-and-forget notification dispatch
#[async_trait]
pub trait NotifierEffects: Send + Sync {
    /// Deliver one notification to one recipient
    ///
    /// An `Ok` return acknowledges acceptance, not delivery.
    async fn notify(&self, recipient: Recipient, notification: Notification) -> Result<()>;
}

#[async_trait]
impl<T: NotifierEffects + ?Sized> NotifierEffects for Arc<T> {
    async fn notify(&self, recipient: Recipient, notification: Notification) -> Result<()> {
        (**self).notify(recipient, notification).await
    }
}
