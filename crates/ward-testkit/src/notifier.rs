//! Notifier that records every dispatch

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use ward_core::effects::{Notification, NotificationKind, NotifierEffects, Recipient};
use ward_core::{Result, WardError};

/// Notifier double that captures dispatches for assertions
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(Recipient, Notification)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything dispatched so far, in order
    pub fn sent(&self) -> Vec<(Recipient, Notification)> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Dispatches of one kind, in order
    pub fn sent_of_kind(&self, kind: NotificationKind) -> Vec<(Recipient, Notification)> {
        self.sent()
            .into_iter()
            .filter(|(_, notification)| notification.kind == kind)
            .collect()
    }

    /// Make every subsequent `notify` refuse the dispatch
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

#[async_trait]
impl NotifierEffects for RecordingNotifier {
    async fn notify(&self, recipient: Recipient, notification: Notification) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(WardError::persistence("notifier refused the dispatch"));
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((recipient, notification));
        Ok(())
    }
}
