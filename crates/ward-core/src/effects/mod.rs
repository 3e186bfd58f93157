//! Pure effect interfaces
//!
//! These traits are the seams between the recovery engine and the
//! surrounding system. Production handlers live in `ward-effects`,
//! deterministic test doubles in `ward-testkit`. Domain-specific stores
//! live next to the types they persist (`ward-factors`, `ward-reset`).

/// Injected wall-clock time
pub mod clock;

/// Outbound user notification
pub mod notifier;

/// Identity-proofing assurance oracle
pub mod proofing;

pub use clock::ClockEffects;
pub use notifier::{Notification, NotificationKind, NotifierEffects, Recipient};
pub use proofing::ProofingEffects;
