//! Ward Reset - Delayed Account-Reset Lifecycle
//!
//! The recovery path for "all factors lost": a user requests a reset,
//! waits out a mandatory calendar-time period during which every confirmed
//! contact channel is told about the request and can cancel it, and only
//! then receives a grant token that lets them replace their factor set.
//!
//! State machine per identity:
//!
//! ```text
//! Uninitiated --create_request--> Requested --grant--> Granted --complete--> Completed
//!                                     |                   |
//!                                     +-----cancel--------+--> Cancelled
//! ```
//!
//! `Uninitiated` is the absence of a request. Cancelled and Completed are
//! terminal; tokens are cleared the instant a request leaves the active
//! states, so no token is ever reusable.

#![forbid(unsafe_code)]

/// The reset-request record and its transitions
pub mod request;

/// Reset-request persistence effect trait
pub mod store;

/// The lifecycle service orchestrating effects around the state machine
pub mod lifecycle;

pub use lifecycle::AccountResetLifecycle;
pub use request::{AccountResetRequest, ResetState};
pub use store::ResetStore;
