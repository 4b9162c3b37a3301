//! Touchd Core - Shared types for the Touch pHAT KVM front end
//!
//! This crate provides the domain types shared between the daemon's
//! session manager and button dispatcher: the fixed set of panel
//! buttons, the action identifiers understood by the KVM service,
//! and the button-to-action map parsed from the service's settings
//! payload.
//!
//! No I/O lives here; everything is plain data so the daemon crate
//! can exercise it against fakes in tests.

pub mod action;
pub mod button;
pub mod error;

// Re-exports for convenience
pub use action::{Action, ActionMap};
pub use button::Button;
pub use error::{SettingsError, SettingsResult};
