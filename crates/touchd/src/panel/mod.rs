//! Button panel capability.
//!
//! The dispatcher depends on this trait, not on the CAP1166 driver, so
//! tests can substitute a fake panel and fire releases by hand.

use touchd_core::Button;

pub mod cap1166;

pub use cap1166::Cap1166Panel;

/// Callback invoked when a pad is released.
///
/// May be called from the driver's polling thread, so it must be cheap
/// and thread-safe; the dispatcher's handlers only do a channel send.
pub type ReleaseHandler = Box<dyn Fn(Button) + Send + Sync>;

/// A panel of capacitive buttons that reports releases.
pub trait ButtonPanel {
    /// Whether the hardware was found at probe time.
    fn is_present(&self) -> bool;

    /// Registers the release handler for one pad.
    ///
    /// Release only; presses are not reported. Registering a handler
    /// for the same pad twice replaces the earlier one.
    fn on_release(&mut self, button: Button, handler: ReleaseHandler);
}
