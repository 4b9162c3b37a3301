//! Error types for the touchd daemon.
//!
//! Two concerns fail here: talking to the KVM service over the system
//! bus, and talking to the CAP1166 controller over I2C. Service errors
//! are all recovered locally by the session manager (reconnect and
//! retry); panel errors only matter at probe time, where they downgrade
//! the daemon to the no-hardware path.

use thiserror::Error;

// ============================================================================
// Service Errors
// ============================================================================

/// Errors from the KVM service connection.
///
/// Every variant is treated as connection-level by the session manager:
/// the session is considered dead and a reconnect cycle runs. This
/// matches the service contract, which does not distinguish transport
/// loss from a restarted service mid-call.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// D-Bus transport or remote call failure.
    #[error("D-Bus error: {0}")]
    Dbus(#[from] zbus::Error),

    /// Failure from a standard `org.freedesktop.DBus` interface,
    /// e.g. introspecting a service name nobody owns.
    #[error("D-Bus error: {0}")]
    Fdo(#[from] zbus::fdo::Error),

    /// No session is established.
    #[error("KVM service session not established")]
    NotConnected,
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// ============================================================================
// Panel Errors
// ============================================================================

/// Errors from probing or driving the Touch pHAT.
#[derive(Error, Debug)]
pub enum PanelError {
    /// The I2C bus device could not be opened or addressed.
    #[error("Failed to open I2C device: {0}")]
    Bus(#[from] i2cdev::linux::LinuxI2CError),

    /// Something answered on the bus, but it is not a CAP1166.
    #[error("Unexpected product id {found:#04x} (expected {expected:#04x})")]
    UnknownDevice { found: u8, expected: u8 },

    /// The polling thread could not be spawned.
    #[error("Failed to start polling thread: {0}")]
    Thread(#[from] std::io::Error),
}
