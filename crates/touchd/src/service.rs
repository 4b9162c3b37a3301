//! D-Bus client for the rpi-kvm host switching service.
//!
//! The service owns all host-switching logic and the button
//! configuration; this daemon only consumes two remote operations:
//! `GetTouchPhatSettings` and `SwitchToNextConnectedHost`.
//!
//! The session manager is written against the [`HostService`] and
//! [`ServiceConnector`] traits rather than the zbus proxy directly, so
//! tests can stand in a fake service that fails on demand. [`SystemBus`]
//! is the production connector.

use async_trait::async_trait;
use zbus::Connection;

use crate::error::ServiceResult;

/// Well-known bus name of the KVM service.
pub const SERVICE_NAME: &str = "org.rpi.kvmservice";

/// Object path of the KVM service.
pub const OBJECT_PATH: &str = "/org/rpi/kvmservice";

#[zbus::proxy(
    gen_blocking = false,
    interface = "org.rpi.kvmservice",
    default_service = "org.rpi.kvmservice",
    default_path = "/org/rpi/kvmservice"
)]
pub trait KvmService {
    /// Returns the button settings as a JSON-encoded object of
    /// button key to action identifier.
    fn get_touch_phat_settings(&self) -> zbus::Result<String>;

    /// Switches the KVM to the next connected host.
    fn switch_to_next_connected_host(&self) -> zbus::Result<()>;
}

// ============================================================================
// Service Seam
// ============================================================================

/// The two remote operations this daemon consumes.
///
/// Any error is connection-level: callers treat the session as dead and
/// reconnect.
#[async_trait]
pub trait HostService: Clone + Send + Sync + 'static {
    /// Fetches the raw JSON settings payload.
    async fn fetch_settings(&self) -> ServiceResult<String>;

    /// Invokes the switch-to-next-host operation.
    async fn switch_next_host(&self) -> ServiceResult<()>;
}

/// One attempt at establishing a session to the KVM service.
///
/// Retry policy lives in the session manager; a connector only ever
/// tries once.
#[async_trait]
pub trait ServiceConnector: Send + Sync + 'static {
    /// The session handle produced on success.
    type Service: HostService;

    /// Attempts to reach the service and resolve its interface.
    async fn connect(&self) -> ServiceResult<Self::Service>;
}

#[async_trait]
impl HostService for KvmServiceProxy<'static> {
    async fn fetch_settings(&self) -> ServiceResult<String> {
        Ok(self.get_touch_phat_settings().await?)
    }

    async fn switch_next_host(&self) -> ServiceResult<()> {
        Ok(self.switch_to_next_connected_host().await?)
    }
}

// ============================================================================
// System Bus Connector
// ============================================================================

/// Production connector: system bus, introspection, proxy resolution.
pub struct SystemBus;

#[async_trait]
impl ServiceConnector for SystemBus {
    type Service = KvmServiceProxy<'static>;

    async fn connect(&self) -> ServiceResult<Self::Service> {
        let connection = Connection::system().await?;

        // Building a proxy succeeds even when nobody owns the name, so
        // introspect first: it fails with ServiceUnknown while the KVM
        // service is down, which is what turns connect() into a retry.
        let introspectable = zbus::fdo::IntrospectableProxy::builder(&connection)
            .destination(SERVICE_NAME)?
            .path(OBJECT_PATH)?
            .build()
            .await?;
        introspectable.introspect().await?;

        Ok(KvmServiceProxy::new(&connection).await?)
    }
}
