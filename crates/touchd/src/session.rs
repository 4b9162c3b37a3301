//! Session manager for the KVM service connection.
//!
//! Owns the lifecycle of the D-Bus session: establishing it, fetching
//! the button settings through it, and re-establishing it transparently
//! whenever a call fails because the service is gone or restarting.
//!
//! # Session Lifecycle
//!
//! `DISCONNECTED -> CONNECTING -> CONNECTED`, re-entering `CONNECTING`
//! whenever a remote call fails. `CONNECTING` has no failure exit: it
//! retries with a fixed delay until the service appears, forever if it
//! never does. Process shutdown is external to this type.
//!
//! # Sharing
//!
//! The session handle and the action map are both replaced wholesale,
//! never mutated in place, so concurrently dispatched button tasks work
//! from cheap snapshots. Concurrent reconnects are allowed to race;
//! last writer wins, which is fine at human button-press rates.

use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use touchd_core::{Action, ActionMap, Button};

use crate::error::{ServiceError, ServiceResult};
use crate::service::{HostService, ServiceConnector};

/// Fixed delay between connection attempts while the service is down.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for session establishment.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Delay between connection attempts.
    pub retry_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            retry_delay: RETRY_DELAY,
        }
    }
}

// ============================================================================
// Session Manager
// ============================================================================

/// Manages the session to the KVM service and the action map loaded
/// through it.
///
/// Generic over a [`ServiceConnector`] so tests can drive it with a
/// fake service that fails a chosen number of times.
pub struct SessionManager<C: ServiceConnector> {
    connector: C,
    config: SessionConfig,
    session: RwLock<Option<C::Service>>,
    actions: RwLock<ActionMap>,
}

impl<C: ServiceConnector> SessionManager<C> {
    /// Creates a session manager in the disconnected state.
    pub fn new(connector: C, config: SessionConfig) -> Self {
        Self {
            connector,
            config,
            session: RwLock::new(None),
            actions: RwLock::new(ActionMap::empty()),
        }
    }

    /// Creates a session manager with the default 5 second retry delay.
    pub fn with_defaults(connector: C) -> Self {
        Self::new(connector, SessionConfig::default())
    }

    /// Whether a session is currently established.
    pub async fn is_connected(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Snapshot of the current action map.
    pub async fn actions(&self) -> ActionMap {
        self.actions.read().await.clone()
    }

    /// The recognized action configured for a pad, if any.
    pub async fn action_for(&self, button: Button) -> Option<Action> {
        self.actions.read().await.action_for(button)
    }

    /// Raw configured identifier for a pad, for logging no-op presses.
    pub async fn configured_value(&self, button: Button) -> Option<String> {
        self.actions
            .read()
            .await
            .configured_value(button)
            .map(str::to_string)
    }

    async fn session_snapshot(&self) -> Option<C::Service> {
        self.session.read().await.clone()
    }

    /// Establishes a session, retrying forever.
    ///
    /// Each failed attempt waits `retry_delay` before the next one; the
    /// call only returns once connected. A successful attempt replaces
    /// any previously held session wholesale.
    pub async fn connect(&self) {
        let mut attempt = 0u32;

        loop {
            attempt = attempt.saturating_add(1);
            debug!(attempt, "Attempting to connect to KVM service");

            match self.connector.connect().await {
                Ok(service) => {
                    *self.session.write().await = Some(service);
                    info!(attempt, "KVM service connected");
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "KVM service not available - reconnecting...");
                    sleep(self.config.retry_delay).await;
                }
            }
        }
    }

    /// Fetches the settings payload and replaces the action map.
    ///
    /// On a connection-level failure the session is treated as dead:
    /// reconnect, then try the fetch again, indefinitely. A malformed
    /// payload is logged and the previous map retained; crashing an
    /// unattended daemon over one bad payload would be worse, and the
    /// next reconnect reloads anyway.
    pub async fn load_settings(&self) {
        loop {
            let Some(service) = self.session_snapshot().await else {
                self.connect().await;
                continue;
            };

            match service.fetch_settings().await {
                Ok(payload) => {
                    match ActionMap::parse(&payload) {
                        Ok(map) => {
                            info!(entries = map.len(), "Loaded settings");
                            *self.actions.write().await = map;
                        }
                        Err(e) => {
                            warn!(error = %e, "Malformed settings payload - keeping previous map");
                        }
                    }
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "D-Bus connection terminated - reconnecting...");
                    self.connect().await;
                }
            }
        }
    }

    /// Invokes the switch-to-next-host operation.
    ///
    /// On a connection-level failure this performs exactly one
    /// reconnect-and-retry cycle; a second failure is returned to the
    /// caller and not retried further. The asymmetry with
    /// [`load_settings`](Self::load_settings), which retries forever, is
    /// deliberate: it mirrors the service contract as deployed, pending
    /// product-owner confirmation either way.
    pub async fn switch_next_host(&self) -> ServiceResult<()> {
        if let Some(service) = self.session_snapshot().await {
            match service.switch_next_host().await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(error = %e, "D-Bus connection terminated - reconnecting...");
                }
            }
        }

        self.connect().await;
        let service = self
            .session_snapshot()
            .await
            .ok_or(ServiceError::NotConnected)?;
        service.switch_next_host().await
    }
}

// ============================================================================
// Tests
// ============================================================================
