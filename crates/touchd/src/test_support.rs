//! Shared fakes for exercising the session manager and dispatcher
//! without a system bus or hardware.
//!
//! `FakeService`/`FakeConnector` count every attempt and can be told to
//! fail the next N calls, which is how the retry semantics are pinned
//! down in tests. `FakePanel` stores handlers and fires releases by
//! hand.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use touchd_core::Button;

use crate::error::{ServiceError, ServiceResult};
use crate::panel::{ButtonPanel, ReleaseHandler};
use crate::service::{HostService, ServiceConnector};

/// Decrements `counter` if positive; true means "fail this call".
fn take_failure(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

// ============================================================================
// Fake Service
// ============================================================================

#[derive(Default)]
pub struct FakeServiceState {
    settings: Mutex<String>,
    fetch_failures: AtomicUsize,
    switch_failures: AtomicUsize,
    fetch_attempts: AtomicUsize,
    switch_attempts: AtomicUsize,
}

/// In-memory stand-in for the KVM service.
#[derive(Clone, Default)]
pub struct FakeService {
    state: Arc<FakeServiceState>,
}

impl FakeService {
    pub fn with_settings(payload: &str) -> Self {
        let service = Self::default();
        service.set_settings(payload);
        service
    }

    /// Replaces the payload returned by subsequent fetches.
    pub fn set_settings(&self, payload: &str) {
        if let Ok(mut settings) = self.state.settings.lock() {
            *settings = payload.to_string();
        }
    }

    /// Makes the next `count` fetches fail with a connection error.
    pub fn fail_next_fetches(&self, count: usize) {
        self.state.fetch_failures.store(count, Ordering::SeqCst);
    }

    /// Makes the next `count` switch calls fail with a connection error.
    pub fn fail_next_switches(&self, count: usize) {
        self.state.switch_failures.store(count, Ordering::SeqCst);
    }

    /// Total fetch attempts, failed ones included.
    pub fn fetch_attempts(&self) -> usize {
        self.state.fetch_attempts.load(Ordering::SeqCst)
    }

    /// Total switch attempts, failed ones included.
    pub fn switch_attempts(&self) -> usize {
        self.state.switch_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostService for FakeService {
    async fn fetch_settings(&self) -> ServiceResult<String> {
        self.state.fetch_attempts.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.state.fetch_failures) {
            return Err(ServiceError::NotConnected);
        }
        let payload = self
            .state
            .settings
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default();
        Ok(payload)
    }

    async fn switch_next_host(&self) -> ServiceResult<()> {
        self.state.switch_attempts.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.state.switch_failures) {
            return Err(ServiceError::NotConnected);
        }
        Ok(())
    }
}

// ============================================================================
// Fake Connector
// ============================================================================

#[derive(Default)]
pub struct FakeConnectorState {
    connect_failures: AtomicUsize,
    connect_attempts: AtomicUsize,
}

/// Connector whose attempts can be made to fail N times before
/// succeeding, simulating a service that comes up late.
#[derive(Clone, Default)]
pub struct FakeConnector {
    pub service: FakeService,
    state: Arc<FakeConnectorState>,
}

impl FakeConnector {
    pub fn new(service: FakeService) -> Self {
        Self {
            service,
            state: Arc::default(),
        }
    }

    /// Makes the next `count` connection attempts fail.
    pub fn fail_next_connects(&self, count: usize) {
        self.state.connect_failures.store(count, Ordering::SeqCst);
    }

    /// Total connection attempts, failed ones included.
    pub fn connect_attempts(&self) -> usize {
        self.state.connect_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServiceConnector for FakeConnector {
    type Service = FakeService;

    async fn connect(&self) -> ServiceResult<FakeService> {
        self.state.connect_attempts.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.state.connect_failures) {
            return Err(ServiceError::NotConnected);
        }
        Ok(self.service.clone())
    }
}

// ============================================================================
// Fake Panel
// ============================================================================

/// Panel stand-in: stores handlers and fires releases on demand.
#[derive(Default)]
pub struct FakePanel {
    present: bool,
    handlers: HashMap<Button, ReleaseHandler>,
}

impl FakePanel {
    pub fn present() -> Self {
        Self {
            present: true,
            handlers: HashMap::new(),
        }
    }

    pub fn absent() -> Self {
        Self::default()
    }

    /// Fires the registered release handler for a pad, like the driver
    /// polling thread would.
    pub fn release(&self, button: Button) {
        if let Some(handler) = self.handlers.get(&button) {
            handler(button);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl ButtonPanel for FakePanel {
    fn is_present(&self) -> bool {
        self.present
    }

    fn on_release(&mut self, button: Button, handler: ReleaseHandler) {
        self.handlers.insert(button, handler);
    }
}
