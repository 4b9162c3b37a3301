//! Button dispatcher: panel releases in, remote calls out.
//!
//! Construction registers one release handler per pad; the handlers
//! only hand the event to the run loop over a channel, so the driver's
//! polling thread is never blocked by D-Bus traffic. Each event is then
//! dispatched as its own task: a slow or retrying remote call for one
//! press never delays detection of the next.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use touchd_core::{Action, Button};

use crate::panel::ButtonPanel;
use crate::service::ServiceConnector;
use crate::session::SessionManager;

/// Idle-wait granularity of the run loop; also the worst-case latency
/// for observing [`ButtonDispatcher::stop`].
pub const IDLE_TICK: Duration = Duration::from_secs(1);

/// Receives button releases and forwards the configured action to the
/// session manager.
pub struct ButtonDispatcher<C: ServiceConnector> {
    session: Arc<SessionManager<C>>,
    events: mpsc::UnboundedReceiver<Button>,
    // Kept so the channel survives the panel dropping its handlers.
    event_tx: mpsc::UnboundedSender<Button>,
    present: bool,
    cancel_token: CancellationToken,
}

impl<C: ServiceConnector> ButtonDispatcher<C> {
    /// Creates the dispatcher and registers a release handler for every
    /// pad with the panel.
    ///
    /// Construction always succeeds; when the panel reports no hardware
    /// the dispatcher still builds and [`run`](Self::run) becomes a
    /// graceful no-op.
    pub fn new<P: ButtonPanel>(
        panel: &mut P,
        session: Arc<SessionManager<C>>,
        cancel_token: CancellationToken,
    ) -> Self {
        let (event_tx, events) = mpsc::unbounded_channel();

        for button in Button::ALL {
            let tx = event_tx.clone();
            panel.on_release(
                button,
                Box::new(move |released| {
                    // Send only; the polling thread must never wait.
                    let _ = tx.send(released);
                }),
            );
        }

        Self {
            session,
            events,
            event_tx,
            present: panel.is_present(),
            cancel_token,
        }
    }

    /// Signals the run loop to exit after its current wait.
    ///
    /// Does not tear down the session or cancel in-flight calls.
    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    /// Main loop of the daemon.
    ///
    /// With no hardware present this returns immediately without any
    /// connection attempt. Otherwise it connects, loads settings (so
    /// the first press always sees a populated map), then idles,
    /// spawning one task per button event until stopped.
    pub async fn run(&mut self) {
        if !self.present {
            info!("Touch pHAT not found, disabling");
            return;
        }

        info!("KVM service connecting...");
        self.session.connect().await;
        self.session.load_settings().await;

        info!("Running in loop");
        let mut tick = interval(IDLE_TICK);

        loop {
            tokio::select! {
                biased;

                _ = self.cancel_token.cancelled() => {
                    break;
                }

                event = self.events.recv() => {
                    if let Some(button) = event {
                        debug!(button = %button, "Button event received");
                        let session = Arc::clone(&self.session);
                        tokio::spawn(dispatch_release(session, button));
                    }
                }

                _ = tick.tick() => {}
            }
        }

        info!("Shut down completed");
    }

    /// Sender that injects synthetic button events into the run loop,
    /// exactly as a panel release would.
    pub fn event_sender(&self) -> mpsc::UnboundedSender<Button> {
        self.event_tx.clone()
    }
}

/// Handles a single button release.
///
/// Looks the pad up in the current map snapshot; the recognized action
/// goes out as a remote call, anything else is a logged no-op.
pub async fn dispatch_release<C: ServiceConnector>(session: Arc<SessionManager<C>>, button: Button) {
    match session.action_for(button).await {
        Some(Action::SwitchNextHost) => {
            info!(button = %button, "Button released - switching to next host");
            if let Err(e) = session.switch_next_host().await {
                warn!(button = %button, error = %e, "Switch to next host failed");
            }
        }
        None => {
            let configured = session.configured_value(button).await;
            info!(
                button = %button,
                configured = configured.as_deref().unwrap_or("none"),
                "Button released - no action configured"
            );
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
