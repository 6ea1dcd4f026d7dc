//! ConnectionManager - async driver for the push connection.
//!
//! Executes the actions returned by [`ConnectionMachine`] against a
//! [`PushTransport`]: opening handles, arming the single reconnect timer,
//! and folding inbound frames into the shared [`DashboardState`].
//!
//! ## Stale events
//!
//! Every opened handle gets a generation number. Closing a handle bumps
//! the generation, so open completions, frames and close reports from a
//! superseded handle are dropped instead of driving the machine.
//!
//! ## Graceful Shutdown
//!
//! `shutdown()` aborts the reconnect timer, closes the live handle with
//! 1000 and refuses further `connect()` calls.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use crate::domain::connection::{
    ConnectionAction, ConnectionMachine, ConnectionState, ReconnectPolicy, TransportError,
    ABNORMAL_CLOSURE, NORMAL_CLOSURE,
};
use crate::domain::dashboard::FoldOutcome;
use crate::domain::events::{classify, Envelope, TypedEvent};
use crate::ports::{OutboundFrame, PushChannel, PushTransport, TransportEvent};

use super::SharedDashboard;

/// Settings for one managed connection.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub url: String,
    pub policy: ReconnectPolicy,
}

impl ConnectionSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            policy: ReconnectPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Observable snapshot of the connection, published on every transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub reconnect_attempts: u32,
    /// Delay of the armed reconnect timer, if any.
    pub next_retry_ms: Option<u64>,
    pub last_error: Option<String>,
}

impl ConnectionStatus {
    fn of(machine: &ConnectionMachine) -> Self {
        Self {
            state: machine.state(),
            reconnect_attempts: machine.attempts(),
            next_retry_ms: machine
                .pending_reconnect()
                .map(|p| p.delay.as_millis() as u64),
            last_error: machine.last_error().map(str::to_string),
        }
    }
}

struct Driver {
    machine: ConnectionMachine,
    outbound: Option<mpsc::UnboundedSender<OutboundFrame>>,
    timer: Option<JoinHandle<()>>,
    timer_seq: u64,
}

struct Shared {
    url: String,
    transport: Arc<dyn PushTransport>,
    dashboard: SharedDashboard,
    driver: Mutex<Driver>,
    generation: watch::Sender<u64>,
    status: watch::Sender<ConnectionStatus>,
    shut_down: AtomicBool,
}

/// Owner of the single push connection of a session.
///
/// Cheap to clone; clones drive the same connection.
#[derive(Clone)]
pub struct ConnectionManager {
    shared: Arc<Shared>,
}

impl ConnectionManager {
    pub fn new(
        settings: ConnectionSettings,
        transport: Arc<dyn PushTransport>,
        dashboard: SharedDashboard,
    ) -> Self {
        let machine = ConnectionMachine::new(settings.policy);
        let (status, _) = watch::channel(ConnectionStatus::of(&machine));
        let (generation, _) = watch::channel(0);

        Self {
            shared: Arc::new(Shared {
                url: settings.url,
                transport,
                dashboard,
                driver: Mutex::new(Driver {
                    machine,
                    outbound: None,
                    timer: None,
                    timer_seq: 0,
                }),
                generation,
                status,
                shut_down: AtomicBool::new(false),
            }),
        }
    }

    // === Operations ===

    /// Starts connecting unless a handle is already opening or open.
    /// Refused in `Error` and after shutdown.
    pub async fn connect(&self) {
        if self.is_shut_down() {
            tracing::debug!("connect ignored after shutdown");
            return;
        }
        let mut driver = self.shared.driver.lock().await;
        if driver.machine.state() == ConnectionState::Error {
            tracing::warn!("connect refused in error state; use reconnect()");
            return;
        }
        tracing::info!(url = %self.shared.url, "connecting push channel");
        let actions = driver.machine.connect();
        self.execute(&mut driver, actions);
    }

    /// Closes the connection with 1000 and suppresses any reconnect.
    pub async fn disconnect(&self, reason: &str) {
        let mut driver = self.shared.driver.lock().await;
        tracing::info!(reason, "disconnecting push channel");
        let actions = driver.machine.disconnect(reason);
        self.execute(&mut driver, actions);
    }

    /// Drops any handle, resets the attempt budget and connects again.
    pub async fn reconnect(&self) {
        if self.is_shut_down() {
            return;
        }
        let mut driver = self.shared.driver.lock().await;
        tracing::info!("manual reconnect");
        let actions = driver.machine.reconnect();
        self.execute(&mut driver, actions);
    }

    /// Sends one envelope if connected. Nothing is queued: returns false
    /// and drops the envelope otherwise.
    pub async fn send(&self, envelope: &Envelope) -> bool {
        let driver = self.shared.driver.lock().await;
        if !driver.machine.can_send() {
            tracing::debug!(event_type = %envelope.event_type, "send dropped: not connected");
            return false;
        }
        let text = match envelope.to_json() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode outbound envelope");
                return false;
            }
        };
        match &driver.outbound {
            Some(outbound) => outbound.send(OutboundFrame::Text(text)).is_ok(),
            None => false,
        }
    }

    /// Disposes the connection for good.
    pub async fn shutdown(&self) {
        self.shared.shut_down.store(true, Ordering::SeqCst);
        let mut driver = self.shared.driver.lock().await;
        let actions = driver.machine.disconnect("shutdown");
        self.execute(&mut driver, actions);
        if let Some(timer) = driver.timer.take() {
            timer.abort();
        }
        self.shared.generation.send_modify(|g| *g += 1);
        tracing::info!("connection manager shut down");
    }

    // === Queries ===

    pub fn state(&self) -> ConnectionState {
        self.shared.status.borrow().state
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.status.borrow().reconnect_attempts
    }

    pub fn status(&self) -> ConnectionStatus {
        self.shared.status.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionStatus> {
        self.shared.status.subscribe()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.shut_down.load(Ordering::SeqCst)
    }

    pub fn url(&self) -> &str {
        &self.shared.url
    }

    // === Action execution ===

    fn execute(&self, driver: &mut Driver, actions: Vec<ConnectionAction>) {
        for action in actions {
            match action {
                ConnectionAction::OpenTransport => {
                    let generation = self.bump_generation();
                    let manager = self.clone();
                    tokio::spawn(async move { manager.open_handle(generation).await });
                }
                ConnectionAction::SendInit => {
                    let sent = match (&driver.outbound, Envelope::connection_init().to_json()) {
                        (Some(outbound), Ok(text)) => outbound.send(OutboundFrame::Text(text)).is_ok(),
                        _ => false,
                    };
                    if !sent {
                        tracing::warn!("connection_init could not be sent");
                    }
                }
                ConnectionAction::ScheduleReconnect { delay, attempt } => {
                    tracing::info!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "scheduling reconnect"
                    );
                    self.arm_timer(driver, delay);
                }
                ConnectionAction::CancelReconnect => {
                    if let Some(timer) = driver.timer.take() {
                        timer.abort();
                    }
                }
                ConnectionAction::CloseTransport { code, reason } => {
                    if let Some(outbound) = driver.outbound.take() {
                        let _ = outbound.send(OutboundFrame::Close { code, reason });
                    }
                    self.bump_generation();
                }
            }
        }

        if driver.machine.state() == ConnectionState::Error {
            if let Some(reason) = driver.machine.last_error() {
                tracing::error!(reason, "push channel in error state");
            }
        }
        self.shared
            .status
            .send_replace(ConnectionStatus::of(&driver.machine));
    }

    fn bump_generation(&self) -> u64 {
        let mut next = 0;
        self.shared.generation.send_modify(|g| {
            *g += 1;
            next = *g;
        });
        next
    }

    fn current_generation(&self) -> u64 {
        *self.shared.generation.borrow()
    }

    fn arm_timer(&self, driver: &mut Driver, delay: Duration) {
        if let Some(previous) = driver.timer.take() {
            previous.abort();
        }
        driver.timer_seq += 1;
        let seq = driver.timer_seq;
        let manager = self.clone();
        driver.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            manager.on_timer(seq).await;
        }));
    }

    async fn on_timer(&self, seq: u64) {
        let mut driver = self.shared.driver.lock().await;
        if driver.timer_seq != seq || self.is_shut_down() {
            return;
        }
        driver.timer = None;
        tracing::info!(attempt = driver.machine.attempts(), "reconnect timer fired");
        let actions = driver.machine.on_timer_fired();
        self.execute(&mut driver, actions);
    }

    // === Transport handling ===

    async fn open_handle(&self, generation: u64) {
        let result = self.shared.transport.open(&self.shared.url).await;

        let mut driver = self.shared.driver.lock().await;
        if generation != self.current_generation() {
            if let Ok(channel) = result {
                let _ = channel.outbound.send(OutboundFrame::Close {
                    code: NORMAL_CLOSURE,
                    reason: "superseded".to_string(),
                });
            }
            return;
        }

        let actions = match result {
            Ok(PushChannel { outbound, inbound }) => {
                tracing::info!(url = %self.shared.url, "push channel open");
                driver.outbound = Some(outbound);
                // Subscribed under the driver lock so a bump racing the
                // spawn is still observed by the reader.
                let generation_rx = self.shared.generation.subscribe();
                let manager = self.clone();
                tokio::spawn(async move {
                    manager.read_loop(generation, generation_rx, inbound).await
                });
                driver.machine.on_open()
            }
            Err(e) if e.is_fatal() => {
                tracing::error!(error = %e, "push transport unusable");
                driver.machine.on_fatal_error(e.to_string())
            }
            Err(e) => {
                tracing::warn!(error = %e, "push transport open failed");
                driver.machine.on_close(ABNORMAL_CLOSURE)
            }
        };
        self.execute(&mut driver, actions);
    }

    async fn read_loop(
        &self,
        generation: u64,
        mut generation_rx: watch::Receiver<u64>,
        mut inbound: mpsc::UnboundedReceiver<TransportEvent>,
    ) {
        loop {
            tokio::select! {
                changed = generation_rx.changed() => {
                    if changed.is_err() || *generation_rx.borrow() != generation {
                        return;
                    }
                }
                event = inbound.recv() => match event {
                    Some(TransportEvent::Frame(text)) => self.handle_frame(generation, &text).await,
                    Some(TransportEvent::Closed { code, reason }) => {
                        self.on_transport_closed(generation, code, &reason).await;
                        return;
                    }
                    Some(TransportEvent::Failed(error)) => {
                        self.on_transport_failed(generation, error).await;
                        return;
                    }
                    None => {
                        self.on_transport_closed(generation, ABNORMAL_CLOSURE, "channel dropped")
                            .await;
                        return;
                    }
                },
            }
        }
    }

    async fn handle_frame(&self, generation: u64, text: &str) {
        if generation != self.current_generation() {
            return;
        }

        let envelope = match Envelope::parse(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(error = %e, len = text.len(), "dropping malformed frame");
                return;
            }
        };

        let event = classify(&envelope);
        let label = event.label();
        match &event {
            TypedEvent::Ack { message } => {
                tracing::info!(
                    server_message = message.as_deref().unwrap_or(""),
                    "connection confirmed"
                );
            }
            TypedEvent::Unclassified(miss) => {
                tracing::debug!(event_type = %miss.event_type, reason = %miss.reason, "unclassified event");
            }
            _ => {}
        }

        let outcome = self.shared.dashboard.write().await.apply_event(event);
        if outcome == FoldOutcome::Discarded {
            tracing::debug!(event = label, "event discarded after dispose");
        } else {
            tracing::trace!(event = label, ?outcome, "event folded");
        }
    }

    async fn on_transport_closed(&self, generation: u64, code: u16, reason: &str) {
        let mut driver = self.shared.driver.lock().await;
        if generation != self.current_generation() {
            return;
        }
        tracing::info!(code, reason, "push channel closed");
        driver.outbound = None;
        let actions = driver.machine.on_close(code);
        self.execute(&mut driver, actions);
    }

    async fn on_transport_failed(&self, generation: u64, error: TransportError) {
        if !error.is_fatal() {
            tracing::warn!(error = %error, "push channel failed");
            self.on_transport_closed(generation, ABNORMAL_CLOSURE, "transport failure")
                .await;
            return;
        }
        let mut driver = self.shared.driver.lock().await;
        if generation != self.current_generation() {
            return;
        }
        driver.outbound = None;
        let actions = driver.machine.on_fatal_error(error.to_string());
        self.execute(&mut driver, actions);
    }
}
