//! Connection lifecycle state machine.
//!
//! `ConnectionMachine` is a pure transition type: every input (a caller
//! request or a transport observation) updates the state and returns the
//! side effects the async driver must perform. It never touches I/O or
//! timers itself, which keeps reconnect behaviour testable without a
//! runtime.
//!
//! ```text
//! Disconnected --connect()--> Connecting --open--> Connected
//!      ^                          |                   |
//!      |<------ close(1000) ------+-------------------+
//!      |<-- abnormal close, attempts < max (timer) ---+
//!      |                                              |
//!      +--timer--> Connecting      Error <-- exhausted / fatal
//!                                    |
//!                                    +--reconnect()--> Connecting
//! ```

use std::time::Duration;

use crate::domain::foundation::StateMachine;

use super::backoff::ReconnectPolicy;
use super::state::ConnectionState;

/// RFC 6455 normal closure.
pub const NORMAL_CLOSURE: u16 = 1000;

/// RFC 6455 abnormal closure (no close frame received).
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionAction {
    /// Open a new transport handle.
    OpenTransport,
    /// Send the `connection_init` envelope on the fresh handle.
    SendInit,
    /// Arm the single reconnect timer.
    ScheduleReconnect { delay: Duration, attempt: u32 },
    /// Disarm the pending reconnect timer.
    CancelReconnect,
    /// Close the live handle with the given code.
    CloseTransport { code: u16, reason: String },
}

/// A reconnect timer that has been requested but not yet fired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingReconnect {
    pub attempt: u32,
    pub delay: Duration,
}

/// Finite-state machine for one push connection.
#[derive(Debug, Clone)]
pub struct ConnectionMachine {
    state: ConnectionState,
    attempts: u32,
    policy: ReconnectPolicy,
    pending: Option<PendingReconnect>,
    handle_active: bool,
    last_error: Option<String>,
}

impl ConnectionMachine {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            attempts: 0,
            policy,
            pending: None,
            handle_active: false,
            last_error: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Failed cycles since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn pending_reconnect(&self) -> Option<PendingReconnect> {
        self.pending
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// Sends are only permitted on an open handle.
    pub fn can_send(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Caller asks for a connection.
    ///
    /// No-op while a handle is opening or open, and refused in `Error`
    /// (use [`reconnect`](Self::reconnect) instead).
    pub fn connect(&mut self) -> Vec<ConnectionAction> {
        if self.state.has_live_handle() || self.handle_active {
            return Vec::new();
        }
        if self.state == ConnectionState::Error {
            return Vec::new();
        }

        let mut actions = self.cancel_pending();
        self.enter(ConnectionState::Connecting);
        self.handle_active = true;
        actions.push(ConnectionAction::OpenTransport);
        actions
    }

    /// Transport reported a successful open.
    pub fn on_open(&mut self) -> Vec<ConnectionAction> {
        if self.state != ConnectionState::Connecting {
            return Vec::new();
        }
        self.enter(ConnectionState::Connected);
        self.attempts = 0;
        self.last_error = None;
        vec![ConnectionAction::SendInit]
    }

    /// Transport reported the handle closed.
    pub fn on_close(&mut self, code: u16) -> Vec<ConnectionAction> {
        if !self.handle_active {
            return Vec::new();
        }
        self.handle_active = false;

        if code == NORMAL_CLOSURE {
            self.enter(ConnectionState::Disconnected);
            return Vec::new();
        }

        self.enter(ConnectionState::Disconnected);
        self.attempts += 1;

        if self.policy.is_exhausted(self.attempts) {
            self.enter(ConnectionState::Error);
            self.last_error = Some(format!(
                "gave up after {} reconnect attempts",
                self.attempts
            ));
            return Vec::new();
        }

        let delay = self.policy.delay_for_attempt(self.attempts);
        self.pending = Some(PendingReconnect {
            attempt: self.attempts,
            delay,
        });
        vec![ConnectionAction::ScheduleReconnect {
            delay,
            attempt: self.attempts,
        }]
    }

    /// The transport cannot be used at all (e.g. malformed endpoint).
    pub fn on_fatal_error(&mut self, message: impl Into<String>) -> Vec<ConnectionAction> {
        let mut actions = self.cancel_pending();
        if self.handle_active {
            self.handle_active = false;
            actions.push(ConnectionAction::CloseTransport {
                code: NORMAL_CLOSURE,
                reason: "transport error".to_string(),
            });
        }
        self.last_error = Some(message.into());
        if self.state != ConnectionState::Error {
            self.enter(ConnectionState::Error);
        }
        actions
    }

    /// The reconnect timer elapsed.
    pub fn on_timer_fired(&mut self) -> Vec<ConnectionAction> {
        if self.pending.take().is_none() || self.state != ConnectionState::Disconnected {
            return Vec::new();
        }
        self.enter(ConnectionState::Connecting);
        self.handle_active = true;
        vec![ConnectionAction::OpenTransport]
    }

    /// Caller closes the connection; suppresses any reconnect.
    pub fn disconnect(&mut self, reason: impl Into<String>) -> Vec<ConnectionAction> {
        let mut actions = self.cancel_pending();
        if self.handle_active {
            self.handle_active = false;
            actions.push(ConnectionAction::CloseTransport {
                code: NORMAL_CLOSURE,
                reason: reason.into(),
            });
        }
        if self.state != ConnectionState::Disconnected {
            self.enter(ConnectionState::Disconnected);
        }
        actions
    }

    /// Manual reconnect: resets the attempt budget and opens a fresh handle
    /// from any state, including `Error`.
    pub fn reconnect(&mut self) -> Vec<ConnectionAction> {
        let mut actions = self.disconnect("manual reconnect");
        self.attempts = 0;
        self.last_error = None;
        self.enter(ConnectionState::Connecting);
        self.handle_active = true;
        actions.push(ConnectionAction::OpenTransport);
        actions
    }

    fn cancel_pending(&mut self) -> Vec<ConnectionAction> {
        match self.pending.take() {
            Some(_) => vec![ConnectionAction::CancelReconnect],
            None => Vec::new(),
        }
    }

    fn enter(&mut self, target: ConnectionState) {
        debug_assert!(
            self.state.can_transition_to(&target),
            "illegal connection transition {:?} -> {:?}",
            self.state,
            target
        );
        self.state = target;
    }
}

impl Default for ConnectionMachine {
    fn default() -> Self {
        Self::new(ReconnectPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected_machine() -> ConnectionMachine {
        let mut machine = ConnectionMachine::default();
        machine.connect();
        machine.on_open();
        machine
    }

    #[test]
    fn connect_opens_transport_from_disconnected() {
        let mut machine = ConnectionMachine::default();
        let actions = machine.connect();

        assert_eq!(actions, vec![ConnectionAction::OpenTransport]);
        assert_eq!(machine.state(), ConnectionState::Connecting);
    }

    #[test]
    fn connect_is_noop_while_handle_is_live() {
        let mut machine = ConnectionMachine::default();
        machine.connect();
        assert!(machine.connect().is_empty());

        machine.on_open();
        assert!(machine.connect().is_empty());
        assert_eq!(machine.state(), ConnectionState::Connected);
    }

    #[test]
    fn open_resets_attempts_and_sends_init() {
        let mut machine = ConnectionMachine::default();
        machine.connect();
        machine.on_close(ABNORMAL_CLOSURE);
        assert_eq!(machine.attempts(), 1);

        machine.on_timer_fired();
        let actions = machine.on_open();

        assert_eq!(actions, vec![ConnectionAction::SendInit]);
        assert_eq!(machine.attempts(), 0);
        assert_eq!(machine.state(), ConnectionState::Connected);
    }

    #[test]
    fn abnormal_close_at_attempt_zero_schedules_base_delay() {
        let mut machine = connected_machine();
        let actions = machine.on_close(ABNORMAL_CLOSURE);

        assert_eq!(machine.state(), ConnectionState::Disconnected);
        assert_eq!(machine.attempts(), 1);
        assert_eq!(
            actions,
            vec![ConnectionAction::ScheduleReconnect {
                delay: Duration::from_millis(5_000),
                attempt: 1,
            }]
        );
    }

    #[test]
    fn normal_close_does_not_reconnect() {
        let mut machine = connected_machine();
        let actions = machine.on_close(NORMAL_CLOSURE);

        assert!(actions.is_empty());
        assert_eq!(machine.state(), ConnectionState::Disconnected);
        assert!(machine.pending_reconnect().is_none());
    }

    #[test]
    fn ten_consecutive_abnormal_closes_end_in_error_without_timer() {
        let mut machine = ConnectionMachine::default();
        machine.connect();

        for cycle in 1..=10u32 {
            let actions = machine.on_close(ABNORMAL_CLOSURE);
            if cycle < 10 {
                assert_eq!(
                    actions,
                    vec![ConnectionAction::ScheduleReconnect {
                        delay: machine.policy().delay_for_attempt(cycle),
                        attempt: cycle,
                    }]
                );
                assert_eq!(machine.on_timer_fired(), vec![ConnectionAction::OpenTransport]);
            } else {
                assert!(actions.is_empty());
            }
        }

        assert_eq!(machine.state(), ConnectionState::Error);
        assert!(machine.pending_reconnect().is_none());
        assert!(machine.last_error().is_some());
    }

    #[test]
    fn delays_follow_backoff_for_each_attempt() {
        let mut machine = ConnectionMachine::default();
        machine.connect();

        let mut delays = Vec::new();
        for _ in 0..9 {
            for action in machine.on_close(ABNORMAL_CLOSURE) {
                if let ConnectionAction::ScheduleReconnect { delay, .. } = action {
                    delays.push(delay.as_millis() as u64);
                }
            }
            machine.on_timer_fired();
        }

        assert_eq!(
            delays,
            vec![5_000, 7_500, 11_250, 16_875, 25_313, 30_000, 30_000, 30_000, 30_000]
        );
    }

    #[test]
    fn error_is_terminal_until_manual_reconnect() {
        let mut machine = ConnectionMachine::default();
        machine.connect();
        machine.on_fatal_error("invalid endpoint");
        assert_eq!(machine.state(), ConnectionState::Error);

        assert!(machine.connect().is_empty());
        assert_eq!(machine.state(), ConnectionState::Error);

        let actions = machine.reconnect();
        assert!(actions.contains(&ConnectionAction::OpenTransport));
        assert_eq!(machine.state(), ConnectionState::Connecting);
        assert_eq!(machine.attempts(), 0);
    }

    #[test]
    fn disconnect_cancels_pending_timer_and_suppresses_reconnect() {
        let mut machine = connected_machine();
        machine.on_close(ABNORMAL_CLOSURE);
        assert!(machine.pending_reconnect().is_some());

        let actions = machine.disconnect("user logout");
        assert_eq!(actions, vec![ConnectionAction::CancelReconnect]);
        assert!(machine.pending_reconnect().is_none());

        // A late timer firing is ignored.
        assert!(machine.on_timer_fired().is_empty());
        assert_eq!(machine.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn disconnect_closes_live_handle_normally() {
        let mut machine = connected_machine();
        let actions = machine.disconnect("session end");

        assert_eq!(
            actions,
            vec![ConnectionAction::CloseTransport {
                code: NORMAL_CLOSURE,
                reason: "session end".to_string(),
            }]
        );

        // The echoed close from the old handle must not schedule a reconnect.
        assert!(machine.on_close(ABNORMAL_CLOSURE).is_empty());
        assert_eq!(machine.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn connect_supersedes_pending_timer() {
        let mut machine = connected_machine();
        machine.on_close(ABNORMAL_CLOSURE);

        let actions = machine.connect();
        assert_eq!(
            actions,
            vec![ConnectionAction::CancelReconnect, ConnectionAction::OpenTransport]
        );
        assert!(machine.pending_reconnect().is_none());
    }

    #[test]
    fn sends_only_allowed_when_connected() {
        let mut machine = ConnectionMachine::default();
        assert!(!machine.can_send());
        machine.connect();
        assert!(!machine.can_send());
        machine.on_open();
        assert!(machine.can_send());
    }

    #[test]
    fn reconnect_from_connected_closes_old_handle_first() {
        let mut machine = connected_machine();
        let actions = machine.reconnect();

        assert_eq!(
            actions,
            vec![
                ConnectionAction::CloseTransport {
                    code: NORMAL_CLOSURE,
                    reason: "manual reconnect".to_string(),
                },
                ConnectionAction::OpenTransport,
            ]
        );
    }
}
