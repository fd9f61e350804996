//! Connection lifecycle state machine.
//!
//! Owns the single live transport connection for the whole client process:
//! connect, authenticate, reconnect with capped exponential backoff, and
//! teardown. Uses the action pattern: methods take time as input and return
//! actions for the driver to execute, keeping the state machine pure (no
//! I/O) and straightforward to test.
//!
//! # State Machine
//!
//! ```text
//! ┌──────────────┐ connect ┌────────────┐ opened ┌───────────┐
//! │ Disconnected │────────>│ Connecting │───────>│ Connected │
//! └──────────────┘         └────────────┘        └───────────┘
//!        ▲                     ▲    │ lost            │ lost
//!        │ disconnect          │    ▼                 ▼
//!        │                  ┌──────────────┐<─────────┘
//!        └──────────────────│ Reconnecting │──────> Failed
//!                           └──────────────┘  (retries exhausted)
//! ```
//!
//! Higher-level components are NOT rejoined to their rooms on reconnect —
//! only they know which rooms are still relevant, so each re-subscribes its
//! own rooms when it observes the `Connected` transition.

use std::{ops::Sub, time::Duration};

use classline_proto::{Envelope, payloads::session::UserConnected};

use crate::error::ConnectionError;

/// First reconnect delay.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(500);

/// Upper bound on the reconnect delay.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Reconnect attempts before giving up with [`LinkState::Failed`].
pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;

/// Interval at which the connection sends `ping` frames while connected.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);

/// Maximum time without inbound activity before the transport is presumed
/// dead.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection state visible to the rest of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No transport; nothing scheduled.
    Disconnected,
    /// Transport open in flight.
    Connecting,
    /// Transport open and authenticated.
    Connected,
    /// Transport lost; retry scheduled with backoff.
    Reconnecting,
    /// Retries exhausted; a fresh `connect` call re-arms.
    Failed,
}

/// Actions returned by the connection state machine.
///
/// The driver executes these:
/// - `OpenTransport`: open the physical socket, reporting the result back
///   via `transport_opened` / `transport_lost`
/// - `SendEnvelope`: serialize and send over the live transport
/// - `CloseTransport`: tear down the physical socket
/// - `StateChanged`: surface the new state to observers (passive indicator)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionAction {
    /// Open the physical transport.
    OpenTransport,

    /// Send this envelope to the server.
    SendEnvelope(Envelope),

    /// Close the physical transport.
    CloseTransport,

    /// The connection state changed.
    StateChanged(LinkState),
}

/// Reconnect backoff configuration.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// First retry delay.
    pub initial: Duration,
    /// Upper bound on the retry delay.
    pub max: Duration,
    /// Attempts before transitioning to [`LinkState::Failed`].
    pub max_attempts: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: DEFAULT_INITIAL_BACKOFF,
            max: DEFAULT_MAX_BACKOFF,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl BackoffConfig {
    /// Delay before retry number `attempt` (0-based): `initial × 2^attempt`,
    /// capped at `max`.
    pub fn delay(&self, attempt: u32) -> Duration {
        // Beyond 2^16 the cap has long since taken over; bounding the shift
        // avoids overflow for absurd attempt counts.
        let factor = 1u32 << attempt.min(16);
        self.initial.saturating_mul(factor).min(self.max)
    }
}

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Reconnect backoff parameters.
    pub backoff: BackoffConfig,
    /// Heartbeat interval (should be < `idle_timeout` / 2).
    pub heartbeat_interval: Duration,
    /// Idle timeout before the transport is presumed dead.
    pub idle_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            backoff: BackoffConfig::default(),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

/// Connection lifecycle state machine.
///
/// Pure: no I/O, no clock access — time is passed as a parameter. Generic
/// over `I` to support both real and virtual time.
#[derive(Debug, Clone)]
pub struct Connection<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Current state.
    state: LinkState,
    /// Configuration.
    config: ConnectionConfig,
    /// Authenticated user announcement, replayed on every (re)connect.
    identity: Option<UserConnected>,
    /// Reconnect attempts since the last successful open.
    attempt: u32,
    /// When the current backoff wait started.
    retry_since: Option<I>,
    /// Last inbound activity timestamp.
    last_activity: I,
    /// Last heartbeat sent timestamp.
    last_heartbeat: Option<I>,
}

impl<I> Connection<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create a new connection in [`LinkState::Disconnected`].
    pub fn new(now: I, config: ConnectionConfig) -> Self {
        Self {
            state: LinkState::Disconnected,
            config,
            identity: None,
            attempt: 0,
            retry_since: None,
            last_activity: now,
            last_heartbeat: None,
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Whether the transport is open and authenticated.
    ///
    /// Callers treat `false` as "retry later", never as fatal — the state
    /// machine is already driving recovery.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// The announced identity. `None` before the first `connect`.
    #[must_use]
    pub fn identity(&self) -> Option<&UserConnected> {
        self.identity.as_ref()
    }

    /// Reconnect attempts since the last successful open.
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Start (or re-arm) the connection with the given identity.
    ///
    /// Idempotent: while a connection is live or in progress this only
    /// refreshes the stored identity and returns no actions. From
    /// `Disconnected` or `Failed` it begins a fresh attempt.
    pub fn connect(&mut self, identity: UserConnected, now: I) -> Vec<ConnectionAction> {
        self.identity = Some(identity);

        match self.state {
            LinkState::Connecting | LinkState::Connected | LinkState::Reconnecting => vec![],
            LinkState::Disconnected | LinkState::Failed => {
                self.state = LinkState::Connecting;
                self.attempt = 0;
                self.retry_since = None;
                self.last_activity = now;
                vec![
                    ConnectionAction::StateChanged(LinkState::Connecting),
                    ConnectionAction::OpenTransport,
                ]
            },
        }
    }

    /// The physical transport opened successfully.
    ///
    /// Transitions to `Connected` and announces the authenticated user.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::InvalidState` if no open was in flight
    pub fn transport_opened(&mut self, now: I) -> Result<Vec<ConnectionAction>, ConnectionError> {
        if self.state != LinkState::Connecting {
            return Err(ConnectionError::InvalidState {
                state: self.state,
                operation: "transport_opened".to_string(),
            });
        }

        self.state = LinkState::Connected;
        self.attempt = 0;
        self.retry_since = None;
        self.last_activity = now;
        self.last_heartbeat = None;

        let mut actions = vec![ConnectionAction::StateChanged(LinkState::Connected)];
        if let Some(identity) = &self.identity {
            actions.push(ConnectionAction::SendEnvelope(Envelope::UserConnected(
                identity.clone(),
            )));
        }

        Ok(actions)
    }

    /// The physical transport failed to open or dropped.
    ///
    /// Schedules a retry with capped exponential backoff, or transitions to
    /// `Failed` once attempts are exhausted. Idempotent while already down.
    pub fn transport_lost(&mut self, now: I) -> Vec<ConnectionAction> {
        match self.state {
            LinkState::Disconnected | LinkState::Failed => vec![],
            LinkState::Connecting | LinkState::Connected | LinkState::Reconnecting => {
                self.attempt += 1;

                if self.attempt > self.config.backoff.max_attempts {
                    self.state = LinkState::Failed;
                    self.retry_since = None;
                    vec![ConnectionAction::StateChanged(LinkState::Failed)]
                } else {
                    self.state = LinkState::Reconnecting;
                    self.retry_since = Some(now);
                    vec![ConnectionAction::StateChanged(LinkState::Reconnecting)]
                }
            },
        }
    }

    /// Mark inbound activity (call when receiving any envelope).
    pub fn activity(&mut self, now: I) {
        self.last_activity = now;
    }

    /// Process periodic maintenance: due retries, heartbeats, idle timeout.
    pub fn tick(&mut self, now: I) -> Vec<ConnectionAction> {
        match self.state {
            LinkState::Reconnecting => {
                let Some(since) = self.retry_since else {
                    return vec![];
                };

                // attempt >= 1 while Reconnecting; delay index is 0-based
                let delay = self.config.backoff.delay(self.attempt.saturating_sub(1));
                if now - since < delay {
                    return vec![];
                }

                self.state = LinkState::Connecting;
                self.retry_since = None;
                vec![
                    ConnectionAction::StateChanged(LinkState::Connecting),
                    ConnectionAction::OpenTransport,
                ]
            },
            LinkState::Connected => {
                if now - self.last_activity > self.config.idle_timeout {
                    // Dead transport: close it and enter the retry path.
                    let mut actions = vec![ConnectionAction::CloseTransport];
                    actions.extend(self.transport_lost(now));
                    return actions;
                }

                let due = match self.last_heartbeat {
                    None => true,
                    Some(last) => now - last >= self.config.heartbeat_interval,
                };

                if due {
                    self.last_heartbeat = Some(now);
                    vec![ConnectionAction::SendEnvelope(Envelope::Ping)]
                } else {
                    vec![]
                }
            },
            LinkState::Disconnected | LinkState::Connecting | LinkState::Failed => vec![],
        }
    }

    /// Tear down the connection (logout / process shutdown). Idempotent.
    ///
    /// Clears the stored identity and any scheduled retry; room
    /// subscriptions die with the transport.
    pub fn disconnect(&mut self) -> Vec<ConnectionAction> {
        if self.state == LinkState::Disconnected {
            return vec![];
        }

        self.state = LinkState::Disconnected;
        self.identity = None;
        self.attempt = 0;
        self.retry_since = None;
        self.last_heartbeat = None;

        vec![
            ConnectionAction::CloseTransport,
            ConnectionAction::StateChanged(LinkState::Disconnected),
        ]
    }
}
