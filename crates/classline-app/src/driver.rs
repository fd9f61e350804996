//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations: the socket transport, the HTTP client for REST calls
//! (request-level timeouts are its concern), rendering, and UI effects.
//! Each embedding implements the trait while the generic
//! [`Runtime`](crate::Runtime) handles orchestration, so the same
//! orchestration code runs in production and in simulation.

use std::future::Future;

use classline_client::{ApiCall, ApiOutcome};
use classline_proto::Envelope;

use crate::{App, AppAction};

/// UI side effects the protocol layer requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    /// Play the reminder tone.
    Alert {
        /// Higher pitch and longer display for urgent stages.
        urgent: bool,
        /// Repeat the tone while the reminder is displayed.
        repeat: bool,
    },

    /// Open a meeting URL (join flow).
    OpenMeetingUrl {
        /// URL to open.
        url: String,
    },
}

/// Abstracts I/O operations for the application runtime.
///
/// # Implementations
///
/// - **Production**: websocket transport, HTTP client, real view layer
/// - **Simulation**: scripted backend and socket hub, no real I/O
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Poll for view-layer intents, surfaced by invoking the [`App`]'s
    /// public operations. Returns the produced actions, or an empty vector
    /// when nothing is pending.
    fn poll_intents(
        &mut self,
        app: &mut App,
    ) -> impl Future<Output = Result<Vec<AppAction>, Self::Error>> + Send;

    /// Open the physical transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be established; the runtime
    /// reports it to the protocol layer, which schedules the retry.
    fn open_transport(&mut self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Close the physical transport.
    fn close_transport(&mut self);

    /// Send an envelope to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is closed or the send fails.
    fn send_envelope(
        &mut self,
        envelope: Envelope,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Receive the next inbound envelope if one is ready.
    ///
    /// Returns `None` when nothing is pending or the transport is closed.
    fn recv_envelope(&mut self) -> impl Future<Output = Option<Envelope>> + Send;

    /// Execute a REST call with the embedding's HTTP client.
    ///
    /// Failures are encoded in the outcome, never thrown: the protocol
    /// layer owns the retry/rollback policy.
    fn execute_api(&mut self, call: ApiCall) -> impl Future<Output = ApiOutcome> + Send;

    /// Apply a UI effect (alert tone, open meeting URL).
    fn apply_effect(&mut self, effect: UiEffect);

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Whether the physical transport is currently open.
    fn is_connected(&self) -> bool;

    /// Stop the connection and clean up resources.
    fn stop(&mut self);
}
