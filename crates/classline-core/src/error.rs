//! Error types for the connection lifecycle.
//!
//! Strongly-typed errors keep retry policy decidable at the call site: the
//! connection manager retries transient failures transparently and only
//! surfaces a passive indicator once retries are exhausted.

use thiserror::Error;

use crate::connection::LinkState;

/// Errors that can occur during connection state machine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Invalid state transition attempted
    #[error("invalid state transition: cannot {operation} from {state:?}")]
    InvalidState {
        /// Current state when error occurred
        state: LinkState,
        /// Operation that was attempted
        operation: String,
    },

    /// Transport could not be reached
    #[error("transport unreachable: {0}")]
    TransportUnreachable(String),

    /// All reconnect attempts failed
    #[error("reconnect retries exhausted after {attempts} attempts")]
    RetriesExhausted {
        /// How many attempts were made
        attempts: u32,
    },

    /// Operation requires a live connection
    #[error("not connected")]
    NotConnected,
}

impl ConnectionError {
    /// Returns true if this error is transient and may succeed on retry.
    ///
    /// Unreachable transports and missing connections are retried with
    /// backoff. Invalid state transitions are programming errors and
    /// exhausted retries require an explicit re-arm; neither is transient.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransportUnreachable(_) | Self::NotConnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_transient() {
        assert!(ConnectionError::TransportUnreachable("refused".to_string()).is_transient());
        assert!(ConnectionError::NotConnected.is_transient());
    }

    #[test]
    fn exhaustion_and_misuse_are_not_transient() {
        assert!(!ConnectionError::RetriesExhausted { attempts: 8 }.is_transient());
        assert!(
            !ConnectionError::InvalidState {
                state: LinkState::Disconnected,
                operation: "transport_opened".to_string(),
            }
            .is_transient()
        );
    }
}
