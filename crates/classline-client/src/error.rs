//! Client error types.

use classline_core::ConnectionError;
use classline_proto::RoomId;
use thiserror::Error;

/// Errors from client state machine operations.
///
/// These are caller mistakes or unrecoverable states. Expected runtime
/// failures (send rollback, decryption, REST errors) are not errors at this
/// level — they flow through actions so the view can present them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Operation targets a conversation that is not open.
    #[error("conversation {room_id} is not open")]
    ConversationNotOpen {
        /// The room that was targeted.
        room_id: RoomId,
    },

    /// Operation requires an authenticated identity.
    #[error("not authenticated: call connect first")]
    NotAuthenticated,

    /// Connection state machine rejected a transition.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}
