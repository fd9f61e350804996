//! Application input events.
//!
//! [`AppEvent`]s drive the [`crate::App`] state machine. They originate from
//! the protocol side: the [`crate::Bridge`] translates client actions into
//! these events after every dispatch.

use classline_client::ActiveReminder;
use classline_core::LinkState;
use classline_proto::{RoomId, UserId, payloads::session::UserRole};

use crate::state::{ConversationView, InboxView};

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic tick.
    Tick,

    /// Connection state changed (passive indicator).
    ConnectionChanged {
        /// The new state.
        state: LinkState,
    },

    /// A conversation snapshot changed.
    ConversationUpdated {
        /// Fresh snapshot.
        view: ConversationView,
    },

    /// A conversation was evicted.
    ConversationClosed {
        /// The room that was closed.
        room_id: RoomId,
    },

    /// Rolled-back text to restore into the compose box.
    ComposeRestore {
        /// Room whose compose box to restore.
        room_id: RoomId,
        /// The original message text.
        body: String,
    },

    /// The inbox snapshot changed.
    InboxUpdated {
        /// Fresh snapshot.
        view: InboxView,
    },

    /// The active reminder set changed.
    RemindersUpdated {
        /// Fresh snapshot, oldest first.
        reminders: Vec<ActiveReminder>,
    },

    /// This user's marketplace role changed.
    RoleChanged {
        /// User whose role changed.
        user_id: UserId,
        /// The new role.
        role: UserRole,
    },

    /// A transient, toast-level error.
    TransientError {
        /// Human-readable description.
        message: String,
    },
}
