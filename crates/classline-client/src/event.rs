//! Client events and actions.

use classline_core::LinkState;
use classline_proto::{
    Envelope, NotificationId, RoomId, UserId,
    payloads::{
        meeting::{AppointmentInvitation, MeetingInvitation},
        session::{UserConnected, UserRole},
    },
};

use crate::{
    api::{ApiCall, ApiOutcome},
    reminders::ReminderId,
};

/// Events the caller feeds into the client.
///
/// The caller is responsible for:
/// - Reporting transport lifecycle (opened, lost) and inbound envelopes
/// - Executing REST calls and feeding their outcomes back
/// - Driving time forward via ticks
/// - Forwarding view intents (open conversation, send, mark read, ...)
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// Establish (or re-arm) the connection with an authenticated identity.
    Connect {
        /// The authenticated user announcement.
        identity: UserConnected,
    },

    /// Tear down the connection (logout).
    Disconnect,

    /// The physical transport opened.
    TransportOpened,

    /// The physical transport failed to open or dropped.
    TransportLost {
        /// Driver-reported reason, for logs.
        reason: String,
    },

    /// An envelope arrived on the live connection.
    EnvelopeReceived(Envelope),

    /// Periodic tick for timeout processing.
    Tick,

    /// View opened a conversation.
    OpenConversation {
        /// Room to open (= offer id).
        room_id: RoomId,
        /// The other participant.
        peer_id: UserId,
    },

    /// View closed a conversation.
    CloseConversation {
        /// Room to close.
        room_id: RoomId,
    },

    /// View sends a chat message in an open conversation.
    SendChatMessage {
        /// Target room.
        room_id: RoomId,
        /// Plaintext body.
        body: String,
    },

    /// View sends a meeting invitation.
    SendMeetingInvitation(MeetingInvitation),

    /// View sends an appointment invitation.
    SendAppointmentInvitation(AppointmentInvitation),

    /// View opened the inbox panel.
    InboxPanelOpened,

    /// View closed the inbox panel.
    InboxPanelClosed,

    /// View requested an inbox page.
    FetchInboxPage {
        /// 1-based page index.
        page: u32,
    },

    /// View marked one notification as read.
    MarkNotificationRead {
        /// Notification to mark.
        id: NotificationId,
    },

    /// View marked every notification as read.
    MarkAllNotificationsRead,

    /// View deleted one notification.
    DeleteNotification {
        /// Notification to delete.
        id: NotificationId,
    },

    /// View dismissed a reminder.
    DismissReminder {
        /// Reminder to dismiss.
        id: ReminderId,
    },

    /// View joins the meeting behind a reminder.
    JoinMeeting {
        /// Reminder whose meeting to join.
        id: ReminderId,
    },

    /// A REST call completed.
    ApiCompleted(ApiOutcome),
}

/// Actions the client produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Open the physical transport.
    OpenTransport,

    /// Close the physical transport.
    CloseTransport,

    /// Send an envelope over the live connection.
    SendEnvelope(Envelope),

    /// Execute a REST call and feed the outcome back.
    Api(ApiCall),

    /// The connection state changed (passive indicator).
    ConnectionChanged {
        /// The new state.
        state: LinkState,
    },

    /// A conversation's visible state changed; re-read its snapshot.
    ConversationUpdated {
        /// The room that changed.
        room_id: RoomId,
    },

    /// A conversation was evicted.
    ConversationClosed {
        /// The room that was closed.
        room_id: RoomId,
    },

    /// Restore rolled-back text into the compose box.
    ComposeRestore {
        /// Room whose compose box to restore.
        room_id: RoomId,
        /// The original message text.
        body: String,
    },

    /// The inbox read model changed; re-read its snapshot.
    InboxUpdated,

    /// The active reminder set changed; re-read its snapshot.
    RemindersUpdated,

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

    /// This user's marketplace role changed.
    RoleChanged {
        /// User whose role changed.
        user_id: UserId,
        /// The new role.
        role: UserRole,
    },

    /// Surface a transient, toast-level error to the view.
    TransientError {
        /// Human-readable description.
        message: String,
    },

    /// Log message for debugging.
    Log {
        /// Log message.
        message: String,
    },
}
