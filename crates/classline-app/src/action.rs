//! Application side-effects and intents.
//!
//! [`AppAction`]s are instructions produced by the [`crate::App`] state
//! machine for the runtime to execute — mostly forwarding view intents into
//! the protocol layer, plus rendering.

use classline_client::ReminderId;
use classline_proto::{
    NotificationId, RoomId, UserId,
    payloads::{
        meeting::{AppointmentInvitation, MeetingInvitation},
        session::UserConnected,
    },
};

/// Actions produced by the App state machine.
#[derive(Debug, Clone)]
pub enum AppAction {
    /// Render the view.
    Render,

    /// Quit the application.
    Quit,

    /// Establish (or re-arm) the connection.
    Connect {
        /// The authenticated user announcement.
        identity: UserConnected,
    },

    /// Tear down the connection (logout).
    Disconnect,

    /// Open a conversation.
    OpenConversation {
        /// Room to open (= offer id).
        room_id: RoomId,
        /// The other participant.
        peer_id: UserId,
    },

    /// Close a conversation.
    CloseConversation {
        /// Room to close.
        room_id: RoomId,
    },

    /// Send a chat message.
    SendChatMessage {
        /// Target room.
        room_id: RoomId,
        /// Plaintext body.
        body: String,
    },

    /// Open the inbox panel.
    OpenInbox,

    /// Close the inbox panel.
    CloseInbox,

    /// Fetch an inbox page.
    FetchInboxPage {
        /// 1-based page index.
        page: u32,
    },

    /// Mark one notification as read.
    MarkNotificationRead {
        /// Notification to mark.
        id: NotificationId,
    },

    /// Mark every notification as read.
    MarkAllNotificationsRead,

    /// Delete one notification.
    DeleteNotification {
        /// Notification to delete.
        id: NotificationId,
    },

    /// Dismiss a reminder.
    DismissReminder {
        /// Reminder to dismiss.
        id: ReminderId,
    },

    /// Join the meeting behind a reminder.
    JoinMeeting {
        /// Reminder whose meeting to join.
        id: ReminderId,
    },

    /// Send a meeting invitation.
    SendMeetingInvitation(MeetingInvitation),

    /// Send an appointment invitation.
    SendAppointmentInvitation(AppointmentInvitation),
}
