//! Application state machine.
//!
//! The [`App`] manages the interactive state of the real-time layer
//! completely decoupled from I/O and protocol mechanics: which conversation
//! is active, the latest snapshots handed over by the bridge, the compose
//! box restoration after a failed send, and the transient status line.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//! Its public operations are the imperative surface the view layer calls
//! (`send`, `open`, `mark as read`, `dismiss`, `join`, ...); the view reads
//! state back through the accessors on every render.

use classline_client::{ActiveReminder, ReminderId};
use classline_core::LinkState;
use classline_proto::{
    NotificationId, RoomId, UserId,
    payloads::{
        meeting::{AppointmentInvitation, MeetingInvitation},
        session::UserConnected,
    },
};

use crate::{
    AppAction, AppEvent,
    state::{ConversationView, InboxView},
};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Connection state for the passive indicator.
    connection: LinkState,
    /// Room the view currently displays. `None` when no chat is open.
    active_room: Option<RoomId>,
    /// Snapshot of the active conversation.
    active_conversation: Option<ConversationView>,
    /// Snapshot of the inbox.
    inbox: InboxView,
    /// Active reminders, oldest first.
    reminders: Vec<ActiveReminder>,
    /// Text to restore into the compose box after a rolled-back send.
    compose_restore: Option<(RoomId, String)>,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create a new App.
    pub fn new() -> Self {
        Self {
            connection: LinkState::Disconnected,
            active_room: None,
            active_conversation: None,
            inbox: InboxView::default(),
            reminders: Vec::new(),
            compose_restore: None,
            status_message: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Tick => vec![],
            AppEvent::ConnectionChanged { state } => {
                self.connection = state;
                if state == LinkState::Failed {
                    self.status_message =
                        Some("connection lost; will retry when you reconnect".to_string());
                }
                vec![AppAction::Render]
            },
            AppEvent::ConversationUpdated { view } => {
                // A snapshot for a room the view has already navigated away
                // from must not clobber the active one.
                if self.active_room.as_ref() == Some(&view.room_id) {
                    self.active_conversation = Some(view);
                }
                vec![AppAction::Render]
            },
            AppEvent::ConversationClosed { room_id } => {
                if self.active_room.as_ref() == Some(&room_id) {
                    self.active_room = None;
                    self.active_conversation = None;
                }
                vec![AppAction::Render]
            },
            AppEvent::ComposeRestore { room_id, body } => {
                self.compose_restore = Some((room_id, body));
                vec![AppAction::Render]
            },
            AppEvent::InboxUpdated { view } => {
                self.inbox = view;
                vec![AppAction::Render]
            },
            AppEvent::RemindersUpdated { reminders } => {
                self.reminders = reminders;
                vec![AppAction::Render]
            },
            AppEvent::RoleChanged { role, .. } => {
                self.status_message = Some(format!("your role changed to {role:?}"));
                vec![AppAction::Render]
            },
            AppEvent::TransientError { message } => {
                self.status_message = Some(message);
                vec![AppAction::Render]
            },
        }
    }

    /// Establish (or re-arm) the connection.
    pub fn connect(&mut self, identity: UserConnected) -> Vec<AppAction> {
        vec![AppAction::Connect { identity }, AppAction::Render]
    }

    /// Tear down the connection (logout).
    pub fn disconnect(&mut self) -> Vec<AppAction> {
        self.active_room = None;
        self.active_conversation = None;
        vec![AppAction::Disconnect, AppAction::Render]
    }

    /// Open a conversation and make it the active one.
    pub fn open_conversation(&mut self, room_id: RoomId, peer_id: UserId) -> Vec<AppAction> {
        self.active_room = Some(room_id.clone());
        vec![AppAction::OpenConversation { room_id, peer_id }, AppAction::Render]
    }

    /// Close the active conversation.
    pub fn close_conversation(&mut self) -> Vec<AppAction> {
        let Some(room_id) = self.active_room.clone() else {
            return vec![];
        };
        vec![AppAction::CloseConversation { room_id }, AppAction::Render]
    }

    /// Send a message in the active conversation.
    pub fn send_message(&mut self, body: impl Into<String>) -> Vec<AppAction> {
        let Some(room_id) = self.active_room.clone() else {
            self.status_message = Some("no conversation open".to_string());
            return vec![AppAction::Render];
        };
        // The compose box is being submitted; whatever restoration was
        // pending is superseded by this send.
        self.compose_restore = None;
        vec![AppAction::SendChatMessage { room_id, body: body.into() }, AppAction::Render]
    }

    /// Open the inbox panel.
    pub fn open_inbox(&mut self) -> Vec<AppAction> {
        vec![AppAction::OpenInbox, AppAction::Render]
    }

    /// Close the inbox panel.
    pub fn close_inbox(&mut self) -> Vec<AppAction> {
        vec![AppAction::CloseInbox, AppAction::Render]
    }

    /// Fetch an inbox page.
    pub fn fetch_inbox_page(&self, page: u32) -> Vec<AppAction> {
        vec![AppAction::FetchInboxPage { page }]
    }

    /// Mark one notification as read.
    pub fn mark_as_read(&self, id: NotificationId) -> Vec<AppAction> {
        vec![AppAction::MarkNotificationRead { id }]
    }

    /// Mark every notification as read.
    pub fn mark_all_as_read(&self) -> Vec<AppAction> {
        vec![AppAction::MarkAllNotificationsRead]
    }

    /// Delete one notification.
    pub fn delete_notification(&self, id: NotificationId) -> Vec<AppAction> {
        vec![AppAction::DeleteNotification { id }]
    }

    /// Dismiss a reminder.
    pub fn dismiss_reminder(&self, id: ReminderId) -> Vec<AppAction> {
        vec![AppAction::DismissReminder { id }]
    }

    /// Join the meeting behind a reminder.
    pub fn join_meeting(&self, id: ReminderId) -> Vec<AppAction> {
        vec![AppAction::JoinMeeting { id }]
    }

    /// Send a meeting invitation.
    pub fn send_meeting_invitation(&self, invitation: MeetingInvitation) -> Vec<AppAction> {
        vec![AppAction::SendMeetingInvitation(invitation)]
    }

    /// Send an appointment invitation.
    pub fn send_appointment_invitation(
        &self,
        invitation: AppointmentInvitation,
    ) -> Vec<AppAction> {
        vec![AppAction::SendAppointmentInvitation(invitation)]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Current connection state.
    pub fn connection(&self) -> LinkState {
        self.connection
    }

    /// Room the view currently displays.
    pub fn active_room(&self) -> Option<&RoomId> {
        self.active_room.as_ref()
    }

    /// Snapshot of the active conversation.
    pub fn active_conversation(&self) -> Option<&ConversationView> {
        self.active_conversation.as_ref()
    }

    /// Snapshot of the inbox.
    pub fn inbox(&self) -> &InboxView {
        &self.inbox
    }

    /// Active reminders, oldest first.
    pub fn reminders(&self) -> &[ActiveReminder] {
        &self.reminders
    }

    /// Pending compose box restoration, consumed by the view.
    pub fn take_compose_restore(&mut self) -> Option<(RoomId, String)> {
        self.compose_restore.take()
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use classline_client::{Message, MessageId, MessageState};

    use super::*;

    fn view(room: &str) -> ConversationView {
        ConversationView {
            room_id: RoomId::new(room),
            peer_id: UserId::new("bob"),
            messages: vec![Message {
                id: MessageId::Server("srv-1".to_string()),
                sender_id: UserId::new("bob"),
                receiver_id: UserId::new("alice"),
                body: "hi".to_string(),
                sent_at_ms: 1,
                encrypted: false,
                state: MessageState::Confirmed,
            }],
            joined: true,
        }
    }

    #[test]
    fn conversation_updates_apply_only_to_the_active_room() {
        let mut app = App::new();
        app.open_conversation(RoomId::new("offer1"), UserId::new("bob"));

        app.handle(AppEvent::ConversationUpdated { view: view("offer1") });
        assert!(app.active_conversation().is_some());

        // Stale snapshot for another room is discarded
        app.handle(AppEvent::ConversationUpdated { view: view("offer2") });
        assert_eq!(app.active_conversation().unwrap().room_id, RoomId::new("offer1"));
    }

    #[test]
    fn closing_the_active_room_clears_the_snapshot() {
        let mut app = App::new();
        app.open_conversation(RoomId::new("offer1"), UserId::new("bob"));
        app.handle(AppEvent::ConversationUpdated { view: view("offer1") });

        app.handle(AppEvent::ConversationClosed { room_id: RoomId::new("offer1") });
        assert!(app.active_room().is_none());
        assert!(app.active_conversation().is_none());
    }

    #[test]
    fn send_without_an_open_conversation_only_warns() {
        let mut app = App::new();
        let actions = app.send_message("hello");

        assert!(matches!(actions.as_slice(), [AppAction::Render]));
        assert!(app.status_message().is_some());
    }

    #[test]
    fn send_supersedes_pending_compose_restore() {
        let mut app = App::new();
        app.open_conversation(RoomId::new("offer1"), UserId::new("bob"));
        app.handle(AppEvent::ComposeRestore {
            room_id: RoomId::new("offer1"),
            body: "old draft".to_string(),
        });

        let actions = app.send_message("new text");
        assert!(matches!(actions.as_slice(), [
            AppAction::SendChatMessage { .. },
            AppAction::Render,
        ]));
        assert!(app.take_compose_restore().is_none());
    }

    #[test]
    fn failed_connection_sets_a_passive_status() {
        let mut app = App::new();
        let actions = app.handle(AppEvent::ConnectionChanged { state: LinkState::Failed });

        assert!(matches!(actions.as_slice(), [AppAction::Render]));
        assert_eq!(app.connection(), LinkState::Failed);
        assert!(app.status_message().is_some());
    }

    #[test]
    fn api_operations_map_to_actions() {
        let app = App::new();

        assert!(matches!(
            app.mark_as_read(NotificationId::new("n1")).as_slice(),
            [AppAction::MarkNotificationRead { .. }]
        ));
        assert!(matches!(
            app.mark_all_as_read().as_slice(),
            [AppAction::MarkAllNotificationsRead]
        ));
        assert!(matches!(app.fetch_inbox_page(3).as_slice(), [AppAction::FetchInboxPage {
            page: 3
        }]));
    }
}
