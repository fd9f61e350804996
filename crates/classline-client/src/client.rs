//! Client state machine.
//!
//! The `Client` is the top-level state machine composing the connection
//! lifecycle, per-room conversations, the notification inbox, and the
//! reminder dispatcher. It owns the pairwise key cache and is the only
//! place where wire bodies are sealed and opened.

use std::collections::HashMap;

use classline_core::{
    Connection, ConnectionAction, ConnectionConfig, Environment, LinkState,
};
use classline_crypto::NONCE_SIZE;
use classline_proto::{
    CreateMessageRequest, Envelope, RoomId, UserId, WireMessage,
    payloads::{
        chat::ChatPush,
        meeting::ReminderPush,
        session::{JoinRoom, UserConnected},
    },
};

use crate::{
    api::{ApiCall, ApiError, ApiOutcome},
    conversation::{Conversation, Message, MessageId, MessageState, REDACTED_PLACEHOLDER},
    error::ClientError,
    event::{ClientAction, ClientEvent},
    inbox::{DEFAULT_PAGE_SIZE, Inbox, LivePushKind},
    key_cache::PairKeyCache,
    reminders::{ReminderAction, ReminderDispatcher, ReminderId},
};

/// Top-level client state machine.
///
/// Sans-IO: consumes [`ClientEvent`]s, returns [`ClientAction`]s, and never
/// touches the network or the clock directly (time and randomness come from
/// the [`Environment`]).
pub struct Client<E: Environment> {
    /// Environment for randomness and timing.
    env: E,

    /// Connection lifecycle state machine.
    connection: Connection<E::Instant>,

    /// The authenticated user. `None` before `Connect`.
    identity: Option<UserConnected>,

    /// Pairwise keys, created on `Connect`.
    keys: Option<PairKeyCache>,

    /// Open conversations by room.
    conversations: HashMap<RoomId, Conversation>,

    /// Notification aggregator.
    inbox: Inbox,

    /// Reminder dispatcher.
    reminders: ReminderDispatcher<E::Instant>,
}

impl<E: Environment> Client<E> {
    /// Create a client with default connection configuration.
    pub fn new(env: E) -> Self {
        Self::with_config(env, ConnectionConfig::default())
    }

    /// Create a client with explicit connection configuration.
    pub fn with_config(env: E, config: ConnectionConfig) -> Self {
        let now = env.now();
        Self {
            env,
            connection: Connection::new(now, config),
            identity: None,
            keys: None,
            conversations: HashMap::new(),
            inbox: Inbox::new(DEFAULT_PAGE_SIZE),
            reminders: ReminderDispatcher::new(),
        }
    }

    /// Current connection state.
    pub fn connection_state(&self) -> LinkState {
        self.connection.state()
    }

    /// Read model of an open conversation. `None` after it is closed.
    pub fn conversation(&self, room_id: &RoomId) -> Option<&Conversation> {
        self.conversations.get(room_id)
    }

    /// Read model of the inbox.
    pub fn inbox(&self) -> &Inbox {
        &self.inbox
    }

    /// Read model of the active reminders.
    pub fn reminders(&self) -> &ReminderDispatcher<E::Instant> {
        &self.reminders
    }

    /// The authenticated identity, if any.
    pub fn identity(&self) -> Option<&UserConnected> {
        self.identity.as_ref()
    }

    /// Process an event and return actions for the caller to execute.
    ///
    /// # Errors
    ///
    /// - `ClientError::NotAuthenticated` for chat operations before `Connect`
    /// - `ClientError::ConversationNotOpen` for sends to unopened rooms
    /// - `ClientError::Connection` for invalid transport transitions
    pub fn handle(&mut self, event: ClientEvent) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ClientEvent::Connect { identity } => Ok(self.on_connect(identity)),
            ClientEvent::Disconnect => Ok(self.on_disconnect()),
            ClientEvent::TransportOpened => self.on_transport_opened(),
            ClientEvent::TransportLost { reason } => Ok(self.on_transport_lost(&reason)),
            ClientEvent::EnvelopeReceived(envelope) => Ok(self.on_envelope(envelope)),
            ClientEvent::Tick => Ok(self.on_tick()),
            ClientEvent::OpenConversation { room_id, peer_id } => {
                self.on_open_conversation(room_id, peer_id)
            },
            ClientEvent::CloseConversation { room_id } => Ok(self.on_close_conversation(&room_id)),
            ClientEvent::SendChatMessage { room_id, body } => self.on_send_chat(room_id, &body),
            ClientEvent::SendMeetingInvitation(invitation) => {
                Ok(self.on_send_envelope_op(Envelope::SendMeetingInvitation(invitation)))
            },
            ClientEvent::SendAppointmentInvitation(invitation) => {
                Ok(self.on_send_envelope_op(Envelope::SendAppointmentInvitation(invitation)))
            },
            ClientEvent::InboxPanelOpened => Ok(self.on_inbox_panel(true)),
            ClientEvent::InboxPanelClosed => Ok(self.on_inbox_panel(false)),
            ClientEvent::FetchInboxPage { page } => {
                Ok(Self::api_actions(self.inbox.request_page(page)))
            },
            ClientEvent::MarkNotificationRead { id } => {
                Ok(Self::api_actions(self.inbox.request_mark_read(id)))
            },
            ClientEvent::MarkAllNotificationsRead => {
                Ok(Self::api_actions(self.inbox.request_mark_all_read()))
            },
            ClientEvent::DeleteNotification { id } => {
                Ok(Self::api_actions(self.inbox.request_delete(id)))
            },
            ClientEvent::DismissReminder { id } => {
                let changed = self.reminders.dismiss(&id);
                Ok(if changed { vec![ClientAction::RemindersUpdated] } else { vec![] })
            },
            ClientEvent::JoinMeeting { id } => Ok(self.on_join_meeting(&id)),
            ClientEvent::ApiCompleted(outcome) => Ok(self.on_api_completed(outcome)),
        }
    }

    fn on_connect(&mut self, identity: UserConnected) -> Vec<ClientAction> {
        self.keys = Some(PairKeyCache::new(identity.user_id.clone()));
        self.identity = Some(identity.clone());
        self.inbox.rearm();

        let now = self.env.now();
        Self::map_connection(self.connection.connect(identity, now))
    }

    fn on_disconnect(&mut self) -> Vec<ClientAction> {
        for conversation in self.conversations.values_mut() {
            conversation.set_joined(false);
        }
        self.identity = None;
        self.keys = None;
        self.inbox.suspend();

        Self::map_connection(self.connection.disconnect())
    }

    fn on_transport_opened(&mut self) -> Result<Vec<ClientAction>, ClientError> {
        let now = self.env.now();
        let mut actions = Self::map_connection(self.connection.transport_opened(now)?);

        // Re-subscribe our own rooms: the connection manager does not know
        // which rooms are still relevant, but we do.
        for (room_id, conversation) in &mut self.conversations {
            conversation.set_joined(true);
            actions.push(ClientAction::SendEnvelope(Envelope::JoinRoom(JoinRoom {
                room_id: room_id.clone(),
            })));
        }

        // The unread counter may have drifted while offline.
        if !self.inbox.is_dormant() {
            actions.push(ClientAction::Api(ApiCall::FetchUnreadCount));
        }

        Ok(actions)
    }

    fn on_transport_lost(&mut self, reason: &str) -> Vec<ClientAction> {
        for conversation in self.conversations.values_mut() {
            conversation.set_joined(false);
        }

        let now = self.env.now();
        let mut actions = vec![ClientAction::Log {
            message: format!("transport lost: {reason}"),
        }];
        actions.extend(Self::map_connection(self.connection.transport_lost(now)));
        actions
    }

    fn on_envelope(&mut self, envelope: Envelope) -> Vec<ClientAction> {
        let now = self.env.now();
        self.connection.activity(now);

        match envelope {
            Envelope::Ping => vec![ClientAction::SendEnvelope(Envelope::Pong)],
            Envelope::Pong => vec![],
            Envelope::ReceiveMessage(push) => self.on_receive_message(push),
            Envelope::ReceiveMeetingInvitation(_) => {
                self.on_live_push(LivePushKind::MeetingInvite)
            },
            Envelope::ReceiveAppointmentInvitation(_) => {
                self.on_live_push(LivePushKind::AppointmentInvite)
            },
            Envelope::MeetingReminder(push) => self.on_reminder(push),
            Envelope::RoleChanged(change) => {
                vec![ClientAction::RoleChanged { user_id: change.user_id, role: change.role }]
            },
            Envelope::UserConnected(_)
            | Envelope::JoinRoom(_)
            | Envelope::SendMessage(_)
            | Envelope::SendMeetingInvitation(_)
            | Envelope::SendAppointmentInvitation(_) => vec![ClientAction::Log {
                message: format!("ignoring outbound-only envelope: {}", envelope.event_name()),
            }],
        }
    }

    fn on_receive_message(&mut self, push: ChatPush) -> Vec<ClientAction> {
        let mut actions = Vec::new();

        // Inbox first: a chat push is a notification event, except for our
        // own broadcast coming back.
        let own_echo = self
            .identity
            .as_ref()
            .is_some_and(|identity| identity.user_id == push.sender_id);
        if !own_echo {
            actions.extend(self.on_live_push(LivePushKind::Chat));
        }

        // Conversation second, and only if that room is currently open —
        // closed rooms are inbox-only traffic.
        let Some(peer_id) = self.conversations.get(&push.room_id).map(|c| c.peer_id().clone())
        else {
            return actions;
        };

        let body = self.open_wire_body(&peer_id, &push.message, push.is_encrypted, &mut actions);
        let receiver_id = if own_echo {
            peer_id.clone()
        } else {
            self.identity
                .as_ref()
                .map_or_else(|| peer_id.clone(), |identity| identity.user_id.clone())
        };

        let message = Message {
            id: MessageId::Local(format!("live-{:016x}", self.env.random_u64())),
            sender_id: push.sender_id,
            receiver_id,
            body,
            sent_at_ms: self.env.wall_clock_ms(),
            encrypted: push.is_encrypted,
            state: MessageState::Confirmed,
        };

        if let Some(conversation) = self.conversations.get_mut(&push.room_id)
            && conversation.apply_incoming(message)
        {
            actions.push(ClientAction::ConversationUpdated { room_id: push.room_id });
        }

        actions
    }

    fn on_live_push(&mut self, kind: LivePushKind) -> Vec<ClientAction> {
        let calls = self.inbox.on_live_push(kind);
        if calls.is_empty() {
            return vec![];
        }

        let mut actions = Self::api_actions(calls);
        actions.push(ClientAction::InboxUpdated);
        actions
    }

    fn on_reminder(&mut self, push: ReminderPush) -> Vec<ClientAction> {
        let now = self.env.now();
        let reminder_actions = self.reminders.handle_push(push, now);
        if reminder_actions.is_empty() {
            return vec![];
        }

        let mut actions = Self::map_reminders(reminder_actions);
        actions.push(ClientAction::RemindersUpdated);
        actions
    }

    fn on_tick(&mut self) -> Vec<ClientAction> {
        let now = self.env.now();
        let mut actions = Self::map_connection(self.connection.tick(now));
        if self.reminders.tick(now) {
            actions.push(ClientAction::RemindersUpdated);
        }
        actions
    }

    fn on_open_conversation(
        &mut self,
        room_id: RoomId,
        peer_id: UserId,
    ) -> Result<Vec<ClientAction>, ClientError> {
        let identity = self.identity.as_ref().ok_or(ClientError::NotAuthenticated)?;
        let self_id = identity.user_id.clone();

        let conversation = self
            .conversations
            .entry(room_id.clone())
            .or_insert_with(|| Conversation::new(room_id.clone(), self_id, peer_id));

        let mut actions =
            vec![ClientAction::Api(ApiCall::FetchHistory { room_id: room_id.clone() })];

        if self.connection.is_connected() {
            conversation.set_joined(true);
            actions.push(ClientAction::SendEnvelope(Envelope::JoinRoom(JoinRoom {
                room_id: room_id.clone(),
            })));
        }

        actions.push(ClientAction::ConversationUpdated { room_id });
        Ok(actions)
    }

    fn on_close_conversation(&mut self, room_id: &RoomId) -> Vec<ClientAction> {
        if self.conversations.remove(room_id).is_some() {
            vec![ClientAction::ConversationClosed { room_id: room_id.clone() }]
        } else {
            vec![]
        }
    }

    fn on_send_chat(
        &mut self,
        room_id: RoomId,
        body: &str,
    ) -> Result<Vec<ClientAction>, ClientError> {
        let identity = self.identity.clone().ok_or(ClientError::NotAuthenticated)?;
        let Some(keys) = self.keys.as_mut() else {
            return Err(ClientError::NotAuthenticated);
        };

        let peer_id = self
            .conversations
            .get(&room_id)
            .map(|c| c.peer_id().clone())
            .ok_or_else(|| ClientError::ConversationNotOpen { room_id: room_id.clone() })?;

        let nonce = format!("{:016x}", self.env.random_u64());
        let mut aead_nonce = [0u8; NONCE_SIZE];
        self.env.random_bytes(&mut aead_nonce);
        let wire_body = keys.seal_for(&peer_id, body, aead_nonce);

        let message = Message {
            id: MessageId::Local(nonce.clone()),
            sender_id: identity.user_id.clone(),
            receiver_id: peer_id.clone(),
            body: body.to_string(),
            sent_at_ms: self.env.wall_clock_ms(),
            encrypted: true,
            state: MessageState::Pending,
        };

        let Some(conversation) = self.conversations.get_mut(&room_id) else {
            return Err(ClientError::ConversationNotOpen { room_id });
        };
        conversation.push_pending(message);

        let mut actions = vec![
            ClientAction::ConversationUpdated { room_id: room_id.clone() },
            ClientAction::Api(ApiCall::CreateMessage {
                nonce,
                request: CreateMessageRequest {
                    room_id: room_id.clone(),
                    receiver_id: peer_id,
                    body: wire_body.clone(),
                    encrypted: true,
                },
            }),
        ];

        if self.connection.is_connected() {
            actions.push(ClientAction::SendEnvelope(Envelope::SendMessage(ChatPush {
                room_id: room_id.clone(),
                message: wire_body,
                is_encrypted: true,
                sender_id: identity.user_id,
                sender: identity.user_name,
                offer: Some(room_id),
            })));
        } else {
            actions.push(ClientAction::Log {
                message: "socket offline; message delivered via REST only".to_string(),
            });
        }

        Ok(actions)
    }

    fn on_send_envelope_op(&mut self, envelope: Envelope) -> Vec<ClientAction> {
        if self.connection.is_connected() {
            vec![ClientAction::SendEnvelope(envelope)]
        } else {
            vec![ClientAction::TransientError {
                message: "not connected; invitation was not sent".to_string(),
            }]
        }
    }

    fn on_inbox_panel(&mut self, open: bool) -> Vec<ClientAction> {
        let calls = self.inbox.set_panel_open(open);
        let mut actions = Self::api_actions(calls);
        actions.push(ClientAction::InboxUpdated);
        actions
    }

    fn on_join_meeting(&mut self, id: &ReminderId) -> Vec<ClientAction> {
        let reminder_actions = self.reminders.join(id);
        if reminder_actions.is_empty() {
            return vec![];
        }

        let mut actions = Self::map_reminders(reminder_actions);
        actions.push(ClientAction::RemindersUpdated);
        actions
    }

    fn on_api_completed(&mut self, outcome: ApiOutcome) -> Vec<ClientAction> {
        match outcome {
            ApiOutcome::History { room_id, result } => self.on_history(room_id, result),
            ApiOutcome::MessageCreated { room_id, nonce, result } => {
                self.on_message_created(&room_id, &nonce, result)
            },
            ApiOutcome::NotificationsPage { result } => match result {
                Ok(page) => {
                    self.inbox.page_loaded(page);
                    vec![ClientAction::InboxUpdated]
                },
                Err(error) => self.on_api_error(&error, "notification fetch"),
            },
            ApiOutcome::UnreadCount { result } => match result {
                Ok(count) => {
                    self.inbox.unread_loaded(count);
                    vec![ClientAction::InboxUpdated]
                },
                Err(error) => self.on_api_error(&error, "unread count fetch"),
            },
            ApiOutcome::NotificationMarkedRead { id, result } => match result {
                Ok(()) => {
                    self.inbox.mark_read_completed(&id);
                    vec![ClientAction::InboxUpdated]
                },
                Err(error) => self.on_api_error(&error, "mark as read"),
            },
            ApiOutcome::AllNotificationsMarkedRead { result } => match result {
                Ok(()) => {
                    self.inbox.mark_all_completed();
                    vec![ClientAction::InboxUpdated]
                },
                Err(error) => self.on_api_error(&error, "mark all as read"),
            },
            ApiOutcome::NotificationDeleted { id, result } => match result {
                Ok(()) => {
                    self.inbox.delete_completed(&id);
                    vec![ClientAction::InboxUpdated]
                },
                Err(error) => self.on_api_error(&error, "notification delete"),
            },
        }
    }

    fn on_history(
        &mut self,
        room_id: RoomId,
        result: Result<Vec<WireMessage>, ApiError>,
    ) -> Vec<ClientAction> {
        // Re-validate: a response for a room closed while the fetch was in
        // flight must not resurrect state.
        let Some(peer_id) = self.conversations.get(&room_id).map(|c| c.peer_id().clone()) else {
            return vec![ClientAction::Log {
                message: format!("discarding history for closed conversation {room_id}"),
            }];
        };

        let wire_messages = match result {
            Ok(messages) => messages,
            // No history yet is an empty conversation, not an error.
            Err(ApiError::NotFound) => Vec::new(),
            Err(error) => return self.on_api_error(&error, "history fetch"),
        };

        let mut actions = Vec::new();
        let messages: Vec<Message> = wire_messages
            .into_iter()
            .map(|wire| {
                let body =
                    self.open_wire_body(&peer_id, &wire.body, wire.encrypted, &mut actions);
                Message {
                    id: MessageId::Server(wire.id),
                    sender_id: wire.sender_id,
                    receiver_id: wire.receiver_id,
                    body,
                    sent_at_ms: wire.sent_at_ms,
                    encrypted: wire.encrypted,
                    state: MessageState::Confirmed,
                }
            })
            .collect();

        if let Some(conversation) = self.conversations.get_mut(&room_id) {
            conversation.apply_history(messages);
            actions.push(ClientAction::ConversationUpdated { room_id });
        }
        actions
    }

    fn on_message_created(
        &mut self,
        room_id: &RoomId,
        nonce: &str,
        result: Result<WireMessage, ApiError>,
    ) -> Vec<ClientAction> {
        let Some(conversation) = self.conversations.get_mut(room_id) else {
            return vec![ClientAction::Log {
                message: format!("discarding create completion for closed conversation {room_id}"),
            }];
        };

        match result {
            Ok(wire) => {
                if conversation.confirm(nonce, wire.id, wire.sent_at_ms) {
                    vec![ClientAction::ConversationUpdated { room_id: room_id.clone() }]
                } else {
                    vec![ClientAction::Log {
                        message: format!("stale create completion for nonce {nonce}"),
                    }]
                }
            },
            Err(error) => {
                let mut actions = Vec::new();
                if let Some(body) = conversation.fail(nonce) {
                    actions.push(ClientAction::ConversationUpdated { room_id: room_id.clone() });
                    actions.push(ClientAction::ComposeRestore { room_id: room_id.clone(), body });
                }
                if matches!(error, ApiError::AuthRequired) {
                    actions.extend(self.on_api_error(&error, "message send"));
                } else {
                    actions.push(ClientAction::TransientError {
                        message: "message could not be sent".to_string(),
                    });
                }
                actions
            },
        }
    }

    /// Map a REST failure to actions per the failure policy: 401 puts the
    /// layer to sleep silently, expected absence is quiet, everything else
    /// surfaces a transient indicator without clearing state.
    fn on_api_error(&mut self, error: &ApiError, what: &str) -> Vec<ClientAction> {
        match error {
            ApiError::AuthRequired => {
                self.inbox.suspend();
                vec![
                    ClientAction::Log {
                        message: format!("{what}: no session; real-time layer dormant"),
                    },
                    ClientAction::InboxUpdated,
                ]
            },
            ApiError::NotFound => {
                vec![ClientAction::Log { message: format!("{what}: not found (empty state)") }]
            },
            ApiError::Transport(_) | ApiError::Server { .. } => {
                vec![ClientAction::TransientError { message: format!("{what} failed") }]
            },
        }
    }

    /// Open a wire body, falling back to the redacted placeholder so the
    /// message keeps its slot in the sequence. Unencrypted legacy bodies
    /// pass through untouched.
    fn open_wire_body(
        &mut self,
        peer_id: &UserId,
        wire_body: &str,
        encrypted: bool,
        actions: &mut Vec<ClientAction>,
    ) -> String {
        if !encrypted {
            return wire_body.to_string();
        }

        let Some(keys) = self.keys.as_mut() else {
            actions.push(ClientAction::Log {
                message: "sealed message with no key cache; redacting".to_string(),
            });
            return REDACTED_PLACEHOLDER.to_string();
        };

        match keys.open_from(peer_id, wire_body) {
            Ok(plaintext) => plaintext,
            Err(error) => {
                actions.push(ClientAction::Log { message: format!("redacting message: {error}") });
                REDACTED_PLACEHOLDER.to_string()
            },
        }
    }

    fn api_actions(calls: Vec<ApiCall>) -> Vec<ClientAction> {
        calls.into_iter().map(ClientAction::Api).collect()
    }

    fn map_connection(actions: Vec<ConnectionAction>) -> Vec<ClientAction> {
        actions
            .into_iter()
            .map(|action| match action {
                ConnectionAction::OpenTransport => ClientAction::OpenTransport,
                ConnectionAction::CloseTransport => ClientAction::CloseTransport,
                ConnectionAction::SendEnvelope(envelope) => ClientAction::SendEnvelope(envelope),
                ConnectionAction::StateChanged(state) => ClientAction::ConnectionChanged { state },
            })
            .collect()
    }

    fn map_reminders(actions: Vec<ReminderAction>) -> Vec<ClientAction> {
        actions
            .into_iter()
            .map(|action| match action {
                ReminderAction::Alert { urgent, repeat } => ClientAction::Alert { urgent, repeat },
                ReminderAction::OpenMeeting { url } => ClientAction::OpenMeetingUrl { url },
            })
            .collect()
    }
}
