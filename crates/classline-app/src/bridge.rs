//! Protocol-to-Application translation layer.
//!
//! The [`Bridge`] wraps the low-level [`classline_client::Client`] and
//! adapts it to the application lifecycle.
//!
//! # Responsibilities
//!
//! - Converts high-level [`crate::AppAction`]s into client events.
//! - Accumulates outgoing envelopes, REST calls, transport commands, and UI
//!   effects for the driver to execute in the next I/O cycle.
//! - Interprets client actions and converts them back into
//!   [`crate::AppEvent`]s carrying fresh snapshots for the view.

use classline_client::{ApiCall, ApiOutcome, Client, ClientAction, ClientEvent};
use classline_core::Environment;
use classline_proto::Envelope;

use crate::{
    AppAction, AppEvent,
    driver::UiEffect,
    state::{ConversationView, InboxView},
};

/// Commands for the driver's transport management.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCommand {
    /// Open the physical transport.
    Open,
    /// Close the physical transport.
    Close,
}

/// Bridge between App and Client protocol logic.
///
/// Generic over Environment to support both production and simulation.
pub struct Bridge<E: Environment> {
    client: Client<E>,
    outgoing: Vec<Envelope>,
    api_calls: Vec<ApiCall>,
    transport: Vec<TransportCommand>,
    effects: Vec<UiEffect>,
}

impl<E: Environment> Bridge<E> {
    /// Create a new Bridge with the given environment.
    pub fn new(env: E) -> Self {
        Self {
            client: Client::new(env),
            outgoing: Vec::new(),
            api_calls: Vec::new(),
            transport: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        let event = match action {
            AppAction::Render | AppAction::Quit => return vec![],
            AppAction::Connect { identity } => ClientEvent::Connect { identity },
            AppAction::Disconnect => ClientEvent::Disconnect,
            AppAction::OpenConversation { room_id, peer_id } => {
                ClientEvent::OpenConversation { room_id, peer_id }
            },
            AppAction::CloseConversation { room_id } => {
                ClientEvent::CloseConversation { room_id }
            },
            AppAction::SendChatMessage { room_id, body } => {
                ClientEvent::SendChatMessage { room_id, body }
            },
            AppAction::OpenInbox => ClientEvent::InboxPanelOpened,
            AppAction::CloseInbox => ClientEvent::InboxPanelClosed,
            AppAction::FetchInboxPage { page } => ClientEvent::FetchInboxPage { page },
            AppAction::MarkNotificationRead { id } => ClientEvent::MarkNotificationRead { id },
            AppAction::MarkAllNotificationsRead => ClientEvent::MarkAllNotificationsRead,
            AppAction::DeleteNotification { id } => ClientEvent::DeleteNotification { id },
            AppAction::DismissReminder { id } => ClientEvent::DismissReminder { id },
            AppAction::JoinMeeting { id } => ClientEvent::JoinMeeting { id },
            AppAction::SendMeetingInvitation(invitation) => {
                ClientEvent::SendMeetingInvitation(invitation)
            },
            AppAction::SendAppointmentInvitation(invitation) => {
                ClientEvent::SendAppointmentInvitation(invitation)
            },
        };

        self.dispatch(event)
    }

    /// Handle an envelope from the live connection.
    pub fn handle_envelope(&mut self, envelope: Envelope) -> Vec<AppEvent> {
        self.dispatch(ClientEvent::EnvelopeReceived(envelope))
    }

    /// The driver opened the physical transport.
    pub fn handle_transport_opened(&mut self) -> Vec<AppEvent> {
        self.dispatch(ClientEvent::TransportOpened)
    }

    /// The driver lost (or failed to open) the physical transport.
    pub fn handle_transport_lost(&mut self, reason: String) -> Vec<AppEvent> {
        self.dispatch(ClientEvent::TransportLost { reason })
    }

    /// A REST call completed.
    pub fn handle_api_outcome(&mut self, outcome: ApiOutcome) -> Vec<AppEvent> {
        self.dispatch(ClientEvent::ApiCompleted(outcome))
    }

    /// Process a time tick.
    pub fn handle_tick(&mut self) -> Vec<AppEvent> {
        self.dispatch(ClientEvent::Tick)
    }

    /// Take pending outgoing envelopes.
    pub fn take_outgoing(&mut self) -> Vec<Envelope> {
        std::mem::take(&mut self.outgoing)
    }

    /// Take pending REST calls.
    pub fn take_api_calls(&mut self) -> Vec<ApiCall> {
        std::mem::take(&mut self.api_calls)
    }

    /// Take pending transport commands.
    pub fn take_transport_commands(&mut self) -> Vec<TransportCommand> {
        std::mem::take(&mut self.transport)
    }

    /// Take pending UI effects.
    pub fn take_effects(&mut self) -> Vec<UiEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Read access to the underlying client (tests, invariant checks).
    pub fn client(&self) -> &Client<E> {
        &self.client
    }

    fn dispatch(&mut self, event: ClientEvent) -> Vec<AppEvent> {
        match self.client.handle(event) {
            Ok(actions) => self.process_client_actions(actions),
            Err(error) => {
                tracing::warn!("client rejected event: {error}");
                vec![AppEvent::TransientError { message: error.to_string() }]
            },
        }
    }

    fn process_client_actions(&mut self, actions: Vec<ClientAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                ClientAction::OpenTransport => self.transport.push(TransportCommand::Open),
                ClientAction::CloseTransport => self.transport.push(TransportCommand::Close),
                ClientAction::SendEnvelope(envelope) => self.outgoing.push(envelope),
                ClientAction::Api(call) => self.api_calls.push(call),
                ClientAction::ConnectionChanged { state } => {
                    events.push(AppEvent::ConnectionChanged { state });
                },
                ClientAction::ConversationUpdated { room_id } => {
                    if let Some(conversation) = self.client.conversation(&room_id) {
                        events.push(AppEvent::ConversationUpdated {
                            view: ConversationView::from_model(conversation),
                        });
                    }
                },
                ClientAction::ConversationClosed { room_id } => {
                    events.push(AppEvent::ConversationClosed { room_id });
                },
                ClientAction::ComposeRestore { room_id, body } => {
                    events.push(AppEvent::ComposeRestore { room_id, body });
                },
                ClientAction::InboxUpdated => {
                    events.push(AppEvent::InboxUpdated {
                        view: InboxView::from_model(self.client.inbox()),
                    });
                },
                ClientAction::RemindersUpdated => {
                    events.push(AppEvent::RemindersUpdated {
                        reminders: self.client.reminders().active().cloned().collect(),
                    });
                },
                ClientAction::Alert { urgent, repeat } => {
                    self.effects.push(UiEffect::Alert { urgent, repeat });
                },
                ClientAction::OpenMeetingUrl { url } => {
                    self.effects.push(UiEffect::OpenMeetingUrl { url });
                },
                ClientAction::RoleChanged { user_id, role } => {
                    events.push(AppEvent::RoleChanged { user_id, role });
                },
                ClientAction::TransientError { message } => {
                    events.push(AppEvent::TransientError { message });
                },
                ClientAction::Log { message } => {
                    tracing::debug!("{message}");
                },
            }
        }

        events
    }
}
