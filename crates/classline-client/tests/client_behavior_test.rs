//! Behavioral tests for the client state machine.
//!
//! Drives a `Client` with scripted events and asserts on the produced
//! actions and read models: optimistic reconciliation, rollback, live-push
//! deduplication, re-subscription after reconnect, and the 401 dormancy
//! policy.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use classline_client::{
    ApiCall, ApiError, ApiOutcome, Client, ClientAction, ClientEvent, MessageState,
    PairKeyCache, REDACTED_PLACEHOLDER, ReminderId,
};
use classline_core::{Environment, LinkState};
use classline_crypto::NONCE_SIZE;
use classline_proto::payloads::chat::ChatPush;
use classline_proto::payloads::meeting::{ReminderPush, ReminderStage};
use classline_proto::payloads::session::{UserConnected, UserRole};
use classline_proto::{Envelope, MeetingId, RoomId, UserId, WireMessage};

/// Deterministic test environment: manually advanced clock, counter RNG.
#[derive(Clone)]
struct TestEnv {
    state: Arc<Mutex<TestEnvState>>,
}

struct TestEnvState {
    now_ms: u64,
    rng_counter: u64,
}

/// Virtual instant measured in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct TestInstant(u64);

impl std::ops::Sub for TestInstant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(rhs.0))
    }
}

impl TestEnv {
    fn new() -> Self {
        Self { state: Arc::new(Mutex::new(TestEnvState { now_ms: 0, rng_counter: 1 })) }
    }

    fn advance(&self, duration: Duration) {
        self.state.lock().unwrap().now_ms += duration.as_millis() as u64;
    }
}

impl Environment for TestEnv {
    type Instant = TestInstant;

    fn now(&self) -> TestInstant {
        TestInstant(self.state.lock().unwrap().now_ms)
    }

    fn sleep(&self, _duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        async {}
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        let mut state = self.state.lock().unwrap();
        for byte in buffer.iter_mut() {
            state.rng_counter = state.rng_counter.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            *byte = (state.rng_counter >> 33) as u8;
        }
    }

    fn wall_clock_ms(&self) -> u64 {
        1_700_000_000_000 + self.state.lock().unwrap().now_ms
    }
}

fn alice() -> UserConnected {
    UserConnected {
        user_id: UserId::new("alice"),
        user_name: "Alice".to_string(),
        user_role: UserRole::Student,
    }
}

fn room() -> RoomId {
    RoomId::new("offer123")
}

/// A connected client with the conversation to bob open.
fn open_client(env: &TestEnv) -> Client<TestEnv> {
    let mut client = Client::new(env.clone());
    client.handle(ClientEvent::Connect { identity: alice() }).unwrap();
    client.handle(ClientEvent::TransportOpened).unwrap();
    client
        .handle(ClientEvent::OpenConversation { room_id: room(), peer_id: UserId::new("bob") })
        .unwrap();
    client
}

fn sent_envelopes(actions: &[ClientAction]) -> Vec<Envelope> {
    actions
        .iter()
        .filter_map(|action| match action {
            ClientAction::SendEnvelope(envelope) => Some(envelope.clone()),
            _ => None,
        })
        .collect()
}

fn api_calls(actions: &[ClientAction]) -> Vec<ApiCall> {
    actions
        .iter()
        .filter_map(|action| match action {
            ClientAction::Api(call) => Some(call.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn connect_opens_transport_and_announces_identity() {
    let env = TestEnv::new();
    let mut client = Client::new(env);

    let actions = client.handle(ClientEvent::Connect { identity: alice() }).unwrap();
    assert!(actions.contains(&ClientAction::OpenTransport));
    assert_eq!(client.connection_state(), LinkState::Connecting);

    let actions = client.handle(ClientEvent::TransportOpened).unwrap();
    assert_eq!(client.connection_state(), LinkState::Connected);
    assert!(
        sent_envelopes(&actions)
            .iter()
            .any(|envelope| matches!(envelope, Envelope::UserConnected(_)))
    );
}

#[test]
fn open_conversation_fetches_history_and_joins_room() {
    let env = TestEnv::new();
    let client = open_client(&env);

    let conversation = client.conversation(&room()).unwrap();
    assert!(conversation.joined());
    assert!(conversation.messages().is_empty());
}

#[test]
fn send_yields_pending_then_exactly_one_confirmed() {
    let env = TestEnv::new();
    let mut client = open_client(&env);

    let actions = client
        .handle(ClientEvent::SendChatMessage { room_id: room(), body: "hello".to_string() })
        .unwrap();

    // Optimistic echo is immediate
    let conversation = client.conversation(&room()).unwrap();
    assert_eq!(conversation.messages().len(), 1);
    assert_eq!(conversation.messages()[0].state, MessageState::Pending);
    assert_eq!(conversation.messages()[0].body, "hello");

    // The REST call carries the sealed body, never the plaintext
    let calls = api_calls(&actions);
    let Some(ApiCall::CreateMessage { nonce, request }) = calls.first() else {
        panic!("expected a create call, got {calls:?}");
    };
    assert!(request.encrypted);
    assert_ne!(request.body, "hello");
    assert!(request.body.starts_with("cl1."));

    // So does the socket emit
    let envelopes = sent_envelopes(&actions);
    let Some(Envelope::SendMessage(push)) = envelopes.first() else {
        panic!("expected a socket emit, got {envelopes:?}");
    };
    assert!(push.is_encrypted);
    assert_eq!(push.message, request.body);

    // Simulated REST success reconciles in place
    let actions = client
        .handle(ClientEvent::ApiCompleted(ApiOutcome::MessageCreated {
            room_id: room(),
            nonce: nonce.clone(),
            result: Ok(WireMessage {
                id: "srv-1".to_string(),
                sender_id: UserId::new("alice"),
                receiver_id: UserId::new("bob"),
                body: request.body.clone(),
                encrypted: true,
                sent_at_ms: 1_700_000_000_500,
            }),
        }))
        .unwrap();
    assert!(actions.contains(&ClientAction::ConversationUpdated { room_id: room() }));

    let conversation = client.conversation(&room()).unwrap();
    assert_eq!(conversation.messages().len(), 1, "never two copies of the same send");
    assert_eq!(conversation.messages()[0].state, MessageState::Confirmed);
    assert_eq!(conversation.messages()[0].body, "hello");
}

#[test]
fn failed_send_rolls_back_and_restores_compose_text() {
    let env = TestEnv::new();
    let mut client = open_client(&env);

    let actions = client
        .handle(ClientEvent::SendChatMessage { room_id: room(), body: "draft".to_string() })
        .unwrap();
    let Some(ApiCall::CreateMessage { nonce, .. }) = api_calls(&actions).into_iter().next()
    else {
        panic!("expected a create call");
    };

    let actions = client
        .handle(ClientEvent::ApiCompleted(ApiOutcome::MessageCreated {
            room_id: room(),
            nonce,
            result: Err(ApiError::Server { status: 500, message: "boom".to_string() }),
        }))
        .unwrap();

    assert!(client.conversation(&room()).unwrap().messages().is_empty());
    assert!(actions.contains(&ClientAction::ComposeRestore {
        room_id: room(),
        body: "draft".to_string(),
    }));
    assert!(
        actions.iter().any(|action| matches!(action, ClientAction::TransientError { .. })),
        "rollback surfaces a toast-level error"
    );
}

#[test]
fn own_broadcast_echo_is_suppressed() {
    let env = TestEnv::new();
    let mut client = open_client(&env);

    let actions = client
        .handle(ClientEvent::SendChatMessage { room_id: room(), body: "hello".to_string() })
        .unwrap();
    let envelopes = sent_envelopes(&actions);
    let Some(Envelope::SendMessage(push)) = envelopes.first() else {
        panic!("expected a socket emit");
    };

    // The server relays our own message back to us
    let echo = Envelope::ReceiveMessage(push.clone());
    client.handle(ClientEvent::EnvelopeReceived(echo)).unwrap();

    let conversation = client.conversation(&room()).unwrap();
    assert_eq!(conversation.messages().len(), 1, "echo must not duplicate the optimistic entry");
}

#[test]
fn peer_message_is_decrypted_and_counted_once() {
    let env = TestEnv::new();
    let mut client = open_client(&env);

    // Bob seals with his own independently derived pair key
    let mut bob_keys = PairKeyCache::new(UserId::new("bob"));
    let wire_body =
        bob_keys.seal_for(&UserId::new("alice"), "Are you free tomorrow?", [9; NONCE_SIZE]);

    let push = ChatPush {
        room_id: room(),
        message: wire_body,
        is_encrypted: true,
        sender_id: UserId::new("bob"),
        sender: "Bob".to_string(),
        offer: Some(room()),
    };

    let actions =
        client.handle(ClientEvent::EnvelopeReceived(Envelope::ReceiveMessage(push))).unwrap();

    let conversation = client.conversation(&room()).unwrap();
    assert_eq!(conversation.messages().len(), 1);
    assert_eq!(conversation.messages()[0].body, "Are you free tomorrow?");
    assert_eq!(conversation.messages()[0].sender_id, UserId::new("bob"));

    // The push also feeds the inbox: optimistic bump + eager recount
    assert_eq!(client.inbox().unread(), 1);
    assert!(api_calls(&actions).contains(&ApiCall::FetchUnreadCount));
}

#[test]
fn corrupt_ciphertext_renders_redacted_placeholder() {
    let env = TestEnv::new();
    let mut client = open_client(&env);

    let push = ChatPush {
        room_id: room(),
        message: "cl1.not-actually-ciphertext".to_string(),
        is_encrypted: true,
        sender_id: UserId::new("bob"),
        sender: "Bob".to_string(),
        offer: None,
    };

    client.handle(ClientEvent::EnvelopeReceived(Envelope::ReceiveMessage(push))).unwrap();

    let conversation = client.conversation(&room()).unwrap();
    assert_eq!(conversation.messages().len(), 1, "the message keeps its slot");
    assert_eq!(conversation.messages()[0].body, REDACTED_PLACEHOLDER);
}

#[test]
fn unencrypted_legacy_messages_pass_through() {
    let env = TestEnv::new();
    let mut client = open_client(&env);

    let push = ChatPush {
        room_id: room(),
        message: "plain old text".to_string(),
        is_encrypted: false,
        sender_id: UserId::new("bob"),
        sender: "Bob".to_string(),
        offer: None,
    };

    client.handle(ClientEvent::EnvelopeReceived(Envelope::ReceiveMessage(push))).unwrap();

    let conversation = client.conversation(&room()).unwrap();
    assert_eq!(conversation.messages()[0].body, "plain old text");
    assert!(!conversation.messages()[0].encrypted);
}

#[test]
fn history_for_closed_conversation_is_discarded() {
    let env = TestEnv::new();
    let mut client = open_client(&env);

    client.handle(ClientEvent::CloseConversation { room_id: room() }).unwrap();

    let actions = client
        .handle(ClientEvent::ApiCompleted(ApiOutcome::History {
            room_id: room(),
            result: Ok(vec![WireMessage {
                id: "srv-1".to_string(),
                sender_id: UserId::new("bob"),
                receiver_id: UserId::new("alice"),
                body: "late".to_string(),
                encrypted: false,
                sent_at_ms: 1,
            }]),
        }))
        .unwrap();

    assert!(client.conversation(&room()).is_none(), "no state resurrected");
    assert!(actions.iter().any(|action| matches!(action, ClientAction::Log { .. })));
}

#[test]
fn reconnect_rejoins_open_rooms() {
    let env = TestEnv::new();
    let mut client = open_client(&env);

    client
        .handle(ClientEvent::TransportLost { reason: "wifi dropped".to_string() })
        .unwrap();
    assert_eq!(client.connection_state(), LinkState::Reconnecting);
    assert!(!client.conversation(&room()).unwrap().joined());

    // Past the first backoff, the retry fires
    env.advance(Duration::from_millis(600));
    let actions = client.handle(ClientEvent::Tick).unwrap();
    assert!(actions.contains(&ClientAction::OpenTransport));

    let actions = client.handle(ClientEvent::TransportOpened).unwrap();
    let envelopes = sent_envelopes(&actions);

    assert!(envelopes.iter().any(|envelope| matches!(envelope, Envelope::UserConnected(_))));
    assert!(envelopes.iter().any(
        |envelope| matches!(envelope, Envelope::JoinRoom(join) if join.room_id == room())
    ));
    assert!(client.conversation(&room()).unwrap().joined());
    assert!(
        api_calls(&actions).contains(&ApiCall::FetchUnreadCount),
        "unread counter re-synced after the gap"
    );
}

#[test]
fn auth_failure_puts_the_layer_to_sleep_silently() {
    let env = TestEnv::new();
    let mut client = open_client(&env);

    let actions = client
        .handle(ClientEvent::ApiCompleted(ApiOutcome::UnreadCount {
            result: Err(ApiError::AuthRequired),
        }))
        .unwrap();

    assert!(client.inbox().is_dormant());
    assert!(
        !actions.iter().any(|action| matches!(action, ClientAction::TransientError { .. })),
        "401 is swallowed, not surfaced"
    );

    // Dormant inbox ignores pushes entirely
    let actions = client
        .handle(ClientEvent::EnvelopeReceived(Envelope::ReceiveMeetingInvitation(
            classline_proto::payloads::meeting::MeetingInvitation {
                room_id: room(),
                sender_id: UserId::new("bob"),
                sender: "Bob".to_string(),
                subject: "Algebra".to_string(),
                starts_at_ms: 0,
                meeting_url: "https://meet.example/m1".to_string(),
            },
        )))
        .unwrap();
    assert_eq!(client.inbox().unread(), 0);
    assert!(api_calls(&actions).is_empty());

    // A fresh connect re-arms the inbox
    client.handle(ClientEvent::Connect { identity: alice() }).unwrap();
    assert!(!client.inbox().is_dormant());
}

#[test]
fn urgent_reminder_alerts_and_join_opens_url_once() {
    let env = TestEnv::new();
    let mut client = open_client(&env);

    let push = ReminderPush {
        meeting_id: MeetingId::new("m1"),
        stage: ReminderStage::T2,
        minutes_until_meeting: 2,
        is_urgent: true,
        subject: "Algebra".to_string(),
        room_id: room(),
        meeting_url: "https://meet.example/m1".to_string(),
    };

    let actions = client
        .handle(ClientEvent::EnvelopeReceived(Envelope::MeetingReminder(push.clone())))
        .unwrap();
    assert!(actions.contains(&ClientAction::Alert { urgent: true, repeat: true }));
    assert_eq!(client.reminders().active_count(), 1);

    // Replay is refused
    let actions = client
        .handle(ClientEvent::EnvelopeReceived(Envelope::MeetingReminder(push)))
        .unwrap();
    assert!(actions.is_empty());
    assert_eq!(client.reminders().active_count(), 1);

    let id = ReminderId::for_stage(&MeetingId::new("m1"), ReminderStage::T2);
    let actions = client.handle(ClientEvent::JoinMeeting { id: id.clone() }).unwrap();
    let opens = actions
        .iter()
        .filter(|action| matches!(action, ClientAction::OpenMeetingUrl { .. }))
        .count();
    assert_eq!(opens, 1);
    assert_eq!(client.reminders().active_count(), 0);

    // Joining again does nothing
    assert!(client.handle(ClientEvent::JoinMeeting { id }).unwrap().is_empty());
}

#[test]
fn send_to_unopened_room_is_an_error() {
    let env = TestEnv::new();
    let mut client = Client::new(env);
    client.handle(ClientEvent::Connect { identity: alice() }).unwrap();

    let result = client.handle(ClientEvent::SendChatMessage {
        room_id: RoomId::new("offer999"),
        body: "hi".to_string(),
    });
    assert!(result.is_err());
}

#[test]
fn server_ping_is_answered_with_pong() {
    let env = TestEnv::new();
    let mut client = open_client(&env);

    let actions = client.handle(ClientEvent::EnvelopeReceived(Envelope::Ping)).unwrap();
    assert_eq!(sent_envelopes(&actions), vec![Envelope::Pong]);
}
