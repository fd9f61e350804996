//! Property-based tests for envelope encoding.
//!
//! Round-trip stability must hold for arbitrary field contents, including
//! bodies with quotes, newlines, and non-ASCII text — chat bodies are
//! user-controlled.

use classline_proto::payloads::chat::ChatPush;
use classline_proto::payloads::meeting::{ReminderPush, ReminderStage};
use classline_proto::payloads::session::{JoinRoom, UserConnected, UserRole};
use classline_proto::{Envelope, MeetingId, RoomId, UserId};
use proptest::prelude::*;

fn stage_strategy() -> impl Strategy<Value = ReminderStage> {
    prop_oneof![
        Just(ReminderStage::T15),
        Just(ReminderStage::T10),
        Just(ReminderStage::T5),
        Just(ReminderStage::T2),
    ]
}

fn role_strategy() -> impl Strategy<Value = UserRole> {
    prop_oneof![Just(UserRole::Student), Just(UserRole::Teacher), Just(UserRole::Admin)]
}

fn envelope_strategy() -> impl Strategy<Value = Envelope> {
    prop_oneof![
        (".*", ".*", any::<bool>(), ".*", ".*").prop_map(
            |(room, message, is_encrypted, sender_id, sender)| {
                Envelope::SendMessage(ChatPush {
                    room_id: RoomId::new(room.clone()),
                    message,
                    is_encrypted,
                    sender_id: UserId::new(sender_id),
                    sender,
                    offer: Some(RoomId::new(room)),
                })
            }
        ),
        ".*".prop_map(|room| Envelope::JoinRoom(JoinRoom { room_id: RoomId::new(room) })),
        (".*", ".*", role_strategy()).prop_map(|(id, name, role)| {
            Envelope::UserConnected(UserConnected {
                user_id: UserId::new(id),
                user_name: name,
                user_role: role,
            })
        }),
        (".*", stage_strategy(), 0u32..60, ".*", ".*", ".*").prop_map(
            |(meeting, stage, minutes, subject, room, url)| {
                Envelope::MeetingReminder(ReminderPush {
                    meeting_id: MeetingId::new(meeting),
                    stage,
                    minutes_until_meeting: minutes,
                    is_urgent: stage.is_urgent(),
                    subject,
                    room_id: RoomId::new(room),
                    meeting_url: url,
                })
            }
        ),
        Just(Envelope::Ping),
        Just(Envelope::Pong),
    ]
}

proptest! {
    #[test]
    fn prop_envelope_round_trip(envelope in envelope_strategy()) {
        let encoded = envelope.encode().unwrap();
        let decoded = Envelope::decode(&encoded).unwrap();
        prop_assert_eq!(decoded, envelope);
    }

    #[test]
    fn prop_encode_is_deterministic(envelope in envelope_strategy()) {
        prop_assert_eq!(envelope.encode().unwrap(), envelope.encode().unwrap());
    }

    #[test]
    fn prop_garbage_never_panics(text in ".*") {
        // Decoding arbitrary text must fail cleanly, never panic.
        let _ = Envelope::decode(&text);
    }
}
