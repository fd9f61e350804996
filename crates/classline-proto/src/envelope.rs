//! Tagged-union envelope for the live socket connection.
//!
//! Every event on the wire is `{"type": <event name>, "payload": <payload>}`.
//! The variant set is the complete client-observable protocol: five outbound
//! events, five inbound events, and the keepalive pair.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::payloads::{
    chat::ChatPush,
    meeting::{AppointmentInvitation, MeetingInvitation, ReminderPush},
    session::{JoinRoom, RoleChanged, UserConnected},
};

/// One event on the live connection, in either direction.
///
/// # Invariants
///
/// - Each variant maps to exactly one wire event name (the serde tag).
/// - `decode(encode(e)) == e` for every envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Envelope {
    // Outbound (client -> server)
    /// Announce the authenticated user after the transport opens.
    UserConnected(UserConnected),
    /// Subscribe to a room's broadcast.
    JoinRoom(JoinRoom),
    /// Relay a chat message to the room.
    SendMessage(ChatPush),
    /// Relay a meeting invitation to the room.
    SendMeetingInvitation(MeetingInvitation),
    /// Relay an appointment invitation to the room.
    SendAppointmentInvitation(AppointmentInvitation),

    // Inbound (server -> client)
    /// Chat message broadcast for a subscribed room.
    ReceiveMessage(ChatPush),
    /// Meeting invitation addressed to this user.
    ReceiveMeetingInvitation(MeetingInvitation),
    /// Appointment invitation addressed to this user.
    ReceiveAppointmentInvitation(AppointmentInvitation),
    /// Staged reminder for an upcoming meeting.
    MeetingReminder(ReminderPush),
    /// This user's marketplace role changed.
    RoleChanged(RoleChanged),

    // Keepalive (both directions)
    /// Heartbeat probe.
    Ping,
    /// Heartbeat response.
    Pong,
}

impl Envelope {
    /// Encode to the JSON wire form.
    pub fn encode(&self) -> Result<String, EnvelopeError> {
        serde_json::to_string(self).map_err(|e| EnvelopeError::Encode(e.to_string()))
    }

    /// Decode from the JSON wire form.
    ///
    /// # Errors
    ///
    /// `EnvelopeError::Decode` for malformed JSON, unknown event names, or
    /// payloads that do not match the event's schema.
    pub fn decode(text: &str) -> Result<Self, EnvelopeError> {
        serde_json::from_str(text).map_err(|e| EnvelopeError::Decode(e.to_string()))
    }

    /// The wire event name of this envelope.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::UserConnected(_) => "userConnected",
            Self::JoinRoom(_) => "joinRoom",
            Self::SendMessage(_) => "sendMessage",
            Self::SendMeetingInvitation(_) => "sendMeetingInvitation",
            Self::SendAppointmentInvitation(_) => "sendAppointmentInvitation",
            Self::ReceiveMessage(_) => "receiveMessage",
            Self::ReceiveMeetingInvitation(_) => "receiveMeetingInvitation",
            Self::ReceiveAppointmentInvitation(_) => "receiveAppointmentInvitation",
            Self::MeetingReminder(_) => "meetingReminder",
            Self::RoleChanged(_) => "roleChanged",
            Self::Ping => "ping",
            Self::Pong => "pong",
        }
    }
}

/// Errors from envelope encoding and decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Envelope could not be serialized.
    #[error("envelope encode failed: {0}")]
    Encode(String),

    /// Wire text was not a valid envelope.
    #[error("envelope decode failed: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{RoomId, UserId};
    use crate::payloads::session::UserRole;

    fn chat_push() -> ChatPush {
        ChatPush {
            room_id: RoomId::new("offer123"),
            message: "hello".into(),
            is_encrypted: false,
            sender_id: UserId::new("u1"),
            sender: "Alice".into(),
            offer: Some(RoomId::new("offer123")),
        }
    }

    #[test]
    fn envelope_wire_shape() {
        let envelope = Envelope::SendMessage(chat_push());
        let json: serde_json::Value = serde_json::from_str(&envelope.encode().unwrap()).unwrap();

        assert_eq!(json["type"], "sendMessage");
        assert_eq!(json["payload"]["roomId"], "offer123");
        assert_eq!(json["payload"]["sender"], "Alice");
    }

    #[test]
    fn keepalive_has_no_payload() {
        let json: serde_json::Value =
            serde_json::from_str(&Envelope::Ping.encode().unwrap()).unwrap();
        assert_eq!(json["type"], "ping");
        assert!(json.get("payload").is_none());
    }

    #[test]
    fn round_trip_all_directions() {
        let envelopes = vec![
            Envelope::UserConnected(UserConnected {
                user_id: UserId::new("u1"),
                user_name: "Alice".into(),
                user_role: UserRole::Student,
            }),
            Envelope::JoinRoom(JoinRoom { room_id: RoomId::new("offer123") }),
            Envelope::SendMessage(chat_push()),
            Envelope::ReceiveMessage(chat_push()),
            Envelope::Ping,
            Envelope::Pong,
        ];

        for envelope in envelopes {
            let decoded = Envelope::decode(&envelope.encode().unwrap()).unwrap();
            assert_eq!(decoded, envelope);
        }
    }

    #[test]
    fn unknown_event_name_is_rejected() {
        let result = Envelope::decode(r#"{"type":"receiveTypingIndicator","payload":{}}"#);
        assert!(matches!(result, Err(EnvelopeError::Decode(_))));
    }

    #[test]
    fn mismatched_payload_is_rejected() {
        // joinRoom with a chat payload shape
        let result = Envelope::decode(r#"{"type":"joinRoom","payload":{"message":"hi"}}"#);
        assert!(matches!(result, Err(EnvelopeError::Decode(_))));
    }

    #[test]
    fn event_names_match_serde_tags() {
        let envelope = Envelope::JoinRoom(JoinRoom { room_id: RoomId::new("r") });
        let json: serde_json::Value = serde_json::from_str(&envelope.encode().unwrap()).unwrap();
        assert_eq!(json["type"], envelope.event_name());
    }
}
