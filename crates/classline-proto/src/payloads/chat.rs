//! Chat message payloads.

use serde::{Deserialize, Serialize};

use crate::ids::{RoomId, UserId};

/// A chat message pushed over the live connection.
///
/// Used both outbound (`sendMessage`) and inbound (`receiveMessage`) — the
/// server relays the payload unchanged to the other room participant, and may
/// relay it back to the sender as well.
///
/// When `is_encrypted` is set, `message` carries the sealed wire form (see
/// `classline-crypto`), not plaintext. The push intentionally carries no
/// server-assigned message id: the REST create call is the authoritative
/// record, and receivers deduplicate live pushes against it by sender and
/// body within a short window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPush {
    /// Room the message belongs to.
    pub room_id: RoomId,

    /// Message body; sealed wire form when `is_encrypted` is set.
    pub message: String,

    /// Whether `message` is sealed.
    pub is_encrypted: bool,

    /// Stable id of the sender.
    pub sender_id: UserId,

    /// Display name of the sender.
    pub sender: String,

    /// Originating offer. Today this equals `room_id`; kept separate for
    /// compatibility with the backend's payload shape.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer: Option<RoomId>,
}
