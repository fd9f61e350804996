//! Per-conversation message sequence with optimistic echo.
//!
//! One [`Conversation`] per open room. The visible sequence is the
//! authoritative read model for the view layer and maintains two invariants
//! under every interleaving of sends, REST completions, and live pushes:
//!
//! - ascending `sent_at_ms` order, with no duplicate message ids
//! - reconciliation replaces the optimistic entry in place; the view never
//!   observes a duplicate or a reorder of a confirmed message
//!
//! Decryption happens before messages reach this module; a message whose
//! body could not be decrypted arrives already redacted so the sequence
//! keeps its slot.

use classline_proto::{RoomId, UserId};

/// Placeholder body shown for messages that failed to decrypt.
///
/// The message stays in the sequence — dropping it would silently reorder
/// the conversation around the gap.
pub const REDACTED_PLACEHOLDER: &str = "🔒 [Encrypted Message]";

/// Window within which a live push is considered an echo of an existing
/// entry from the same sender with the same body.
///
/// The live protocol carries no message ids, and a sender may receive its
/// own broadcast back, so equality-within-a-window is the only available
/// identity.
pub const DEDUP_WINDOW_MS: u64 = 10_000;

/// Message identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageId {
    /// Client-assigned nonce, used until the server confirms the message.
    Local(String),
    /// Server-assigned stable id.
    Server(String),
}

impl MessageId {
    /// The id as a string slice, whichever side assigned it.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Local(id) | Self::Server(id) => id,
        }
    }
}

/// Delivery state of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageState {
    /// Optimistic local echo, awaiting the server's copy.
    Pending,
    /// Server-confirmed; immutable from here on.
    Confirmed,
    /// The create call failed; the entry leaves the visible sequence.
    Failed,
}

/// A chat message as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Message identity (local nonce or server id).
    pub id: MessageId,
    /// Stable id of the sender.
    pub sender_id: UserId,
    /// Stable id of the receiver.
    pub receiver_id: UserId,
    /// Plaintext body (or [`REDACTED_PLACEHOLDER`]).
    pub body: String,
    /// Client timestamp for optimistic entries, server timestamp once
    /// confirmed. Unix milliseconds (UTC).
    pub sent_at_ms: u64,
    /// Whether the message travelled sealed.
    pub encrypted: bool,
    /// Delivery state.
    pub state: MessageState,
}

/// One open conversation.
#[derive(Debug, Clone)]
pub struct Conversation {
    room_id: RoomId,
    self_id: UserId,
    peer_id: UserId,
    messages: Vec<Message>,
    joined: bool,
    history_loaded: bool,
}

impl Conversation {
    /// Create an empty conversation for a room.
    pub fn new(room_id: RoomId, self_id: UserId, peer_id: UserId) -> Self {
        Self { room_id, self_id, peer_id, messages: Vec::new(), joined: false, history_loaded: false }
    }

    /// Room this conversation belongs to.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Our own user id.
    pub fn self_id(&self) -> &UserId {
        &self.self_id
    }

    /// The other participant.
    pub fn peer_id(&self) -> &UserId {
        &self.peer_id
    }

    /// The visible message sequence, ascending in `sent_at_ms`.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Whether the live room broadcast is currently subscribed.
    pub fn joined(&self) -> bool {
        self.joined
    }

    /// Record the room subscription state.
    pub fn set_joined(&mut self, joined: bool) {
        self.joined = joined;
    }

    /// Whether history has been fetched at least once.
    pub fn history_loaded(&self) -> bool {
        self.history_loaded
    }

    /// Install fetched history, keeping any still-pending optimistic
    /// entries in their sorted positions.
    pub fn apply_history(&mut self, mut history: Vec<Message>) {
        history.sort_by_key(|m| m.sent_at_ms);

        let pending: Vec<Message> = self
            .messages
            .drain(..)
            .filter(|m| m.state == MessageState::Pending)
            .collect();

        self.messages = history;
        for message in pending {
            self.insert_sorted(message);
        }
        self.history_loaded = true;
    }

    /// Append an optimistic local echo.
    pub fn push_pending(&mut self, message: Message) {
        debug_assert_eq!(message.state, MessageState::Pending);
        self.insert_sorted(message);
    }

    /// Replace the pending entry matching `nonce` with its confirmed
    /// server copy (id and timestamp become authoritative; the plaintext
    /// body is kept). Returns false if no such pending entry exists —
    /// e.g. the completion arrived twice.
    pub fn confirm(&mut self, nonce: &str, server_id: String, sent_at_ms: u64) -> bool {
        let Some(index) = self.messages.iter().position(|m| {
            m.state == MessageState::Pending && matches!(&m.id, MessageId::Local(n) if n == nonce)
        }) else {
            return false;
        };

        let mut message = self.messages.remove(index);
        message.id = MessageId::Server(server_id);
        message.sent_at_ms = sent_at_ms;
        message.state = MessageState::Confirmed;
        self.insert_sorted(message);
        true
    }

    /// Roll back the pending entry matching `nonce`.
    ///
    /// The entry transitions to Failed and leaves the visible sequence;
    /// the original body is returned so the caller can restore it into the
    /// compose box.
    pub fn fail(&mut self, nonce: &str) -> Option<String> {
        let index = self.messages.iter().position(|m| {
            m.state == MessageState::Pending && matches!(&m.id, MessageId::Local(n) if n == nonce)
        })?;

        let mut message = self.messages.remove(index);
        message.state = MessageState::Failed;
        Some(message.body)
    }

    /// Apply a live inbound message.
    ///
    /// Suppressed when it duplicates an existing entry: same server id, or
    /// same sender and body within [`DEDUP_WINDOW_MS`] of an unfailed entry
    /// (the sender's own optimistic echo coming back, or a double relay).
    /// Returns whether the message was appended.
    pub fn apply_incoming(&mut self, message: Message) -> bool {
        if let MessageId::Server(id) = &message.id
            && self.messages.iter().any(|m| matches!(&m.id, MessageId::Server(existing) if existing == id))
        {
            return false;
        }

        let echo = self.messages.iter().any(|m| {
            m.state != MessageState::Failed
                && m.sender_id == message.sender_id
                && m.body == message.body
                && m.sent_at_ms.abs_diff(message.sent_at_ms) <= DEDUP_WINDOW_MS
        });
        if echo {
            return false;
        }

        self.insert_sorted(message);
        true
    }

    /// Whether the sequence satisfies its ordering invariant. Exposed for
    /// tests and the simulation harness.
    pub fn is_ordered(&self) -> bool {
        self.messages.windows(2).all(|pair| pair[0].sent_at_ms <= pair[1].sent_at_ms)
    }

    fn insert_sorted(&mut self, message: Message) {
        // Stable: equal timestamps keep arrival order.
        let index = self.messages.partition_point(|m| m.sent_at_ms <= message.sent_at_ms);
        self.messages.insert(index, message);
    }
}
