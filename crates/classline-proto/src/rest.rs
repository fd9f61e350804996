//! REST contract types.
//!
//! The shapes exchanged with the backend API for chat history, message
//! creation, and the notification inbox. The HTTP client itself is a
//! collaborator supplied by the embedding application; this crate only fixes
//! the payload contract.

use serde::{Deserialize, Serialize};

use crate::ids::{NotificationId, RoomId, UserId};

/// A persisted chat message as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    /// Server-assigned stable id.
    pub id: String,
    /// Stable id of the sender.
    pub sender_id: UserId,
    /// Stable id of the receiver.
    pub receiver_id: UserId,
    /// Message body; sealed wire form when `encrypted` is set.
    pub body: String,
    /// Whether `body` is sealed.
    pub encrypted: bool,
    /// Server timestamp, Unix milliseconds (UTC).
    pub sent_at_ms: u64,
}

/// Request body of the message create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    /// Room the message belongs to.
    pub room_id: RoomId,
    /// Stable id of the receiver.
    pub receiver_id: UserId,
    /// Message body; sealed wire form when `encrypted` is set.
    pub body: String,
    /// Whether `body` is sealed.
    pub encrypted: bool,
}

/// Category of a notification inbox entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// New chat message.
    Chat,
    /// Meeting invitation or update.
    Meeting,
    /// Appointment invitation or update.
    Appointment,
    /// Offer activity.
    Offer,
    /// Anything else.
    Generic,
}

/// A notification inbox entry as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireNotification {
    /// Server-assigned stable id.
    pub id: NotificationId,
    /// Category of the entry.
    pub kind: NotificationKind,
    /// Whether the user has read this entry.
    pub read: bool,
    /// Creation timestamp, Unix milliseconds (UTC).
    pub created_at_ms: u64,
    /// Stable id of the user the entry originates from.
    pub sender_id: UserId,
    /// Display name of that user.
    pub sender_name: String,
    /// Optional navigation target for the entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
}

/// One page of the notification inbox, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    /// Entries on this page, newest first.
    pub items: Vec<WireNotification>,
    /// 1-based index of this page.
    pub current_page: u32,
    /// Total number of pages available.
    pub total_pages: u32,
}
