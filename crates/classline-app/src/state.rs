//! Observable application state types.
//!
//! Snapshots of the client's read models, cloned out for the view layer.
//! They contain exactly what rendering needs and none of the protocol
//! bookkeeping (pending nonces, key caches, fired-stage records).

use classline_client::{Conversation, Inbox, Message, NotificationItem};
use classline_proto::{RoomId, UserId};

/// Snapshot of one conversation for rendering.
#[derive(Debug, Clone)]
pub struct ConversationView {
    /// Room the conversation belongs to.
    pub room_id: RoomId,
    /// The other participant.
    pub peer_id: UserId,
    /// Visible messages, ascending in `sent_at_ms`.
    pub messages: Vec<Message>,
    /// Whether the live room broadcast is subscribed.
    pub joined: bool,
}

impl ConversationView {
    /// Snapshot the client's conversation read model.
    pub fn from_model(conversation: &Conversation) -> Self {
        Self {
            room_id: conversation.room_id().clone(),
            peer_id: conversation.peer_id().clone(),
            messages: conversation.messages().to_vec(),
            joined: conversation.joined(),
        }
    }
}

/// Snapshot of the notification inbox for rendering.
#[derive(Debug, Clone)]
pub struct InboxView {
    /// Loaded entries, newest first.
    pub items: Vec<NotificationItem>,
    /// Unread counter.
    pub unread: u64,
    /// 1-based index of the loaded page.
    pub current_page: u32,
    /// Total pages the server reported.
    pub total_pages: u32,
    /// Whether the panel is open.
    pub panel_open: bool,
    /// False while the session is not established — the view hides the
    /// inbox entirely rather than showing errors.
    pub visible: bool,
}

impl InboxView {
    /// Snapshot the client's inbox read model.
    pub fn from_model(inbox: &Inbox) -> Self {
        Self {
            items: inbox.items().to_vec(),
            unread: inbox.unread(),
            current_page: inbox.current_page(),
            total_pages: inbox.total_pages(),
            panel_open: inbox.panel_open(),
            visible: !inbox.is_dormant(),
        }
    }
}

impl Default for InboxView {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            unread: 0,
            current_page: 1,
            total_pages: 1,
            panel_open: false,
            visible: true,
        }
    }
}
