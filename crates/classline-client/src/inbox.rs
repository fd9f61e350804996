//! Unified notification inbox.
//!
//! Merges paginated REST-fetched notifications with live push events into
//! one ordered, deduplicated read model with an unread counter.
//!
//! Two rules keep the inbox consistent with the server:
//!
//! - Live pushes never synthesize items locally. They bump the unread
//!   counter optimistically and, only while the panel is open, trigger a
//!   fresh page-1 fetch — the server's record is canonical.
//! - Mutations (mark read, mark all, delete) hit REST first; local state
//!   changes only on success, so the view never shows a read/deleted state
//!   the server rejected.
//!
//! A 401 puts the inbox into a dormant state: every operation becomes a
//! silent no-op until a fresh authenticated connect re-arms it.

use classline_proto::{
    NotificationId, NotificationKind, NotificationPage, UserId, WireNotification,
};

use crate::api::ApiCall;

/// Default inbox page size.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Live push categories that feed the inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivePushKind {
    /// New chat message.
    Chat,
    /// Meeting invitation.
    MeetingInvite,
    /// Appointment invitation.
    AppointmentInvite,
}

/// A notification as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationItem {
    /// Server-assigned stable id.
    pub id: NotificationId,
    /// Category of the entry.
    pub kind: NotificationKind,
    /// Whether the user has read this entry.
    pub read: bool,
    /// Creation timestamp, Unix milliseconds (UTC).
    pub created_at_ms: u64,
    /// Stable id of the originating user.
    pub sender_id: UserId,
    /// Display name of the originating user.
    pub sender_name: String,
    /// Optional navigation target.
    pub action_url: Option<String>,
}

impl From<WireNotification> for NotificationItem {
    fn from(wire: WireNotification) -> Self {
        Self {
            id: wire.id,
            kind: wire.kind,
            read: wire.read,
            created_at_ms: wire.created_at_ms,
            sender_id: wire.sender_id,
            sender_name: wire.sender_name,
            action_url: wire.action_url,
        }
    }
}

/// The notification aggregator read model.
#[derive(Debug, Clone)]
pub struct Inbox {
    items: Vec<NotificationItem>,
    current_page: u32,
    total_pages: u32,
    unread: u64,
    panel_open: bool,
    dormant: bool,
    page_size: u32,
}

impl Inbox {
    /// Create an empty inbox.
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            current_page: 1,
            total_pages: 1,
            unread: 0,
            panel_open: false,
            dormant: false,
            page_size,
        }
    }

    /// Currently loaded items, newest first.
    pub fn items(&self) -> &[NotificationItem] {
        &self.items
    }

    /// Unread counter snapshot.
    pub fn unread(&self) -> u64 {
        self.unread
    }

    /// 1-based index of the most recently loaded page.
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Total pages the server reported.
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Whether the inbox panel is currently open in the view.
    pub fn panel_open(&self) -> bool {
        self.panel_open
    }

    /// Whether the inbox is dormant (no established session).
    pub fn is_dormant(&self) -> bool {
        self.dormant
    }

    /// Put the inbox to sleep. Every operation is a silent no-op until
    /// [`Inbox::rearm`].
    pub fn suspend(&mut self) {
        self.dormant = true;
    }

    /// Wake the inbox after a fresh authenticated connect.
    pub fn rearm(&mut self) {
        self.dormant = false;
    }

    /// Record the panel opening or closing. Opening triggers a fresh
    /// page-1 fetch plus a counter refresh.
    pub fn set_panel_open(&mut self, open: bool) -> Vec<ApiCall> {
        self.panel_open = open;

        if !open || self.dormant {
            return vec![];
        }

        vec![
            ApiCall::FetchNotificationsPage { page: 1, limit: self.page_size },
            ApiCall::FetchUnreadCount,
        ]
    }

    /// A live push arrived (chat, meeting invite, appointment invite).
    ///
    /// Bumps the unread counter optimistically and refreshes it eagerly
    /// from the server regardless of panel state. Only while the panel is
    /// open does it also refetch page 1 — no notification object is ever
    /// synthesized locally.
    pub fn on_live_push(&mut self, _kind: LivePushKind) -> Vec<ApiCall> {
        if self.dormant {
            return vec![];
        }

        self.unread += 1;

        let mut calls = vec![ApiCall::FetchUnreadCount];
        if self.panel_open {
            calls.push(ApiCall::FetchNotificationsPage { page: 1, limit: self.page_size });
        }
        calls
    }

    /// Request a specific page.
    pub fn request_page(&self, page: u32) -> Vec<ApiCall> {
        if self.dormant {
            return vec![];
        }
        vec![ApiCall::FetchNotificationsPage { page: page.max(1), limit: self.page_size }]
    }

    /// Request that one notification be marked read (REST first).
    pub fn request_mark_read(&self, id: NotificationId) -> Vec<ApiCall> {
        if self.dormant {
            return vec![];
        }
        vec![ApiCall::MarkNotificationRead { id }]
    }

    /// Request that every notification be marked read (REST first).
    pub fn request_mark_all_read(&self) -> Vec<ApiCall> {
        if self.dormant {
            return vec![];
        }
        vec![ApiCall::MarkAllNotificationsRead]
    }

    /// Request that one notification be deleted (REST first).
    pub fn request_delete(&self, id: NotificationId) -> Vec<ApiCall> {
        if self.dormant {
            return vec![];
        }
        vec![ApiCall::DeleteNotification { id }]
    }

    /// Install a fetched page.
    ///
    /// Page 1 replaces the loaded window (it is the canonical freshest
    /// view); deeper pages merge in, deduplicated by id with the server's
    /// copy winning. Items stay newest first.
    pub fn page_loaded(&mut self, page: NotificationPage) {
        let incoming: Vec<NotificationItem> =
            page.items.into_iter().map(NotificationItem::from).collect();

        if page.current_page <= 1 {
            self.items = incoming;
        } else {
            for item in incoming {
                if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
                    *existing = item;
                } else {
                    self.items.push(item);
                }
            }
        }

        self.items.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
        self.current_page = page.current_page.max(1);
        self.total_pages = page.total_pages.max(1);
    }

    /// Install a fetched unread count (server snapshot wins over the
    /// optimistic local bump).
    pub fn unread_loaded(&mut self, count: u64) {
        self.unread = count;
    }

    /// The server confirmed one notification as read.
    pub fn mark_read_completed(&mut self, id: &NotificationId) {
        if let Some(item) = self.items.iter_mut().find(|i| &i.id == id)
            && !item.read
        {
            item.read = true;
            self.unread = self.unread.saturating_sub(1);
        }
    }

    /// The server confirmed every notification as read.
    pub fn mark_all_completed(&mut self) {
        for item in &mut self.items {
            item.read = true;
        }
        self.unread = 0;
    }

    /// The server confirmed one notification as deleted.
    pub fn delete_completed(&mut self, id: &NotificationId) {
        if let Some(index) = self.items.iter().position(|i| &i.id == id) {
            let removed = self.items.remove(index);
            if !removed.read {
                self.unread = self.unread.saturating_sub(1);
            }
        }
    }
}
