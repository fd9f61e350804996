//! In-memory REST backend double.
//!
//! Implements the backend API contract over plain data structures:
//! message history and create with server-assigned ids and timestamps, a
//! notification store with pagination and unread counting, and scriptable
//! failure injection (`fail_next`, expired sessions).

use std::collections::HashMap;

use classline_client::{ApiCall, ApiError, ApiOutcome};
use classline_proto::{
    NotificationId, NotificationPage, RoomId, UserId, WireMessage, WireNotification,
};

use crate::sim_env::SIM_EPOCH_MS;

/// In-memory REST collaborator for one authenticated session.
pub struct SimBackend {
    /// The user this session belongs to (the server knows the sender).
    session_user: UserId,
    /// Message history per room, in creation order.
    messages: HashMap<RoomId, Vec<WireMessage>>,
    /// Notification store, unordered.
    notifications: Vec<WireNotification>,
    /// Server-assigned message id counter.
    next_message_id: u64,
    /// Server clock, strictly increasing per create.
    server_clock_ms: u64,
    /// When set, every call answers 401.
    auth_expired: bool,
    /// One-shot injected failure for the next call.
    fail_next: Option<ApiError>,
}

impl SimBackend {
    /// Create a backend for an authenticated session.
    pub fn new(session_user: UserId) -> Self {
        Self {
            session_user,
            messages: HashMap::new(),
            notifications: Vec::new(),
            next_message_id: 0,
            server_clock_ms: SIM_EPOCH_MS,
            auth_expired: false,
            fail_next: None,
        }
    }

    /// Make every subsequent call answer 401.
    pub fn expire_auth(&mut self) {
        self.auth_expired = true;
    }

    /// Restore the session.
    pub fn restore_auth(&mut self) {
        self.auth_expired = false;
    }

    /// Fail the next call with the given error.
    pub fn fail_next(&mut self, error: ApiError) {
        self.fail_next = Some(error);
    }

    /// Seed a notification into the store.
    pub fn seed_notification(&mut self, notification: WireNotification) {
        self.notifications.push(notification);
    }

    /// Seed a message into a room's history.
    pub fn seed_message(&mut self, room_id: RoomId, message: WireMessage) {
        self.messages.entry(room_id).or_default().push(message);
    }

    /// Messages stored for a room.
    pub fn history(&self, room_id: &RoomId) -> &[WireMessage] {
        self.messages.get(room_id).map_or(&[], Vec::as_slice)
    }

    /// Server-side unread count.
    pub fn unread_count(&self) -> u64 {
        self.notifications.iter().filter(|n| !n.read).count() as u64
    }

    /// Execute a REST call, returning the outcome the client will consume.
    pub fn execute(&mut self, call: ApiCall) -> ApiOutcome {
        let error = if self.auth_expired {
            Some(ApiError::AuthRequired)
        } else {
            self.fail_next.take()
        };

        match call {
            ApiCall::FetchHistory { room_id } => {
                let result = match error {
                    Some(error) => Err(error),
                    None => {
                        let mut history =
                            self.messages.get(&room_id).cloned().unwrap_or_default();
                        history.sort_by_key(|m| m.sent_at_ms);
                        Ok(history)
                    },
                };
                ApiOutcome::History { room_id, result }
            },
            ApiCall::CreateMessage { nonce, request } => {
                let room_id = request.room_id.clone();
                let result = match error {
                    Some(error) => Err(error),
                    None => {
                        self.next_message_id += 1;
                        self.server_clock_ms += 1;
                        let message = WireMessage {
                            id: format!("srv-{}", self.next_message_id),
                            sender_id: self.session_user.clone(),
                            receiver_id: request.receiver_id,
                            body: request.body,
                            encrypted: request.encrypted,
                            sent_at_ms: self.server_clock_ms,
                        };
                        self.messages.entry(room_id.clone()).or_default().push(message.clone());
                        Ok(message)
                    },
                };
                ApiOutcome::MessageCreated { room_id, nonce, result }
            },
            ApiCall::FetchNotificationsPage { page, limit } => {
                let result = match error {
                    Some(error) => Err(error),
                    None => Ok(self.page(page, limit)),
                };
                ApiOutcome::NotificationsPage { result }
            },
            ApiCall::FetchUnreadCount => {
                let result = match error {
                    Some(error) => Err(error),
                    None => Ok(self.unread_count()),
                };
                ApiOutcome::UnreadCount { result }
            },
            ApiCall::MarkNotificationRead { id } => {
                let result = match error {
                    Some(error) => Err(error),
                    None => match self.notifications.iter_mut().find(|n| n.id == id) {
                        Some(notification) => {
                            notification.read = true;
                            Ok(())
                        },
                        None => Err(ApiError::NotFound),
                    },
                };
                ApiOutcome::NotificationMarkedRead { id, result }
            },
            ApiCall::MarkAllNotificationsRead => {
                let result = match error {
                    Some(error) => Err(error),
                    None => {
                        for notification in &mut self.notifications {
                            notification.read = true;
                        }
                        Ok(())
                    },
                };
                ApiOutcome::AllNotificationsMarkedRead { result }
            },
            ApiCall::DeleteNotification { id } => {
                let result = match error {
                    Some(error) => Err(error),
                    None => {
                        let before = self.notifications.len();
                        self.notifications.retain(|n| n.id != id);
                        if self.notifications.len() == before {
                            Err(ApiError::NotFound)
                        } else {
                            Ok(())
                        }
                    },
                };
                ApiOutcome::NotificationDeleted { id, result }
            },
        }
    }

    fn page(&self, page: u32, limit: u32) -> NotificationPage {
        let mut sorted = self.notifications.clone();
        sorted.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));

        let limit = limit.max(1) as usize;
        let page = page.max(1);
        let total_pages = (sorted.len().div_ceil(limit)).max(1) as u32;

        let start = (page as usize - 1) * limit;
        let items = sorted.into_iter().skip(start).take(limit).collect();

        NotificationPage { items, current_page: page, total_pages }
    }
}

/// Helper for tests: a notification with the given id and timestamp.
pub fn notification(id: &str, created_at_ms: u64, read: bool) -> WireNotification {
    WireNotification {
        id: NotificationId::new(id),
        kind: classline_proto::NotificationKind::Generic,
        read,
        created_at_ms,
        sender_id: UserId::new("system"),
        sender_name: "System".to_string(),
        action_url: None,
    }
}
