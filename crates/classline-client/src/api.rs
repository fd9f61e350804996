//! Typed REST contract between the client and the backend API.
//!
//! The client never performs HTTP itself: it emits [`ApiCall`] actions, the
//! embedding runtime executes them with its own HTTP client (request-level
//! timeouts included), and feeds the [`ApiOutcome`] back in as an event.
//! Completions carry enough context (room id, client nonce, page) for the
//! client to re-validate applicability before applying them.

use classline_proto::{CreateMessageRequest, NotificationId, NotificationPage, RoomId, WireMessage};
use thiserror::Error;

/// A REST call the runtime must execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    /// Fetch the full message history of a room.
    FetchHistory {
        /// Room to fetch.
        room_id: RoomId,
    },

    /// Persist a new chat message.
    CreateMessage {
        /// Client nonce of the optimistic entry awaiting reconciliation.
        nonce: String,
        /// Create request body.
        request: CreateMessageRequest,
    },

    /// Fetch one page of the notification inbox, newest first.
    FetchNotificationsPage {
        /// 1-based page index.
        page: u32,
        /// Page size.
        limit: u32,
    },

    /// Fetch the unread notification count.
    FetchUnreadCount,

    /// Mark one notification as read.
    MarkNotificationRead {
        /// Notification to mark.
        id: NotificationId,
    },

    /// Mark every notification as read.
    MarkAllNotificationsRead,

    /// Delete one notification.
    DeleteNotification {
        /// Notification to delete.
        id: NotificationId,
    },
}

/// The result of an executed [`ApiCall`], fed back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome {
    /// Result of [`ApiCall::FetchHistory`].
    History {
        /// Room the history belongs to.
        room_id: RoomId,
        /// Messages in server order, or the failure.
        result: Result<Vec<WireMessage>, ApiError>,
    },

    /// Result of [`ApiCall::CreateMessage`].
    MessageCreated {
        /// Room the message belongs to.
        room_id: RoomId,
        /// Client nonce of the optimistic entry.
        nonce: String,
        /// The persisted message, or the failure.
        result: Result<WireMessage, ApiError>,
    },

    /// Result of [`ApiCall::FetchNotificationsPage`].
    NotificationsPage {
        /// The fetched page, or the failure.
        result: Result<NotificationPage, ApiError>,
    },

    /// Result of [`ApiCall::FetchUnreadCount`].
    UnreadCount {
        /// The count, or the failure.
        result: Result<u64, ApiError>,
    },

    /// Result of [`ApiCall::MarkNotificationRead`].
    NotificationMarkedRead {
        /// Notification that was marked.
        id: NotificationId,
        /// Success, or the failure.
        result: Result<(), ApiError>,
    },

    /// Result of [`ApiCall::MarkAllNotificationsRead`].
    AllNotificationsMarkedRead {
        /// Success, or the failure.
        result: Result<(), ApiError>,
    },

    /// Result of [`ApiCall::DeleteNotification`].
    NotificationDeleted {
        /// Notification that was deleted.
        id: NotificationId,
        /// Success, or the failure.
        result: Result<(), ApiError>,
    },
}

/// Failures of REST calls, as the client distinguishes them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 401 — no established session. The real-time layer goes dormant
    /// rather than erroring repeatedly.
    #[error("authentication required")]
    AuthRequired,

    /// Expected absence (e.g. no appointment yet exists for an offer).
    /// Treated as empty state, not an error.
    #[error("not found")]
    NotFound,

    /// The request never reached the backend.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The backend rejected the request.
    #[error("server error {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_log_friendly() {
        let err = ApiError::Server { status: 503, message: "maintenance".to_string() };
        assert_eq!(err.to_string(), "server error 503: maintenance");
    }
}
