//! Session management payloads.

use serde::{Deserialize, Serialize};

use crate::ids::{RoomId, UserId};

/// Marketplace role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Learner account.
    Student,
    /// Instructor account.
    Teacher,
    /// Administrative account.
    Admin,
}

/// Announces the authenticated user on a freshly opened connection.
///
/// Sent exactly once per (re)connect, before any other outbound event. The
/// server uses it to associate the transport with the user for targeted
/// pushes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConnected {
    /// Stable id of the authenticated user.
    pub user_id: UserId,
    /// Display name of the authenticated user.
    pub user_name: String,
    /// Marketplace role of the authenticated user.
    pub user_role: UserRole,
}

/// Subscribes the connection to a room's broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoom {
    /// Room to subscribe to.
    pub room_id: RoomId,
}

/// Server notification that a user's role changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleChanged {
    /// User whose role changed.
    pub user_id: UserId,
    /// The new role.
    pub role: UserRole,
}
