//! Meeting and appointment payloads.
//!
//! Invitations travel over the live connection so the counterpart sees them
//! without polling; reminders are pushed by the server at fixed lead times
//! before a scheduled meeting. The client never computes reminder timing
//! itself — it only renders what the server decided was due.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{MeetingId, RoomId, UserId};

/// Invitation to a live video meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingInvitation {
    /// Room (offer) the meeting belongs to.
    pub room_id: RoomId,
    /// Stable id of the inviter.
    pub sender_id: UserId,
    /// Display name of the inviter.
    pub sender: String,
    /// Meeting subject line.
    pub subject: String,
    /// Scheduled start, Unix milliseconds (UTC).
    pub starts_at_ms: u64,
    /// URL to join the meeting.
    pub meeting_url: String,
}

/// Invitation to an in-person or scheduled appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentInvitation {
    /// Room (offer) the appointment belongs to.
    pub room_id: RoomId,
    /// Stable id of the inviter.
    pub sender_id: UserId,
    /// Display name of the inviter.
    pub sender: String,
    /// Appointment subject line.
    pub subject: String,
    /// Scheduled start, Unix milliseconds (UTC).
    pub starts_at_ms: u64,
}

/// Fixed lead-time checkpoints at which the server pushes meeting reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReminderStage {
    /// 15 minutes before the meeting.
    #[serde(rename = "15-minute")]
    T15,
    /// 10 minutes before the meeting.
    #[serde(rename = "10-minute")]
    T10,
    /// 5 minutes before the meeting.
    #[serde(rename = "5-minute")]
    T5,
    /// 2 minutes before the meeting.
    #[serde(rename = "2-minute")]
    T2,
}

impl ReminderStage {
    /// Lead time of this stage in minutes.
    pub fn minutes(self) -> u32 {
        match self {
            Self::T15 => 15,
            Self::T10 => 10,
            Self::T5 => 5,
            Self::T2 => 2,
        }
    }

    /// Whether this stage warrants the attention-grabbing presentation.
    ///
    /// Urgency is derived from the stage, not read off the wire: the 5- and
    /// 2-minute checkpoints are urgent, the earlier ones are not.
    pub fn is_urgent(self) -> bool {
        matches!(self, Self::T5 | Self::T2)
    }

    /// Canonical wire name of the stage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::T15 => "15-minute",
            Self::T10 => "10-minute",
            Self::T5 => "5-minute",
            Self::T2 => "2-minute",
        }
    }
}

impl fmt::Display for ReminderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-pushed reminder for an upcoming meeting.
///
/// `is_urgent` duplicates what [`ReminderStage::is_urgent`] derives; it is
/// accepted for compatibility with the backend payload but receivers trust
/// the stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPush {
    /// Meeting this reminder is for.
    pub meeting_id: MeetingId,
    /// Lead-time checkpoint that fired.
    pub stage: ReminderStage,
    /// Minutes remaining until the meeting starts.
    pub minutes_until_meeting: u32,
    /// Server-computed urgency flag (receivers re-derive from `stage`).
    pub is_urgent: bool,
    /// Meeting subject line.
    pub subject: String,
    /// Room (offer) the meeting belongs to.
    pub room_id: RoomId,
    /// URL to join the meeting.
    pub meeting_url: String,
}
