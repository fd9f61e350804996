//! Staged meeting-reminder dispatcher.
//!
//! Consumes server-pushed reminder events for upcoming meetings. The server
//! alone decides when a stage is due; this module's job is presentation
//! discipline: a stage that has been shown once for a meeting is never shown
//! again, urgent stages (5- and 2-minute) get a longer display window and
//! the repeated high-pitch tone, and `join` opens the meeting URL exactly
//! once.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Sub;
use std::time::Duration;

use classline_proto::{
    MeetingId, RoomId,
    payloads::meeting::{ReminderPush, ReminderStage},
};

/// Display window for non-urgent reminder stages.
pub const STANDARD_DISPLAY: Duration = Duration::from_secs(12);

/// Display window for urgent reminder stages.
pub const URGENT_DISPLAY: Duration = Duration::from_secs(45);

/// Identity of one displayed reminder: the `(meeting, stage)` pair in its
/// canonical `"{meeting_id}:{stage}"` rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReminderId(String);

impl ReminderId {
    /// Build the id for a meeting/stage pair.
    pub fn for_stage(meeting_id: &MeetingId, stage: ReminderStage) -> Self {
        Self(format!("{meeting_id}:{stage}"))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reminder currently presented to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveReminder {
    /// Display identity (`meeting_id` + stage).
    pub id: ReminderId,
    /// Meeting this reminder is for.
    pub meeting_id: MeetingId,
    /// Lead-time checkpoint that fired.
    pub stage: ReminderStage,
    /// Minutes remaining until the meeting starts.
    pub minutes_until_meeting: u32,
    /// Meeting subject line.
    pub subject: String,
    /// Room (offer) the meeting belongs to.
    pub room_id: RoomId,
    /// URL to join the meeting.
    pub meeting_url: String,
    /// Whether this reminder uses the attention-grabbing presentation.
    pub urgent: bool,
}

/// Side effects the dispatcher asks the runtime to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderAction {
    /// Play the reminder tone.
    Alert {
        /// Higher pitch and longer display for urgent stages.
        urgent: bool,
        /// Repeat the tone while the reminder is displayed.
        repeat: bool,
    },

    /// Open the meeting URL (join flow).
    OpenMeeting {
        /// URL to open.
        url: String,
    },
}

/// The reminder dispatcher state machine.
///
/// # Invariants
///
/// - `(meeting_id, stage)` pairs that have fired are remembered for the
///   process lifetime; replays are refused even after dismissal.
/// - At most one active reminder exists per `(meeting_id, stage)`.
#[derive(Debug, Clone)]
pub struct ReminderDispatcher<I> {
    /// Active reminders with the instant they were raised.
    active: Vec<(ActiveReminder, I)>,
    /// Stages already shown, per meeting.
    fired: HashMap<MeetingId, HashSet<ReminderStage>>,
}

impl<I> ReminderDispatcher<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self { active: Vec::new(), fired: HashMap::new() }
    }

    /// Reminders currently presented, oldest first.
    pub fn active(&self) -> impl Iterator<Item = &ActiveReminder> {
        self.active.iter().map(|(reminder, _)| reminder)
    }

    /// Number of reminders currently presented.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Whether a stage has already been shown for a meeting.
    pub fn has_fired(&self, meeting_id: &MeetingId, stage: ReminderStage) -> bool {
        self.fired.get(meeting_id).is_some_and(|stages| stages.contains(&stage))
    }

    /// Handle a server-pushed reminder event.
    ///
    /// Refused (no action, nothing displayed) when this `(meeting, stage)`
    /// pair has fired before. Urgency is derived from the stage; the wire
    /// flag is ignored.
    pub fn handle_push(&mut self, push: ReminderPush, now: I) -> Vec<ReminderAction> {
        if self.has_fired(&push.meeting_id, push.stage) {
            return vec![];
        }

        self.fired.entry(push.meeting_id.clone()).or_default().insert(push.stage);

        let urgent = push.stage.is_urgent();
        let reminder = ActiveReminder {
            id: ReminderId::for_stage(&push.meeting_id, push.stage),
            meeting_id: push.meeting_id,
            stage: push.stage,
            minutes_until_meeting: push.minutes_until_meeting,
            subject: push.subject,
            room_id: push.room_id,
            meeting_url: push.meeting_url,
            urgent,
        };

        self.active.push((reminder, now));
        vec![ReminderAction::Alert { urgent, repeat: urgent }]
    }

    /// Dismiss a displayed reminder. Returns whether one was removed.
    ///
    /// The fired record survives dismissal — the same stage will not come
    /// back even if the server replays it.
    pub fn dismiss(&mut self, id: &ReminderId) -> bool {
        let before = self.active.len();
        self.active.retain(|(reminder, _)| &reminder.id != id);
        self.active.len() != before
    }

    /// Join the meeting behind a displayed reminder.
    ///
    /// Removes the reminder and opens the meeting URL — exactly once; a
    /// second join on the same id is a no-op.
    pub fn join(&mut self, id: &ReminderId) -> Vec<ReminderAction> {
        let Some(index) = self.active.iter().position(|(reminder, _)| &reminder.id == id) else {
            return vec![];
        };

        let (reminder, _) = self.active.remove(index);
        vec![ReminderAction::OpenMeeting { url: reminder.meeting_url }]
    }

    /// Expire reminders past their display window. Returns whether the
    /// active set changed.
    pub fn tick(&mut self, now: I) -> bool {
        let before = self.active.len();
        self.active.retain(|(reminder, raised_at)| {
            now - *raised_at <= Self::display_window(reminder.urgent)
        });
        self.active.len() != before
    }

    fn display_window(urgent: bool) -> Duration {
        if urgent { URGENT_DISPLAY } else { STANDARD_DISPLAY }
    }
}

impl<I> Default for ReminderDispatcher<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    fn default() -> Self {
        Self::new()
    }
}
