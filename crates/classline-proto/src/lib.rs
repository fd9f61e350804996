//! Classline wire protocol.
//!
//! Defines the contract between the client core and its two backend
//! collaborators: the live socket server (event envelopes) and the REST API
//! (history, message create, notification pages).
//!
//! The live protocol is a tagged-union envelope: every event on the wire is a
//! JSON object `{"type": ..., "payload": ...}`. Dispatching on a closed enum
//! instead of raw event-name strings means an unhandled event is a compile
//! error, not a silently dropped callback.
//!
//! # Invariants
//!
//! - Each envelope variant maps to exactly one wire event name.
//! - Round-trip encoding must produce identical values.
//! - Unknown inbound event names decode to an error, never a panic.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod envelope;
mod ids;
pub mod payloads;
mod rest;

pub use envelope::{Envelope, EnvelopeError};
pub use ids::{MeetingId, NotificationId, RoomId, UserId};
pub use rest::{
    CreateMessageRequest, NotificationKind, NotificationPage, WireMessage, WireNotification,
};
