//! Classline client state machine.
//!
//! The sans-IO heart of the real-time layer. A single [`Client`] composes
//! the four core components:
//!
//! - [`conversation`]: per-room encrypted chat with optimistic echo and
//!   server reconciliation
//! - [`inbox`]: the unified notification aggregator
//! - [`reminders`]: the staged meeting-reminder dispatcher
//! - the connection lifecycle from `classline-core`
//!
//! The client consumes [`ClientEvent`] inputs (transport lifecycle, inbound
//! envelopes, view intents, REST completions, time ticks) and produces
//! [`ClientAction`] instructions for the embedding runtime to execute. It
//! performs no I/O itself; every suspension point in the surrounding
//! application is therefore a place where events interleave, and the client
//! re-validates applicability (is this room still open?) before applying any
//! delayed result.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod api;
mod client;
pub mod conversation;
mod error;
mod event;
pub mod inbox;
mod key_cache;
pub mod reminders;

pub use api::{ApiCall, ApiError, ApiOutcome};
pub use client::Client;
pub use conversation::{Conversation, Message, MessageId, MessageState, REDACTED_PLACEHOLDER};
pub use error::ClientError;
pub use event::{ClientAction, ClientEvent};
pub use inbox::{Inbox, LivePushKind, NotificationItem};
pub use key_cache::PairKeyCache;
pub use reminders::{ActiveReminder, ReminderDispatcher, ReminderId};
