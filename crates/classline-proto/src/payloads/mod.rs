//! Payload types carried inside the socket envelope.
//!
//! Grouped by concern: chat traffic, meeting/appointment coordination, and
//! session management. Field names follow the backend's camelCase JSON.

pub mod chat;
pub mod meeting;
pub mod session;
