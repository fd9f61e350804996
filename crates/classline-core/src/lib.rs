//! Classline protocol core.
//!
//! The shared foundations of the real-time layer: the [`env::Environment`]
//! abstraction that keeps state machines free of system resources, the
//! connection-level error taxonomy, and the [`connection::Connection`]
//! lifecycle state machine that owns the single live transport for the whole
//! client process.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod connection;
pub mod env;
pub mod error;

pub use connection::{
    BackoffConfig, Connection, ConnectionAction, ConnectionConfig, LinkState,
};
pub use env::Environment;
pub use error::ConnectionError;
