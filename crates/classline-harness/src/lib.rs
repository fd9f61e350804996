//! Deterministic simulation harness for Classline testing.
//!
//! In-process doubles for everything outside the client: a virtual-clock
//! seeded [`SimEnv`], an in-memory REST collaborator ([`SimBackend`]) with
//! scriptable failures, and a socket-server double ([`SimHub`]) that routes
//! envelopes between room participants. Same seed, same run — scenario
//! tests drive real clients end-to-end without any I/O.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod sim_backend;
pub mod sim_env;
pub mod sim_hub;

pub use sim_backend::SimBackend;
pub use sim_env::{SimEnv, SimInstant};
pub use sim_hub::SimHub;
