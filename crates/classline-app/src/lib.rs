//! Application layer for Classline.
//!
//! Pure state machines and a generic runtime for view and protocol
//! orchestration, enabling deterministic simulation testing with the same
//! code that runs in production.
//!
//! # Components
//!
//! - [`App`]: view-model state machine (connection health, conversation and
//!   inbox snapshots, active reminders, transient status)
//! - [`Bridge`]: protocol bridge (translates App actions to Client events
//!   and Client actions back to App events)
//! - [`Driver`]: trait for platform-specific I/O abstraction
//! - [`Runtime`]: generic orchestration loop using Driver
//! - [`SystemEnv`]: production environment (system clock, OS RNG)

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
mod driver;
mod event;
mod runtime;
mod state;
mod system_env;

pub use action::AppAction;
pub use app::App;
pub use bridge::{Bridge, TransportCommand};
pub use driver::{Driver, UiEffect};
pub use event::AppEvent;
pub use runtime::Runtime;
pub use state::{ConversationView, InboxView};
pub use system_env::SystemEnv;
