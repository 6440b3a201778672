//! Chat client module for conversations with a stateless relay.
//!
//! The relay remembers nothing between calls, so the client carries the
//! conversation: every turn is recorded locally and, under the stateful
//! protocol, replayed in full on each request.
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: the `ChatClient` state machine and its history
//! - [`view`]: the rendering seam and a plain-text terminal view
//! - [`commands`]: slash command parsing for the REPL

mod commands;
mod config;
mod session;
mod view;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use session::{ChatClient, SessionState, SessionStats, TurnOutcome};
pub use view::{ChatView, PlainTextView};
