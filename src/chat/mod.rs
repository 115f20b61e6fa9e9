//! Interactive chat against a multi-agent backend.
//!
//! This module provides the conversation session controller and the pieces
//! the terminal client is built from:
//!
//! - Agent registry loading with a built-in fallback
//! - Optimistic display of user turns with a typing indicator
//! - At most one chat request in flight
//! - Session statistics and best-effort server-side session cleanup
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: The session controller and its state machine
//! - [`commands`]: Slash command parsing

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use session::{
    AgentSource, ChatSession, Cleanup, ControllerState, PendingSend, Rejection, SendOutcome,
    SessionStats,
};
