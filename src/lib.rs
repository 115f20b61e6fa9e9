//! Client library and terminal chat for a multi-agent chat API.
//!
//! The backend exposes three endpoints: the agent registry, a chat turn
//! endpoint, and session deletion.  [`HubClient`] speaks them over HTTP and
//! [`chat::ChatSession`] keeps the client-side conversation in step with
//! them.

pub mod backend;
pub mod chat;
pub mod client;
pub mod error;
pub mod observability;
pub mod render;
pub mod types;

pub use backend::ChatBackend;
pub use client::{DEFAULT_API_URL, HubClient, resolve_base_url};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use types::*;
