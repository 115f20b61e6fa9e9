//! The seam between the session controller and the chat API.

use crate::error::Result;
use crate::types::{AgentInfo, ChatRequest, ChatResponse};

/// Operations the session controller needs from a chat backend.
///
/// [`HubClient`](crate::HubClient) implements this over HTTP; tests supply
/// in-memory fakes.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Returns the agents the backend offers.
    async fn list_agents(&self) -> Result<Vec<AgentInfo>>;

    /// Sends one conversation turn and returns the backend's reply.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Asks the backend to forget a session.
    async fn delete_session(&self, session_id: &str) -> Result<()>;
}
