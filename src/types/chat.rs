use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::types::{AgentInfo, HistoryItem};

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    /// Agent that should handle this turn.
    pub agent_name: String,

    /// The user's message.
    pub message: String,

    /// Every turn accepted so far, excluding `message`.
    pub history: Vec<HistoryItem>,

    /// Server-assigned session, or `null` for a new conversation.
    pub session_id: Option<String>,
}

/// Successful body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    /// Session the exchange belongs to.
    pub session_id: String,

    /// The server's canonical history after the exchange.
    pub history: Vec<HistoryItem>,

    /// The assistant's reply.
    pub response: String,

    /// The agent that produced the reply.
    pub agent: String,
}

/// Body of `GET /api/agents`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentListResponse {
    /// Agent key to description, in server order.
    pub agents: Map<String, Value>,
}

impl AgentListResponse {
    /// Converts the mapping into registry entries, preserving order.
    pub fn into_agents(self) -> Result<Vec<AgentInfo>> {
        self.agents
            .into_iter()
            .map(|(name, description)| match description {
                Value::String(description) => Ok(AgentInfo { name, description }),
                other => Err(Error::serialization(
                    format!("agent {name} has a non-string description: {other}"),
                    None,
                )),
            })
            .collect()
    }
}
