use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Agent tag carried by synthetic turns that report a failed request.
pub const ERROR_AGENT: &str = "error";

/// Author of a conversation turn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Turn typed by the person at the keyboard.
    User,

    /// Turn produced by a backend agent.
    Assistant,
}

/// The content of a turn: plain text, or the list of content parts some
/// backends store for assistant output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TurnContent {
    /// A simple string content.
    Text(String),

    /// Structured content parts, kept as the server sent them.
    Parts(Vec<Value>),
}

impl TurnContent {
    /// Returns the displayable text of this content.
    ///
    /// Parts contribute their `text` field, joined by newlines; parts
    /// without one are skipped.
    pub fn text(&self) -> String {
        match self {
            TurnContent::Text(text) => text.clone(),
            TurnContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl From<&str> for TurnContent {
    fn from(content: &str) -> Self {
        TurnContent::Text(content.to_string())
    }
}

impl From<String> for TurnContent {
    fn from(content: String) -> Self {
        TurnContent::Text(content)
    }
}

/// One message in the conversation.
///
/// Fields the client does not know about are preserved in `extra` so that a
/// history echoed by the server serializes back exactly as it arrived.  An
/// explicit `"agent": null` is kept in `extra` as well.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "WireTurn", into = "WireTurn")]
pub struct Turn {
    /// Who authored the turn.
    pub role: Role,

    /// What was said.
    pub content: TurnContent,

    /// The agent that produced the turn; assistant turns only.
    pub agent: Option<String>,

    /// Additional server-defined fields.
    pub extra: Map<String, Value>,
}

/// Serialized form of [`Turn`]; distinguishes a null `agent` from a missing one.
#[derive(Serialize, Deserialize)]
struct WireTurn {
    role: Role,
    content: TurnContent,
    #[serde(
        default,
        deserialize_with = "present_agent",
        skip_serializing_if = "Option::is_none"
    )]
    agent: Option<Option<String>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn present_agent<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl From<WireTurn> for Turn {
    fn from(wire: WireTurn) -> Self {
        let mut extra = wire.extra;
        let agent = match wire.agent {
            Some(Some(agent)) => Some(agent),
            Some(None) => {
                extra.insert("agent".to_string(), Value::Null);
                None
            }
            None => None,
        };
        Self {
            role: wire.role,
            content: wire.content,
            agent,
            extra,
        }
    }
}

impl From<Turn> for WireTurn {
    fn from(turn: Turn) -> Self {
        let mut extra = turn.extra;
        let agent = match turn.agent {
            Some(agent) => {
                extra.remove("agent");
                Some(Some(agent))
            }
            None => None,
        };
        Self {
            role: turn.role,
            content: turn.content,
            agent,
            extra,
        }
    }
}

impl Turn {
    /// Create a new turn with the given role and content.
    pub fn new(role: Role, content: impl Into<TurnContent>, agent: Option<String>) -> Self {
        Self {
            role,
            content: content.into(),
            agent,
            extra: Map::new(),
        }
    }

    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, TurnContent::Text(content.into()), None)
    }

    /// Create an assistant turn attributed to `agent`.
    pub fn assistant(content: impl Into<String>, agent: impl Into<String>) -> Self {
        Self::new(
            Role::Assistant,
            TurnContent::Text(content.into()),
            Some(agent.into()),
        )
    }

    /// Create the synthetic assistant turn shown when a chat request fails.
    pub fn error(message: impl fmt::Display) -> Self {
        Self::assistant(
            format!("Error: Could not connect to the server. {message}"),
            ERROR_AGENT,
        )
    }

    /// Returns true if this is a synthetic error turn.
    pub fn is_error(&self) -> bool {
        self.role == Role::Assistant && self.agent.as_deref() == Some(ERROR_AGENT)
    }

    /// Returns the displayable text of the turn.
    pub fn text(&self) -> String {
        self.content.text()
    }
}

/// One entry of the server's canonical history.
///
/// Backends may interleave items that are not messages (tool calls,
/// handoffs); those are carried opaquely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum HistoryItem {
    /// A user or assistant message.
    Turn(Turn),

    /// Any other item, kept verbatim.
    Other(Map<String, Value>),
}

impl HistoryItem {
    /// Returns the message if this item is one.
    pub fn as_turn(&self) -> Option<&Turn> {
        match self {
            HistoryItem::Turn(turn) => Some(turn),
            HistoryItem::Other(_) => None,
        }
    }
}

impl From<Turn> for HistoryItem {
    fn from(turn: Turn) -> Self {
        HistoryItem::Turn(turn)
    }
}
