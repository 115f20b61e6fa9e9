// Public modules
pub mod agent;
pub mod chat;
pub mod turn;

// Re-exports
pub use agent::{
    AgentCatalog, AgentInfo, AgentProfile, AgentView, DEFAULT_AGENT, GENERIC_ICON,
    format_agent_name,
};
pub use chat::{AgentListResponse, ChatRequest, ChatResponse};
pub use turn::{ERROR_AGENT, HistoryItem, Role, Turn, TurnContent};
