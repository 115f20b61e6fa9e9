//! Core chat session management.
//!
//! This module provides the `ChatSession` controller, which owns the client's
//! view of a conversation and keeps it in step with the backend.  All state
//! changes happen on the caller's task; the only concurrency is the
//! best-effort session deletion spawned by [`ChatSession::clear_session`].

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::backend::ChatBackend;
use crate::chat::config::ChatConfig;
use crate::error::Result;
use crate::observability::{
    CHAT_AGENT_SWITCHES, CHAT_DISCARDED, CHAT_FAILURES, CHAT_REJECTED, CHAT_SENDS,
    REGISTRY_FALLBACKS, SESSION_CLEARS, SESSION_DELETE_ERRORS,
};
use crate::render::Renderer;
use crate::types::{
    AgentCatalog, AgentInfo, AgentView, ChatRequest, ChatResponse, HistoryItem, Role, Turn,
};

/// Counters describing the conversation so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Number of successful assistant replies.
    pub message_count: u64,
    /// Number of replies that came from a different agent than the one before.
    pub agent_switches: u64,
    /// The agent that produced the most recent reply.
    pub last_agent: Option<String>,
}

impl SessionStats {
    /// Records a reply from `agent`; returns true if it counted as a switch.
    fn record_reply(&mut self, agent: &str) -> bool {
        let switched = self
            .last_agent
            .as_deref()
            .is_some_and(|last| last != agent);
        if switched {
            self.agent_switches += 1;
        }
        self.last_agent = Some(agent.to_string());
        self.message_count += 1;
        switched
    }
}

/// Where the agent registry came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AgentSource {
    /// The backend's agent list.
    Backend,
    /// The catalog's built-in list, used because the backend's failed.
    Fallback,
}

/// The two states of the controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ControllerState {
    /// Accepting input.
    Idle,
    /// A chat request is outstanding; sends are rejected.
    AwaitingResponse,
}

/// Why a message was not sent.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The message was empty after trimming.
    Empty,
    /// Another chat request is still in flight.
    Busy,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Empty => write!(f, "message is empty"),
            Rejection::Busy => write!(f, "still waiting for the previous reply"),
        }
    }
}

/// What became of a call to [`ChatSession::send_message`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing was sent.
    Rejected(Rejection),
    /// The backend replied and the session was updated.
    Replied,
    /// The request failed; an error turn was shown.
    Failed,
    /// The reply arrived after the session was cleared and was dropped.
    Discarded,
}

/// A chat request that has been started but not completed.
///
/// Produced by [`ChatSession::begin_send`] and consumed by
/// [`ChatSession::complete_send`].
#[derive(Debug)]
pub struct PendingSend {
    request: ChatRequest,
    generation: u64,
}

impl PendingSend {
    /// The request to deliver to the backend.
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }
}

/// The server-side cleanup started by [`ChatSession::clear_session`].
///
/// Dropping it leaves the deletion running in the background.
#[derive(Debug)]
pub struct Cleanup {
    session_id: Option<String>,
    task: Option<JoinHandle<()>>,
}

impl Cleanup {
    fn none() -> Self {
        Self {
            session_id: None,
            task: None,
        }
    }

    /// The session whose deletion was requested, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Waits for the deletion request to finish.  Its result is ignored.
    pub async fn wait(self) {
        if let Some(task) = self.task {
            let _ = task.await;
        }
    }
}

/// The conversation session controller.
///
/// The session tracks the agent registry, the selected agent, the server's
/// canonical history and session id, the transcript of turns that have been
/// shown, and the session statistics.  Every change is pushed to the
/// renderer.
pub struct ChatSession<B: ChatBackend + 'static, R: Renderer> {
    backend: Arc<B>,
    renderer: R,
    catalog: AgentCatalog,
    registry: Vec<AgentInfo>,
    current_agent: String,
    session_id: Option<String>,
    history: Vec<HistoryItem>,
    transcript: Vec<Turn>,
    stats: SessionStats,
    in_flight: bool,
    generation: u64,
    discard_stale_responses: bool,
}

impl<B: ChatBackend + 'static, R: Renderer> ChatSession<B, R> {
    /// Creates a new chat session with the given backend, renderer and
    /// configuration.
    pub fn new(backend: B, renderer: R, config: &ChatConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            renderer,
            current_agent: config.catalog.default_agent().to_string(),
            catalog: config.catalog.clone(),
            registry: Vec::new(),
            session_id: None,
            history: Vec::new(),
            transcript: Vec::new(),
            stats: SessionStats::default(),
            in_flight: false,
            generation: 0,
            discard_stale_responses: config.discard_stale_responses,
        }
    }

    /// Loads the agent registry and draws the agent list and mode banner.
    ///
    /// Any failure falls back to the catalog's built-in list.  The failure is
    /// logged and never reported to the user.
    pub async fn load_agents(&mut self) -> AgentSource {
        let source = match self.backend.list_agents().await {
            Ok(agents) => {
                debug!(count = agents.len(), "loaded agent registry");
                self.registry = agents;
                AgentSource::Backend
            }
            Err(err) => {
                REGISTRY_FALLBACKS.click();
                warn!(error = %err, "could not load agents; using built-in list");
                self.registry = self.catalog.fallback_registry();
                AgentSource::Fallback
            }
        };
        self.render_agents();
        source
    }

    /// Selects the agent for the next turn.
    ///
    /// Keys the registry does not list are accepted.
    pub fn select_agent(&mut self, name: &str) {
        self.current_agent = name.to_string();
        self.render_agents();
    }

    /// Sends a user message and applies the backend's reply.
    ///
    /// This method:
    /// 1. Ignores messages that are empty after trimming
    /// 2. Shows the user turn and a typing indicator immediately
    /// 3. Sends the turn together with the history accepted so far
    /// 4. Adopts the server's session id and history and shows the reply,
    ///    or shows an error turn if the request failed
    ///
    /// Failures never escape; they are reported through the returned
    /// [`SendOutcome`] and the renderer.
    pub async fn send_message(&mut self, text: &str) -> SendOutcome {
        let pending = match self.begin_send(text) {
            Ok(pending) => pending,
            Err(rejection) => return SendOutcome::Rejected(rejection),
        };
        let result = self.backend.chat(pending.request()).await;
        self.complete_send(pending, result)
    }

    /// First half of [`send_message`](Self::send_message): validates the
    /// message, shows it, and moves the controller to awaiting-response.
    pub fn begin_send(&mut self, text: &str) -> std::result::Result<PendingSend, Rejection> {
        let message = text.trim();
        if message.is_empty() {
            return Err(Rejection::Empty);
        }
        if self.in_flight {
            CHAT_REJECTED.click();
            return Err(Rejection::Busy);
        }
        CHAT_SENDS.click();

        let request = ChatRequest {
            agent_name: self.current_agent.clone(),
            message: message.to_string(),
            history: self.history.clone(),
            session_id: self.session_id.clone(),
        };
        self.show_turn(Turn::user(message));
        self.renderer.show_typing();
        self.in_flight = true;

        Ok(PendingSend {
            request,
            generation: self.generation,
        })
    }

    /// Second half of [`send_message`](Self::send_message): applies the
    /// backend's answer and returns the controller to idle.
    pub fn complete_send(
        &mut self,
        pending: PendingSend,
        result: Result<ChatResponse>,
    ) -> SendOutcome {
        self.in_flight = false;
        self.renderer.hide_typing();

        if pending.generation != self.generation && self.discard_stale_responses {
            CHAT_DISCARDED.click();
            debug!(
                ok = result.is_ok(),
                "dropping chat response for a cleared session"
            );
            return SendOutcome::Discarded;
        }

        match result {
            Ok(response) => {
                self.apply_response(response);
                SendOutcome::Replied
            }
            Err(err) => {
                CHAT_FAILURES.click();
                warn!(error = %err, agent = %pending.request.agent_name, "chat request failed");
                self.show_turn(Turn::error(&err));
                SendOutcome::Failed
            }
        }
    }

    /// Clears the conversation and asks the backend to forget the session.
    ///
    /// Local state is reset before the deletion is requested; the deletion
    /// runs in the background and its outcome never affects the session.
    pub fn clear_session(&mut self) -> Cleanup {
        SESSION_CLEARS.click();
        self.generation += 1;
        self.history.clear();
        self.transcript.clear();
        self.stats = SessionStats::default();
        let session_id = self.session_id.take();

        let views = self.agent_views();
        self.renderer.render_welcome(&views);
        self.renderer.render_stats(&self.stats);

        match session_id {
            Some(session_id) => delete_in_background(Arc::clone(&self.backend), session_id),
            None => Cleanup::none(),
        }
    }

    /// Returns the key of the agent that will receive the next turn.
    pub fn current_agent(&self) -> &str {
        &self.current_agent
    }

    /// Returns the server-assigned session id, if a session exists.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Returns the server's canonical history.
    pub fn history(&self) -> &[HistoryItem] {
        &self.history
    }

    /// Returns every turn shown so far, including error turns.
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Returns the current session statistics.
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Returns the loaded agent registry.
    pub fn agents(&self) -> &[AgentInfo] {
        &self.registry
    }

    /// Returns the agent catalog.
    pub fn catalog(&self) -> &AgentCatalog {
        &self.catalog
    }

    /// Returns whether the controller is idle or awaiting a response.
    pub fn state(&self) -> ControllerState {
        if self.in_flight {
            ControllerState::AwaitingResponse
        } else {
            ControllerState::Idle
        }
    }

    /// Returns the renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Returns the renderer for direct output.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Returns the views of all listed agents, in registry order.
    ///
    /// Before the registry is loaded, or if it is empty, the catalog's agents
    /// are listed instead.
    pub fn agent_views(&self) -> Vec<AgentView> {
        if self.registry.is_empty() {
            self.catalog
                .keys()
                .map(|key| AgentView::new(key, &self.catalog, None))
                .collect()
        } else {
            self.registry
                .iter()
                .map(|agent| {
                    AgentView::new(&agent.name, &self.catalog, Some(&agent.description))
                })
                .collect()
        }
    }

    /// Returns the view of an arbitrary agent key.
    pub fn agent_view(&self, key: &str) -> AgentView {
        let description = self
            .registry
            .iter()
            .find(|agent| agent.name == key)
            .map(|agent| agent.description.as_str());
        AgentView::new(key, &self.catalog, description)
    }

    fn apply_response(&mut self, response: ChatResponse) {
        let ChatResponse {
            session_id,
            history,
            response,
            agent,
        } = response;
        self.session_id = Some(session_id);
        self.history = history;
        if self.stats.record_reply(&agent) {
            CHAT_AGENT_SWITCHES.click();
        }
        self.show_turn(Turn::assistant(response, agent));
        self.renderer.render_stats(&self.stats);
    }

    fn show_turn(&mut self, turn: Turn) {
        let view = match (&turn.role, &turn.agent) {
            (Role::Assistant, Some(agent)) if !turn.is_error() => Some(self.agent_view(agent)),
            _ => None,
        };
        self.renderer.render_turn(&turn, view.as_ref());
        self.transcript.push(turn);
    }

    fn render_agents(&mut self) {
        let views = self.agent_views();
        let current = self.agent_view(&self.current_agent);
        self.renderer.render_agent_list(&views, &self.current_agent);
        self.renderer.render_mode(&current);
    }
}

fn delete_in_background<B: ChatBackend + 'static>(backend: Arc<B>, session_id: String) -> Cleanup {
    let handle = match Handle::try_current() {
        Ok(handle) => handle,
        Err(_) => {
            warn!(session_id = %session_id, "no async runtime; session left on the server");
            return Cleanup {
                session_id: Some(session_id),
                task: None,
            };
        }
    };
    let id = session_id.clone();
    let task = handle.spawn(async move {
        if let Err(err) = backend.delete_session(&id).await {
            SESSION_DELETE_ERRORS.click();
            debug!(session_id = %id, error = %err, "session delete failed");
        }
    });
    Cleanup {
        session_id: Some(session_id),
        task: Some(task),
    }
}
