//! Output rendering for the chat session.
//!
//! The session controller pushes its state to a [`Renderer`]; it never reads
//! anything back.  [`PlainTextRenderer`] draws to a terminal with optional
//! ANSI styling.

use std::io::{self, Stdout, Write};

use time::{OffsetDateTime, UtcOffset};
use time::macros::format_description;

use crate::chat::SessionStats;
use crate::types::{AgentView, Role, Turn};

/// ANSI escape code for dim text (used for timestamps and the typing line).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (used for the active agent).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for agent tags).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for the user's turns).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI sequence that returns to column zero and erases the line.
const ANSI_CLEAR_LINE: &str = "\r\x1b[2K";

const USER_ICON: &str = "👤";
const TYPING_ICON: &str = "💭";
const WELCOME_ICON: &str = "✨";

/// Trait for rendering chat state.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - Recording renderers in tests
pub trait Renderer: Send {
    /// Draw the selectable agents, marking `current`.
    fn render_agent_list(&mut self, agents: &[AgentView], current: &str);

    /// Draw the banner describing the agent that will receive the next turn.
    fn render_mode(&mut self, agent: &AgentView);

    /// Draw one conversation turn.
    ///
    /// `agent` is the producer of an assistant turn when it is a real agent;
    /// it is `None` for user turns and synthetic error turns.
    fn render_turn(&mut self, turn: &Turn, agent: Option<&AgentView>);

    /// Show the transient indicator while a reply is pending.
    fn show_typing(&mut self);

    /// Remove the typing indicator, if shown.
    fn hide_typing(&mut self);

    /// Draw the session counters.
    fn render_stats(&mut self, stats: &SessionStats);

    /// Reset the message surface to its welcome state.
    fn render_welcome(&mut self, agents: &[AgentView]);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
    show_timestamps: bool,
    utc_offset: UtcOffset,
    typing: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer on stdout with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer on stdout with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer that writes to `out`.
    ///
    /// Timestamps use the local offset if it can be determined now, UTC
    /// otherwise.  The offset cannot be read once other threads exist; see
    /// [`with_utc_offset`](Self::with_utc_offset).
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            show_timestamps: true,
            utc_offset: UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
            typing: false,
        }
    }

    /// Sets the offset timestamps are shown in.
    pub fn with_utc_offset(mut self, utc_offset: UtcOffset) -> Self {
        self.utc_offset = utc_offset;
        self
    }

    /// Sets whether turns carry an `HH:MM` timestamp.
    pub fn with_timestamps(mut self, show_timestamps: bool) -> Self {
        self.show_timestamps = show_timestamps;
        self
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
    }

    fn style(&self, code: &'static str) -> &'static str {
        if self.use_color { code } else { "" }
    }

    fn timestamp(&self) -> Option<String> {
        if !self.show_timestamps {
            return None;
        }
        self.clock(OffsetDateTime::now_utc())
    }

    fn clock(&self, at: OffsetDateTime) -> Option<String> {
        at.to_offset(self.utc_offset)
            .format(format_description!("[hour]:[minute]"))
            .ok()
    }

    fn clear_typing(&mut self) {
        if self.typing {
            if self.use_color {
                let _ = write!(self.out, "{ANSI_CLEAR_LINE}");
            } else {
                let _ = writeln!(self.out);
            }
            self.typing = false;
        }
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn render_agent_list(&mut self, agents: &[AgentView], current: &str) {
        self.clear_typing();
        let (bold, reset) = (self.style(ANSI_BOLD), self.style(ANSI_RESET));
        for agent in agents {
            let marker = if agent.key == current { ">" } else { " " };
            let label = if agent.key == current {
                format!("{bold}{}{reset}", agent.label)
            } else {
                agent.label.clone()
            };
            let _ = writeln!(
                self.out,
                "{marker} {} {label} ({}) {}",
                agent.icon, agent.key, agent.summary
            );
        }
        self.flush();
    }

    fn render_mode(&mut self, agent: &AgentView) {
        self.clear_typing();
        let (bold, reset) = (self.style(ANSI_BOLD), self.style(ANSI_RESET));
        if agent.description.is_empty() {
            let _ = writeln!(self.out, "{} {bold}{}{reset}", agent.icon, agent.label);
        } else {
            let _ = writeln!(
                self.out,
                "{} {bold}{}{reset} - {}",
                agent.icon, agent.label, agent.description
            );
        }
        self.flush();
    }

    fn render_turn(&mut self, turn: &Turn, agent: Option<&AgentView>) {
        self.clear_typing();
        let (dim, reset) = (self.style(ANSI_DIM), self.style(ANSI_RESET));
        let stamp = self
            .timestamp()
            .map(|t| format!(" {dim}{t}{reset}"))
            .unwrap_or_default();
        let header = match (turn.role, agent) {
            (Role::User, _) => {
                let green = self.style(ANSI_GREEN);
                format!("{USER_ICON} {green}You{reset}")
            }
            (Role::Assistant, _) if turn.is_error() => {
                let red = self.style(ANSI_RED);
                format!("{} {red}Error{reset}", crate::types::GENERIC_ICON)
            }
            (Role::Assistant, Some(agent)) => {
                let cyan = self.style(ANSI_CYAN);
                format!("{} {cyan}{}{reset}", agent.icon, agent.label)
            }
            (Role::Assistant, None) => crate::types::GENERIC_ICON.to_string(),
        };
        let _ = writeln!(self.out, "{header}{stamp}");
        for line in turn.text().lines() {
            let _ = writeln!(self.out, "  {line}");
        }
        let _ = writeln!(self.out);
        self.flush();
    }

    fn show_typing(&mut self) {
        if self.typing {
            return;
        }
        let (dim, reset) = (self.style(ANSI_DIM), self.style(ANSI_RESET));
        let _ = write!(self.out, "{TYPING_ICON} {dim}...{reset}");
        self.typing = true;
        self.flush();
    }

    fn hide_typing(&mut self) {
        self.clear_typing();
        self.flush();
    }

    fn render_stats(&mut self, stats: &SessionStats) {
        self.clear_typing();
        let (dim, reset) = (self.style(ANSI_DIM), self.style(ANSI_RESET));
        let _ = writeln!(
            self.out,
            "{dim}messages: {}  agent switches: {}{reset}",
            stats.message_count, stats.agent_switches
        );
        self.flush();
    }

    fn render_welcome(&mut self, agents: &[AgentView]) {
        self.clear_typing();
        let (bold, reset) = (self.style(ANSI_BOLD), self.style(ANSI_RESET));
        let _ = writeln!(self.out, "{WELCOME_ICON} {bold}Welcome to AI Agent Hub!{reset}");
        for agent in agents {
            if !agent.description.is_empty() {
                let _ = writeln!(self.out, "  {} {}", agent.icon, agent.description);
            }
        }
        let _ = writeln!(self.out);
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        self.clear_typing();
        let (red, reset) = (self.style(ANSI_RED), self.style(ANSI_RESET));
        let _ = writeln!(self.out, "{red}Error: {error}{reset}");
        self.flush();
    }

    fn print_info(&mut self, info: &str) {
        self.clear_typing();
        let _ = writeln!(self.out, "{info}");
        self.flush();
    }
}
