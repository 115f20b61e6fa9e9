//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::time::Duration;

use arrrg_derive::CommandLine;
use url::Url;

use crate::client::resolve_base_url;
use crate::error::Error;
use crate::types::AgentCatalog;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Command-line arguments for the agenthub-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the chat API.
    #[arrrg(optional, "Chat API base URL (default: $AGENTHUB_URL or http://localhost:8000/)", "URL")]
    pub server: Option<String>,

    /// Origin of the page the client stands in for; the API base is derived from it.
    #[arrrg(optional, "Derive the API base from a page origin", "URL")]
    pub origin: Option<String>,

    /// Agent selected at startup.
    #[arrrg(optional, "Agent to start with (default: triage)", "AGENT")]
    pub agent: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 60)", "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Clear without asking for confirmation.
    #[arrrg(flag, "Do not ask before clearing the conversation")]
    pub no_confirm: bool,

    /// Apply replies that arrive after the conversation was cleared.
    #[arrrg(flag, "Keep replies that arrive after /clear")]
    pub keep_stale: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL of the chat API; `None` defers to the client's default.
    pub base_url: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Presentation data for known agents and the default selection.
    pub catalog: AgentCatalog,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether clearing the conversation asks for confirmation first.
    pub confirm_clear: bool,

    /// Whether replies to a request issued before a clear are dropped.
    pub discard_stale_responses: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Base URL: client default
    /// - Timeout: 60 seconds
    /// - Catalog: the six built-in agents, starting with triage
    /// - Color: enabled
    /// - Confirm clear: enabled
    /// - Stale replies: discarded
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            catalog: AgentCatalog::default(),
            use_color: true,
            confirm_clear: true,
            discard_stale_responses: true,
        }
    }

    /// Sets the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces the agent catalog.
    pub fn with_catalog(mut self, catalog: AgentCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets the agent selected at startup.
    pub fn with_default_agent(mut self, agent: impl Into<String>) -> Self {
        self.catalog = self.catalog.with_default_agent(agent);
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets whether clearing asks for confirmation.
    pub fn with_confirm_clear(mut self, confirm: bool) -> Self {
        self.confirm_clear = confirm;
        self
    }

    /// Sets whether replies that arrive after a clear are dropped.
    pub fn with_discard_stale_responses(mut self, discard: bool) -> Self {
        self.discard_stale_responses = discard;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = Error;

    fn try_from(args: ChatArgs) -> Result<Self, Error> {
        let mut config = ChatConfig::new()
            .with_confirm_clear(!args.no_confirm)
            .with_discard_stale_responses(!args.keep_stale);

        config.base_url = match (args.server, args.origin) {
            (Some(_), Some(_)) => {
                return Err(Error::validation(
                    "--server and --origin are mutually exclusive",
                    Some("origin".to_string()),
                ));
            }
            (Some(server), None) => Some(server),
            (None, Some(origin)) => {
                let origin = Url::parse(&origin)?;
                Some(resolve_base_url(&origin).to_string())
            }
            (None, None) => None,
        };
        if let Some(agent) = args.agent {
            config = config.with_default_agent(agent);
        }
        if let Some(secs) = args.timeout_secs {
            if secs == 0 {
                return Err(Error::validation(
                    "timeout must be at least one second",
                    Some("timeout_secs".to_string()),
                ));
            }
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if args.no_color {
            config = config.without_color();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert!(config.base_url.is_none());
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.catalog.default_agent(), "triage");
        assert!(config.use_color);
        assert!(config.confirm_clear);
        assert!(config.discard_stale_responses);
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::try_from(ChatArgs::default()).unwrap();
        assert!(config.base_url.is_none());
        assert!(config.use_color);
        assert!(config.confirm_clear);
        assert!(config.discard_stale_responses);
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            server: Some("https://hub.example.com/".to_string()),
            origin: None,
            agent: Some("research".to_string()),
            timeout_secs: Some(5),
            no_color: true,
            no_confirm: true,
            keep_stale: true,
        };
        let config = ChatConfig::try_from(args).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://hub.example.com/"));
        assert_eq!(config.catalog.default_agent(), "research");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(!config.use_color);
        assert!(!config.confirm_clear);
        assert!(!config.discard_stale_responses);
    }

    #[test]
    fn origin_is_resolved() {
        let args = ChatArgs {
            origin: Some("http://localhost:3000/".to_string()),
            ..ChatArgs::default()
        };
        let config = ChatConfig::try_from(args).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8000/"));

        let args = ChatArgs {
            origin: Some("https://hub.example.com/chat/".to_string()),
            ..ChatArgs::default()
        };
        let config = ChatConfig::try_from(args).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://hub.example.com/"));
    }

    #[test]
    fn conflicting_or_invalid_args_fail() {
        let args = ChatArgs {
            server: Some("http://a/".to_string()),
            origin: Some("http://b/".to_string()),
            ..ChatArgs::default()
        };
        assert!(ChatConfig::try_from(args).is_err());

        let args = ChatArgs {
            timeout_secs: Some(0),
            ..ChatArgs::default()
        };
        assert!(ChatConfig::try_from(args).is_err());

        let args = ChatArgs {
            origin: Some("nope".to_string()),
            ..ChatArgs::default()
        };
        assert!(matches!(
            ChatConfig::try_from(args),
            Err(Error::Url { .. })
        ));
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_base_url("http://localhost:9000/")
            .with_timeout(Duration::from_secs(10))
            .with_default_agent("business")
            .without_color()
            .with_confirm_clear(false)
            .with_discard_stale_responses(false);

        assert_eq!(config.base_url.as_deref(), Some("http://localhost:9000/"));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.catalog.default_agent(), "business");
        assert!(!config.use_color);
        assert!(!config.confirm_clear);
        assert!(!config.discard_stale_responses);
    }
}
