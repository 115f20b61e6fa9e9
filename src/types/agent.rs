use serde::{Deserialize, Serialize};

/// Icon shown for agents the catalog does not know.
pub const GENERIC_ICON: &str = "🤖";

/// The agent selected when nothing else has been chosen.
pub const DEFAULT_AGENT: &str = "triage";

/// An agent advertised by the backend registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInfo {
    /// Unique agent key, sent as `agent_name` on chat requests.
    pub name: String,

    /// Human-readable description.
    pub description: String,
}

impl AgentInfo {
    /// Create a new registry entry.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Client-side presentation data for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Short description used in the agent list.
    pub summary: String,

    /// Full description used in the mode banner.
    pub description: String,

    /// Display glyph.
    pub icon: String,
}

impl AgentProfile {
    /// Create a new profile.
    pub fn new(
        summary: impl Into<String>,
        description: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            summary: summary.into(),
            description: description.into(),
            icon: icon.into(),
        }
    }
}

/// The agents the client knows how to present, and the default selection.
///
/// The catalog doubles as the fallback registry when the backend's agent
/// list cannot be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCatalog {
    default_agent: String,
    profiles: Vec<(String, AgentProfile)>,
}

impl AgentCatalog {
    /// Creates an empty catalog whose default selection is `default_agent`.
    pub fn empty(default_agent: impl Into<String>) -> Self {
        Self {
            default_agent: default_agent.into(),
            profiles: Vec::new(),
        }
    }

    /// Adds or replaces the profile for `key`, keeping its original position.
    pub fn with_agent(mut self, key: impl Into<String>, profile: AgentProfile) -> Self {
        let key = key.into();
        if let Some(slot) = self.profiles.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = profile;
        } else {
            self.profiles.push((key, profile));
        }
        self
    }

    /// Changes the default selection.
    pub fn with_default_agent(mut self, key: impl Into<String>) -> Self {
        self.default_agent = key.into();
        self
    }

    /// Returns the default agent key.
    pub fn default_agent(&self) -> &str {
        &self.default_agent
    }

    /// Returns the profile for `key`, if the catalog has one.
    pub fn profile(&self, key: &str) -> Option<&AgentProfile> {
        self.profiles
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, profile)| profile)
    }

    /// Returns the icon for `key`, or [`GENERIC_ICON`].
    pub fn icon(&self, key: &str) -> &str {
        self.profile(key)
            .map(|p| p.icon.as_str())
            .unwrap_or(GENERIC_ICON)
    }

    /// Returns the known agent keys in catalog order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|(k, _)| k.as_str())
    }

    /// Returns the number of agents in the catalog.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns true if the catalog has no agents.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// The registry used when the backend's agent list is unavailable.
    pub fn fallback_registry(&self) -> Vec<AgentInfo> {
        self.profiles
            .iter()
            .map(|(key, profile)| AgentInfo::new(key.clone(), profile.summary.clone()))
            .collect()
    }
}

impl Default for AgentCatalog {
    fn default() -> Self {
        AgentCatalog::empty(DEFAULT_AGENT)
            .with_agent(
                "triage",
                AgentProfile::new(
                    "Routes to specialists",
                    "Routes your request to the right specialist",
                    "🎯",
                ),
            )
            .with_agent(
                "orchestrator",
                AgentProfile::new(
                    "Coordinates agents",
                    "Coordinates multiple agents to handle complex tasks",
                    "🎼",
                ),
            )
            .with_agent(
                "research",
                AgentProfile::new(
                    "Research & analysis",
                    "Research, analysis, and information gathering",
                    "🔬",
                ),
            )
            .with_agent(
                "creative",
                AgentProfile::new(
                    "Creative writing",
                    "Creative writing and brainstorming",
                    "🎨",
                ),
            )
            .with_agent(
                "technical",
                AgentProfile::new(
                    "Technical help",
                    "Technical programming and debugging",
                    "💻",
                ),
            )
            .with_agent(
                "business",
                AgentProfile::new(
                    "Business strategy",
                    "Business strategy and planning",
                    "💼",
                ),
            )
    }
}

/// Everything a renderer needs to draw one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentView {
    /// Agent key.
    pub key: String,

    /// Title-cased display name.
    pub label: String,

    /// Display glyph.
    pub icon: String,

    /// Short description for lists.
    pub summary: String,

    /// Full description for the mode banner.
    pub description: String,
}

impl AgentView {
    /// Builds the view of `key` from the catalog and, when present, the
    /// registry's description.
    pub fn new(key: &str, catalog: &AgentCatalog, registry_description: Option<&str>) -> Self {
        let profile = catalog.profile(key);
        let summary = profile
            .map(|p| p.summary.clone())
            .or_else(|| registry_description.map(String::from))
            .unwrap_or_default();
        let description = profile
            .map(|p| p.description.clone())
            .or_else(|| registry_description.map(String::from))
            .unwrap_or_default();
        Self {
            key: key.to_string(),
            label: format_agent_name(key),
            icon: catalog.icon(key).to_string(),
            summary,
            description,
        }
    }
}

/// Turns an agent key such as `research_agent` into `Research Agent`.
pub fn format_agent_name(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
