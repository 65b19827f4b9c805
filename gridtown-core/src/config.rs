//! Static configuration for the town: agent roster, reply policies and
//! interaction timings.
//!
//! Defaults describe the shipped town; a TOML file can override any field.
//! Policies are resolved from this description exactly once at startup
//! (see [`crate::respond::Responder`]) — nothing downstream compares
//! identity strings at runtime.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::types::{AgentId, GridPos};

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// How an agent's replies are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Pick from the agent's canned table after a fixed delay.
    Local,
    /// Ask the remote completion endpoint.
    Remote,
}

/// One configured agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Stable identity used in transcripts, events and the policy map.
    pub id: AgentId,
    /// Spawn cell on the tile map. Agents without a spawn never appear in
    /// the world and are only reachable programmatically.
    #[serde(default)]
    pub spawn: Option<GridPos>,
    /// Reply policy.
    #[serde(default = "default_policy")]
    pub policy: PolicyKind,
    /// Canned reply table, used by the local policy only.
    #[serde(default)]
    pub responses: Vec<String>,
}

fn default_policy() -> PolicyKind {
    PolicyKind::Local
}

impl AgentConfig {
    /// A locally-answered agent with a spawn cell and a canned table.
    #[must_use]
    pub fn local(
        id: &str,
        spawn: Option<GridPos>,
        responses: &[&str],
    ) -> Self {
        Self {
            id: AgentId::from(id),
            spawn,
            policy: PolicyKind::Local,
            responses: responses.iter().map(ToString::to_string).collect(),
        }
    }

    /// A remotely-answered agent.
    #[must_use]
    pub fn remote(id: &str, spawn: Option<GridPos>) -> Self {
        Self {
            id: AgentId::from(id),
            spawn,
            policy: PolicyKind::Remote,
            responses: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Town
// ---------------------------------------------------------------------------

/// Whole-town configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TownConfig {
    /// Manhattan distance (cells) at which interact opens a chat. Exactly
    /// this distance triggers; standing on the agent's cell does not.
    pub adjacency_cells: u32,
    /// Delay before the typing placeholder appears (ms).
    pub typing_delay_ms: u64,
    /// Delay before a canned reply lands (ms).
    pub response_delay_ms: u64,
    /// Timeout for one remote completion call (ms).
    pub remote_timeout_ms: u64,
    /// How long a speech bubble stays visible (ms).
    pub bubble_duration_ms: u64,
    /// Reply used for identities with no canned table.
    pub fallback_response: String,
    /// Player spawn cell.
    pub player_spawn: GridPos,
    /// Walking speed, cells per second.
    pub normal_speed: u32,
    /// Speed while the run modifier is held.
    pub sprint_speed: u32,
    /// Agent roster, in trigger-priority order: when two agents are
    /// adjacent at once, the first one listed wins.
    pub agents: Vec<AgentConfig>,
}

impl Default for TownConfig {
    fn default() -> Self {
        Self {
            adjacency_cells: 1,
            typing_delay_ms: 500,
            response_delay_ms: 1500,
            remote_timeout_ms: 10_000,
            bubble_duration_ms: 3000,
            fallback_response: "I don't have much to say right now.".to_string(),
            player_spawn: GridPos::new(56, 13),
            normal_speed: 6,
            sprint_speed: 10,
            agents: vec![
                AgentConfig::local(
                    "Marcus",
                    Some(GridPos::new(9, 30)),
                    &["Hello!", "How can I help?", "Nice to meet you!"],
                ),
                AgentConfig::local(
                    "Julie",
                    Some(GridPos::new(13, 11)),
                    &["Hey there!", "What do you need?", "I'm busy but I'll chat."],
                ),
                AgentConfig::local(
                    "Leonardo",
                    Some(GridPos::new(85, 11)),
                    &["Greetings!", "Need assistance?", "Always here to help."],
                ),
                AgentConfig::local(
                    "Alan",
                    Some(GridPos::new(87, 30)),
                    &["Hi!", "Have any questions?", "Let's talk."],
                ),
                AgentConfig::local(
                    "Troy",
                    None,
                    &["Yo!", "What brings you here?", "Nice to see you."],
                ),
                AgentConfig::local(
                    "Linda",
                    None,
                    &["Hey!", "Hope you're having a great day!", "Let's chat!"],
                ),
                AgentConfig::remote("Sara", None),
            ],
        }
    }
}

impl TownConfig {
    /// Parse a TOML override file. Unset fields keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the roster for mistakes that would otherwise fail silently.
    pub fn validate(&self) -> Result<()> {
        if self.adjacency_cells == 0 {
            return Err(CoreError::ConfigInvalid {
                reason: "adjacency_cells must be at least 1".to_string(),
            });
        }
        for (i, agent) in self.agents.iter().enumerate() {
            if self.agents[..i].iter().any(|other| other.id == agent.id) {
                return Err(CoreError::ConfigInvalid {
                    reason: format!("duplicate agent id: {}", agent.id),
                });
            }
            if agent.policy == PolicyKind::Remote && !agent.responses.is_empty() {
                return Err(CoreError::ConfigInvalid {
                    reason: format!(
                        "agent {} is remote but carries a canned table",
                        agent.id
                    ),
                });
            }
        }
        Ok(())
    }

    /// Look up one agent's configuration.
    #[must_use]
    pub fn agent(&self, id: &AgentId) -> Option<&AgentConfig> {
        self.agents.iter().find(|agent| &agent.id == id)
    }

    /// Spawned agents in roster order — the proximity-scan order.
    pub fn spawned_agents(&self) -> impl Iterator<Item = (&AgentId, GridPos)> {
        self.agents
            .iter()
            .filter_map(|agent| agent.spawn.map(|spawn| (&agent.id, spawn)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_roster_matches_shipped_town() {
        let config = TownConfig::default();
        assert_eq!(config.adjacency_cells, 1);
        assert_eq!(config.typing_delay_ms, 500);
        assert_eq!(config.response_delay_ms, 1500);
        assert_eq!(config.agents.len(), 7);

        let marcus = config.agent(&AgentId::from("Marcus")).expect("Marcus");
        assert_eq!(marcus.spawn, Some(GridPos::new(9, 30)));
        assert_eq!(marcus.responses.len(), 3);

        let sara = config.agent(&AgentId::from("Sara")).expect("Sara");
        assert_eq!(sara.policy, PolicyKind::Remote);
        assert_eq!(sara.spawn, None);

        // Troy and Linda have canned tables but never spawn.
        let spawned: Vec<_> = config.spawned_agents().map(|(id, _)| id.as_str()).collect();
        assert_eq!(spawned, vec!["Marcus", "Julie", "Leonardo", "Alan"]);
    }

    #[test]
    fn toml_overrides_merge_over_defaults() {
        let config = TownConfig::from_toml_str(
            r#"
            adjacency_cells = 1
            response_delay_ms = 100

            [[agents]]
            id = "Greta"
            spawn = { x = 2, y = 3 }
            responses = ["Mm."]
            "#,
        )
        .expect("parse");

        assert_eq!(config.response_delay_ms, 100);
        assert_eq!(config.typing_delay_ms, 500); // default kept
        assert_eq!(config.agents.len(), 1);
        assert_eq!(config.agents[0].policy, PolicyKind::Local);
    }

    #[test]
    fn duplicate_agent_ids_rejected() {
        let err = TownConfig::from_toml_str(
            r#"
            [[agents]]
            id = "Marcus"
            [[agents]]
            id = "Marcus"
            "#,
        )
        .expect_err("duplicate ids");
        assert!(err.to_string().contains("duplicate agent id"));
    }

    #[test]
    fn remote_agent_with_canned_table_rejected() {
        let err = TownConfig::from_toml_str(
            r#"
            [[agents]]
            id = "Sara"
            policy = "remote"
            responses = ["canned"]
            "#,
        )
        .expect_err("remote with table");
        assert!(err.to_string().contains("remote"));
    }

    #[test]
    fn zero_adjacency_rejected() {
        let err = TownConfig::from_toml_str("adjacency_cells = 0").expect_err("zero adjacency");
        assert!(matches!(err, CoreError::ConfigInvalid { .. }));
    }
}
