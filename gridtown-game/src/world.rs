//! World-side collaborators: the pathing-engine position view, movement
//! speed selection and speech bubbles.

use std::collections::HashMap;

use tokio::time::{Duration, Instant};

use gridtown_core::bus::Event;
use gridtown_core::config::TownConfig;
use gridtown_core::types::{AgentId, GridPos};

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// Read-only view of character cells, implemented by the pathing engine.
/// The chat layer never moves anything.
pub trait PositionSource {
    /// Current cell of the player avatar.
    fn player_position(&self) -> GridPos;

    /// Current cell of a spawned agent, if it exists in the world.
    fn agent_position(&self, agent: &AgentId) -> Option<GridPos>;
}

/// Build the proximity-scan roster, in configured order, from live
/// positions. Unspawned agents and agents the engine does not know are
/// skipped.
#[must_use]
pub fn roster_positions(
    config: &TownConfig,
    source: &impl PositionSource,
) -> Vec<(AgentId, GridPos)> {
    config
        .spawned_agents()
        .filter_map(|(agent, _)| {
            source
                .agent_position(agent)
                .map(|cell| (agent.clone(), cell))
        })
        .collect()
}

/// Movement speed for this tick, in cells per second. The run modifier is
/// level-triggered and owned by the pathing collaborator; this only picks
/// between the two configured speeds.
#[must_use]
pub fn movement_speed(config: &TownConfig, run_held: bool) -> u32 {
    if run_held {
        config.sprint_speed
    } else {
        config.normal_speed
    }
}

// ---------------------------------------------------------------------------
// Speech bubbles
// ---------------------------------------------------------------------------

/// Text shown above an agent after an `agent-message` event, hidden again
/// after the configured duration.
#[derive(Debug)]
pub struct SpeechBubbles {
    duration: Duration,
    bubbles: HashMap<AgentId, Bubble>,
}

#[derive(Debug)]
struct Bubble {
    text: String,
    shown_at: Instant,
}

impl SpeechBubbles {
    /// Bubbles stay visible for `duration_ms`.
    #[must_use]
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration: Duration::from_millis(duration_ms),
            bubbles: HashMap::new(),
        }
    }

    /// Apply a bus event; `agent-message` shows a bubble.
    pub fn handle_event(&mut self, event: &Event) {
        if let Event::AgentMessage { agent, text } = event {
            self.show(agent.clone(), text.clone());
        }
    }

    /// Show `text` above `agent`, replacing any bubble already there.
    pub fn show(&mut self, agent: AgentId, text: String) {
        self.bubbles.insert(
            agent,
            Bubble {
                text,
                shown_at: Instant::now(),
            },
        );
    }

    /// Drop bubbles whose duration has elapsed. Call once per tick.
    pub fn tick(&mut self) {
        let duration = self.duration;
        let now = Instant::now();
        self.bubbles
            .retain(|_, bubble| now.duration_since(bubble.shown_at) < duration);
    }

    /// The text currently shown above `agent`, if any.
    #[must_use]
    pub fn visible(&self, agent: &AgentId) -> Option<&str> {
        self.bubbles.get(agent).map(|bubble| bubble.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_follows_configured_order_and_live_cells() {
        struct Fixed;
        impl PositionSource for Fixed {
            fn player_position(&self) -> GridPos {
                GridPos::new(0, 0)
            }
            fn agent_position(&self, agent: &AgentId) -> Option<GridPos> {
                // Leonardo wandered out of the engine's world.
                (agent.as_str() != "Leonardo").then_some(GridPos::new(1, 1))
            }
        }

        let config = TownConfig::default();
        let roster = roster_positions(&config, &Fixed);
        let ids: Vec<_> = roster.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["Marcus", "Julie", "Alan"]);
    }

    #[test]
    fn run_modifier_selects_sprint_speed() {
        let config = TownConfig::default();
        assert_eq!(movement_speed(&config, false), 6);
        assert_eq!(movement_speed(&config, true), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn bubble_hides_after_duration() {
        let mut bubbles = SpeechBubbles::new(3000);
        let marcus = AgentId::from("Marcus");

        bubbles.handle_event(&Event::AgentMessage {
            agent: marcus.clone(),
            text: "hi".to_string(),
        });
        bubbles.tick();
        assert_eq!(bubbles.visible(&marcus), Some("hi"));

        tokio::time::advance(Duration::from_millis(2999)).await;
        bubbles.tick();
        assert_eq!(bubbles.visible(&marcus), Some("hi"));

        tokio::time::advance(Duration::from_millis(2)).await;
        bubbles.tick();
        assert_eq!(bubbles.visible(&marcus), None);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_bubble_replaces_older() {
        let mut bubbles = SpeechBubbles::new(3000);
        let julie = AgentId::from("Julie");

        bubbles.show(julie.clone(), "first".to_string());
        tokio::time::advance(Duration::from_millis(2000)).await;
        bubbles.show(julie.clone(), "second".to_string());

        // The older bubble's deadline passes, the newer one survives.
        tokio::time::advance(Duration::from_millis(1500)).await;
        bubbles.tick();
        assert_eq!(bubbles.visible(&julie), Some("second"));
    }
}
