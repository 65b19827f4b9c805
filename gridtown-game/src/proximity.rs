//! Player/agent adjacency detection.
//!
//! While a session is active the scan is skipped entirely — that, plus
//! the edge-triggered interact key, is what makes chat opening idempotent
//! while the player stays next to the same agent.

use gridtown_core::types::{AgentId, GridPos};

/// Scans the roster for an agent at exactly the adjacency distance.
#[derive(Debug, Clone, Copy)]
pub struct ProximityTrigger {
    adjacency_cells: u32,
}

impl ProximityTrigger {
    /// The trigger fires at exactly `adjacency_cells` Manhattan distance
    /// (1 in the shipped town).
    #[must_use]
    pub fn new(adjacency_cells: u32) -> Self {
        Self { adjacency_cells }
    }

    /// Find the agent to interact with this tick, if any.
    ///
    /// Returns the first agent in roster order whose cell is at exactly
    /// the adjacency distance from `player` — the roster order is the
    /// tie-break when two agents qualify at once. Returns `None` when no
    /// interact edge occurred this tick or while a session is active.
    #[must_use]
    pub fn check(
        &self,
        player: GridPos,
        roster: &[(AgentId, GridPos)],
        interact_pressed: bool,
        session_active: bool,
    ) -> Option<AgentId> {
        if session_active || !interact_pressed {
            return None;
        }
        roster
            .iter()
            .find(|(_, cell)| player.manhattan_distance(*cell) == self.adjacency_cells)
            .map(|(agent, _)| agent.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(cells: &[(&str, (i32, i32))]) -> Vec<(AgentId, GridPos)> {
        cells
            .iter()
            .map(|(id, (x, y))| (AgentId::from(*id), GridPos::new(*x, *y)))
            .collect()
    }

    #[test]
    fn exact_adjacency_triggers() {
        let trigger = ProximityTrigger::new(1);
        let roster = roster(&[("Marcus", (10, 11))]);

        let hit = trigger.check(GridPos::new(10, 10), &roster, true, false);
        assert_eq!(hit.as_ref().map(AgentId::as_str), Some("Marcus"));
    }

    #[test]
    fn same_cell_and_two_cells_away_do_not_trigger() {
        let trigger = ProximityTrigger::new(1);
        let roster = roster(&[("Marcus", (10, 10)), ("Julie", (10, 12))]);

        assert_eq!(trigger.check(GridPos::new(10, 10), &roster, true, false), None);
    }

    #[test]
    fn tie_break_is_first_in_roster_order() {
        let trigger = ProximityTrigger::new(1);
        // Both adjacent to the player at (10, 10).
        let roster = roster(&[("Julie", (10, 11)), ("Marcus", (11, 10))]);

        let hit = trigger.check(GridPos::new(10, 10), &roster, true, false);
        assert_eq!(hit.as_ref().map(AgentId::as_str), Some("Julie"));
    }

    #[test]
    fn disabled_while_a_session_is_active() {
        let trigger = ProximityTrigger::new(1);
        let roster = roster(&[("Marcus", (10, 11))]);

        assert_eq!(trigger.check(GridPos::new(10, 10), &roster, true, true), None);
    }

    #[test]
    fn no_interact_edge_means_no_trigger() {
        let trigger = ProximityTrigger::new(1);
        let roster = roster(&[("Marcus", (10, 11))]);

        assert_eq!(trigger.check(GridPos::new(10, 10), &roster, false, false), None);
    }
}
