//! Response resolution — decides how an agent's reply is produced.
//!
//! Every agent maps to exactly one [`ResponsePolicy`], resolved from the
//! town configuration once at startup. Identities missing from the map
//! (or with an empty table) get the single configured fallback string,
//! deterministically. Nothing here performs I/O: a remote decision is
//! returned to the caller, which owns the completion client and the
//! delays.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{PolicyKind, TownConfig};
use crate::types::AgentId;

/// Startup-resolved reply policy for one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePolicy {
    /// Ask the remote completion endpoint.
    Remote,
    /// Pick uniformly at random from this canned table.
    Local(Vec<String>),
}

/// What the resolver decided for one outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Dispatch to the remote completion client.
    Remote,
    /// Reply with this text after the canned-response delay.
    Canned(String),
}

/// Maps agent identities to reply policies.
///
/// The random pick is driven by an owned, seedable generator so tests can
/// assert exact output instead of "one of N strings".
pub struct Responder {
    policies: HashMap<AgentId, ResponsePolicy>,
    fallback: String,
    rng: StdRng,
}

impl Responder {
    /// Resolve the policy map from configuration, with an entropy-seeded
    /// generator.
    #[must_use]
    pub fn from_config(config: &TownConfig) -> Self {
        Self::build(config, StdRng::from_entropy())
    }

    /// Resolve the policy map with a fixed seed, for deterministic tests.
    #[must_use]
    pub fn with_seed(config: &TownConfig, seed: u64) -> Self {
        Self::build(config, StdRng::seed_from_u64(seed))
    }

    fn build(config: &TownConfig, rng: StdRng) -> Self {
        let policies = config
            .agents
            .iter()
            .map(|agent| {
                let policy = match agent.policy {
                    PolicyKind::Remote => ResponsePolicy::Remote,
                    PolicyKind::Local => ResponsePolicy::Local(agent.responses.clone()),
                };
                (agent.id.clone(), policy)
            })
            .collect();
        Self {
            policies,
            fallback: config.fallback_response.clone(),
            rng,
        }
    }

    /// Decide how to answer `agent` for one outgoing message.
    pub fn resolve(&mut self, agent: &AgentId) -> Resolution {
        match self.policies.get(agent) {
            Some(ResponsePolicy::Remote) => Resolution::Remote,
            Some(ResponsePolicy::Local(table)) if !table.is_empty() => {
                let index = self.rng.gen_range(0..table.len());
                Resolution::Canned(table[index].clone())
            }
            _ => Resolution::Canned(self.fallback.clone()),
        }
    }

    /// The resolved policy for `agent`, if it is configured at all.
    #[must_use]
    pub fn policy(&self, agent: &AgentId) -> Option<&ResponsePolicy> {
        self.policies.get(agent)
    }
}
