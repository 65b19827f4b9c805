//! # gridtown-core
//!
//! Game-agnostic chat/agent-interaction core for a grid-based town of NPC
//! agents. The host game engine owns rendering, pathing and raw keyboard
//! input; this crate owns everything between "the player pressed interact
//! next to an agent" and "a reply appeared in the transcript":
//!
//! - [`bus`] — in-process publish/subscribe with typed topics, decoupling
//!   the game runtime from the chat UI layer.
//! - [`session`] — transcripts, the single active-session pointer and the
//!   `Idle → AwaitingInput → WaitingForResponse` state machine.
//! - [`respond`] — per-agent reply policies (remote completion endpoint or
//!   local canned table) resolved once at startup.
//! - [`config`] — the static town description: roster, policies, timings.
//!
//! Everything here is synchronous and single-threaded; the integration
//! crate (`gridtown-game`) supplies timers and the remote call and funnels
//! their completions back onto the one event-loop thread.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bus;
pub mod config;
pub mod error;
pub mod respond;
pub mod session;
pub mod types;

pub use bus::{Event, EventBus, Topic};
pub use config::{AgentConfig, PolicyKind, TownConfig};
pub use error::{CoreError, Result};
pub use respond::{Resolution, Responder, ResponsePolicy};
pub use session::{ChatStore, OutboundMessage, SessionPhase, SessionToken, TurnId};
pub use types::{AgentId, ChatMessage, GridPos};
