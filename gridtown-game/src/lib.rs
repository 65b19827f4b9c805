//! # gridtown-game — Game-Loop Integration
//!
//! Wires the synchronous chat core to the host game engine and the remote
//! completion client:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              Host game engine                 │
//! │   (tile map, pathing, raw keyboard input)     │
//! │  ┌────────────────────────────────────────┐  │
//! │  │            gridtown-game               │  │
//! │  │  GameLoop ── per-tick: key edges,      │  │
//! │  │              proximity scan, bubbles   │  │
//! │  │  ChatRuntime ── timers + remote call,  │  │
//! │  │              completions via channel   │  │
//! │  │        │                   │           │  │
//! │  │        ▼                   ▼           │  │
//! │  │  ┌──────────────┐  ┌──────────────┐    │  │
//! │  │  │ gridtown-core│  │ gridtown-llm │    │  │
//! │  │  └──────────────┘  └──────────────┘    │  │
//! │  └────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Concurrency model: a single-threaded event loop. The typing delay, the
//! canned-reply delay and the remote completion call are the only
//! asynchronous operations; each runs as a fire-and-forget task whose
//! outcome is funneled back through an unbounded channel and applied on
//! the loop thread ([`ChatRuntime::pump`]). The game loop keeps ticking
//! while a reply is pending.
//!
//! ## Modules
//!
//! - `input` — interact-key edge detection and the world-input gate
//! - `proximity` — player/agent adjacency scan
//! - `world` — pathing-engine position view, speeds, speech bubbles
//! - `runtime` — the chat runtime and the per-tick game loop driver

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod input;
pub mod proximity;
pub mod runtime;
pub mod world;

pub use input::{InputGate, KeyEdge};
pub use proximity::ProximityTrigger;
pub use runtime::{ChatRuntime, GameLoop, KeyState, TickOutcome};
pub use world::{PositionSource, SpeechBubbles};
