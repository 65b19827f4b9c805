//! The chat runtime and the per-tick game loop driver.
//!
//! [`ChatRuntime`] glues the session store, response resolution, the
//! remote completion client and the event bus together on one event-loop
//! thread. Timers and the remote call run as fire-and-forget tasks; their
//! outcomes come back through an unbounded channel and are applied by
//! [`ChatRuntime::pump`], so every touch of shared state happens on the
//! loop thread and nothing blocks the game loop while a reply is pending.
//!
//! [`GameLoop`] is the world-side counterpart: it edge-detects the
//! interact and cancel keys, scans for adjacency, drives speech bubbles
//! and reports the movement speed for the tick.

use std::rc::Rc;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{Duration, sleep};
use tracing::{debug, warn};

use gridtown_core::bus::{Event, EventBus};
use gridtown_core::config::TownConfig;
use gridtown_core::respond::{Resolution, Responder};
use gridtown_core::session::{ChatStore, OutboundMessage, SessionToken, TurnId};
use gridtown_core::types::{AgentId, ChatMessage};
use gridtown_llm::CompletionClient;

use crate::input::{InputGate, KeyEdge};
use crate::proximity::ProximityTrigger;
use crate::world::{PositionSource, SpeechBubbles, movement_speed, roster_positions};

// ---------------------------------------------------------------------------
// Completions
// ---------------------------------------------------------------------------

/// Outcome of one asynchronous step, delivered back to the loop thread.
#[derive(Debug)]
enum ChatCompletion {
    /// The typing-placeholder delay elapsed.
    TypingDue {
        agent: AgentId,
        token: SessionToken,
        turn: TurnId,
    },
    /// A reply is ready to append.
    ReplyReady {
        agent: AgentId,
        token: SessionToken,
        turn: TurnId,
        text: String,
    },
    /// The remote call failed; clear the placeholder and move on.
    ReplyFailed {
        agent: AgentId,
        token: SessionToken,
        turn: TurnId,
        error: String,
    },
}

// ---------------------------------------------------------------------------
// Chat runtime
// ---------------------------------------------------------------------------

/// Owns the session store and drives response resolution.
pub struct ChatRuntime {
    store: ChatStore,
    responder: Responder,
    client: Arc<CompletionClient>,
    bus: Rc<EventBus>,
    typing_delay: Duration,
    response_delay: Duration,
    tx: UnboundedSender<ChatCompletion>,
    rx: UnboundedReceiver<ChatCompletion>,
}

impl ChatRuntime {
    /// Assemble the runtime from its resolved parts.
    #[must_use]
    pub fn new(
        config: &TownConfig,
        responder: Responder,
        client: CompletionClient,
        bus: Rc<EventBus>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            store: ChatStore::new(),
            responder,
            client: Arc::new(client),
            bus,
            typing_delay: Duration::from_millis(config.typing_delay_ms),
            response_delay: Duration::from_millis(config.response_delay_ms),
            tx,
            rx,
        }
    }

    /// Open a chat with `agent` — the `agent-interaction` path. Idempotent
    /// while the same agent stays active.
    pub fn open_chat(&mut self, agent: &AgentId) {
        self.store.open(agent);
    }

    /// The chat input grabbed keyboard focus.
    pub fn input_focused(&self) {
        self.bus.publish(&Event::DisableGameInput);
    }

    /// The chat input lost keyboard focus.
    pub fn input_blurred(&self) {
        self.bus.publish(&Event::EnableGameInput);
    }

    /// Close the active chat. Publishes `chat-closed` and re-enables world
    /// input even when no blur event fired. A no-op while idle.
    pub fn close_chat(&mut self) {
        if self.store.active().is_none() {
            return;
        }
        self.store.close();
        self.bus.publish(&Event::ChatClosed);
        self.bus.publish(&Event::EnableGameInput);
    }

    /// Send the chat input's text to the active agent.
    ///
    /// Empty text, or a send with no active session, is silently dropped.
    /// Otherwise the user message is appended, echoed onto the bus for the
    /// speech bubble, and its reply is scheduled.
    pub fn send_message(&mut self, text: &str) {
        let Some(outbound) = self.store.append_user(text) else {
            return;
        };
        self.bus.publish(&Event::AgentMessage {
            agent: outbound.agent.clone(),
            text: outbound.text.clone(),
        });

        self.schedule_typing(&outbound);
        match self.responder.resolve(&outbound.agent) {
            Resolution::Canned(reply) => self.schedule_canned(&outbound, reply),
            Resolution::Remote => self.dispatch_remote(&outbound),
        }
    }

    fn schedule_typing(&self, outbound: &OutboundMessage) {
        let tx = self.tx.clone();
        let delay = self.typing_delay;
        let (agent, token, turn) = (outbound.agent.clone(), outbound.token, outbound.turn);
        tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(ChatCompletion::TypingDue { agent, token, turn });
        });
    }

    fn schedule_canned(&self, outbound: &OutboundMessage, reply: String) {
        let tx = self.tx.clone();
        let delay = self.response_delay;
        let (agent, token, turn) = (outbound.agent.clone(), outbound.token, outbound.turn);
        tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(ChatCompletion::ReplyReady {
                agent,
                token,
                turn,
                text: reply,
            });
        });
    }

    fn dispatch_remote(&self, outbound: &OutboundMessage) {
        let tx = self.tx.clone();
        let client = Arc::clone(&self.client);
        let (agent, token, turn) = (outbound.agent.clone(), outbound.token, outbound.turn);
        let text = outbound.text.clone();
        tokio::spawn(async move {
            let completion = match client.complete(agent.as_str(), &text).await {
                Ok(reply) => ChatCompletion::ReplyReady {
                    agent,
                    token,
                    turn,
                    text: reply,
                },
                Err(err) => ChatCompletion::ReplyFailed {
                    agent,
                    token,
                    turn,
                    error: err.to_string(),
                },
            };
            let _ = tx.send(completion);
        });
    }

    /// Apply every completion that has arrived. Call once per tick.
    pub fn pump(&mut self) {
        while let Ok(completion) = self.rx.try_recv() {
            self.apply(completion);
        }
    }

    fn apply(&mut self, completion: ChatCompletion) {
        match completion {
            ChatCompletion::TypingDue { agent, token, turn } => {
                self.store.begin_typing(&agent, token, turn);
            }
            ChatCompletion::ReplyReady {
                agent,
                token,
                turn,
                text,
            } => {
                if self.store.append_agent(&agent, text, token, turn) {
                    debug!(agent = %agent, "reply appended");
                }
            }
            ChatCompletion::ReplyFailed {
                agent,
                token,
                turn,
                error,
            } => {
                // Terminal here: logged, placeholder cleared, session
                // stays usable. No retry.
                warn!(agent = %agent, %error, "remote completion failed");
                self.store.fail_turn(&agent, token, turn);
            }
        }
    }

    /// Whether a session is active (the chat panel is visible).
    #[must_use]
    pub fn is_chatting(&self) -> bool {
        self.store.active().is_some()
    }

    /// The transcript for `agent`, if one exists.
    #[must_use]
    pub fn transcript(&self, agent: &AgentId) -> Option<&[ChatMessage]> {
        self.store.transcript(agent)
    }

    /// Read access to the session store.
    #[must_use]
    pub fn store(&self) -> &ChatStore {
        &self.store
    }
}

// ---------------------------------------------------------------------------
// Game loop driver
// ---------------------------------------------------------------------------

/// Raw key levels sampled by the host engine this tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyState {
    /// The interact key ("E").
    pub interact_down: bool,
    /// The run modifier (Shift). Level-triggered.
    pub run_down: bool,
    /// The cancel key (Escape).
    pub escape_down: bool,
}

/// What the host engine needs to know after one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    /// Whether movement keys may be applied this tick.
    pub movement_enabled: bool,
    /// Player speed for this tick, cells per second.
    pub speed: u32,
    /// The agent a chat was opened with this tick, if any.
    pub opened: Option<AgentId>,
}

/// Per-tick world driver: key edges, proximity scan, speech bubbles.
pub struct GameLoop {
    config: TownConfig,
    trigger: ProximityTrigger,
    interact: KeyEdge,
    escape: KeyEdge,
    gate: InputGate,
    bubbles: SpeechBubbles,
    bus: Rc<EventBus>,
}

impl GameLoop {
    /// Build the driver from configuration.
    #[must_use]
    pub fn new(config: TownConfig, bus: Rc<EventBus>) -> Self {
        Self {
            trigger: ProximityTrigger::new(config.adjacency_cells),
            interact: KeyEdge::new(),
            escape: KeyEdge::new(),
            gate: InputGate::new(),
            bubbles: SpeechBubbles::new(config.bubble_duration_ms),
            config,
            bus,
        }
    }

    /// Forward a bus event to the world-side state (input gate, bubbles).
    pub fn handle_event(&mut self, event: &Event) {
        self.gate.handle_event(event);
        self.bubbles.handle_event(event);
    }

    /// Run one world tick.
    ///
    /// Key edges are tracked every tick, including while a chat is open,
    /// so a key held across the chat cannot fire on close. The proximity
    /// scan runs only when world input is enabled and no session is
    /// active; a hit opens the chat directly and publishes
    /// `agent-interaction` for the UI layer.
    pub fn tick(
        &mut self,
        runtime: &mut ChatRuntime,
        positions: &impl PositionSource,
        keys: KeyState,
    ) -> TickOutcome {
        runtime.pump();
        self.bubbles.tick();

        let interact_edge = self.interact.update(keys.interact_down);
        let escape_edge = self.escape.update(keys.escape_down);

        if escape_edge && runtime.is_chatting() {
            runtime.close_chat();
        }

        let world_active = self.gate.world_input_enabled() && !runtime.is_chatting();
        let mut opened = None;

        if world_active {
            let roster = roster_positions(&self.config, positions);
            if let Some(agent) = self.trigger.check(
                positions.player_position(),
                &roster,
                interact_edge,
                runtime.is_chatting(),
            ) {
                runtime.open_chat(&agent);
                self.bus.publish(&Event::AgentInteraction(agent.clone()));
                opened = Some(agent);
            }
        }

        TickOutcome {
            movement_enabled: world_active && opened.is_none(),
            speed: movement_speed(&self.config, keys.run_down),
            opened,
        }
    }

    /// The speech bubble currently shown above `agent`, if any.
    #[must_use]
    pub fn bubble(&self, agent: &AgentId) -> Option<&str> {
        self.bubbles.visible(agent)
    }
}
