//! In-process publish/subscribe bus decoupling the game runtime from the
//! chat UI layer.
//!
//! Dispatch is synchronous and single-threaded: handlers for a topic run in
//! subscription order on the turn that published, and a publish with no
//! subscribers is a no-op. There are no locks; the handler table lives in a
//! `RefCell` and the list for a topic is cloned out before dispatch, so a
//! handler may itself publish (to a different topic) or subscribe without
//! tripping the borrow. A handler publishing back to its own topic would
//! recurse into itself and is not supported.
//!
//! Topics carry typed payloads ([`Event`]), and [`Topic::as_str`] is the
//! single source of truth for the wire names, so a typo cannot silently
//! miss its wiring.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use crate::types::AgentId;

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

/// The named bus topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Player pressed interact next to an agent; a chat should open.
    AgentInteraction,
    /// A chat message was sent to an agent (drives the speech bubble).
    AgentMessage,
    /// The chat panel was closed.
    ChatClosed,
    /// The chat input grabbed keyboard focus; the world must stop reading
    /// movement keys.
    DisableGameInput,
    /// The chat input released keyboard focus.
    EnableGameInput,
}

impl Topic {
    /// Wire name of this topic.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AgentInteraction => "agent-interaction",
            Self::AgentMessage => "agent-message",
            Self::ChatClosed => "chat-closed",
            Self::DisableGameInput => "disable-game-input",
            Self::EnableGameInput => "enable-game-input",
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Typed payloads, one variant per [`Topic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// See [`Topic::AgentInteraction`].
    AgentInteraction(AgentId),
    /// See [`Topic::AgentMessage`].
    AgentMessage {
        /// The agent the message was sent to.
        agent: AgentId,
        /// The message text.
        text: String,
    },
    /// See [`Topic::ChatClosed`].
    ChatClosed,
    /// See [`Topic::DisableGameInput`].
    DisableGameInput,
    /// See [`Topic::EnableGameInput`].
    EnableGameInput,
}

impl Event {
    /// The topic this event is delivered on.
    #[must_use]
    pub fn topic(&self) -> Topic {
        match self {
            Self::AgentInteraction(_) => Topic::AgentInteraction,
            Self::AgentMessage { .. } => Topic::AgentMessage,
            Self::ChatClosed => Topic::ChatClosed,
            Self::DisableGameInput => Topic::DisableGameInput,
            Self::EnableGameInput => Topic::EnableGameInput,
        }
    }
}

// ---------------------------------------------------------------------------
// Bus
// ---------------------------------------------------------------------------

type Handler = Rc<RefCell<dyn FnMut(&Event)>>;

/// Single-threaded publish/subscribe bus.
#[derive(Default)]
pub struct EventBus {
    handlers: RefCell<HashMap<Topic, Vec<Handler>>>,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `topic`. Handlers for one topic fire in
    /// subscription order.
    pub fn subscribe(&self, topic: Topic, handler: impl FnMut(&Event) + 'static) {
        self.handlers
            .borrow_mut()
            .entry(topic)
            .or_default()
            .push(Rc::new(RefCell::new(handler)));
    }

    /// Drop every handler registered for `topic`.
    pub fn unsubscribe(&self, topic: Topic) {
        self.handlers.borrow_mut().remove(&topic);
    }

    /// Deliver `event` to every handler of its topic, synchronously.
    pub fn publish(&self, event: &Event) {
        let handlers = self.handlers.borrow().get(&event.topic()).cloned();
        let Some(handlers) = handlers else {
            trace!(topic = event.topic().as_str(), "publish with no subscribers");
            return;
        };
        for handler in handlers {
            (handler.borrow_mut())(event);
        }
    }

    /// Number of handlers currently registered for `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.handlers.borrow().get(&topic).map_or(0, Vec::len)
    }
}
