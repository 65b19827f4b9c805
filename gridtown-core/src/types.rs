//! Core type definitions for the gridtown chat layer.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Stable key naming an NPC/chat participant.
///
/// Identities come from static configuration and live for the whole process;
/// they are never created or destroyed at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Wrap an agent name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The raw name, as used on the wire and in configuration.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Spatial
// ---------------------------------------------------------------------------

/// Integer grid-cell coordinates.
///
/// Positions are owned and mutated by the external pathing engine; this
/// crate only ever reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    /// Cell column.
    pub x: i32,
    /// Cell row.
    pub y: i32,
}

impl GridPos {
    /// Construct a cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance `|Δx| + |Δy|` to another cell.
    #[must_use]
    pub fn manhattan_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Transcript entries
// ---------------------------------------------------------------------------

/// One transcript entry. Immutable once appended; transcript order is
/// insertion order.
///
/// Serializes with the same tagged shape the chat UI consumes, e.g.
/// `{"sender": "user", "text": "hi"}` or `{"sender": "typing"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "sender", rename_all = "lowercase")]
pub enum ChatMessage {
    /// Text the player typed.
    User {
        /// The message body.
        text: String,
    },
    /// Text produced by response resolution on behalf of an agent.
    Agent {
        /// The message body.
        text: String,
    },
    /// Transient placeholder shown while a reply is pending. Removed when
    /// the real reply lands.
    Typing,
}

impl ChatMessage {
    /// A user-sent message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::User { text: text.into() }
    }

    /// An agent reply.
    #[must_use]
    pub fn agent(text: impl Into<String>) -> Self {
        Self::Agent { text: text.into() }
    }

    /// Whether this entry is the transient typing placeholder.
    #[must_use]
    pub fn is_typing(&self) -> bool {
        matches!(self, Self::Typing)
    }

    /// The message body, if this entry carries one.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::User { text } | Self::Agent { text } => Some(text),
            Self::Typing => None,
        }
    }
}
