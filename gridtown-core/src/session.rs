//! Chat session store and state machine.
//!
//! One [`ChatStore`] owns every transcript and the single active-session
//! pointer. The chat UI is visible if and only if a session is active.
//!
//! Lifecycle: `Idle → AwaitingInput` (open) `→ WaitingForResponse` (send)
//! `→ AwaitingInput` (reply lands) `→ Idle` (close). Close is reachable
//! from any phase and always returns to `Idle`.
//!
//! Late completions — a typing timer or a reply that fires after the
//! session it belonged to was closed — are discarded: every completion
//! carries the [`SessionToken`] it was issued under, and a stale token is
//! dropped with a debug log. Close additionally strips any pending typing
//! placeholder from the transcript, so reopening an agent never shows an
//! orphaned placeholder.

use std::collections::HashMap;

use tracing::debug;

use crate::types::{AgentId, ChatMessage};

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Generation counter distinguishing the current session from closed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionToken(u64);

/// Sequence number for one outgoing user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TurnId(u64);

/// Where the active session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No session; the world owns the keyboard.
    #[default]
    Idle,
    /// A session is open and the input is waiting for the player.
    AwaitingInput,
    /// A user message went out and its reply has not landed yet. The
    /// player may keep typing; sends are not blocked in this phase.
    WaitingForResponse,
}

/// A user message accepted by the store, to be handed to response
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// The agent the message was sent to.
    pub agent: AgentId,
    /// The raw text as typed (whitespace preserved).
    pub text: String,
    /// Session generation this message belongs to.
    pub token: SessionToken,
    /// This message's turn.
    pub turn: TurnId,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Owns every transcript, keyed by agent identity, plus the active-session
/// pointer. Created at application start and torn down at exit; transcripts
/// are created lazily on first interaction and kept for the whole UI
/// session so a reopened chat shows its history.
#[derive(Debug, Default)]
pub struct ChatStore {
    transcripts: HashMap<AgentId, Vec<ChatMessage>>,
    active: Option<AgentId>,
    phase: SessionPhase,
    generation: u64,
    next_turn: u64,
    /// Turn still waiting for its reply, if any. Guards placeholder
    /// insertion: a typing timer whose turn was already answered is
    /// ignored, so a fast reply can never be followed by an orphaned
    /// placeholder.
    awaiting: Option<TurnId>,
}

impl ChatStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session with `agent`, creating its transcript if this is the
    /// first interaction.
    ///
    /// Idempotent while the same agent is active: re-opening neither
    /// resets the transcript nor bumps the session generation. Opening
    /// over a session with a different agent closes that session first.
    pub fn open(&mut self, agent: &AgentId) -> SessionToken {
        if self.active.as_ref() == Some(agent) {
            return SessionToken(self.generation);
        }
        if self.active.is_some() {
            self.close();
        }
        self.transcripts.entry(agent.clone()).or_default();
        self.active = Some(agent.clone());
        self.phase = SessionPhase::AwaitingInput;
        debug!(agent = %agent, "chat opened");
        SessionToken(self.generation)
    }

    /// Close the active session. Safe to call from any phase; a no-op when
    /// idle. The transcript survives for later reopening, minus any
    /// pending typing placeholder.
    pub fn close(&mut self) {
        let Some(agent) = self.active.take() else {
            return;
        };
        if let Some(transcript) = self.transcripts.get_mut(&agent) {
            transcript.retain(|message| !message.is_typing());
        }
        self.phase = SessionPhase::Idle;
        self.awaiting = None;
        self.generation += 1;
        debug!(agent = %agent, "chat closed");
    }

    /// Append a user message to the active transcript and hand it back for
    /// response resolution.
    ///
    /// Returns `None` — with no transcript mutation and no resolution —
    /// when the text is empty after trimming or when no session is active.
    pub fn append_user(&mut self, text: &str) -> Option<OutboundMessage> {
        if text.trim().is_empty() {
            debug!("dropping empty chat message");
            return None;
        }
        let agent = self.active.clone()?;
        self.transcripts
            .entry(agent.clone())
            .or_default()
            .push(ChatMessage::user(text));

        let turn = TurnId(self.next_turn);
        self.next_turn += 1;
        self.awaiting = Some(turn);
        self.phase = SessionPhase::WaitingForResponse;

        Some(OutboundMessage {
            agent,
            text: text.to_string(),
            token: SessionToken(self.generation),
            turn,
        })
    }

    /// Insert the typing placeholder for `turn`. Dropped when the session
    /// it belonged to is gone, or when the reply already landed.
    pub fn begin_typing(&mut self, agent: &AgentId, token: SessionToken, turn: TurnId) -> bool {
        if !self.token_is_current(token) {
            debug!(agent = %agent, "typing timer for a closed session, dropping");
            return false;
        }
        if self.awaiting != Some(turn) {
            return false;
        }
        self.transcripts
            .entry(agent.clone())
            .or_default()
            .push(ChatMessage::Typing);
        true
    }

    /// Append an agent reply, removing the typing placeholder in the same
    /// step. Placeholders are removed by filtering, so the transcript is
    /// correct even if more than one was somehow queued.
    ///
    /// Returns `false` (and leaves every transcript untouched) for a reply
    /// whose session has been closed.
    pub fn append_agent(
        &mut self,
        agent: &AgentId,
        text: impl Into<String>,
        token: SessionToken,
        turn: TurnId,
    ) -> bool {
        if !self.token_is_current(token) {
            debug!(agent = %agent, "reply for a closed session, dropping");
            return false;
        }
        let transcript = self.transcripts.entry(agent.clone()).or_default();
        transcript.retain(|message| !message.is_typing());
        transcript.push(ChatMessage::agent(text));
        self.finish_turn(agent, turn);
        true
    }

    /// Record that `turn` failed: the placeholder is cleared and the
    /// session stays usable, but no agent message is appended.
    pub fn fail_turn(&mut self, agent: &AgentId, token: SessionToken, turn: TurnId) -> bool {
        if !self.token_is_current(token) {
            return false;
        }
        if let Some(transcript) = self.transcripts.get_mut(agent) {
            transcript.retain(|message| !message.is_typing());
        }
        self.finish_turn(agent, turn);
        true
    }

    fn finish_turn(&mut self, agent: &AgentId, turn: TurnId) {
        if self.awaiting == Some(turn) {
            self.awaiting = None;
            if self.active.as_ref() == Some(agent) {
                self.phase = SessionPhase::AwaitingInput;
            }
        }
    }

    fn token_is_current(&self, token: SessionToken) -> bool {
        token == SessionToken(self.generation)
    }

    /// The currently active agent, if any. The chat UI is visible exactly
    /// when this is `Some`.
    #[must_use]
    pub fn active(&self) -> Option<&AgentId> {
        self.active.as_ref()
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The transcript for `agent`, if one was ever created.
    #[must_use]
    pub fn transcript(&self, agent: &AgentId) -> Option<&[ChatMessage]> {
        self.transcripts.get(agent).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marcus() -> AgentId {
        AgentId::from("Marcus")
    }

    #[test]
    fn open_is_idempotent() {
        let mut store = ChatStore::new();
        let first = store.open(&marcus());
        store.append_user("hi");
        let second = store.open(&marcus());

        assert_eq!(first, second);
        assert_eq!(store.transcript(&marcus()).map(<[_]>::len), Some(1));
        assert_eq!(store.active(), Some(&marcus()));
    }

    #[test]
    fn open_over_another_agent_switches_session() {
        let mut store = ChatStore::new();
        let first = store.open(&marcus());
        let second = store.open(&AgentId::from("Julie"));

        assert_ne!(first, second);
        assert_eq!(store.active(), Some(&AgentId::from("Julie")));
        // Marcus's transcript survives.
        assert!(store.transcript(&marcus()).is_some());
    }

    #[test]
    fn empty_and_whitespace_input_is_a_noop() {
        let mut store = ChatStore::new();
        store.open(&marcus());

        assert!(store.append_user("").is_none());
        assert!(store.append_user("   ").is_none());
        assert_eq!(store.transcript(&marcus()).map(<[_]>::len), Some(0));
        assert_eq!(store.phase(), SessionPhase::AwaitingInput);
    }

    #[test]
    fn send_without_active_session_is_a_noop() {
        let mut store = ChatStore::new();
        assert!(store.append_user("hello?").is_none());
        assert!(store.transcript(&marcus()).is_none());
    }

    #[test]
    fn typing_placeholder_lifecycle() {
        let mut store = ChatStore::new();
        store.open(&marcus());
        let out = store.append_user("hi").expect("accepted");
        assert_eq!(store.phase(), SessionPhase::WaitingForResponse);

        assert!(store.begin_typing(&out.agent, out.token, out.turn));
        assert_eq!(
            store.transcript(&marcus()),
            Some(&[ChatMessage::user("hi"), ChatMessage::Typing][..])
        );

        assert!(store.append_agent(&out.agent, "Hello!", out.token, out.turn));
        assert_eq!(
            store.transcript(&marcus()),
            Some(&[ChatMessage::user("hi"), ChatMessage::agent("Hello!")][..])
        );
        assert_eq!(store.phase(), SessionPhase::AwaitingInput);
    }

    #[test]
    fn typing_after_reply_is_ignored() {
        let mut store = ChatStore::new();
        store.open(&marcus());
        let out = store.append_user("hi").expect("accepted");

        // Remote reply lands before the typing timer fires.
        assert!(store.append_agent(&out.agent, "Hello!", out.token, out.turn));
        assert!(!store.begin_typing(&out.agent, out.token, out.turn));

        let transcript = store.transcript(&marcus()).expect("transcript");
        assert!(transcript.iter().all(|m| !m.is_typing()));
    }

    #[test]
    fn close_discards_pending_typing_and_late_reply() {
        let mut store = ChatStore::new();
        store.open(&AgentId::from("Julie"));
        let out = store.append_user("hello").expect("accepted");
        store.begin_typing(&out.agent, out.token, out.turn);

        store.close();
        assert_eq!(store.active(), None);
        assert_eq!(store.phase(), SessionPhase::Idle);

        // The delayed reply resolves after close: discarded.
        assert!(!store.append_agent(&out.agent, "Hey there!", out.token, out.turn));
        // Its typing timer fires even later: also discarded.
        assert!(!store.begin_typing(&out.agent, out.token, out.turn));

        // Reopen: history kept, no orphaned placeholder, no ghost reply.
        store.open(&AgentId::from("Julie"));
        assert_eq!(
            store.transcript(&AgentId::from("Julie")),
            Some(&[ChatMessage::user("hello")][..])
        );
    }

    #[test]
    fn reply_filter_removes_every_placeholder() {
        let mut store = ChatStore::new();
        store.open(&marcus());
        let first = store.append_user("one").expect("accepted");
        store.begin_typing(&first.agent, first.token, first.turn);
        let second = store.append_user("two").expect("accepted");
        store.begin_typing(&second.agent, second.token, second.turn);

        store.append_agent(&marcus(), "Hello!", second.token, second.turn);
        let transcript = store.transcript(&marcus()).expect("transcript");
        assert!(transcript.iter().all(|m| !m.is_typing()));
    }

    #[test]
    fn failed_turn_clears_placeholder_and_keeps_session() {
        let mut store = ChatStore::new();
        store.open(&AgentId::from("Sara"));
        let out = store.append_user("hi").expect("accepted");
        store.begin_typing(&out.agent, out.token, out.turn);

        assert!(store.fail_turn(&out.agent, out.token, out.turn));
        assert_eq!(store.phase(), SessionPhase::AwaitingInput);
        assert_eq!(
            store.transcript(&AgentId::from("Sara")),
            Some(&[ChatMessage::user("hi")][..])
        );

        // The player can keep typing.
        assert!(store.append_user("are you there?").is_some());
    }

    #[test]
    fn close_from_ready_state_reaches_idle() {
        let mut store = ChatStore::new();
        store.open(&marcus());
        store.close();
        assert_eq!(store.phase(), SessionPhase::Idle);
        // Closing again is harmless.
        store.close();
        assert_eq!(store.phase(), SessionPhase::Idle);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Whatever text is sent, after a close no transcript retains
            /// a typing placeholder.
            #[test]
            fn close_never_leaves_placeholders(texts in proptest::collection::vec(".{0,12}", 0..8)) {
                let mut store = ChatStore::new();
                store.open(&AgentId::from("Marcus"));
                for text in &texts {
                    if let Some(out) = store.append_user(text) {
                        store.begin_typing(&out.agent, out.token, out.turn);
                    }
                }
                store.close();
                let transcript = store.transcript(&AgentId::from("Marcus")).expect("transcript");
                prop_assert!(transcript.iter().all(|m| !m.is_typing()));
            }

            /// Whitespace-only input never mutates a transcript.
            #[test]
            fn whitespace_is_never_appended(spaces in "[ \\t]{0,10}") {
                let mut store = ChatStore::new();
                store.open(&AgentId::from("Alan"));
                prop_assert!(store.append_user(&spaces).is_none());
                prop_assert_eq!(store.transcript(&AgentId::from("Alan")).map(<[_]>::len), Some(0));
            }
        }
    }
}
