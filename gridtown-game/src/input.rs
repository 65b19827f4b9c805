//! Keyboard-side logic: interact-key edge detection and the gate that
//! suspends world input while the chat input has focus.

use gridtown_core::bus::Event;

/// Tracks one key across ticks and reports the down *transition*.
///
/// The interact key must be edge-triggered: holding it across N ticks
/// while adjacent to an agent yields one interaction, not N.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyEdge {
    was_down: bool,
}

impl KeyEdge {
    /// Fresh tracker; the key is considered up.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed this tick's level state. Returns `true` only on the tick the
    /// key went down.
    pub fn update(&mut self, is_down: bool) -> bool {
        let pressed = is_down && !self.was_down;
        self.was_down = is_down;
        pressed
    }
}

/// World-input gate, fed from bus events.
///
/// While the chat input has focus the world must ignore movement and
/// interaction keys; `chat-closed` re-enables them even when no blur
/// event fired.
#[derive(Debug, Clone, Copy)]
pub struct InputGate {
    enabled: bool,
}

impl InputGate {
    /// World input starts enabled.
    #[must_use]
    pub fn new() -> Self {
        Self { enabled: true }
    }

    /// Apply a bus event.
    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::DisableGameInput => self.enabled = false,
            Event::EnableGameInput | Event::ChatClosed => self.enabled = true,
            _ => {}
        }
    }

    /// Whether the world may read movement/interaction keys this tick.
    #[must_use]
    pub fn world_input_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for InputGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_key_fires_once() {
        let mut key = KeyEdge::new();
        let fired: usize = (0..10).map(|_| usize::from(key.update(true))).sum();
        assert_eq!(fired, 1);
    }

    #[test]
    fn release_then_press_fires_again() {
        let mut key = KeyEdge::new();
        assert!(key.update(true));
        assert!(!key.update(true));
        assert!(!key.update(false));
        assert!(key.update(true));
    }

    #[test]
    fn gate_follows_focus_events() {
        let mut gate = InputGate::new();
        assert!(gate.world_input_enabled());

        gate.handle_event(&Event::DisableGameInput);
        assert!(!gate.world_input_enabled());

        gate.handle_event(&Event::EnableGameInput);
        assert!(gate.world_input_enabled());
    }

    #[test]
    fn chat_closed_re_enables_without_blur() {
        let mut gate = InputGate::new();
        gate.handle_event(&Event::DisableGameInput);

        // The panel was closed but the input never blurred.
        gate.handle_event(&Event::ChatClosed);
        assert!(gate.world_input_enabled());
    }
}
