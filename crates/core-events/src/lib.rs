//! Input event types and the queue interface committed IME text is fed into.
//!
//! Committed composition text becomes ordinary typed input: one key-down
//! event per char, zero virtual-key and scan code, enqueued as a single batch
//! so readers never observe half of a committed string.

use std::collections::VecDeque;
use std::fmt;

bitflags::bitflags! {
    /// Modifier / toggle state attached to every key event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ControlKeyState: u32 {
        const RIGHT_ALT    = 0x0001;
        const LEFT_ALT     = 0x0002;
        const RIGHT_CTRL   = 0x0004;
        const LEFT_CTRL    = 0x0008;
        const SHIFT        = 0x0010;
        const NUM_LOCK     = 0x0020;
        const SCROLL_LOCK  = 0x0040;
        const CAPS_LOCK    = 0x0080;
        const ENHANCED_KEY = 0x0100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key_down: bool,
    pub virtual_key: u16,
    pub scan_code: u16,
    pub modifiers: ControlKeyState,
    pub character: char,
    pub repeat_count: u16,
}

impl KeyEvent {
    /// Key-down carrying only a character, as produced for committed text.
    pub fn typed(character: char, modifiers: ControlKeyState) -> Self {
        Self {
            key_down: true,
            virtual_key: 0,
            scan_code: 0,
            modifiers,
            character,
            repeat_count: 1,
        }
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = if self.key_down { "down" } else { "up" };
        write!(f, "{dir}:{:?}{:?}", self.character, self.modifiers)
    }
}

/// Destination for synthesized input. Implementations must preserve the
/// order of `events` and append them atomically.
pub trait InputQueue {
    /// Modifier state at the time of the call.
    fn control_key_state(&self) -> ControlKeyState;
    fn enqueue(&mut self, events: Vec<KeyEvent>);
    /// Toggled by composition start / end notifications.
    fn set_in_composition(&mut self, active: bool);
}

/// In-memory input buffer.
#[derive(Debug, Default)]
pub struct InputBuffer {
    events: VecDeque<KeyEvent>,
    modifiers: ControlKeyState,
    in_composition: bool,
    batches: usize,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_modifiers(&mut self, modifiers: ControlKeyState) {
        self.modifiers = modifiers;
    }

    pub fn in_composition(&self) -> bool {
        self.in_composition
    }

    /// Number of `enqueue` calls observed.
    pub fn batches(&self) -> usize {
        self.batches
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn pop(&mut self) -> Option<KeyEvent> {
        self.events.pop_front()
    }

    pub fn drain(&mut self) -> Vec<KeyEvent> {
        self.events.drain(..).collect()
    }
}

impl InputQueue for InputBuffer {
    fn control_key_state(&self) -> ControlKeyState {
        self.modifiers
    }

    fn enqueue(&mut self, events: Vec<KeyEvent>) {
        tracing::trace!(target: "input.queue", count = events.len(), "enqueue_batch");
        self.batches += 1;
        self.events.extend(events);
    }

    fn set_in_composition(&mut self, active: bool) {
        tracing::debug!(target: "input.queue", active, "in_composition");
        self.in_composition = active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_event_defaults() {
        let ev = KeyEvent::typed('x', ControlKeyState::SHIFT);
        assert!(ev.key_down);
        assert_eq!(ev.virtual_key, 0);
        assert_eq!(ev.scan_code, 0);
        assert_eq!(ev.repeat_count, 1);
        assert_eq!(ev.modifiers, ControlKeyState::SHIFT);
    }

    #[test]
    fn key_event_display() {
        let ev = KeyEvent::typed('a', ControlKeyState::LEFT_CTRL);
        let s = format!("{}", ev);
        assert!(s.starts_with("down"));
        assert!(s.contains("'a'"));
    }

    #[test]
    fn enqueue_preserves_order_and_counts_batches() {
        let mut q = InputBuffer::new();
        q.enqueue(vec![
            KeyEvent::typed('a', ControlKeyState::empty()),
            KeyEvent::typed('b', ControlKeyState::empty()),
        ]);
        q.enqueue(vec![KeyEvent::typed('c', ControlKeyState::empty())]);
        assert_eq!(q.batches(), 2);
        let chars: Vec<char> = q.drain().into_iter().map(|e| e.character).collect();
        assert_eq!(chars, vec!['a', 'b', 'c']);
        assert!(q.is_empty());
    }

    #[test]
    fn composition_flag_toggles() {
        let mut q = InputBuffer::new();
        assert!(!q.in_composition());
        q.set_in_composition(true);
        assert!(q.in_composition());
        q.set_in_composition(false);
        assert!(!q.in_composition());
    }
}
