//! Composition protocol entry points.
//!
//! Each payload is handled as one of two states with no transition history:
//! determined (composition ended, possibly with committed text) or in
//! progress (pending text to lay out). Committed text becomes ordinary typed
//! input, one key-down per char, enqueued as a single batch.

use core_events::KeyEvent;
use core_render::{Coord, Rect};
use tracing::debug;

use crate::error::Result;
use crate::host::ImeHost;
use crate::message::CompositionMessage;
use crate::registry::OverlayRegistry;

/// Messages delivered by the platform IME transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImeMessage {
    StartComposition,
    EndComposition,
    /// Raw composition update payload.
    Composition(Vec<u8>),
}

impl OverlayRegistry {
    pub fn handle_message(&mut self, host: &mut ImeHost<'_>, message: ImeMessage) -> Result<()> {
        match message {
            ImeMessage::StartComposition => {
                debug!(target: "ime.handler", "composition_started");
                host.input.set_in_composition(true);
                Ok(())
            }
            ImeMessage::EndComposition => {
                debug!(target: "ime.handler", "composition_ended");
                host.input.set_in_composition(false);
                Ok(())
            }
            ImeMessage::Composition(bytes) => match CompositionMessage::decode(&bytes) {
                Ok(msg) => {
                    self.saved = Some(msg.clone());
                    self.on_composition_update(host, &msg)
                }
                Err(e) => {
                    debug!(target: "ime.message", len = bytes.len(), error = %e, "payload_dropped");
                    Ok(())
                }
            },
        }
    }

    pub fn on_composition_update(
        &mut self,
        host: &mut ImeHost<'_>,
        msg: &CompositionMessage,
    ) -> Result<()> {
        if msg.is_determined() {
            debug!(
                target: "ime.handler",
                result = msg.result.as_ref().map_or(0, Vec::len),
                "composition_determined"
            );
            if self.saved_cursor_visible {
                self.saved_cursor_visible = false;
                if let Some(surface) = host.surface.as_deref_mut() {
                    surface.set_cursor_visible(true);
                }
            }
            self.clear_visible_composition(host)?;
            if let Some(result) = msg.result.as_deref().filter(|r| !r.is_empty()) {
                let modifiers = host.input.control_key_state();
                let events: Vec<KeyEvent> = result
                    .iter()
                    .map(|&ch| KeyEvent::typed(ch, modifiers))
                    .collect();
                host.input.enqueue(events);
            }
            self.saved = None;
            return Ok(());
        }

        debug!(target: "ime.handler", pending = msg.pending.len(), "composition_in_progress");
        if let Some(surface) = host.surface.as_deref_mut() {
            if surface.cursor_visible() {
                self.saved_cursor_visible = true;
                surface.set_cursor_visible(false);
            }
        }
        self.clear_visible_composition(host)?;
        self.stream_composition(host, &msg.pending, &msg.attrs, &msg.colors)?;
        Ok(())
    }

    /// Re-lay out the saved composition against the current window.
    pub fn on_viewport_resize(&mut self, host: &mut ImeHost<'_>, new_size: Coord) -> Result<()> {
        let Some(msg) = self.saved.clone() else {
            return Ok(());
        };
        debug!(target: "ime.handler", width = new_size.x, height = new_size.y, "viewport_resized");
        self.clear_visible_composition(host)?;
        self.stream_composition(host, &msg.pending, &msg.attrs, &msg.colors)?;
        Ok(())
    }

    /// Resize every composition overlay buffer and clamp its shown region.
    pub fn on_buffer_resize(&mut self, host: &mut ImeHost<'_>, new_size: Coord) -> Result<()> {
        debug!(target: "ime.handler", width = new_size.x, height = new_size.y, "buffer_resized");
        for i in 0..self.composition.len() {
            let id = self.composition[i];
            let overlay = self.overlay_mut(id)?;
            if !overlay.is_hidden() {
                overlay.set_hidden(true);
                self.paint(host, id);
            }
            let overlay = self.overlay_mut(id)?;
            overlay.buffer.resize(new_size)?;
            overlay.buffer_size = new_size;
            let max_x = new_size.x - 1;
            let max_y = new_size.y - 1;
            let r = overlay.view_rect;
            overlay.view_rect = Rect::new(
                r.left.min(max_x),
                r.top.min(max_y),
                r.right.min(max_x),
                r.bottom.min(max_y),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::ImeConfig;
    use core_events::{ControlKeyState, InputBuffer};
    use core_render::{InvalidationLog, ScreenBuffer, TextAttribute};

    const COLORS: [u16; 8] = [0x07; 8];

    fn primary() -> ScreenBuffer {
        ScreenBuffer::new(
            Coord::new(20, 5),
            Coord::new(8, 16),
            Coord::new(20, 20),
            TextAttribute::DEFAULT,
            TextAttribute::DEFAULT,
            25,
        )
        .unwrap()
    }

    fn pending(text: &str) -> ImeMessage {
        let chars: Vec<char> = text.chars().collect();
        let attrs = vec![0; chars.len()];
        let bytes = CompositionMessage::in_progress(chars, attrs, COLORS)
            .encode()
            .unwrap();
        ImeMessage::Composition(bytes)
    }

    #[test]
    fn start_and_end_toggle_input_flag() {
        let mut p = primary();
        let mut log = InvalidationLog::new();
        let mut input = InputBuffer::new();
        let mut reg = OverlayRegistry::new(ImeConfig::default());
        {
            let mut host = ImeHost::new(&mut p, &mut log, &mut input);
            reg.handle_message(&mut host, ImeMessage::StartComposition).unwrap();
        }
        assert!(input.in_composition());
        {
            let mut host = ImeHost::new(&mut p, &mut log, &mut input);
            reg.handle_message(&mut host, ImeMessage::EndComposition).unwrap();
        }
        assert!(!input.in_composition());
    }

    #[test]
    fn in_progress_hides_cursor_and_commit_restores_it() {
        let mut p = primary();
        let mut log = InvalidationLog::new();
        let mut input = InputBuffer::new();
        let mut reg = OverlayRegistry::new(ImeConfig::default());
        {
            let mut host = ImeHost::new(&mut p, &mut log, &mut input);
            reg.handle_message(&mut host, pending("ka")).unwrap();
        }
        assert!(!p.cursor().visible);
        assert!(reg.cursor_suppressed());
        assert!(reg.saved().is_some());
        assert_eq!(reg.visible_composition_rows(), 1);

        input.set_modifiers(ControlKeyState::SHIFT);
        let commit = CompositionMessage::committed("か".chars().collect()).encode().unwrap();
        {
            let mut host = ImeHost::new(&mut p, &mut log, &mut input);
            reg.handle_message(&mut host, ImeMessage::Composition(commit)).unwrap();
        }
        assert!(p.cursor().visible);
        assert!(reg.saved().is_none());
        assert_eq!(reg.visible_composition_rows(), 0);
        let events = input.drain();
        assert_eq!(events, vec![KeyEvent::typed('か', ControlKeyState::SHIFT)]);
    }

    #[test]
    fn malformed_payload_has_no_effect() {
        let mut p = primary();
        let mut log = InvalidationLog::new();
        let mut input = InputBuffer::new();
        let mut reg = OverlayRegistry::new(ImeConfig::default());
        {
            let mut host = ImeHost::new(&mut p, &mut log, &mut input);
            reg.handle_message(&mut host, ImeMessage::Composition(vec![1, 2, 3]))
                .unwrap();
        }
        assert!(reg.is_empty());
        assert!(reg.saved().is_none());
        assert!(log.is_empty());
        assert!(p.cursor().visible);
    }

    #[test]
    fn viewport_resize_without_saved_payload_is_noop() {
        let mut p = primary();
        let mut log = InvalidationLog::new();
        let mut input = InputBuffer::new();
        let mut reg = OverlayRegistry::new(ImeConfig::default());
        let mut host = ImeHost::new(&mut p, &mut log, &mut input);
        reg.on_viewport_resize(&mut host, Coord::new(30, 5)).unwrap();
        assert!(reg.is_empty());
    }

    #[test]
    fn buffer_resize_hides_and_clamps() {
        let mut p = primary();
        let mut log = InvalidationLog::new();
        let mut input = InputBuffer::new();
        let mut reg = OverlayRegistry::new(ImeConfig::default());
        {
            let mut host = ImeHost::new(&mut p, &mut log, &mut input);
            reg.handle_message(&mut host, pending("abcdefgh")).unwrap();
            reg.on_buffer_resize(&mut host, Coord::new(4, 2)).unwrap();
        }
        let o = reg.overlay(reg.composition()[0]).unwrap();
        assert!(o.is_hidden());
        assert_eq!(o.view_rect(), Rect::new(0, 0, 3, 0));
        assert_eq!(o.buffer_size(), Coord::new(4, 2));
        assert_eq!(o.buffer().size(), Coord::new(4, 2));
    }
}
