//! Collaborators the overlay core talks to.
//!
//! The core never owns the primary surface, the renderer or the input queue;
//! every entry point receives them bundled in an `ImeHost`. The surface is
//! optional: a console with no current screen buffer still accepts
//! composition messages, they just cannot anchor overlays.

use core_events::InputQueue;
use core_render::{Coord, Rect, Renderer, ScreenBuffer, TextAttribute};

/// What the core reads from (and asks of) the primary grid surface.
pub trait PrimarySurface {
    fn viewport(&self) -> Rect;
    fn set_viewport_origin(&mut self, origin: Coord);
    fn window_size(&self) -> Coord;
    fn attributes(&self) -> TextAttribute;
    fn popup_attributes(&self) -> TextAttribute;
    fn font_size(&self) -> Coord;
    /// Only the active (front) surface forwards overlay invalidations.
    fn is_active(&self) -> bool;
    fn cursor_position(&self) -> Coord;
    fn cursor_visible(&self) -> bool;
    fn set_cursor_visible(&mut self, visible: bool);
    /// Redraw buffer region `rect` (inclusive) from the surface's own content.
    fn write_to_screen(&mut self, rect: Rect);
}

impl PrimarySurface for ScreenBuffer {
    fn viewport(&self) -> Rect {
        ScreenBuffer::viewport(self)
    }

    fn set_viewport_origin(&mut self, origin: Coord) {
        ScreenBuffer::set_viewport_origin(self, origin);
    }

    fn window_size(&self) -> Coord {
        ScreenBuffer::window_size(self)
    }

    fn attributes(&self) -> TextAttribute {
        ScreenBuffer::attributes(self)
    }

    fn popup_attributes(&self) -> TextAttribute {
        ScreenBuffer::popup_attributes(self)
    }

    fn font_size(&self) -> Coord {
        ScreenBuffer::font_size(self)
    }

    fn is_active(&self) -> bool {
        ScreenBuffer::is_active(self)
    }

    fn cursor_position(&self) -> Coord {
        self.cursor().position
    }

    fn cursor_visible(&self) -> bool {
        self.cursor().visible
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_mut().visible = visible;
    }

    fn write_to_screen(&mut self, rect: Rect) {
        ScreenBuffer::write_to_screen(self, rect);
    }
}

pub struct ImeHost<'a> {
    pub surface: Option<&'a mut dyn PrimarySurface>,
    pub renderer: &'a mut dyn Renderer,
    pub input: &'a mut dyn InputQueue,
}

impl<'a> ImeHost<'a> {
    pub fn new(
        surface: &'a mut dyn PrimarySurface,
        renderer: &'a mut dyn Renderer,
        input: &'a mut dyn InputQueue,
    ) -> Self {
        Self {
            surface: Some(surface),
            renderer,
            input,
        }
    }

    /// Host with no primary surface (console between screen buffers).
    pub fn detached(renderer: &'a mut dyn Renderer, input: &'a mut dyn InputQueue) -> Self {
        Self {
            surface: None,
            renderer,
            input,
        }
    }
}
