//! A single overlay: a private screen buffer plus where it sits on screen.
//!
//! Coordinates:
//! * `view_rect` is inclusive and local to the overlay buffer.
//! * `view_offset` anchors `view_rect` in primary view-relative coordinates.
//! * The absolute (primary buffer) footprint is
//!   `view_rect` translated by viewport origin + `view_offset`.
//!
//! An overlay whose `view_rect` is inverted is empty; redraw skips it.

use bitflags::bitflags;
use core_render::{Coord, Rect, ScreenBuffer};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OverlayMode: u32 {
        /// Not composited onto the primary surface.
        const HIDDEN = 0x0001;
    }
}

/// Handle into the registry's overlay arena. Stable for the registry's life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub(crate) usize);

impl OverlayId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct Overlay {
    pub(crate) buffer: ScreenBuffer,
    pub(crate) mode: OverlayMode,
    pub(crate) view_rect: Rect,
    pub(crate) view_offset: Coord,
    pub(crate) buffer_size: Coord,
}

impl Overlay {
    pub(crate) fn new(
        buffer: ScreenBuffer,
        view_rect: Rect,
        view_offset: Coord,
        mode: OverlayMode,
    ) -> Self {
        let buffer_size = buffer.size();
        Self {
            buffer,
            mode,
            view_rect,
            view_offset,
            buffer_size,
        }
    }

    pub fn buffer(&self) -> &ScreenBuffer {
        &self.buffer
    }

    pub fn mode(&self) -> OverlayMode {
        self.mode
    }

    pub fn is_hidden(&self) -> bool {
        self.mode.contains(OverlayMode::HIDDEN)
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        self.mode.set(OverlayMode::HIDDEN, hidden);
    }

    pub fn view_rect(&self) -> Rect {
        self.view_rect
    }

    pub fn view_offset(&self) -> Coord {
        self.view_offset
    }

    pub fn buffer_size(&self) -> Coord {
        self.buffer_size
    }

    /// Footprint in primary buffer coordinates for a viewport at `viewport_origin`.
    pub fn absolute_rect(&self, viewport_origin: Coord) -> Rect {
        self.view_rect.translate(viewport_origin + self.view_offset)
    }
}
