//! Overlay allocation and placement against the primary surface.

use core_render::{Coord, Rect, ScreenBuffer};
use tracing::debug;

use crate::error::{ImeError, Result};
use crate::host::PrimarySurface;
use crate::overlay::{Overlay, OverlayId, OverlayMode};
use crate::registry::OverlayRegistry;

/// Create an overlay backing buffer of `buffer_size` cells shaped after the
/// primary surface. Overlay cursors are never rendered.
pub fn allocate(surface: Option<&dyn PrimarySurface>, buffer_size: Coord) -> Result<ScreenBuffer> {
    let surface = surface.ok_or(ImeError::NoActiveSurface)?;
    if buffer_size.x <= 0 || buffer_size.y <= 0 {
        return Err(ImeError::InvalidArgument("overlay buffer size must be positive"));
    }
    let mut buffer = ScreenBuffer::new(
        surface.window_size(),
        surface.font_size(),
        buffer_size,
        surface.attributes(),
        surface.popup_attributes(),
        0,
    )?;
    buffer.cursor_mut().conversion_area = true;
    Ok(buffer)
}

impl OverlayRegistry {
    /// Allocate an overlay, set its placement and append it to the chain.
    /// A failed allocation leaves the chain untouched.
    pub fn place(
        &mut self,
        surface: Option<&dyn PrimarySurface>,
        buffer_size: Coord,
        view_rect: Rect,
        view_offset: Coord,
        mode: OverlayMode,
    ) -> Result<OverlayId> {
        let buffer = allocate(surface, buffer_size)?;
        self.overlays
            .try_reserve(1)
            .map_err(|_| ImeError::OutOfMemory)?;
        let id = OverlayId(self.overlays.len());
        self.overlays
            .push(Overlay::new(buffer, view_rect, view_offset, mode));
        if let Some(surface) = surface {
            let attr = surface.attributes();
            for overlay in &mut self.overlays {
                overlay.buffer.set_attributes(attr);
            }
        }
        debug!(
            target: "ime.factory",
            id = id.0,
            width = buffer_size.x,
            height = buffer_size.y,
            ?view_rect,
            ?view_offset,
            "overlay_linked"
        );
        Ok(id)
    }

    /// Append a hidden, window-wide, one-row overlay to the composition set.
    pub fn create_composition_row(
        &mut self,
        surface: Option<&dyn PrimarySurface>,
    ) -> Result<OverlayId> {
        let width = surface.ok_or(ImeError::NoActiveSurface)?.window_size().x;
        self.composition
            .try_reserve(1)
            .map_err(|_| ImeError::OutOfMemory)?;
        let id = self.place(
            surface,
            Coord::new(width, 1),
            Rect::new(0, 0, 0, 0),
            Coord::ORIGIN,
            OverlayMode::HIDDEN,
        )?;
        self.composition.push(id);
        debug!(
            target: "ime.factory",
            id = id.0,
            row = self.composition.len() - 1,
            "composition_row_created"
        );
        Ok(id)
    }
}
