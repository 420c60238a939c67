//! Placement of the IME candidate/suggestion popup.

use core_render::Coord;

use crate::host::PrimarySurface;
use crate::registry::OverlayRegistry;

/// Screen-space pixel rectangle, exclusive on the right and bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// Popup anchored one cell right of `cursor` (window cells), one font cell
/// tall and `width_cells` wide. `to_screen` maps client pixels to screen.
pub fn suggestion_window_rect(
    cursor: Coord,
    font: Coord,
    to_screen: impl FnOnce(Coord) -> Coord,
    width_cells: u16,
) -> PixelRect {
    let client = Coord::new(
        cursor.x.saturating_add(1).saturating_mul(font.x),
        cursor.y.saturating_mul(font.y),
    );
    let at = to_screen(client);
    PixelRect {
        left: at.x,
        top: at.y,
        right: at.x.saturating_add(font.x.saturating_mul(i32::from(width_cells))),
        bottom: at.y.saturating_add(font.y),
    }
}

impl OverlayRegistry {
    /// Suggestion popup for the surface cursor, sized from configuration.
    pub fn suggestion_rect(
        &self,
        surface: &dyn PrimarySurface,
        to_screen: impl FnOnce(Coord) -> Coord,
    ) -> PixelRect {
        let cursor = surface.cursor_position() - surface.viewport().origin();
        suggestion_window_rect(
            cursor,
            surface.font_size(),
            to_screen,
            self.config().suggestion_width_cells,
        )
    }
}
