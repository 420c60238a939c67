//! Compositor queries: what a renderer sees at a screen cell.

use core_render::{CellDecoration, Coord, Rect, ScreenBuffer, TextAttribute};

use crate::registry::OverlayRegistry;

/// A composited cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub decoration: CellDecoration,
    pub attr: TextAttribute,
}

impl From<(char, CellDecoration, TextAttribute)> for Cell {
    fn from((ch, decoration, attr): (char, CellDecoration, TextAttribute)) -> Self {
        Self {
            ch,
            decoration,
            attr,
        }
    }
}

impl OverlayRegistry {
    /// Cell of the last-linked visible overlay covering absolute position
    /// `at` for a viewport `viewport`, if any.
    pub fn overlay_cell_at(&self, viewport: Rect, at: Coord) -> Option<Cell> {
        self.overlays
            .iter()
            .rev()
            .filter(|o| !o.is_hidden())
            .find_map(|o| {
                let abs = o.absolute_rect(viewport.origin());
                if !abs.is_valid() || !abs.contains(at) {
                    return None;
                }
                let local = at - abs.origin() + o.view_rect().origin();
                o.buffer().cell(local).map(Cell::from)
            })
    }

    /// Row `y` of `primary` with visible overlays composited on top.
    pub fn composite_row(&self, primary: &ScreenBuffer, y: i32) -> Vec<Cell> {
        let viewport = primary.viewport();
        (0..primary.size().x)
            .filter_map(|x| {
                let at = Coord::new(x, y);
                self.overlay_cell_at(viewport, at)
                    .or_else(|| primary.cell(at).map(Cell::from))
            })
            .collect()
    }

    /// Composited row as text: trailing halves skipped, trailing blanks trimmed.
    pub fn composite_text(&self, primary: &ScreenBuffer, y: i32) -> String {
        let text: String = self
            .composite_row(primary, y)
            .iter()
            .filter(|c| !c.decoration.contains(CellDecoration::TRAILING))
            .map(|c| c.ch)
            .collect();
        text.trim_end().to_string()
    }
}
