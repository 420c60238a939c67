//! Composition text layout across one-row overlays.
//!
//! Text is laid out starting at the edit cursor and wraps into further
//! composition rows, created lazily. If the whole text would run past the
//! last window row the start row is shifted up (`Placement::ShiftedUp`) and
//! every row is re-anchored. Sizing counts control chars as one column and
//! includes the blank left at a row end when a wide glyph wraps.
//!
//! Within a row, cells are gathered into a fixed-capacity stack chunk. A
//! chunk is flushed through the row writer when it is full, when the row
//! runs out of columns, or when the next input char carries a different
//! attribute byte, so each flush needs exactly one attribute.
//!
//! Wide glyphs take two cells and are never split across rows: one that
//! does not fit at the row edge ends the row and starts the next. Layout
//! stops once the last window row is done, so text that does not fit the
//! window is truncated there and a wide glyph at that edge is replaced per
//! `WideGlyphFallback`. A row narrower than two columns can never hold a
//! wide glyph, so the fallback applies on such rows too.

use core_config::{CHUNK_CAPACITY_MAX, CHUNK_CAPACITY_MIN, WideGlyphFallback};
use core_render::{CellDecoration, Coord, GridFlags, Rect, TextAttribute};
use core_text::{char_columns, is_full_width, padded_columns};
use tracing::debug;

use crate::error::{ImeError, Result};
use crate::host::{ImeHost, PrimarySurface};
use crate::overlay::OverlayId;
use crate::registry::OverlayRegistry;
use crate::row_writer::write_cells_to_row;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Composition starts on the cursor row.
    Normal,
    /// Start row moved up so the text fits above the window bottom.
    ShiftedUp,
}

/// Resolve a composition attribute byte: the low three bits index `colors`,
/// `0x10` requests a right vertical line and `0x20` a left one.
pub fn resolve_attribute(attr: u8, colors: &[u16; 8]) -> TextAttribute {
    let base = TextAttribute::from_legacy(colors[usize::from(attr & 0x07)]);
    if attr & 0x10 != 0 {
        base.with_grid(GridFlags::SINGLE | GridFlags::RVERTICAL)
    } else if attr & 0x20 != 0 {
        base.with_grid(GridFlags::SINGLE | GridFlags::LVERTICAL)
    } else {
        base
    }
}

struct Chunk {
    chars: [char; CHUNK_CAPACITY_MAX],
    decorations: [CellDecoration; CHUNK_CAPACITY_MAX],
    len: usize,
    capacity: usize,
}

impl Chunk {
    fn new(capacity: usize) -> Self {
        Self {
            chars: [' '; CHUNK_CAPACITY_MAX],
            decorations: [CellDecoration::empty(); CHUNK_CAPACITY_MAX],
            len: 0,
            capacity: capacity.clamp(CHUNK_CAPACITY_MIN, CHUNK_CAPACITY_MAX),
        }
    }

    fn room(&self) -> usize {
        self.capacity - self.len
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn push(&mut self, ch: char, decoration: CellDecoration) {
        self.chars[self.len] = ch;
        self.decorations[self.len] = decoration;
        self.len += 1;
    }

    fn cells(&self) -> (&[char], &[CellDecoration]) {
        (&self.chars[..self.len], &self.decorations[..self.len])
    }
}

/// View-relative cursor position, scrolling the viewport first when the
/// cursor is outside it so the cursor row becomes the bottom row.
fn cursor_in_view(surface: &mut dyn PrimarySurface) -> Coord {
    let pos = surface.cursor_position();
    let view = surface.viewport();
    if view.contains(pos) {
        return pos - view.origin();
    }
    let left = if view.left <= pos.x && pos.x <= view.right {
        view.left
    } else {
        (pos.x - (view.width() - 1)).max(0)
    };
    let top = pos.y - (view.height() - 1);
    surface.set_viewport_origin(Coord::new(left, top));
    let view = surface.viewport();
    debug!(target: "ime.stream", ?pos, ?view, "viewport_scrolled_to_cursor");
    pos - view.origin()
}

/// Columns left blank at row ends when a wide glyph moves whole to the next
/// row, for text laid out from column `x` on rows `width` columns wide.
fn wrap_padding(x: i32, text: &[char], width: i32) -> i32 {
    if width < 2 {
        return 0;
    }
    let mut col = x;
    let mut pad = 0;
    for &ch in text {
        match char_columns(ch) {
            0 => {}
            1 => col += 1,
            _ => {
                if col % width == width - 1 {
                    pad += 1;
                    col += 1;
                }
                col += 2;
            }
        }
    }
    pad
}

/// Per-row layout state shared by the chunk loop.
struct RowCursor {
    x: i32,
    width: i32,
    fallback: Option<WideGlyphFallback>,
    full: bool,
    last_wide: bool,
}

impl RowCursor {
    /// Pull cells from `text[*consumed..]` into `chunk`. Stops on input end,
    /// full chunk, row budget or an attribute change.
    fn fill(&mut self, chunk: &mut Chunk, text: &[char], attrs: &[u8], consumed: &mut usize) {
        let n = text.len();
        while *consumed < n && chunk.room() > 0 && self.x < self.width {
            let ch = text[*consumed];
            let attr = attrs[*consumed];
            self.last_wide = false;
            if ch >= ' ' {
                if is_full_width(ch) {
                    self.last_wide = true;
                    let row_fits = self.x < self.width - 1;
                    if row_fits && chunk.room() >= 2 {
                        chunk.push(ch, CellDecoration::LEADING);
                        chunk.push(ch, CellDecoration::TRAILING);
                        self.x += 2;
                    } else if row_fits {
                        break;
                    } else if let Some(fallback) = self.fallback {
                        if fallback == WideGlyphFallback::Blank {
                            chunk.push(' ', CellDecoration::empty());
                            self.x += 1;
                        }
                        self.full = true;
                    } else {
                        self.full = true;
                        break;
                    }
                } else {
                    chunk.push(ch, CellDecoration::empty());
                    self.x += 1;
                }
            }
            *consumed += 1;
            if self.full || (*consumed < n && attrs[*consumed] != attr) {
                break;
            }
        }
    }

    fn row_done(&self, input_done: bool) -> bool {
        input_done
            || self.full
            || self.x >= self.width
            || (self.last_wide && self.x >= self.width - 1)
    }
}

impl OverlayRegistry {
    /// Lay out `text` (one attribute byte per char) starting at the primary
    /// cursor. Rows already finalized stay visible if a later row fails to
    /// allocate. Text past the last window row is not laid out.
    pub fn stream_composition(
        &mut self,
        host: &mut ImeHost<'_>,
        text: &[char],
        attrs: &[u8],
        colors: &[u16; 8],
    ) -> Result<Placement> {
        let n = text.len().min(attrs.len());
        let text = &text[..n];
        let (origin, window) = {
            let surface = host.surface.as_deref_mut().ok_or(ImeError::NoActiveSurface)?;
            (cursor_in_view(surface), surface.window_size())
        };
        let width = window.x;
        let height = window.y;
        if width <= 0 || height <= 0 {
            let rect = Rect::from_origin_size(Coord::ORIGIN, window);
            return Err(ImeError::InvalidGeometry(rect));
        }

        let required = i32::try_from(padded_columns(text))
            .unwrap_or(i32::MAX)
            .saturating_add(wrap_padding(origin.x, text, width));
        let whole_rows = origin.x.saturating_add(required) / width;
        let mut start_y = origin.y;
        if start_y.saturating_add(whole_rows) > height - 1 {
            start_y = (height - 1 - whole_rows).max(0);
        }
        let placement = if start_y != origin.y {
            Placement::ShiftedUp
        } else {
            Placement::Normal
        };
        debug!(
            target: "ime.stream",
            chars = n,
            required,
            whole_rows,
            cursor_x = origin.x,
            cursor_y = origin.y,
            start_y,
            ?placement,
            "composition_layout"
        );

        let capacity = self.config.chunk_capacity;
        let fallback = self.config.wide_glyph_fallback;
        let mut consumed = 0usize;
        let mut x = origin.x;
        let mut index = 0usize;
        while consumed < n {
            if index == self.composition.len() {
                self.create_composition_row(host.surface.as_deref())?;
            }
            let id = self.composition[index];
            let row_y = start_y + index as i32;
            let hidden = {
                let overlay = self.overlay_mut(id)?;
                if overlay.buffer.size().x < width {
                    overlay.buffer.resize(Coord::new(width, 1))?;
                    overlay.buffer.set_window_size(Coord::new(width, 1));
                    overlay.buffer_size = overlay.buffer.size();
                    debug!(target: "ime.stream", id = id.0, width, "composition_row_widened");
                }
                overlay.buffer.cursor_mut().position = Coord::new(x, 0);
                overlay.is_hidden()
            };
            if hidden || placement == Placement::ShiftedUp {
                self.move_overlay(host, id, Coord::new(0, row_y))?;
            }

            let start_x = x;
            let mut row = RowCursor {
                x,
                width,
                fallback: (row_y >= height - 1 || width < 2).then_some(fallback),
                full: false,
                last_wide: false,
            };
            loop {
                let mut chunk = Chunk::new(capacity);
                let chunk_attr = attrs.get(consumed).copied().unwrap_or(0);
                row.fill(&mut chunk, text, attrs, &mut consumed);
                let input_done = consumed == n;
                if !chunk.is_empty() {
                    let overlay = self.overlay_mut(id)?;
                    overlay.buffer.set_attributes(resolve_attribute(chunk_attr, colors));
                    let (chars, decorations) = chunk.cells();
                    let written = write_cells_to_row(&mut overlay.buffer, chars, decorations);
                    overlay.buffer.cursor_mut().increment_x(written as i32);
                    if row.row_done(input_done) {
                        break;
                    }
                    continue;
                }
                if input_done || row.full || row.x >= width {
                    break;
                }
            }
            self.finalize_row(host, id, start_x)?;
            x = 0;
            index += 1;
            if row_y >= height - 1 && consumed < n {
                debug!(
                    target: "ime.stream",
                    dropped = n - consumed,
                    "composition_truncated_at_window_bottom"
                );
                break;
            }
        }

        for i in index..self.composition.len() {
            let id = self.composition[i];
            let overlay = self.overlay_mut(id)?;
            if !overlay.is_hidden() {
                overlay.set_hidden(true);
                self.paint(host, id);
            }
        }
        Ok(placement)
    }

    /// Show the cells a row received: `[start_x, cursor - 1]`. A row that
    /// received nothing stays hidden.
    fn finalize_row(
        &mut self,
        host: &mut ImeHost<'_>,
        id: OverlayId,
        start_x: i32,
    ) -> Result<()> {
        let cursor_x = self.overlay_mut(id)?.buffer.cursor().position.x;
        if cursor_x <= start_x {
            return Ok(());
        }
        let rect = Rect::new(start_x, 0, cursor_x - 1, 0);
        self.reshape_overlay(host, id, rect)?;
        self.overlay_mut(id)?.set_hidden(false);
        self.paint(host, id);
        debug!(target: "ime.stream", id = id.0, ?rect, "composition_row_shown");
        Ok(())
    }
}
