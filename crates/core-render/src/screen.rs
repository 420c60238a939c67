//! Character-cell screen buffer.
//!
//! One type serves both as the primary console surface and as the private
//! backing store of every overlay. A buffer owns its rows, a cursor, the
//! current and popup attributes, and the viewport (the visible window onto
//! the buffer, never larger than the buffer itself).

use thiserror::Error;

use crate::dirty::DirtyRegions;
use crate::geometry::{Coord, Rect};
use crate::row::Row;
use crate::style::{CellDecoration, TextAttribute};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("out of memory allocating screen buffer rows")]
    OutOfMemory,
    #[error("invalid screen buffer size {0:?}")]
    InvalidSize(Coord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub position: Coord,
    pub visible: bool,
    /// Percentage of the cell height; 0 for buffers that never render a cursor.
    pub size: u32,
    /// Cursor moves on this buffer never produce paint notifications.
    pub conversion_area: bool,
}

impl Cursor {
    fn new(size: u32) -> Self {
        Self {
            position: Coord::ORIGIN,
            visible: size > 0,
            size,
            conversion_area: false,
        }
    }

    pub fn set_x(&mut self, x: i32) {
        self.position.x = x;
    }

    pub fn increment_x(&mut self, by: i32) {
        self.position.x += by;
    }
}

#[derive(Debug, Clone)]
pub struct ScreenBuffer {
    rows: Vec<Row>,
    size: Coord,
    window_size: Coord,
    viewport: Rect,
    font_size: Coord,
    cursor: Cursor,
    attributes: TextAttribute,
    popup_attributes: TextAttribute,
    active: bool,
    text_flags: DirtyRegions,
    redraws: DirtyRegions,
}

fn alloc_rows(size: Coord, fill: TextAttribute) -> Result<Vec<Row>, BufferError> {
    let height = size.y as usize;
    let width = size.x as usize;
    let mut rows = Vec::new();
    rows.try_reserve_exact(height)
        .map_err(|_| BufferError::OutOfMemory)?;
    for _ in 0..height {
        rows.push(Row::new(width, fill));
    }
    Ok(rows)
}

fn viewport_for(origin: Coord, window_size: Coord, size: Coord) -> Rect {
    let dims = Coord::new(window_size.x.min(size.x), window_size.y.min(size.y));
    let origin = Coord::new(
        origin.x.clamp(0, size.x - dims.x),
        origin.y.clamp(0, size.y - dims.y),
    );
    Rect::from_origin_size(origin, dims)
}

impl ScreenBuffer {
    /// Allocate a buffer of `size` cells. `window_size` is the visible window
    /// the buffer is shown through; `fill` becomes the current attribute.
    pub fn new(
        window_size: Coord,
        font_size: Coord,
        size: Coord,
        fill: TextAttribute,
        popup_fill: TextAttribute,
        cursor_size: u32,
    ) -> Result<Self, BufferError> {
        if size.x <= 0 || size.y <= 0 || window_size.x <= 0 || window_size.y <= 0 {
            return Err(BufferError::InvalidSize(size));
        }
        let rows = alloc_rows(size, fill)?;
        Ok(Self {
            rows,
            size,
            window_size,
            viewport: viewport_for(Coord::ORIGIN, window_size, size),
            font_size,
            cursor: Cursor::new(cursor_size),
            attributes: fill,
            popup_attributes: popup_fill,
            active: true,
            text_flags: DirtyRegions::new(),
            redraws: DirtyRegions::new(),
        })
    }

    pub fn size(&self) -> Coord {
        self.size
    }

    pub fn window_size(&self) -> Coord {
        self.window_size
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn font_size(&self) -> Coord {
        self.font_size
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    pub fn attributes(&self) -> TextAttribute {
        self.attributes
    }

    pub fn set_attributes(&mut self, attr: TextAttribute) {
        self.attributes = attr;
    }

    pub fn popup_attributes(&self) -> TextAttribute {
        self.popup_attributes
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn row(&self, y: i32) -> Option<&Row> {
        let y = usize::try_from(y).ok()?;
        self.rows.get(y)
    }

    pub fn row_mut(&mut self, y: i32) -> Option<&mut Row> {
        let y = usize::try_from(y).ok()?;
        self.rows.get_mut(y)
    }

    /// Cell at buffer coordinates.
    pub fn cell(&self, at: Coord) -> Option<(char, CellDecoration, TextAttribute)> {
        let row = self.row(at.y)?;
        let x = usize::try_from(at.x).ok()?;
        let ch = *row.chars.chars.get(x)?;
        let deco = row.chars.decorations[x];
        let attr = row.attrs.attr_at(x)?;
        Some((ch, deco, attr))
    }

    /// Row text with trailing blanks removed.
    pub fn row_text(&self, y: i32) -> String {
        self.row(y).map(|r| r.chars.text()).unwrap_or_default()
    }

    /// Move the viewport so its top-left is `origin`, clamped to the buffer.
    pub fn set_viewport_origin(&mut self, origin: Coord) {
        self.viewport = viewport_for(origin, self.window_size, self.size);
    }

    /// Change the visible window dimensions, keeping the viewport origin.
    pub fn set_window_size(&mut self, window_size: Coord) {
        self.window_size = window_size;
        self.viewport = viewport_for(self.viewport.origin(), window_size, self.size);
    }

    /// Reallocate to `new_size`, preserving overlapping content.
    pub fn resize(&mut self, new_size: Coord) -> Result<(), BufferError> {
        if new_size.x <= 0 || new_size.y <= 0 {
            return Err(BufferError::InvalidSize(new_size));
        }
        let width = new_size.x as usize;
        let height = new_size.y as usize;
        if height > self.rows.len() {
            self.rows
                .try_reserve_exact(height - self.rows.len())
                .map_err(|_| BufferError::OutOfMemory)?;
        }
        self.rows.truncate(height);
        for row in &mut self.rows {
            row.resize(width, self.attributes);
        }
        while self.rows.len() < height {
            self.rows.push(Row::new(width, self.attributes));
        }
        self.size = new_size;
        self.viewport = viewport_for(self.viewport.origin(), self.window_size, new_size);
        let pos = self.cursor.position;
        self.cursor.position = Coord::new(pos.x.min(new_size.x - 1), pos.y.min(new_size.y - 1));
        Ok(())
    }

    /// Fill row `y` with `ch` in attribute `attr`.
    pub fn fill_row(&mut self, y: i32, ch: char, attr: TextAttribute) {
        let width = self.size.x;
        if let Some(row) = self.row_mut(y) {
            row.clear(ch, attr);
            self.text_flags.mark_merged(Rect::new(0, y, width - 1, y));
        }
    }

    /// Record that cached per-cell text flags for this range are stale.
    pub fn reset_text_flags(&mut self, left: i32, top: i32, right: i32, bottom: i32) {
        self.text_flags.mark_merged(Rect::new(left, top, right, bottom));
    }

    pub fn text_flags(&self) -> &DirtyRegions {
        &self.text_flags
    }

    pub fn text_flags_mut(&mut self) -> &mut DirtyRegions {
        &mut self.text_flags
    }

    /// Queue a redraw of buffer region `region` from this buffer's own content.
    pub fn write_to_screen(&mut self, region: Rect) {
        let clipped = region.intersect(&self.viewport);
        if clipped.is_valid() {
            self.redraws.mark(clipped);
        }
    }

    /// Drain queued redraws in request order.
    pub fn take_redraws(&mut self) -> Vec<Rect> {
        self.redraws.take_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(w: i32, h: i32) -> ScreenBuffer {
        ScreenBuffer::new(
            Coord::new(w, h),
            Coord::new(8, 16),
            Coord::new(w, h * 4),
            TextAttribute::DEFAULT,
            TextAttribute::from_legacy(0x5F),
            25,
        )
        .unwrap()
    }

    #[test]
    fn new_sets_viewport_from_window() {
        let sb = buffer(20, 5);
        assert_eq!(sb.viewport(), Rect::new(0, 0, 19, 4));
        assert_eq!(sb.size(), Coord::new(20, 20));
        assert!(sb.cursor().visible);
    }

    #[test]
    fn zero_size_rejected() {
        let err = ScreenBuffer::new(
            Coord::new(10, 1),
            Coord::new(8, 16),
            Coord::new(0, 1),
            TextAttribute::DEFAULT,
            TextAttribute::DEFAULT,
            0,
        )
        .unwrap_err();
        assert_eq!(err, BufferError::InvalidSize(Coord::new(0, 1)));
    }

    #[test]
    fn viewport_origin_clamps_to_buffer() {
        let mut sb = buffer(20, 5);
        sb.set_viewport_origin(Coord::new(0, 100));
        assert_eq!(sb.viewport(), Rect::new(0, 15, 19, 19));
    }

    #[test]
    fn resize_preserves_content_and_clamps_cursor() {
        let mut sb = buffer(20, 5);
        sb.row_mut(0).unwrap().chars.chars[3] = 'x';
        sb.row_mut(0).unwrap().chars.recompute_bounds();
        sb.cursor_mut().position = Coord::new(15, 2);
        sb.resize(Coord::new(10, 3)).unwrap();
        assert_eq!(sb.row_text(0), "   x");
        assert_eq!(sb.cursor().position, Coord::new(9, 2));
        assert_eq!(sb.row(0).unwrap().attrs.width(), 10);
    }

    #[test]
    fn write_to_screen_clips_to_viewport() {
        let mut sb = buffer(20, 5);
        sb.write_to_screen(Rect::new(15, 3, 30, 8));
        sb.write_to_screen(Rect::new(0, 10, 5, 10));
        assert_eq!(sb.take_redraws(), vec![Rect::new(15, 3, 19, 4)]);
    }

    #[test]
    fn cell_reports_char_and_attr() {
        let mut sb = buffer(20, 5);
        sb.fill_row(1, '-', TextAttribute::from_legacy(0x1F));
        let (ch, deco, attr) = sb.cell(Coord::new(4, 1)).unwrap();
        assert_eq!(ch, '-');
        assert!(deco.is_empty());
        assert_eq!(attr.legacy(), 0x1F);
        assert!(sb.cell(Coord::new(20, 1)).is_none());
    }
}
