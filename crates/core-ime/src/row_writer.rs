//! Writes a run of cells into one row and merges its attribute.
//!
//! The run is written at the buffer cursor using the buffer's current
//! attribute. Wide glyph pairs are never left half-covered: a pair split
//! by either end of the write is blanked, and a leading half that would be
//! the last cell of a truncated write is blanked as well.
//!
//! Vertical grid lines requested with `SINGLE` are resolved per cell so the
//! two halves of a wide glyph do not both draw the inner line.

use core_render::{AttrRun, CellDecoration, GridFlags, Row, ScreenBuffer, TextAttribute};
use tracing::trace;

fn blank(row: &mut Row, col: usize) {
    row.chars.chars[col] = ' ';
    row.chars.decorations[col] = CellDecoration::empty();
}

/// Blank wide glyph halves that a write over `start..end` would orphan.
/// Returns the widened `(first, last)` touched range.
fn bisect(row: &mut Row, start: usize, end: usize) -> (usize, usize) {
    let mut first = start;
    let mut last = end - 1;
    if start > 0 && row.chars.decorations[start].contains(CellDecoration::TRAILING) {
        blank(row, start - 1);
        first = start - 1;
    }
    if end < row.width() && row.chars.decorations[end].contains(CellDecoration::TRAILING) {
        blank(row, end);
        last = end;
    }
    (first, last)
}

fn vertical_runs(attr: TextAttribute, decorations: &[CellDecoration]) -> Option<Vec<AttrRun>> {
    let right = attr.has_grid(GridFlags::SINGLE | GridFlags::RVERTICAL);
    let left = attr.has_grid(GridFlags::SINGLE | GridFlags::LVERTICAL);
    if !right && !left {
        return None;
    }
    let (half, flag) = if right {
        (CellDecoration::LEADING, GridFlags::RVERTICAL)
    } else {
        (CellDecoration::TRAILING, GridFlags::LVERTICAL)
    };
    let runs = decorations
        .iter()
        .map(|d| {
            let stripped = if d.contains(half) {
                attr.without_grid(GridFlags::SINGLE | flag)
            } else {
                attr.without_grid(GridFlags::SINGLE)
            };
            AttrRun::new(1, stripped)
        })
        .collect();
    Some(runs)
}

/// Write `chars` / `decorations` at the cursor of `buffer`. Cells past the
/// row edge are dropped. Returns the number of cells written.
pub fn write_cells_to_row(
    buffer: &mut ScreenBuffer,
    chars: &[char],
    decorations: &[CellDecoration],
) -> usize {
    let at = buffer.cursor().position;
    let attr = buffer.attributes();
    let Ok(x) = usize::try_from(at.x) else {
        return 0;
    };
    let Some(row) = buffer.row_mut(at.y) else {
        return 0;
    };
    let width = row.width();
    let len = chars.len().min(decorations.len());
    if len == 0 || x >= width {
        return 0;
    }
    let count = len.min(width - x);
    let end = x + count;

    let (first, last) = bisect(row, x, end);
    row.chars.chars[x..end].copy_from_slice(&chars[..count]);
    row.chars.decorations[x..end].copy_from_slice(&decorations[..count]);
    if count < len && row.chars.decorations[end - 1].contains(CellDecoration::LEADING) {
        blank(row, end - 1);
    }

    if first <= row.chars.left {
        row.chars.left = row.chars.chars[first..]
            .iter()
            .position(|c| *c != ' ')
            .map_or(width, |p| first + p);
    }
    if last + 1 >= row.chars.right {
        row.chars.right = row.chars.chars[..=last]
            .iter()
            .rposition(|c| *c != ' ')
            .map_or(0, |p| p + 1);
    }

    let single = row.attrs.len() == 1 && row.attrs.head().is_some_and(|r| r.attr == attr);
    if !single {
        let written = &row.chars.decorations[x..end];
        match vertical_runs(attr, written) {
            Some(runs) => row.attrs.insert_runs(&runs, x, end - 1, width),
            None => row.attrs.insert_runs(&[AttrRun::new(count, attr)], x, end - 1, width),
        }
    }

    trace!(target: "ime.row", x, y = at.y, count, truncated = len - count, "cells_written");
    buffer.reset_text_flags(first as i32, at.y, last as i32, at.y);
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_render::{Coord, Rect};
    use pretty_assertions::assert_eq;

    const L: CellDecoration = CellDecoration::LEADING;
    const T: CellDecoration = CellDecoration::TRAILING;
    const N: CellDecoration = CellDecoration::empty();

    fn row_buffer(width: i32) -> ScreenBuffer {
        ScreenBuffer::new(
            Coord::new(width, 1),
            Coord::new(8, 16),
            Coord::new(width, 1),
            TextAttribute::DEFAULT,
            TextAttribute::DEFAULT,
            0,
        )
        .unwrap()
    }

    fn write_at(buf: &mut ScreenBuffer, x: i32, chars: &[char], decos: &[CellDecoration]) -> usize {
        buf.cursor_mut().set_x(x);
        write_cells_to_row(buf, chars, decos)
    }

    #[test]
    fn plain_write_updates_bounds_and_runs() {
        let mut buf = row_buffer(10);
        buf.set_attributes(TextAttribute::from_legacy(0x1F));
        let n = write_at(&mut buf, 3, &['a', 'b', 'c'], &[N, N, N]);
        assert_eq!(n, 3);
        let row = buf.row(0).unwrap();
        assert_eq!(row.chars.text(), "   abc");
        assert_eq!((row.chars.left, row.chars.right), (3, 6));
        assert_eq!(
            row.attrs.runs(),
            &[
                AttrRun::new(3, TextAttribute::DEFAULT),
                AttrRun::new(3, TextAttribute::from_legacy(0x1F)),
                AttrRun::new(4, TextAttribute::DEFAULT),
            ]
        );
        assert_eq!(buf.text_flags_mut().take_all(), vec![Rect::new(3, 0, 5, 0)]);
    }

    #[test]
    fn same_attribute_row_skips_merge() {
        let mut buf = row_buffer(6);
        write_at(&mut buf, 0, &['x'], &[N]);
        assert_eq!(buf.row(0).unwrap().attrs.len(), 1);
    }

    #[test]
    fn truncates_at_row_edge_and_blanks_leading_half() {
        let mut buf = row_buffer(5);
        let n = write_at(&mut buf, 2, &['a', '中', '中', 'b'], &[N, L, T, N]);
        assert_eq!(n, 3);
        let row = buf.row(0).unwrap();
        assert_eq!(row.chars.chars, vec![' ', ' ', 'a', '中', '中']);
        assert_eq!(row.chars.decorations[3..].to_vec(), vec![L, T]);

        let n = write_at(&mut buf, 3, &['a', '中', '中'], &[N, L, T]);
        assert_eq!(n, 2);
        let row = buf.row(0).unwrap();
        assert_eq!(row.chars.chars[3..].to_vec(), vec!['a', ' ']);
        assert!(row.chars.decorations[4].is_empty());
        assert_eq!(row.chars.right, 4);
    }

    #[test]
    fn overwriting_trailing_half_blanks_leader() {
        let mut buf = row_buffer(8);
        write_at(&mut buf, 2, &['中', '中'], &[L, T]);
        write_at(&mut buf, 3, &['x'], &[N]);
        let row = buf.row(0).unwrap();
        assert_eq!(row.chars.text(), "   x");
        assert_eq!(row.chars.left, 3);
        assert_eq!(buf.text_flags_mut().take_all().last(), Some(&Rect::new(2, 0, 3, 0)));
    }

    #[test]
    fn overwriting_leading_half_blanks_trailer() {
        let mut buf = row_buffer(8);
        write_at(&mut buf, 4, &['中', '中'], &[L, T]);
        write_at(&mut buf, 3, &['x', 'y'], &[N, N]);
        let row = buf.row(0).unwrap();
        assert_eq!(row.chars.text(), "   xy");
        assert_eq!(row.chars.right, 5);
        assert!(row.chars.decorations[5].is_empty());
    }

    #[test]
    fn right_vertical_strips_leading_cells() {
        let mut buf = row_buffer(6);
        let base = TextAttribute::from_legacy(0x70);
        buf.set_attributes(base.with_grid(GridFlags::SINGLE | GridFlags::RVERTICAL));
        write_at(&mut buf, 0, &['中', '中', 'a'], &[L, T, N]);
        let attrs = buf.row(0).unwrap().attrs.expand();
        assert_eq!(attrs[0], base);
        assert_eq!(attrs[1], base.with_grid(GridFlags::RVERTICAL));
        assert_eq!(attrs[2], base.with_grid(GridFlags::RVERTICAL));
        assert_eq!(attrs[3], TextAttribute::DEFAULT);
    }

    #[test]
    fn left_vertical_strips_trailing_cells() {
        let mut buf = row_buffer(4);
        let base = TextAttribute::from_legacy(0x07);
        buf.set_attributes(base.with_grid(GridFlags::SINGLE | GridFlags::LVERTICAL));
        write_at(&mut buf, 1, &['中', '中'], &[L, T]);
        let attrs = buf.row(0).unwrap().attrs.expand();
        assert_eq!(attrs[1], base.with_grid(GridFlags::LVERTICAL));
        assert_eq!(attrs[2], base);
        assert_eq!(buf.row(0).unwrap().attrs.width(), 4);
    }

    #[test]
    fn cursor_past_edge_writes_nothing() {
        let mut buf = row_buffer(4);
        assert_eq!(write_at(&mut buf, 4, &['a'], &[N]), 0);
        assert_eq!(write_at(&mut buf, -1, &['a'], &[N]), 0);
    }
}
