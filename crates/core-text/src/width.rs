//! Cell width classification for grid output.
//!
//! A grid cell holds one `char`. Callers have already segmented text into
//! cells; this module only answers how many columns a single char occupies
//! when written into a row, and how many columns a run of chars reserves.
//!
//! Width Precedence Order:
//! 1. Chars below U+0020 are control input and never produce a cell.
//! 2. Pictographic blocks render as double-width glyphs.
//! 3. `unicode_width` East Asian width (W / F => 2).
//! 4. Everything else is a single column.
//!
//! Invariants:
//! - `char_columns` only returns 0, 1 or 2.
//! - `padded_columns(s)` equals the sum of `char_columns` when `s` has no
//!   control chars; each control char adds one.
//! - A char is full-width iff `char_columns(c) == 2`.

use unicode_width::UnicodeWidthChar;

/// Semantic classification of a single cell char.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Below U+0020; consumed without producing a cell.
    Control,
    Narrow,
    /// Occupies a leading and a trailing cell.
    Wide,
}

// Rough Extended Pictographic heuristic (emoji blocks + misc symbols used as emoji)
fn is_extended_pictographic(c: char) -> bool {
    ('\u{1F300}'..='\u{1FAFF}').contains(&c)
}

/// Classify a char for grid placement.
pub fn classify(c: char) -> CellKind {
    if c < ' ' {
        return CellKind::Control;
    }
    if c.is_ascii() {
        return CellKind::Narrow;
    }
    if is_extended_pictographic(c) {
        return CellKind::Wide;
    }
    match UnicodeWidthChar::width(c) {
        Some(2) => CellKind::Wide,
        _ => CellKind::Narrow,
    }
}

/// True when `c` occupies two grid columns.
#[inline]
pub fn is_full_width(c: char) -> bool {
    classify(c) == CellKind::Wide
}

/// Columns occupied by `c` once written into a row.
#[inline]
pub fn char_columns(c: char) -> u16 {
    match classify(c) {
        CellKind::Control => 0,
        CellKind::Narrow => 1,
        CellKind::Wide => 2,
    }
}

/// Columns reserved for `text` when sizing a layout: control chars count as
/// one column, wide chars as two.
pub fn padded_columns(text: &[char]) -> usize {
    text.iter()
        .map(|c| if is_full_width(*c) { 2 } else { 1 })
        .sum()
}
