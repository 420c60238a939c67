//! Character-grid primitives shared by the primary surface and overlays.
//!
//! A grid cell is a `char` plus a `CellDecoration` byte; a row stores its
//! cells in a `CharRow` and its formatting as run-length `AttrRow` spans.
//! Double-width glyphs occupy two cells tagged `LEADING` and `TRAILING`.
//!
//! Invariants:
//! - Leader: `LEADING` cell immediately followed by its `TRAILING` cell.
//! - No row ever shows a lone half of a wide glyph; writers blank orphans.
//! - Attribute runs of a row always cover exactly the row width.
//!
//! Exposed Components:
//! - `geometry`: `Coord` / inclusive `Rect` with clip + exclusive conversion.
//! - `style`: legacy `TextAttribute` word, `GridFlags`, `CellDecoration`.
//! - `row`: `CharRow`, `AttrRow` (run merge), `Row`.
//! - `screen`: `ScreenBuffer` (rows, viewport, cursor, attributes).
//! - `dirty`: rectangle tracker used for text-flag and redraw bookkeeping.
//! - `writer`: `Renderer` invalidation interface and a recording impl.

pub mod dirty;
pub mod geometry;
pub mod row;
pub mod screen;
pub mod style;
pub mod writer;

pub use dirty::DirtyRegions;
pub use geometry::{Coord, Rect};
pub use row::{AttrRow, AttrRun, CharRow, Row};
pub use screen::{BufferError, Cursor, ScreenBuffer};
pub use style::{CellDecoration, GridFlags, TextAttribute};
pub use writer::{InvalidationLog, Renderer};
