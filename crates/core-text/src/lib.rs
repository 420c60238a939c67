//! Text measurement for the character grid.
//!
//! Text shaping is out of scope: callers hand us chars that are already one
//! cell each. We only decide single vs double width.

pub mod width;

// Re-export primary width functions for callers that only need the answer.
pub use width::{CellKind, char_columns, classify, is_full_width, padded_columns};
