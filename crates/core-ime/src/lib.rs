//! IME composition overlays on a character grid.
//!
//! While an input method composes text, the pending string is shown in small
//! overlay buffers that float above the primary surface, one per display row,
//! without touching the primary's own content. Committed text is fed back as
//! ordinary key-down events.
//!
//! Layers, bottom-up:
//! - `overlay` / `registry`: overlay buffers and the ordered set that owns them.
//! - `factory`: allocation and placement of new overlays.
//! - `redraw`: show/hide/move/reshape as invalidation requests.
//! - `row_writer`: writes a chunk of cells into an overlay row, keeping
//!   double-width pairs intact.
//! - `stream`: lays a composition string out across rows.
//! - `message` / `handler`: the payload codec and protocol entry points.
//! - `compose`, `output`, `suggestion`: compositor queries, block writes and
//!   candidate-popup geometry.
//!
//! Every entry point takes the collaborators it needs through `ImeHost`; the
//! core holds no global state and performs no I/O.

pub mod compose;
pub mod error;
pub mod factory;
pub mod handler;
pub mod host;
pub mod message;
pub mod output;
pub mod overlay;
pub mod redraw;
pub mod registry;
pub mod row_writer;
pub mod stream;
pub mod suggestion;

pub use compose::Cell;
pub use error::{ImeError, Result};
pub use factory::allocate;
pub use handler::ImeMessage;
pub use host::{ImeHost, PrimarySurface};
pub use message::CompositionMessage;
pub use overlay::{Overlay, OverlayId, OverlayMode};
pub use redraw::invalidate_overlay_region;
pub use registry::OverlayRegistry;
pub use row_writer::write_cells_to_row;
pub use stream::{Placement, resolve_attribute};
pub use suggestion::{PixelRect, suggestion_window_rect};
