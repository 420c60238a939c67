//! Block writes into an overlay buffer.
//!
//! Source cells are one per char; wide chars are expanded into a
//! leading/trailing pair through a translation row before landing in the
//! overlay. A wide char that would straddle the region's right edge becomes
//! a blank.

use core_render::{AttrRun, CellDecoration, Rect, TextAttribute};
use core_text::is_full_width;
use tracing::trace;

use crate::error::{ImeError, Result};
use crate::host::ImeHost;
use crate::overlay::OverlayId;
use crate::redraw::invalidate_overlay_region;
use crate::registry::OverlayRegistry;

/// Expand one source row into at most `width` cells.
fn pad_row(
    src: &[(char, TextAttribute)],
    width: usize,
    out: &mut Vec<(char, CellDecoration, TextAttribute)>,
) {
    out.clear();
    for &(ch, attr) in src {
        if out.len() >= width {
            break;
        }
        if is_full_width(ch) {
            if out.len() + 2 <= width {
                out.push((ch, CellDecoration::LEADING, attr));
                out.push((ch, CellDecoration::TRAILING, attr));
            } else {
                out.push((' ', CellDecoration::empty(), attr));
            }
        } else {
            out.push((ch, CellDecoration::empty(), attr));
        }
    }
}

impl OverlayRegistry {
    /// Write `cells` (row-major, `region` sized) into overlay `id` at
    /// `region` (overlay-local, inclusive) and invalidate what changed.
    pub fn write_output(
        &mut self,
        host: &mut ImeHost<'_>,
        id: OverlayId,
        cells: &[(char, TextAttribute)],
        region: Rect,
    ) -> Result<()> {
        if !region.is_valid() {
            return Err(ImeError::InvalidArgument("write region must not be empty"));
        }
        let w = usize::try_from(region.width())
            .map_err(|_| ImeError::InvalidArgument("write region width"))?;
        let h = usize::try_from(region.height())
            .map_err(|_| ImeError::InvalidArgument("write region height"))?;
        let needed = w
            .checked_mul(h)
            .ok_or(ImeError::InvalidArgument("write region too large"))?;
        if cells.len() < needed {
            return Err(ImeError::InvalidArgument("cell block smaller than region"));
        }
        let left = usize::try_from(region.left)
            .map_err(|_| ImeError::InvalidArgument("write region origin"))?;

        let mut trans = Vec::new();
        trans
            .try_reserve_exact(w)
            .map_err(|_| ImeError::OutOfMemory)?;

        let overlay = self.overlay_mut(id)?;
        for (dy, src) in cells.chunks_exact(w).take(h).enumerate() {
            let y = region.top + dy as i32;
            pad_row(src, w, &mut trans);
            let Some(row) = overlay.buffer.row_mut(y) else {
                continue;
            };
            let width = row.width();
            let mut runs: Vec<AttrRun> = Vec::new();
            for (i, &(ch, deco, attr)) in trans.iter().enumerate() {
                let x = left + i;
                if x >= width {
                    break;
                }
                row.chars.chars[x] = ch;
                row.chars.decorations[x] = deco;
                match runs.last_mut() {
                    Some(run) if run.attr == attr => run.length += 1,
                    _ => runs.push(AttrRun::new(1, attr)),
                }
            }
            let written: usize = runs.iter().map(|r| r.length).sum();
            if written == 0 {
                continue;
            }
            row.attrs.insert_runs(&runs, left, left + written - 1, width);
            row.chars.recompute_bounds();
            overlay
                .buffer
                .reset_text_flags(region.left, y, region.left + written as i32 - 1, y);
        }

        let Some(surface) = host.surface.as_deref() else {
            return Ok(());
        };
        let abs = region.translate(surface.viewport().origin() + overlay.view_offset);
        trace!(target: "ime.redraw", id = id.0, ?region, ?abs, "overlay_output");
        invalidate_overlay_region(surface, &mut *host.renderer, self.chain_from(id), abs);
        Ok(())
    }
}
