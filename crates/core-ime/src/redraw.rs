//! Redraw coordination between overlays and the primary surface.
//!
//! Showing an overlay asks the renderer to repaint its clipped footprint;
//! hiding one asks the primary surface to redraw the same footprint from its
//! own content. Moves and reshapes are expressed as pairs of those passes
//! rather than blits.
//!
//! Clipping is two-stage: first against the primary viewport (an overlay
//! may be partially scrolled off-view), then against the caller's dirty
//! rectangle. Inverted results are `ImeError::InvalidGeometry`, logged at
//! trace level and skipped.

use core_render::{Coord, Rect, Renderer, TextAttribute};
use tracing::trace;

use crate::error::{ImeError, Result};
use crate::host::{ImeHost, PrimarySurface};
use crate::overlay::{Overlay, OverlayId};
use crate::registry::OverlayRegistry;

fn clip_for_redraw(abs: Rect, viewport: Rect, dirty: Rect) -> Result<Rect> {
    let in_view = abs.intersect(&viewport);
    if !in_view.is_valid() {
        return Err(ImeError::InvalidGeometry(in_view));
    }
    let clipped = in_view.intersect(&dirty);
    if !clipped.is_valid() {
        return Err(ImeError::InvalidGeometry(clipped));
    }
    Ok(clipped)
}

/// Ask `renderer` to repaint every visible overlay of `chain` inside `dirty`
/// (inclusive, primary buffer coordinates). Returns the number of requests.
pub fn invalidate_overlay_region<'o>(
    surface: &dyn PrimarySurface,
    renderer: &mut dyn Renderer,
    chain: impl IntoIterator<Item = &'o Overlay>,
    dirty: Rect,
) -> usize {
    if !surface.is_active() {
        return 0;
    }
    let viewport = surface.viewport();
    let mut issued = 0;
    for overlay in chain.into_iter().filter(|o| !o.is_hidden()) {
        let abs = overlay.absolute_rect(viewport.origin());
        match clip_for_redraw(abs, viewport, dirty) {
            Ok(rect) => {
                renderer.invalidate(rect.to_exclusive());
                issued += 1;
            }
            Err(e) => trace!(target: "ime.redraw", error = %e, ?abs, "overlay_skipped"),
        }
    }
    issued
}

impl OverlayRegistry {
    /// Show (or, when hidden, restore the primary content under) an overlay.
    pub fn paint(&self, host: &mut ImeHost<'_>, id: OverlayId) {
        let Some(overlay) = self.overlay(id) else {
            return;
        };
        let Some(surface) = host.surface.as_deref_mut() else {
            return;
        };
        let abs = overlay.absolute_rect(surface.viewport().origin());
        trace!(target: "ime.redraw", id = id.0, hidden = overlay.is_hidden(), ?abs, "paint");
        if overlay.is_hidden() {
            surface.write_to_screen(abs);
        } else {
            invalidate_overlay_region(&*surface, &mut *host.renderer, self.chain_from(id), abs);
        }
    }

    pub fn move_overlay(
        &mut self,
        host: &mut ImeHost<'_>,
        id: OverlayId,
        new_offset: Coord,
    ) -> Result<()> {
        let origin = host
            .surface
            .as_deref()
            .map(|s| s.viewport().origin())
            .unwrap_or(Coord::ORIGIN);
        let overlay = self.overlay_mut(id)?;
        if overlay.is_hidden() {
            overlay.view_offset = new_offset;
            return Ok(());
        }
        let old = overlay.absolute_rect(origin);
        overlay.view_offset = new_offset;
        let new = overlay.absolute_rect(origin);
        trace!(target: "ime.redraw", id = id.0, ?old, ?new, "overlay_moved");
        if let Some(surface) = host.surface.as_deref_mut() {
            surface.write_to_screen(old);
            surface.write_to_screen(new);
        }
        Ok(())
    }

    /// Change the shown region of an overlay. A visible overlay is hidden
    /// and repainted first so no cell of the old shape stays on screen.
    pub fn reshape_overlay(
        &mut self,
        host: &mut ImeHost<'_>,
        id: OverlayId,
        new_rect: Rect,
    ) -> Result<()> {
        let overlay = self.overlay_mut(id)?;
        if overlay.view_rect == new_rect {
            return Ok(());
        }
        if overlay.is_hidden() {
            overlay.view_rect = new_rect;
            return Ok(());
        }
        overlay.set_hidden(true);
        self.paint(host, id);
        let overlay = self.overlay_mut(id)?;
        overlay.view_rect = new_rect;
        overlay.set_hidden(false);
        self.paint(host, id);
        Ok(())
    }

    /// Show or hide an overlay and paint the affected footprint.
    pub fn set_overlay_hidden(
        &mut self,
        host: &mut ImeHost<'_>,
        id: OverlayId,
        hidden: bool,
    ) -> Result<()> {
        let overlay = self.overlay_mut(id)?;
        if overlay.is_hidden() == hidden {
            return Ok(());
        }
        overlay.set_hidden(hidden);
        self.paint(host, id);
        Ok(())
    }

    /// Hide an overlay, blank its first row in the primary's current
    /// attribute and repaint what was underneath.
    pub fn clear_composition_row(&mut self, host: &mut ImeHost<'_>, id: OverlayId) -> Result<()> {
        let attr = host
            .surface
            .as_deref()
            .map(|s| s.attributes())
            .unwrap_or(TextAttribute::DEFAULT);
        let overlay = self.overlay_mut(id)?;
        overlay.set_hidden(true);
        overlay.buffer.fill_row(0, ' ', attr);
        self.paint(host, id);
        Ok(())
    }

    /// Clear every visible composition row.
    pub(crate) fn clear_visible_composition(&mut self, host: &mut ImeHost<'_>) -> Result<()> {
        for i in 0..self.composition.len() {
            let id = self.composition[i];
            if self.overlay(id).is_some_and(|o| !o.is_hidden()) {
                self.clear_composition_row(host, id)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::ImeConfig;
    use core_events::InputBuffer;
    use core_render::{InvalidationLog, ScreenBuffer};

    use crate::overlay::OverlayMode;

    fn primary() -> ScreenBuffer {
        ScreenBuffer::new(
            Coord::new(20, 5),
            Coord::new(8, 16),
            Coord::new(20, 50),
            TextAttribute::DEFAULT,
            TextAttribute::DEFAULT,
            25,
        )
        .unwrap()
    }

    fn visible(
        reg: &mut OverlayRegistry,
        p: &ScreenBuffer,
        rect: Rect,
        offset: Coord,
    ) -> OverlayId {
        reg.place(Some(p), Coord::new(20, 1), rect, offset, OverlayMode::empty())
            .unwrap()
    }

    #[test]
    fn clip_rejects_off_view() {
        let view = Rect::new(0, 10, 19, 14);
        let err = clip_for_redraw(Rect::new(0, 2, 4, 2), view, view).unwrap_err();
        assert!(matches!(err, ImeError::InvalidGeometry(_)));
        assert_eq!(
            clip_for_redraw(Rect::new(15, 12, 25, 12), view, Rect::new(0, 0, 17, 99)).unwrap(),
            Rect::new(15, 12, 17, 12)
        );
    }

    #[test]
    fn paint_visible_invalidates_exclusive_rect() {
        let mut p = primary();
        p.set_viewport_origin(Coord::new(0, 10));
        let mut reg = OverlayRegistry::new(ImeConfig::default());
        let id = visible(&mut reg, &p, Rect::new(2, 0, 5, 0), Coord::new(0, 3));
        let mut log = InvalidationLog::new();
        let mut input = InputBuffer::new();
        let mut host = ImeHost::new(&mut p, &mut log, &mut input);
        reg.paint(&mut host, id);
        assert_eq!(log.rects(), &[Rect::new(2, 13, 6, 14)]);
    }

    #[test]
    fn paint_hidden_redraws_primary() {
        let mut p = primary();
        let mut reg = OverlayRegistry::new(ImeConfig::default());
        let id = reg
            .place(
                Some(&p),
                Coord::new(20, 1),
                Rect::new(0, 0, 3, 0),
                Coord::new(0, 1),
                OverlayMode::HIDDEN,
            )
            .unwrap();
        let mut log = InvalidationLog::new();
        let mut input = InputBuffer::new();
        {
            let mut host = ImeHost::new(&mut p, &mut log, &mut input);
            reg.paint(&mut host, id);
        }
        assert!(log.is_empty());
        assert_eq!(p.take_redraws(), vec![Rect::new(0, 1, 3, 1)]);
    }

    #[test]
    fn inactive_surface_issues_nothing() {
        let mut p = primary();
        p.set_active(false);
        let mut reg = OverlayRegistry::new(ImeConfig::default());
        let id = visible(&mut reg, &p, Rect::new(0, 0, 3, 0), Coord::ORIGIN);
        let mut log = InvalidationLog::new();
        let n = invalidate_overlay_region(&p, &mut log, reg.chain_from(id), p.viewport());
        assert_eq!(n, 0);
    }

    #[test]
    fn inverted_overlay_is_skipped() {
        let p = primary();
        let mut reg = OverlayRegistry::new(ImeConfig::default());
        let bad = visible(&mut reg, &p, Rect::new(5, 0, 2, 0), Coord::ORIGIN);
        visible(&mut reg, &p, Rect::new(0, 0, 1, 0), Coord::new(0, 2));
        let mut log = InvalidationLog::new();
        let n = invalidate_overlay_region(&p, &mut log, reg.chain_from(bad), p.viewport());
        assert_eq!(n, 1);
        assert_eq!(log.rects(), &[Rect::new(0, 2, 2, 3)]);
    }

    #[test]
    fn move_hidden_stores_only() {
        let mut p = primary();
        let mut reg = OverlayRegistry::new(ImeConfig::default());
        let id = reg.create_composition_row(Some(&p)).unwrap();
        let mut log = InvalidationLog::new();
        let mut input = InputBuffer::new();
        {
            let mut host = ImeHost::new(&mut p, &mut log, &mut input);
            reg.move_overlay(&mut host, id, Coord::new(0, 4)).unwrap();
        }
        assert_eq!(reg.overlay(id).unwrap().view_offset(), Coord::new(0, 4));
        assert!(p.take_redraws().is_empty());
    }

    #[test]
    fn move_visible_redraws_old_then_new() {
        let mut p = primary();
        let mut reg = OverlayRegistry::new(ImeConfig::default());
        let id = visible(&mut reg, &p, Rect::new(0, 0, 2, 0), Coord::new(0, 1));
        let mut log = InvalidationLog::new();
        let mut input = InputBuffer::new();
        {
            let mut host = ImeHost::new(&mut p, &mut log, &mut input);
            reg.move_overlay(&mut host, id, Coord::new(4, 3)).unwrap();
        }
        assert_eq!(
            p.take_redraws(),
            vec![Rect::new(0, 1, 2, 1), Rect::new(4, 3, 6, 3)]
        );
    }

    #[test]
    fn reshape_counts_paint_passes() {
        let mut p = primary();
        let mut reg = OverlayRegistry::new(ImeConfig::default());
        let id = visible(&mut reg, &p, Rect::new(0, 0, 4, 0), Coord::ORIGIN);
        let mut log = InvalidationLog::new();
        let mut input = InputBuffer::new();
        {
            let mut host = ImeHost::new(&mut p, &mut log, &mut input);
            reg.reshape_overlay(&mut host, id, Rect::new(0, 0, 4, 0)).unwrap();
        }
        assert!(log.is_empty());
        assert!(p.take_redraws().is_empty());
        {
            let mut host = ImeHost::new(&mut p, &mut log, &mut input);
            reg.reshape_overlay(&mut host, id, Rect::new(0, 0, 1, 0)).unwrap();
        }
        assert_eq!(p.take_redraws(), vec![Rect::new(0, 0, 4, 0)]);
        assert_eq!(log.rects(), &[Rect::new(0, 0, 2, 1)]);
        assert!(!reg.overlay(id).unwrap().is_hidden());
    }

    #[test]
    fn clear_blanks_and_hides() {
        let mut p = primary();
        let mut reg = OverlayRegistry::new(ImeConfig::default());
        let id = visible(&mut reg, &p, Rect::new(0, 0, 2, 0), Coord::ORIGIN);
        reg.overlay_mut(id).unwrap().buffer.fill_row(0, 'x', TextAttribute::from_legacy(0x4F));
        let mut log = InvalidationLog::new();
        let mut input = InputBuffer::new();
        {
            let mut host = ImeHost::new(&mut p, &mut log, &mut input);
            reg.clear_composition_row(&mut host, id).unwrap();
        }
        let o = reg.overlay(id).unwrap();
        assert!(o.is_hidden());
        assert_eq!(o.buffer().row_text(0), "");
        assert_eq!(o.buffer().cell(Coord::new(1, 0)).unwrap().2, TextAttribute::DEFAULT);
        assert_eq!(p.take_redraws(), vec![Rect::new(0, 0, 2, 0)]);
    }
}
