//! Renderer invalidation interface.
//!
//! The overlay core never draws; it only tells a renderer which screen
//! rectangles are stale. Requests are advisory and fire-and-forget: the
//! renderer decides when (and whether) to repaint.
//!
//! Design invariants:
//! * Rectangles passed to `Renderer::invalidate` are exclusive on the right
//!   and bottom edges and already clipped to the visible viewport.
//! * Requests preserve ordering.

use crate::geometry::Rect;

pub trait Renderer {
    fn invalidate(&mut self, rect: Rect);
}

/// Renderer that records requests in order (headless hosts and tests).
#[derive(Debug, Default)]
pub struct InvalidationLog {
    rects: Vec<Rect>,
}

impl InvalidationLog {
    pub fn new() -> Self {
        Self { rects: Vec::new() }
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn take(&mut self) -> Vec<Rect> {
        std::mem::take(&mut self.rects)
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }
}

impl Renderer for InvalidationLog {
    fn invalidate(&mut self, rect: Rect) {
        tracing::trace!(target: "render.invalidate", ?rect, "invalidate");
        self.rects.push(rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let mut log = InvalidationLog::new();
        log.invalidate(Rect::new(0, 0, 2, 1));
        log.invalidate(Rect::new(4, 4, 5, 5));
        assert_eq!(log.len(), 2);
        assert_eq!(log.rects()[1], Rect::new(4, 4, 5, 5));
        let taken = log.take();
        assert_eq!(taken.len(), 2);
        assert!(log.is_empty());
    }
}
