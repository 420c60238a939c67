//! Dirty region tracking.
//!
//! Records rectangles whose cached text flags or on-screen content must be
//! reconciled. `mark` appends as-is; `mark_merged` folds a mark into any
//! recorded span on the same rows that it overlaps or touches.
//!
//! Design constraints:
//! * Invalid rectangles are ignored at mark time.
//! * Not thread-safe (owned by a single screen buffer on the console thread).
//!
//! Invariants:
//! * Marks recorded only through `mark_merged` are pairwise disjoint and
//!   non-adjacent per row band, so their count is bounded by the area.
//! * After `take_all`, internal storage is cleared (one-shot consumption).

use crate::geometry::Rect;

#[derive(Debug, Default, Clone)]
pub struct DirtyRegions {
    rects: Vec<Rect>,
}

impl DirtyRegions {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self { rects: Vec::new() }
    }

    /// Mark an inclusive rectangle as dirty.
    pub fn mark(&mut self, rect: Rect) {
        if rect.is_valid() {
            self.rects.push(rect);
        }
    }

    /// Mark `rect`, widening any recorded mark with the same rows that it
    /// overlaps or touches instead of appending.
    pub fn mark_merged(&mut self, rect: Rect) {
        if !rect.is_valid() {
            return;
        }
        let mut merged = rect;
        self.rects.retain(|r| {
            let joins = r.top == merged.top
                && r.bottom == merged.bottom
                && r.left <= merged.right + 1
                && merged.left <= r.right + 1;
            if joins {
                merged.left = merged.left.min(r.left);
                merged.right = merged.right.max(r.right);
            }
            !joins
        });
        self.rects.push(merged);
    }

    /// Consume marks in recording order.
    pub fn take_all(&mut self) -> Vec<Rect> {
        std::mem::take(&mut self.rects)
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// True if nothing has been marked since last consumption.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Clear all marks without returning them (reset state).
    pub fn clear(&mut self) {
        self.rects.clear();
    }
}
