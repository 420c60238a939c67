//! Grid geometry: cell coordinates and rectangles.
//!
//! Coordinates are signed so intermediate placement math (scrolling a
//! composition area up past the top of the window, clipping partially
//! off-view overlays) never wraps.
//!
//! Conventions:
//! * `Rect` is inclusive on all four edges unless a function says otherwise.
//!   The only exclusive rectangles in the system are the ones handed to a
//!   `Renderer` (see `Rect::to_exclusive`).
//! * A rectangle is valid iff `right >= left && bottom >= top`. Invalid
//!   rectangles are empty: intersection results may be invalid and callers
//!   skip them.

use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Coord {
    type Output = Coord;
    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coord {
    type Output = Coord;
    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Inclusive rectangle covering `size` cells starting at `origin`.
    pub const fn from_origin_size(origin: Coord, size: Coord) -> Self {
        Self {
            left: origin.x,
            top: origin.y,
            right: origin.x + size.x - 1,
            bottom: origin.y + size.y - 1,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.right >= self.left && self.bottom >= self.top
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.right - self.left + 1
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bottom - self.top + 1
    }

    #[inline]
    pub fn origin(&self) -> Coord {
        Coord::new(self.left, self.top)
    }

    pub fn contains(&self, at: Coord) -> bool {
        self.left <= at.x && at.x <= self.right && self.top <= at.y && at.y <= self.bottom
    }

    /// Overlap of two rectangles; invalid when they do not intersect.
    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        }
    }

    pub fn translate(&self, by: Coord) -> Rect {
        Rect {
            left: self.left + by.x,
            top: self.top + by.y,
            right: self.right + by.x,
            bottom: self.bottom + by.y,
        }
    }

    /// Convert inclusive bounds into the exclusive form renderers consume.
    pub fn to_exclusive(&self) -> Rect {
        Rect {
            left: self.left,
            top: self.top,
            right: self.right + 1,
            bottom: self.bottom + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_size_is_inclusive() {
        let r = Rect::from_origin_size(Coord::new(2, 3), Coord::new(10, 1));
        assert_eq!(r, Rect::new(2, 3, 11, 3));
        assert_eq!(r.width(), 10);
        assert_eq!(r.height(), 1);
    }

    #[test]
    fn disjoint_intersection_is_invalid() {
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(6, 0, 9, 4);
        assert!(!a.intersect(&b).is_valid());
        assert_eq!(a.intersect(&Rect::new(3, 2, 9, 9)), Rect::new(3, 2, 4, 4));
    }

    #[test]
    fn exclusive_bumps_far_edges() {
        let r = Rect::new(1, 1, 1, 1).to_exclusive();
        assert_eq!(r, Rect::new(1, 1, 2, 2));
    }

    #[test]
    fn translate_and_contains() {
        let r = Rect::new(0, 0, 3, 0).translate(Coord::new(5, 7));
        assert!(r.contains(Coord::new(8, 7)));
        assert!(!r.contains(Coord::new(9, 7)));
    }
}
