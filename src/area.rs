//! Axis-aligned rectangles with inclusive integer bounds.
//!
//! `Area` is the unit of all clipping and damage arithmetic in the crate.
//! Both corners are inclusive: an area covering a single pixel has
//! `x1 == x2` and `y1 == y2`. An invalid (empty) area is represented by
//! the [`Area::INVALID`] sentinel, which overlaps nothing and acts as the
//! identity for [`Area::self_merge`].

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// A point on the logical pixel plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub x: i16,
    pub y: i16,
}

impl Pos {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    pub fn to_point(self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent {
    pub w: i16,
    pub h: i16,
}

impl Extent {
    pub const fn new(w: i16, h: i16) -> Self {
        Self { w, h }
    }
}

/// Rectangle with inclusive bounds.
///
/// Valid when `x1 <= x2` and `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    pub x1: i16,
    pub y1: i16,
    pub x2: i16,
    pub y2: i16,
}

impl Default for Area {
    fn default() -> Self {
        Self::INVALID
    }
}

impl Area {
    /// The empty sentinel: overlaps nothing, merges as identity.
    pub const INVALID: Self = Self {
        x1: i16::MAX,
        y1: i16::MAX,
        x2: i16::MIN,
        y2: i16::MIN,
    };

    pub const fn new(x1: i16, y1: i16, x2: i16, y2: i16) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Area from an origin and a size in pixels.
    pub const fn from_size(x: i16, y: i16, w: i16, h: i16) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + w - 1,
            y2: y + h - 1,
        }
    }

    pub const fn is_valid(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    /// Width in pixels (inclusive bounds).
    pub const fn width(&self) -> i16 {
        self.x2 - self.x1 + 1
    }

    /// Height in pixels (inclusive bounds).
    pub const fn height(&self) -> i16 {
        self.y2 - self.y1 + 1
    }

    pub const fn contains_pos(&self, pos: Pos) -> bool {
        pos.x >= self.x1 && pos.x <= self.x2 && pos.y >= self.y1 && pos.y <= self.y2
    }

    /// True unless one rectangle lies strictly outside the other on any axis.
    pub const fn overlaps(&self, other: &Self) -> bool {
        !(other.y1 > self.y2 || other.y2 < self.y1 || other.x1 > self.x2 || other.x2 < self.x1)
    }

    /// Intersection of two areas, `None` when they do not overlap.
    pub fn clip(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Self {
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
            x2: self.x2.min(other.x2),
            y2: self.y2.min(other.y2),
        })
    }

    /// In-place intersection. Returns false (leaving `self` untouched)
    /// when the areas do not overlap.
    pub fn self_clip(&mut self, other: &Self) -> bool {
        if !self.overlaps(other) {
            return false;
        }
        self.x1 = self.x1.max(other.x1);
        self.x2 = self.x2.min(other.x2);
        self.y1 = self.y1.max(other.y1);
        self.y2 = self.y2.min(other.y2);
        true
    }

    /// Bounding rectangle of two areas. Not an intersection: this is how
    /// the frame's dirty rectangle grows.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Grow `self` to the bounding rectangle of both areas. Seeding the
    /// accumulator with [`Area::INVALID`] makes the first merge an
    /// assignment.
    pub fn self_merge(&mut self, other: &Self) {
        self.x1 = self.x1.min(other.x1);
        self.y1 = self.y1.min(other.y1);
        self.x2 = self.x2.max(other.x2);
        self.y2 = self.y2.max(other.y2);
    }

    /// Convert to an embedded-graphics rectangle for primitive drawing.
    pub fn to_rectangle(&self) -> Rectangle {
        if !self.is_valid() {
            return Rectangle::zero();
        }
        Rectangle::new(
            Point::new(self.x1 as i32, self.y1 as i32),
            Size::new(self.width() as u32, self.height() as u32),
        )
    }

    /// Inclusive-bounds area covering a non-empty embedded-graphics
    /// rectangle. Zero-sized rectangles map to [`Area::INVALID`].
    pub fn from_rectangle(rect: &Rectangle) -> Self {
        if rect.size.width == 0 || rect.size.height == 0 {
            return Self::INVALID;
        }
        Self {
            x1: rect.top_left.x as i16,
            y1: rect.top_left.y as i16,
            x2: (rect.top_left.x + rect.size.width as i32 - 1) as i16,
            y2: (rect.top_left.y + rect.size.height as i32 - 1) as i16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_overlaps_nothing() {
        let a = Area::new(0, 0, 100, 100);
        assert!(!Area::INVALID.overlaps(&a));
        assert!(!a.overlaps(&Area::INVALID));
        assert!(!Area::INVALID.is_valid());
    }

    #[test]
    fn test_clip_disjoint() {
        let a = Area::new(0, 0, 10, 10);
        let b = Area::new(20, 20, 30, 30);
        assert!(a.clip(&b).is_none());
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_clip_partial_overlap() {
        let a = Area::new(0, 0, 10, 10);
        let b = Area::new(5, 5, 15, 15);
        assert_eq!(a.clip(&b), Some(Area::new(5, 5, 10, 10)));
    }

    #[test]
    fn test_clip_touching_edge_counts_as_overlap() {
        let a = Area::new(0, 0, 10, 10);
        let b = Area::new(10, 10, 20, 20);
        assert_eq!(a.clip(&b), Some(Area::new(10, 10, 10, 10)));
    }

    #[test]
    fn test_self_clip_no_overlap_leaves_self_unchanged() {
        let mut clip = Area::new(0, 0, 10, 10);
        let before = clip;
        assert!(!clip.self_clip(&Area::new(50, 50, 60, 60)));
        assert_eq!(clip, before);
    }

    #[test]
    fn test_merge_is_bounding_box() {
        let a = Area::new(0, 0, 10, 10);
        let b = Area::new(20, 20, 30, 30);
        assert_eq!(a.merge(&b), Area::new(0, 0, 30, 30));
    }

    #[test]
    fn test_self_merge_seeded_with_invalid_assigns() {
        let mut acc = Area::INVALID;
        let a = Area::new(3, 4, 5, 6);
        acc.self_merge(&a);
        assert_eq!(acc, a, "first merge into the sentinel must assign");
    }

    #[test]
    fn test_width_height_inclusive() {
        let a = Area::new(5, 5, 5, 5);
        assert_eq!(a.width(), 1);
        assert_eq!(a.height(), 1);
        assert_eq!(Area::from_size(10, 20, 32, 16), Area::new(10, 20, 41, 35));
    }

    #[test]
    fn test_rectangle_round_trip() {
        let a = Area::new(2, 3, 11, 7);
        let rect = a.to_rectangle();
        assert_eq!(rect.size.width, 10);
        assert_eq!(rect.size.height, 5);
        assert_eq!(Area::from_rectangle(&rect), a);
    }
}
