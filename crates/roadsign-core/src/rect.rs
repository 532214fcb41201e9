//! Axis-aligned pixel rectangles with closed bounds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bounding box in pixel coordinates. Both bounds are inclusive:
/// a single pixel is `left == right`, `top == bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Rectangle {
    /// Create a rectangle; bounds must satisfy `left <= right`, `top <= bottom`
    pub fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        debug_assert!(left <= right, "left {left} > right {right}");
        debug_assert!(top <= bottom, "top {top} > bottom {bottom}");
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Zero-area rectangle covering one pixel
    pub fn from_point(x: u32, y: u32) -> Self {
        Self::new(x, x, y, y)
    }

    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// `(right - left) * (bottom - top)`; zero for lines and points
    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Corners as `(x, y)`: top-left, top-right, bottom-left, bottom-right
    pub fn corners(&self) -> [(u32, u32); 4] {
        [
            (self.left, self.top),
            (self.right, self.top),
            (self.left, self.bottom),
            (self.right, self.bottom),
        ]
    }

    #[inline]
    pub fn contains_point(&self, x: u32, y: u32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// True if any corner of `other` lies inside `self`
    pub fn contains_corner_of(&self, other: &Rectangle) -> bool {
        other
            .corners()
            .iter()
            .any(|&(x, y)| self.contains_point(x, y))
    }

    /// Closed-interval overlap; touching edges count
    pub fn overlaps(&self, other: &Rectangle) -> bool {
        self.left <= other.right
            && other.left <= self.right
            && self.top <= other.bottom
            && other.top <= self.bottom
    }

    /// True if `other` lies entirely inside `self`
    pub fn contains(&self, other: &Rectangle) -> bool {
        self.left <= other.left
            && self.right >= other.right
            && self.top <= other.top
            && self.bottom >= other.bottom
    }

    /// Smallest rectangle containing both
    pub fn envelope(&self, other: &Rectangle) -> Rectangle {
        Rectangle {
            left: self.left.min(other.left),
            right: self.right.max(other.right),
            top: self.top.min(other.top),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Grow the bounds to include `(x, y)`
    pub fn include_point(&mut self, x: u32, y: u32) {
        self.left = self.left.min(x);
        self.right = self.right.max(x);
        self.top = self.top.min(y);
        self.bottom = self.bottom.max(y);
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..={}]x[{}..={}]",
            self.left, self.right, self.top, self.bottom
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_and_point() {
        let point = Rectangle::from_point(4, 7);
        assert_eq!(point.area(), 0);
        assert!(point.contains_point(4, 7));

        let rect = Rectangle::new(2, 6, 1, 4);
        assert_eq!((rect.width(), rect.height(), rect.area()), (4, 3, 12));
    }

    #[test]
    fn test_corner_containment_is_asymmetric() {
        let outer = Rectangle::new(0, 10, 0, 10);
        let inner = Rectangle::new(3, 5, 3, 5);
        assert!(outer.contains_corner_of(&inner));
        assert!(!inner.contains_corner_of(&outer));
    }

    #[test]
    fn test_cross_overlap_has_no_corner_inside() {
        let wide = Rectangle::new(0, 10, 4, 6);
        let tall = Rectangle::new(4, 6, 0, 10);
        assert!(!wide.contains_corner_of(&tall));
        assert!(!tall.contains_corner_of(&wide));
        assert!(wide.overlaps(&tall));
    }

    #[test]
    fn test_envelope() {
        let a = Rectangle::new(0, 4, 2, 3);
        let b = Rectangle::new(3, 9, 0, 1);
        let env = a.envelope(&b);
        assert_eq!(env, Rectangle::new(0, 9, 0, 3));
        assert!(env.contains(&a) && env.contains(&b));
    }

    #[test]
    fn test_include_point() {
        let mut rect = Rectangle::from_point(5, 5);
        rect.include_point(2, 8);
        rect.include_point(6, 4);
        assert_eq!(rect, Rectangle::new(2, 6, 4, 8));
    }
}
