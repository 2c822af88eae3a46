//! Rectangle type for crop regions.
//!
//! Coordinates follow the image convention: origin at the top-left,
//! X to the right, Y downward.
//!
//! ```rust
//! use retouch_core::Rect;
//!
//! let rect = Rect::new(10, 20, 100, 50);
//! assert!(rect.contains(15, 25));
//! assert!(!rect.contains(5, 25));
//! ```

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Creates a rectangle from origin and size.
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle at the origin.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Creates a rectangle spanning two corners (order independent, exclusive max).
    pub fn from_corners(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        let (x0, x1) = (x1.min(x2), x1.max(x2));
        let (y0, y1) = (y1.min(y2), y1.max(y2));
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Exclusive right edge. Saturates instead of overflowing.
    #[inline]
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge. Saturates instead of overflowing.
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Returns `true` if the rectangle has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if (x, y) lies inside.
    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Returns `true` if the rectangle lies fully inside a `width`x`height` area.
    #[inline]
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        // checked_add so a huge origin can't wrap back into range
        matches!(self.x.checked_add(self.width), Some(r) if r <= width)
            && matches!(self.y.checked_add(self.height), Some(b) if b <= height)
    }

    /// Intersection with another rectangle, `None` when they don't overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 > x0 && y1 > y0 {
            Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
        } else {
            None
        }
    }

    /// Number of pixels covered.
    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_any_order() {
        assert_eq!(Rect::from_corners(10, 10, 2, 4), Rect::new(2, 4, 8, 6));
    }

    #[test]
    fn test_fits_within() {
        assert!(Rect::new(0, 0, 4, 4).fits_within(4, 4));
        assert!(!Rect::new(1, 0, 4, 4).fits_within(4, 4));
        assert!(!Rect::new(u32::MAX, 0, 2, 1).fits_within(4, 4));
    }

    #[test]
    fn test_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersect(&b), Some(Rect::new(5, 5, 5, 5)));
        assert_eq!(a.intersect(&Rect::new(10, 0, 3, 3)), None);
    }

    #[test]
    fn test_empty_and_area() {
        assert!(Rect::new(3, 3, 0, 9).is_empty());
        assert_eq!(Rect::new(0, 0, 3, 7).area(), 21);
    }
}
