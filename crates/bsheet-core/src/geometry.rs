//! Layout-unit geometry primitives.

/// A width/height pair in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "policy-config", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// The zero size.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero or negative.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// A location in container coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of a sheet showing `offset` units above the bottom edge of
    /// a container of the given size.
    ///
    /// The offset is clamped to `[0, container.height]`.
    #[must_use]
    pub fn bottom_anchored(container: Size, offset: f64) -> Self {
        let visible = offset.clamp(0.0, container.height.max(0.0));
        Self::new(0.0, container.height - visible, container.width, visible)
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    /// Whether the rectangle covers no area.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Whether `point` lies inside the rectangle.
    ///
    /// Empty rectangles contain nothing.
    #[must_use]
    pub fn contains(self, point: Point) -> bool {
        !self.is_empty()
            && point.x >= self.x
            && point.x < self.right()
            && point.y >= self.y
            && point.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_anchored_rect_hugs_bottom_edge() {
        let rect = Rect::bottom_anchored(Size::new(320.0, 800.0), 300.0);
        assert_eq!(rect, Rect::new(0.0, 500.0, 320.0, 300.0));
        assert_eq!(rect.bottom(), 800.0);
    }

    #[test]
    fn bottom_anchored_rect_clamps_offset() {
        let container = Size::new(100.0, 200.0);
        assert_eq!(
            Rect::bottom_anchored(container, 500.0),
            Rect::new(0.0, 0.0, 100.0, 200.0)
        );
        assert!(Rect::bottom_anchored(container, -10.0).is_empty());
    }

    #[test]
    fn contains_excludes_far_edges() {
        let rect = Rect::new(0.0, 10.0, 50.0, 20.0);
        assert!(rect.contains(Point::new(0.0, 10.0)));
        assert!(rect.contains(Point::new(49.9, 29.9)));
        assert!(!rect.contains(Point::new(50.0, 15.0)));
        assert!(!rect.contains(Point::new(10.0, 30.0)));
        assert!(!rect.contains(Point::new(10.0, 9.0)));
    }

    #[test]
    fn empty_rect_contains_nothing() {
        let rect = Rect::new(5.0, 5.0, 0.0, 10.0);
        assert!(!rect.contains(Point::new(5.0, 6.0)));
    }
}
