//! Axis-aligned bounding boxes in the projected plane.

use std::ops::Add;

use lr_core::Point2;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Box from explicit corners; the corners are reordered if needed.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// The box spanned by two points, grown by `padding` on every side.
    pub fn around(a: Point2, b: Point2, padding: f64) -> Self {
        Self::new(a.x, a.y, b.x, b.y).padded(padding)
    }

    /// Smallest box containing every point; `None` for an empty input.
    pub fn from_points<I: IntoIterator<Item = Point2>>(points: I) -> Option<Self> {
        points
            .into_iter()
            .map(|p| Self::new(p.x, p.y, p.x, p.y))
            .reduce(|a, b| a + b)
    }

    pub fn padded(self, padding: f64) -> Self {
        Self {
            min_x: self.min_x - padding,
            min_y: self.min_y - padding,
            max_x: self.max_x + padding,
            max_y: self.max_y + padding,
        }
    }

    pub fn union(self, other: Bounds) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    #[inline]
    pub fn contains(&self, p: Point2) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn min(&self) -> Point2 {
        Point2::new(self.min_x, self.min_y)
    }

    pub fn max(&self) -> Point2 {
        Point2::new(self.max_x, self.max_y)
    }

    pub fn is_finite(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
    }
}

impl Add for Bounds {
    type Output = Bounds;

    fn add(self, other: Bounds) -> Bounds {
        self.union(other)
    }
}
