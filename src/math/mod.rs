pub mod arc2d;
pub mod distance2d;
pub mod intersect2d;
pub mod polygon2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// An axis-aligned bounding box in the XY plane.
///
/// Every shape and every NURBS subdivision leaf carries one of these; the
/// curve-curve intersection search (see [`crate::nurbs`]) prunes subtrees
/// whose boxes don't overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point2,
    pub max: Point2,
}

impl BoundingBox {
    /// Creates a bounding box from two corner points, normalizing min/max.
    #[must_use]
    pub fn new(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// A degenerate bounding box consisting of a single point.
    #[must_use]
    pub fn from_point(p: Point2) -> Self {
        Self { min: p, max: p }
    }

    /// Builds a bounding box enclosing a slice of points.
    ///
    /// Every call site produces `points` from a shape's own evaluation (at
    /// least one sample always exists), so an empty slice is never expected
    /// in practice; it is handled here as a degenerate point box at the
    /// origin rather than by panicking.
    #[must_use]
    pub fn from_points(points: &[Point2]) -> Self {
        let mut iter = points.iter();
        let Some(&first) = iter.next() else {
            return Self::from_point(Point2::origin());
        };
        let mut bbox = Self::from_point(first);
        for p in iter {
            bbox = bbox.expanded_to_include(*p);
        }
        bbox
    }

    #[must_use]
    pub fn expanded_to_include(&self, p: Point2) -> Self {
        Self {
            min: Point2::new(self.min.x.min(p.x), self.min.y.min(p.y)),
            max: Point2::new(self.max.x.max(p.x), self.max.y.max(p.y)),
        }
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    #[must_use]
    pub fn contains_point(&self, p: Point2) -> bool {
        p.x >= self.min.x - TOLERANCE
            && p.x <= self.max.x + TOLERANCE
            && p.y >= self.min.y - TOLERANCE
            && p.y <= self.max.y + TOLERANCE
    }

    /// Whether two bounding boxes overlap, expanded by `tolerance` on each side.
    #[must_use]
    pub fn overlaps(&self, other: &Self, tolerance: f64) -> bool {
        self.min.x - tolerance <= other.max.x + tolerance
            && self.max.x + tolerance >= other.min.x - tolerance
            && self.min.y - tolerance <= other.max.y + tolerance
            && self.max.y + tolerance >= other.min.y - tolerance
    }

    #[must_use]
    pub fn diameter(&self) -> f64 {
        (self.max - self.min).norm()
    }

    #[must_use]
    pub fn expanded_by(&self, margin: f64) -> Self {
        Self {
            min: Point2::new(self.min.x - margin, self.min.y - margin),
            max: Point2::new(self.max.x + margin, self.max.y + margin),
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        nalgebra::center(&self.min, &self.max)
    }
}
