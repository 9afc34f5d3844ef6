mod arc;
mod circle;
mod ellipse;
mod line;
mod polyline;
mod spline;

pub use arc::Arc;
pub use circle::Circle;
pub use ellipse::Ellipse;
pub use line::Line;
pub use polyline::{Polyline, PolylineVertex};
pub use spline::Spline;

use crate::error::Result;
use crate::math::{BoundingBox, Point2};

/// Opaque, deterministically-derived identity for a shape.
///
/// Arena-backed generational keys (the usual Rust pattern for this, e.g.
/// `slotmap`) are insertion-order dependent and therefore unusable here: the
/// kernel is a pure function of its inputs and repeated calls must produce
/// bit-for-bit identical output, ids included. `ShapeId` is instead a plain
/// value derived from a parent id and a salt via a fixed bit-mixer, so two
/// calls with the same inputs always mint the same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapeId(pub u64);

impl ShapeId {
    /// Wraps an externally-assigned id (e.g. one coming from an importer).
    #[must_use]
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Derives a new id from a parent id and an operation-specific salt.
    ///
    /// This is a splitmix64-style bit mixer: cheap, deterministic, and
    /// collision-resistant in practice for the small populations a single
    /// chain-offset call produces.
    #[must_use]
    pub fn derive(parent: ShapeId, salt: u64) -> Self {
        let mut z = parent.0 ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        Self(z ^ (z >> 31))
    }
}

/// The common evaluation surface every shape variant implements.
///
/// `Shape` itself dispatches to these via a `match`, not a trait object —
/// the variant set is closed and known ahead of time, so a tagged union with
/// manual dispatch avoids the indirection (and the `Box<dyn Trait>`
/// allocation) a virtual method hierarchy would force on every shape.
pub trait Primitive2D {
    /// Evaluates the position at parameter `t` in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if `t` is outside `[0, 1]` or the shape is degenerate.
    fn point_at(&self, t: f64) -> Result<Point2>;

    /// Evaluates the unit tangent direction at parameter `t` in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if `t` is outside `[0, 1]` or the tangent is undefined
    /// (zero-length derivative).
    fn tangent_at(&self, t: f64) -> Result<crate::math::Vector2>;

    fn start_point(&self) -> Point2 {
        #[allow(clippy::unwrap_used)]
        self.point_at(0.0).unwrap()
    }

    fn end_point(&self) -> Point2 {
        #[allow(clippy::unwrap_used)]
        self.point_at(1.0).unwrap()
    }

    fn bounding_box(&self) -> BoundingBox;

    fn is_closed(&self) -> bool {
        false
    }
}

/// The six primitive shape kinds the kernel operates on, tagged by variant
/// rather than dispatched through a trait object (see [`Primitive2D`]).
#[derive(Debug, Clone)]
pub enum Shape {
    Line(Line),
    Arc(Arc),
    Circle(Circle),
    Ellipse(Ellipse),
    Polyline(Polyline),
    Spline(Spline),
}

impl Shape {
    #[must_use]
    pub fn id(&self) -> ShapeId {
        match self {
            Shape::Line(s) => s.id,
            Shape::Arc(s) => s.id,
            Shape::Circle(s) => s.id,
            Shape::Ellipse(s) => s.id,
            Shape::Polyline(s) => s.id,
            Shape::Spline(s) => s.id,
        }
    }

    #[must_use]
    pub fn with_id(self, id: ShapeId) -> Self {
        match self {
            Shape::Line(mut s) => {
                s.id = id;
                Shape::Line(s)
            }
            Shape::Arc(mut s) => {
                s.id = id;
                Shape::Arc(s)
            }
            Shape::Circle(mut s) => {
                s.id = id;
                Shape::Circle(s)
            }
            Shape::Ellipse(mut s) => {
                s.id = id;
                Shape::Ellipse(s)
            }
            Shape::Polyline(mut s) => {
                s.id = id;
                Shape::Polyline(s)
            }
            Shape::Spline(mut s) => {
                s.id = id;
                s.curve.id = id;
                Shape::Spline(s)
            }
        }
    }

    pub fn point_at(&self, t: f64) -> Result<Point2> {
        match self {
            Shape::Line(s) => s.point_at(t),
            Shape::Arc(s) => s.point_at(t),
            Shape::Circle(s) => s.point_at(t),
            Shape::Ellipse(s) => s.point_at(t),
            Shape::Polyline(s) => s.point_at(t),
            Shape::Spline(s) => s.point_at(t),
        }
    }

    pub fn tangent_at(&self, t: f64) -> Result<crate::math::Vector2> {
        match self {
            Shape::Line(s) => s.tangent_at(t),
            Shape::Arc(s) => s.tangent_at(t),
            Shape::Circle(s) => s.tangent_at(t),
            Shape::Ellipse(s) => s.tangent_at(t),
            Shape::Polyline(s) => s.tangent_at(t),
            Shape::Spline(s) => s.tangent_at(t),
        }
    }

    #[must_use]
    pub fn start_point(&self) -> Point2 {
        match self {
            Shape::Line(s) => s.start_point(),
            Shape::Arc(s) => s.start_point(),
            Shape::Circle(s) => s.start_point(),
            Shape::Ellipse(s) => s.start_point(),
            Shape::Polyline(s) => s.start_point(),
            Shape::Spline(s) => s.start_point(),
        }
    }

    #[must_use]
    pub fn end_point(&self) -> Point2 {
        match self {
            Shape::Line(s) => s.end_point(),
            Shape::Arc(s) => s.end_point(),
            Shape::Circle(s) => s.end_point(),
            Shape::Ellipse(s) => s.end_point(),
            Shape::Polyline(s) => s.end_point(),
            Shape::Spline(s) => s.end_point(),
        }
    }

    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Shape::Line(s) => s.bounding_box(),
            Shape::Arc(s) => s.bounding_box(),
            Shape::Circle(s) => s.bounding_box(),
            Shape::Ellipse(s) => s.bounding_box(),
            Shape::Polyline(s) => s.bounding_box(),
            Shape::Spline(s) => s.bounding_box(),
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        match self {
            Shape::Line(s) => s.is_closed(),
            Shape::Arc(s) => s.is_closed(),
            Shape::Circle(s) => s.is_closed(),
            Shape::Ellipse(s) => s.is_closed(),
            Shape::Polyline(s) => s.is_closed(),
            Shape::Spline(s) => s.is_closed(),
        }
    }

    /// A short tag used for dispatch-table lookups and logging.
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Line(_) => ShapeKind::Line,
            Shape::Arc(_) => ShapeKind::Arc,
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Ellipse(_) => ShapeKind::Ellipse,
            Shape::Polyline(_) => ShapeKind::Polyline,
            Shape::Spline(_) => ShapeKind::Spline,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Line,
    Arc,
    Circle,
    Ellipse,
    Polyline,
    Spline,
}
