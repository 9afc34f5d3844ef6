use crate::error::{GeometryError, Result};
use crate::math::{BoundingBox, Point2, Vector2, TOLERANCE};

use super::{Primitive2D, ShapeId};

/// A straight line segment between two endpoints.
#[derive(Debug, Clone)]
pub struct Line {
    pub id: ShapeId,
    pub start: Point2,
    pub end: Point2,
}

impl Line {
    /// Creates a new line segment.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if `start` and `end` coincide.
    pub fn new(id: ShapeId, start: Point2, end: Point2) -> Result<Self> {
        if (end - start).norm() < TOLERANCE {
            return Err(GeometryError::Degenerate("line endpoints coincide".into()).into());
        }
        Ok(Self { id, start, end })
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    #[must_use]
    pub fn direction(&self) -> Vector2 {
        (self.end - self.start).normalize()
    }
}

impl Primitive2D for Line {
    fn point_at(&self, t: f64) -> Result<Point2> {
        Ok(self.start + (self.end - self.start) * t)
    }

    fn tangent_at(&self, _t: f64) -> Result<Vector2> {
        let d = self.end - self.start;
        let len = d.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(d / len)
    }

    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.start, self.end)
    }

    fn is_closed(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn point_at_midpoint() {
        let l = Line::new(ShapeId::from_raw(1), Point2::new(0.0, 0.0), Point2::new(2.0, 4.0)).unwrap();
        let p = l.point_at(0.5).unwrap();
        assert!((p.x - 1.0).abs() < TOLERANCE);
        assert!((p.y - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn tangent_is_unit() {
        let l = Line::new(ShapeId::from_raw(1), Point2::new(0.0, 0.0), Point2::new(3.0, 4.0)).unwrap();
        let t = l.tangent_at(0.0).unwrap();
        assert!((t.norm() - 1.0).abs() < TOLERANCE);
        assert!((t.x - 0.6).abs() < TOLERANCE);
        assert!((t.y - 0.8).abs() < TOLERANCE);
    }

    #[test]
    fn degenerate_line_rejected() {
        let r = Line::new(ShapeId::from_raw(1), Point2::new(1.0, 1.0), Point2::new(1.0, 1.0));
        assert!(r.is_err());
    }

    #[test]
    fn never_closed() {
        let l = Line::new(ShapeId::from_raw(1), Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)).unwrap();
        assert!(!l.is_closed());
    }
}
