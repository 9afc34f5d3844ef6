use crate::error::{GeometryError, Result};
use crate::math::{BoundingBox, Point2, Vector2, TOLERANCE};

use super::{Primitive2D, ShapeId};

/// A full circle, parameterized over `[0, 1]` mapping to `[0, 2*pi)`.
#[derive(Debug, Clone)]
pub struct Circle {
    pub id: ShapeId,
    pub center: Point2,
    pub radius: f64,
}

impl Circle {
    /// Creates a new circle.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if the radius is non-positive.
    pub fn new(id: ShapeId, center: Point2, radius: f64) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("circle radius must be positive".into()).into());
        }
        Ok(Self { id, center, radius })
    }

    #[must_use]
    pub fn circumference(&self) -> f64 {
        std::f64::consts::TAU * self.radius
    }
}

impl Primitive2D for Circle {
    fn point_at(&self, t: f64) -> Result<Point2> {
        let angle = std::f64::consts::TAU * t;
        Ok(Point2::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        ))
    }

    fn tangent_at(&self, t: f64) -> Result<Vector2> {
        let angle = std::f64::consts::TAU * t;
        Ok(Vector2::new(-angle.sin(), angle.cos()))
    }

    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(
            Point2::new(self.center.x - self.radius, self.center.y - self.radius),
            Point2::new(self.center.x + self.radius, self.center.y + self.radius),
        )
    }

    fn is_closed(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn point_at_zero_is_east() {
        let c = Circle::new(ShapeId::from_raw(1), Point2::origin(), 2.0).unwrap();
        let p = c.point_at(0.0).unwrap();
        assert!((p.x - 2.0).abs() < TOLERANCE);
        assert!(p.y.abs() < TOLERANCE);
    }

    #[test]
    fn bounding_box_is_square() {
        let c = Circle::new(ShapeId::from_raw(1), Point2::new(1.0, 1.0), 3.0).unwrap();
        let bbox = c.bounding_box();
        assert!((bbox.width() - 6.0).abs() < TOLERANCE);
        assert!((bbox.height() - 6.0).abs() < TOLERANCE);
    }

    #[test]
    fn always_closed() {
        let c = Circle::new(ShapeId::from_raw(1), Point2::origin(), 1.0).unwrap();
        assert!(c.is_closed());
    }

    #[test]
    fn invalid_radius() {
        assert!(Circle::new(ShapeId::from_raw(1), Point2::origin(), 0.0).is_err());
    }
}
