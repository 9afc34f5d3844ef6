use crate::error::Result;
use crate::math::{BoundingBox, Point2, Vector2};
use crate::nurbs;

use super::{Primitive2D, ShapeId};

/// A NURBS curve shape. Thin wrapper around [`nurbs::Spline`] so that
/// construction (component B) stays in its own module while `Shape` keeps a
/// uniform six-variant surface.
#[derive(Debug, Clone)]
pub struct Spline {
    pub id: ShapeId,
    pub curve: nurbs::Spline,
}

impl Spline {
    #[must_use]
    pub fn new(curve: nurbs::Spline) -> Self {
        Self { id: curve.id, curve }
    }
}

impl Primitive2D for Spline {
    fn point_at(&self, t: f64) -> Result<Point2> {
        self.curve.point_at(t)
    }

    fn tangent_at(&self, t: f64) -> Result<Vector2> {
        self.curve.tangent_at(t)
    }

    fn bounding_box(&self) -> BoundingBox {
        self.curve.bounding_box()
    }

    fn is_closed(&self) -> bool {
        let start = self.curve.point_at(0.0);
        let end = self.curve.point_at(1.0);
        match (start, end) {
            (Ok(a), Ok(b)) => (a - b).norm() < crate::math::TOLERANCE,
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::nurbs::ControlPoint;

    fn open_line_spline() -> Spline {
        let cps = vec![
            ControlPoint::new(Point2::new(0.0, 0.0), 1.0),
            ControlPoint::new(Point2::new(1.0, 0.0), 1.0),
        ];
        let knots = nurbs::Spline::clamped_uniform_knots(2, 1);
        let curve = nurbs::Spline::new(ShapeId::from_raw(1), 1, cps, knots).unwrap();
        Spline::new(curve)
    }

    #[test]
    fn delegates_point_at_to_curve() {
        let s = open_line_spline();
        let p = s.point_at(0.5).unwrap();
        assert!((p.x - 0.5).abs() < 1e-9);
    }

    #[test]
    fn open_curve_is_not_closed() {
        let s = open_line_spline();
        assert!(!s.is_closed());
    }
}
