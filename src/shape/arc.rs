use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::math::{BoundingBox, Point2, Vector2, TOLERANCE};

use super::{Primitive2D, ShapeId};

/// A circular arc, defined by center, radius, and a signed angular sweep
/// from `start_angle`. Positive `sweep` is counter-clockwise.
#[derive(Debug, Clone)]
pub struct Arc {
    pub id: ShapeId,
    pub center: Point2,
    pub radius: f64,
    pub start_angle: f64,
    pub sweep: f64,
}

impl Arc {
    /// Creates a new arc.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if the radius is non-positive or
    /// the sweep is zero.
    pub fn new(id: ShapeId, center: Point2, radius: f64, start_angle: f64, sweep: f64) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("arc radius must be positive".into()).into());
        }
        if sweep.abs() < TOLERANCE {
            return Err(GeometryError::Degenerate("arc sweep must be non-zero".into()).into());
        }
        Ok(Self {
            id,
            center,
            radius,
            start_angle,
            sweep,
        })
    }

    #[must_use]
    pub fn end_angle(&self) -> f64 {
        self.start_angle + self.sweep
    }

    #[must_use]
    pub fn arc_length(&self) -> f64 {
        self.radius * self.sweep.abs()
    }

    fn angle_at(&self, t: f64) -> f64 {
        self.start_angle + self.sweep * t
    }
}

impl Primitive2D for Arc {
    fn point_at(&self, t: f64) -> Result<Point2> {
        let angle = self.angle_at(t);
        Ok(Point2::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        ))
    }

    fn tangent_at(&self, t: f64) -> Result<Vector2> {
        let angle = self.angle_at(t);
        let sign = if self.sweep >= 0.0 { 1.0 } else { -1.0 };
        Ok(Vector2::new(-sign * angle.sin(), sign * angle.cos()))
    }

    fn bounding_box(&self) -> BoundingBox {
        // Sample the endpoints plus any axis-aligned extrema (angle = k*pi/2)
        // that fall within the arc's sweep.
        let mut pts = vec![self.start_point(), self.end_point()];
        for k in 0..4 {
            let cardinal = std::f64::consts::FRAC_PI_2 * f64::from(k);
            if let Some(t) = crate::math::intersect2d::angle_to_arc_param(
                cardinal,
                self.start_angle,
                self.sweep,
            ) {
                #[allow(clippy::unwrap_used)]
                pts.push(self.point_at(t).unwrap());
            }
        }
        BoundingBox::from_points(&pts)
    }

    fn is_closed(&self) -> bool {
        (self.sweep.abs() - TAU).abs() < TOLERANCE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn quarter_arc_endpoints() {
        let a = Arc::new(ShapeId::from_raw(1), Point2::origin(), 1.0, 0.0, PI / 2.0).unwrap();
        let p0 = a.point_at(0.0).unwrap();
        let p1 = a.point_at(1.0).unwrap();
        assert!((p0.x - 1.0).abs() < TOLERANCE);
        assert!(p0.y.abs() < TOLERANCE);
        assert!(p1.x.abs() < TOLERANCE);
        assert!((p1.y - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn tangent_is_unit() {
        let a = Arc::new(ShapeId::from_raw(1), Point2::origin(), 2.0, 0.0, PI).unwrap();
        let t = a.tangent_at(0.0).unwrap();
        assert!((t.norm() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn bounding_box_includes_cardinal_extrema() {
        // Semicircle from angle 0 to pi passes through (0, r) at the top.
        let a = Arc::new(ShapeId::from_raw(1), Point2::origin(), 1.0, 0.0, PI).unwrap();
        let bbox = a.bounding_box();
        assert!((bbox.max.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn invalid_radius_rejected() {
        assert!(Arc::new(ShapeId::from_raw(1), Point2::origin(), 0.0, 0.0, PI).is_err());
    }
}
