use crate::error::{GeometryError, Result};
use crate::math::{BoundingBox, Point2, Vector2, TOLERANCE};

use super::{Primitive2D, ShapeId};

/// An ellipse or elliptical arc.
///
/// `P(t) = center + a*cos(angle(t))*major_dir + b*sin(angle(t))*minor_dir`
/// where `minor_dir` is `major_dir` rotated 90 degrees CCW and
/// `angle(t) = start_angle + (end_angle - start_angle) * t`.
#[derive(Debug, Clone)]
pub struct Ellipse {
    pub id: ShapeId,
    pub center: Point2,
    pub semi_major: f64,
    pub semi_minor: f64,
    /// Rotation of the major axis from the X axis, in radians.
    pub rotation: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl Ellipse {
    /// Creates a new ellipse (or elliptical arc).
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if either semi-axis is
    /// non-positive.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ShapeId,
        center: Point2,
        semi_major: f64,
        semi_minor: f64,
        rotation: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self> {
        if semi_major < TOLERANCE {
            return Err(GeometryError::Degenerate("semi-major axis must be positive".into()).into());
        }
        if semi_minor < TOLERANCE {
            return Err(GeometryError::Degenerate("semi-minor axis must be positive".into()).into());
        }
        Ok(Self {
            id,
            center,
            semi_major,
            semi_minor,
            rotation,
            start_angle,
            end_angle,
        })
    }

    fn major_dir(&self) -> Vector2 {
        Vector2::new(self.rotation.cos(), self.rotation.sin())
    }

    fn minor_dir(&self) -> Vector2 {
        Vector2::new(-self.rotation.sin(), self.rotation.cos())
    }

    fn angle_at(&self, t: f64) -> f64 {
        self.start_angle + (self.end_angle - self.start_angle) * t
    }
}

impl Primitive2D for Ellipse {
    fn point_at(&self, t: f64) -> Result<Point2> {
        let angle = self.angle_at(t);
        let major = self.major_dir();
        let minor = self.minor_dir();
        let x = self.semi_major * angle.cos();
        let y = self.semi_minor * angle.sin();
        Ok(self.center + major * x + minor * y)
    }

    fn tangent_at(&self, t: f64) -> Result<Vector2> {
        let angle = self.angle_at(t);
        let major = self.major_dir();
        let minor = self.minor_dir();
        let dx = -self.semi_major * angle.sin();
        let dy = self.semi_minor * angle.cos();
        let tangent = major * dx + minor * dy;
        let len = tangent.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(tangent / len)
    }

    fn bounding_box(&self) -> BoundingBox {
        // Sample densely enough to bound a rotated partial ellipse tightly;
        // exact extrema would require solving a rotated-axis equation per
        // quadrant, which the offset/extend pipeline doesn't need precision
        // beyond this for (bounding boxes are used for pruning, not for
        // exact geometry).
        const SAMPLES: usize = 64;
        let mut pts = Vec::with_capacity(SAMPLES + 2);
        pts.push(self.start_point());
        pts.push(self.end_point());
        for i in 0..=SAMPLES {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f64 / SAMPLES as f64;
            #[allow(clippy::unwrap_used)]
            pts.push(self.point_at(t).unwrap());
        }
        BoundingBox::from_points(&pts)
    }

    fn is_closed(&self) -> bool {
        (self.end_angle - self.start_angle - std::f64::consts::TAU).abs() < TOLERANCE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, TAU};

    fn xy_ellipse(a: f64, b: f64) -> Ellipse {
        Ellipse::new(ShapeId::from_raw(1), Point2::origin(), a, b, 0.0, 0.0, TAU).unwrap()
    }

    #[test]
    fn evaluate_at_zero() {
        let e = xy_ellipse(3.0, 2.0);
        let p = e.point_at(0.0).unwrap();
        assert!((p.x - 3.0).abs() < TOLERANCE);
        assert!(p.y.abs() < TOLERANCE);
    }

    #[test]
    fn evaluate_at_quarter() {
        let e = xy_ellipse(3.0, 2.0);
        let p = e.point_at(0.25).unwrap();
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn full_ellipse_is_closed() {
        assert!(xy_ellipse(3.0, 2.0).is_closed());
    }

    #[test]
    fn partial_ellipse_is_not_closed() {
        let e = Ellipse::new(ShapeId::from_raw(1), Point2::origin(), 3.0, 2.0, 0.0, 0.0, std::f64::consts::PI).unwrap();
        assert!(!e.is_closed());
    }

    #[test]
    fn rotation_rotates_major_axis() {
        let e = Ellipse::new(ShapeId::from_raw(1), Point2::origin(), 3.0, 2.0, FRAC_PI_2, 0.0, TAU).unwrap();
        let p = e.point_at(0.0).unwrap();
        // Major axis now along +Y.
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - 3.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_semi_axis_rejected() {
        assert!(Ellipse::new(ShapeId::from_raw(1), Point2::origin(), 0.0, 1.0, 0.0, 0.0, TAU).is_err());
    }
}
