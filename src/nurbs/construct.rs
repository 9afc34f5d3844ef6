//! Exact NURBS construction for the four analytic shape kinds, so the
//! dispatcher (component F) can hand any shape to the spline-based
//! intersection search without a lossy tessellate-and-fit step.

use crate::error::{GeometryError, Result};
use crate::math::{Point2, TOLERANCE};
use crate::shape::ShapeId;

use super::{ControlPoint, Spline};

/// Builds the (trivial) degree-1 NURBS representation of a line segment.
///
/// # Errors
///
/// Returns `GeometryError::Degenerate` if the endpoints coincide.
pub fn from_line(id: ShapeId, start: Point2, end: Point2) -> Result<Spline> {
    if (end - start).norm() < TOLERANCE {
        return Err(GeometryError::Degenerate("line endpoints coincide".into()).into());
    }
    let cps = vec![ControlPoint::new(start, 1.0), ControlPoint::new(end, 1.0)];
    let knots = Spline::clamped_uniform_knots(2, 1);
    Spline::new(id, 1, cps, knots)
}

/// Builds the exact rational quadratic Bezier-per-span representation of a
/// circular arc spanning `sweep` radians from `start_angle`, split into
/// enough spans that each span covers at most 120 degrees (the weight
/// formula below degenerates for spans approaching 180 degrees).
///
/// # Errors
///
/// Returns `GeometryError::Degenerate` if `radius` is non-positive or
/// `sweep` is zero.
pub fn from_arc(id: ShapeId, center: Point2, radius: f64, start_angle: f64, sweep: f64) -> Result<Spline> {
    if radius < TOLERANCE {
        return Err(GeometryError::Degenerate("arc radius must be positive".into()).into());
    }
    if sweep.abs() < TOLERANCE {
        return Err(GeometryError::Degenerate("arc sweep must be non-zero".into()).into());
    }

    const MAX_SPAN: f64 = std::f64::consts::FRAC_PI_3 * 2.0; // 120 degrees
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n_spans = ((sweep.abs() / MAX_SPAN).ceil() as usize).max(1);
    let span_sweep = sweep / n_spans as f64;
    let half = span_sweep / 2.0;
    let weight_mid = half.cos();

    let mut cps = Vec::with_capacity(2 * n_spans + 1);
    for i in 0..n_spans {
        let a0 = sweep.mul_add(i as f64 / n_spans as f64, start_angle);
        let a_mid = a0 + half;
        let a1 = a0 + span_sweep;

        let p0 = Point2::new(center.x + radius * a0.cos(), center.y + radius * a0.sin());
        let p1 = Point2::new(center.x + radius * a1.cos(), center.y + radius * a1.sin());
        // The mid control point lies on the line through the two tangent
        // intersections, at radius/cos(half) from the center.
        let r_mid = radius / weight_mid;
        let p_mid = Point2::new(center.x + r_mid * a_mid.cos(), center.y + r_mid * a_mid.sin());

        if i == 0 {
            cps.push(ControlPoint::new(p0, 1.0));
        }
        cps.push(ControlPoint::new(p_mid, weight_mid));
        cps.push(ControlPoint::new(p1, 1.0));
    }

    let n_control_points = cps.len();
    let degree = 2;
    let knots = arc_knot_vector(n_spans, degree);
    debug_assert_eq!(knots.len(), n_control_points + degree + 1);
    Spline::new(id, degree, cps, knots)
}

/// Builds a clamped knot vector with `n_spans` quadratic Bezier segments
/// stitched with full multiplicity at each interior knot (no continuity is
/// assumed between segments beyond matching endpoints — each span is an
/// independent rational Bezier arc).
fn arc_knot_vector(n_spans: usize, degree: usize) -> Vec<f64> {
    let mut knots = Vec::with_capacity(2 * (degree + 1) * n_spans);
    for _ in 0..=degree {
        knots.push(0.0);
    }
    for i in 1..n_spans {
        #[allow(clippy::cast_precision_loss)]
        let u = i as f64 / n_spans as f64;
        for _ in 0..degree {
            knots.push(u);
        }
    }
    for _ in 0..=degree {
        knots.push(1.0);
    }
    knots
}

/// Builds the exact NURBS representation of a full circle as a closed
/// rational quadratic spline (three 120-degree spans).
///
/// # Errors
///
/// Returns `GeometryError::Degenerate` if `radius` is non-positive.
pub fn from_circle(id: ShapeId, center: Point2, radius: f64) -> Result<Spline> {
    from_arc(id, center, radius, 0.0, std::f64::consts::TAU)
}

/// Builds the NURBS representation of an (elliptical) arc by constructing
/// the equivalent unit-circle arc and applying a non-uniform scale plus
/// rotation to every control point. Rational weights are invariant under
/// affine control-point transforms, so this is exact.
///
/// # Errors
///
/// Returns `GeometryError::Degenerate` if either semi-axis is non-positive
/// or the sweep is zero.
#[allow(clippy::too_many_arguments)]
pub fn from_ellipse(
    id: ShapeId,
    center: Point2,
    semi_major: f64,
    semi_minor: f64,
    rotation: f64,
    start_angle: f64,
    end_angle: f64,
) -> Result<Spline> {
    if semi_major < TOLERANCE || semi_minor < TOLERANCE {
        return Err(GeometryError::Degenerate("ellipse semi-axes must be positive".into()).into());
    }
    let mut circle = from_arc(id, Point2::origin(), 1.0, start_angle, end_angle - start_angle)?;
    let (cos_r, sin_r) = (rotation.cos(), rotation.sin());
    for cp in &mut circle.control_points {
        let x = cp.position.x * semi_major;
        let y = cp.position.y * semi_minor;
        cp.position = Point2::new(
            center.x + x * cos_r - y * sin_r,
            center.y + x * sin_r + y * cos_r,
        );
    }
    Ok(circle)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn line_endpoints_match() {
        let s = from_line(ShapeId::from_raw(1), Point2::new(0.0, 0.0), Point2::new(2.0, 0.0)).unwrap();
        assert!((s.point_at(0.0).unwrap().x).abs() < 1e-9);
        assert!((s.point_at(1.0).unwrap().x - 2.0).abs() < 1e-9);
    }

    #[test]
    fn quarter_arc_hits_endpoints_and_quadrant_point() {
        let s = from_arc(
            ShapeId::from_raw(1),
            Point2::origin(),
            2.0,
            0.0,
            std::f64::consts::FRAC_PI_2,
        )
        .unwrap();
        let p0 = s.point_at(0.0).unwrap();
        let p1 = s.point_at(1.0).unwrap();
        assert!((p0 - Point2::new(2.0, 0.0)).norm() < 1e-9);
        assert!((p1 - Point2::new(0.0, 2.0)).norm() < 1e-9);
        let mid = s.point_at(0.5).unwrap();
        assert!((mid.norm() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn full_circle_stays_on_radius() {
        let s = from_circle(ShapeId::from_raw(1), Point2::origin(), 3.0).unwrap();
        for i in 0..=20 {
            #[allow(clippy::cast_precision_loss)]
            let t = f64::from(i) / 20.0;
            let p = s.point_at(t).unwrap();
            assert!((p.coords.norm() - 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn ellipse_respects_semi_axes() {
        let s = from_ellipse(
            ShapeId::from_raw(1),
            Point2::origin(),
            3.0,
            1.0,
            0.0,
            0.0,
            std::f64::consts::TAU,
        )
        .unwrap();
        let p0 = s.point_at(0.0).unwrap();
        assert!((p0.x - 3.0).abs() < 1e-6);
        assert!(p0.y.abs() < 1e-6);
    }

    #[test]
    fn degenerate_arc_rejected() {
        assert!(from_arc(ShapeId::from_raw(1), Point2::origin(), 0.0, 0.0, 1.0).is_err());
    }
}
