//! Shape extension (prolongation) along start/end tangents.

use crate::error::{PipelineError, Result};
use crate::math::TOLERANCE;
use crate::nurbs::{ControlPoint, Spline as NurbsCurve};
use crate::shape::{Arc, Ellipse, Line, Polyline, PolylineVertex, Shape};

/// Maximum angular extension for an arc, regardless of how large `length`
/// is relative to the radius — prevents a tiny-radius arc from wrapping
/// around on itself many times under a large extension length.
const MAX_ARC_EXTENSION_RADIANS: f64 = 4.0 * std::f64::consts::PI;

/// Prolongs `shape` by `length` at both ends along its tangent, preserving
/// curvature where natural (see per-variant notes below).
///
/// # Errors
///
/// Returns `PipelineError::ExtensionFailed` if the shape's tangent is
/// undefined at an endpoint (degenerate geometry).
pub fn extend(shape: &Shape, length: f64) -> Result<Shape> {
    match shape {
        Shape::Line(l) => extend_line(l, length).map(Shape::Line),
        Shape::Arc(a) => extend_arc(a, length).map(Shape::Arc),
        Shape::Circle(_) => Err(PipelineError::ExtensionFailed("circles are already closed and cannot be extended".into()).into()),
        Shape::Ellipse(e) => extend_ellipse(e, length).map(Shape::Ellipse),
        Shape::Polyline(p) => extend_polyline(p, length).map(Shape::Polyline),
        Shape::Spline(s) => extend_spline(&s.curve, length).map(|curve| Shape::Spline(crate::shape::Spline::new(curve))),
    }
}

fn extend_line(line: &Line, length: f64) -> Result<Line> {
    let dir = line.direction();
    Line::new(line.id, line.start - dir * length, line.end + dir * length)
}

fn extend_arc(arc: &Arc, length: f64) -> Result<Arc> {
    let delta = (length / arc.radius).min(MAX_ARC_EXTENSION_RADIANS);
    let sign = if arc.sweep >= 0.0 { 1.0 } else { -1.0 };
    let new_start = arc.start_angle - sign * delta;
    let new_sweep = arc.sweep + sign * 2.0 * delta;
    Arc::new(arc.id, arc.center, arc.radius, new_start, new_sweep)
}

/// Extends an elliptical arc by widening its angular span, the same
/// approach as [`extend_arc`]: the semi-major axis stands in for the arc's
/// radius when converting a linear extension length to an angle, since
/// elliptical arc length has no closed form. This is an approximation — the
/// actual arc length added is somewhat less than `length` away from the
/// major axis — acceptable for the same reason the bounding box is
/// approximate: extension feeds the intersection/trim pipeline's search
/// radius, not an exact geometric output.
fn extend_ellipse(e: &Ellipse, length: f64) -> Result<Ellipse> {
    let delta = (length / e.semi_major).min(MAX_ARC_EXTENSION_RADIANS);
    let sign = if e.end_angle >= e.start_angle { 1.0 } else { -1.0 };
    let new_start = e.start_angle - sign * delta;
    let new_end = e.end_angle + sign * delta;
    Ellipse::new(e.id, e.center, e.semi_major, e.semi_minor, e.rotation, new_start, new_end)
}

fn extend_polyline(pl: &Polyline, length: f64) -> Result<Polyline> {
    if pl.closed {
        return Ok(pl.clone());
    }
    let mut vertices = pl.vertices.clone();
    let n = vertices.len();
    if n < 2 {
        return Err(PipelineError::ExtensionFailed("polyline has fewer than 2 vertices".into()).into());
    }

    // Only straight first/last segments are linearly extended; a bulged end
    // segment is left as-is (its curvature has no natural "extend along the
    // tangent while keeping the same arc" meaning without changing radius,
    // which is arc extension's job, not the polyline's).
    if vertices[0].bulge.abs() < 1e-12 {
        let p0 = vertices[0].point();
        let p1 = vertices[1].point();
        let dir = (p1 - p0).try_normalize(TOLERANCE).ok_or_else(|| PipelineError::ExtensionFailed("degenerate first segment".into()))?;
        let new_start = p0 - dir * length;
        vertices[0] = PolylineVertex::line(new_start.x, new_start.y);
    }

    let last = n - 1;
    if vertices[last - 1].bulge.abs() < 1e-12 {
        let p0 = vertices[last - 1].point();
        let p1 = vertices[last].point();
        let dir = (p1 - p0).try_normalize(TOLERANCE).ok_or_else(|| PipelineError::ExtensionFailed("degenerate last segment".into()))?;
        let new_end = p1 + dir * length;
        vertices[last] = PolylineVertex::new(new_end.x, new_end.y, vertices[last].bulge);
    }

    Ok(Polyline {
        id: pl.id,
        vertices,
        closed: false,
    })
}

/// Extends a NURBS curve by adding one control point at each end, placed at
/// tangent distance `length` from the current endpoint.
///
/// This is a tangent-continuous approximation rather than an exact
/// shape-preserving extension (an exact extension would require solving the
/// reverse of Boehm's knot-removal formula for an arbitrarily chosen new
/// knot, which this kernel does not implement); it falls back to the
/// control-polygon secant direction when the analytic tangent is degenerate.
fn extend_spline(curve: &NurbsCurve, length: f64) -> Result<NurbsCurve> {
    let degree = curve.degree;
    let mut cps = curve.control_points.clone();
    let mut knots = curve.knots.clone();

    let start_tangent = curve
        .tangent_at(0.0)
        .unwrap_or_else(|_| secant_direction(&cps, true));
    let start_anchor = curve.point_at(0.0).map_err(|_| PipelineError::ExtensionFailed("degenerate spline start".into()))?;
    let new_start = start_anchor - start_tangent * length;

    let span_start = (knots[degree + 1] - knots[degree]).max(1e-6);
    let mut new_knots = vec![knots[0] - span_start; degree + 1];
    new_knots.push(knots[0]);
    new_knots.extend_from_slice(&knots[(degree + 1)..]);
    cps.insert(0, ControlPoint::new(new_start, 1.0));
    knots = new_knots;

    let end_tangent = curve.tangent_at(1.0).unwrap_or_else(|_| secant_direction(&curve.control_points, false));
    let end_anchor = curve.point_at(1.0).map_err(|_| PipelineError::ExtensionFailed("degenerate spline end".into()))?;
    let new_end = end_anchor + end_tangent * length;

    let last = knots.len() - 1;
    let span_end = (knots[last - degree] - knots[last - degree - 1]).max(1e-6);
    let old_end_value = knots[last];
    let mut final_knots = knots[..(last - degree)].to_vec();
    final_knots.push(old_end_value);
    final_knots.extend(vec![old_end_value + span_end; degree + 1]);
    cps.push(ControlPoint::new(new_end, 1.0));

    NurbsCurve::new(curve.id, degree, cps, final_knots)
}

fn secant_direction(cps: &[ControlPoint], at_start: bool) -> crate::math::Vector2 {
    let (a, b) = if at_start {
        (cps[0].position, cps.get(1).map_or(cps[0].position, |c| c.position))
    } else {
        let n = cps.len();
        (cps[n.saturating_sub(2)].position, cps[n - 1].position)
    };
    let d = b - a;
    d.try_normalize(TOLERANCE).unwrap_or_else(|| crate::math::Vector2::new(1.0, 0.0))
}
