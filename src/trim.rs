//! Shape trim (§4.I): cuts a shape at a point on (or near) its own extent,
//! keeping one half.

use crate::error::{DomainError, GeometryError, PipelineError, Result};
use crate::extend;
use crate::math::{Point2, TOLERANCE};
use crate::shape::{Arc, Line, Polyline, PolylineVertex, Shape};

/// Minimum arc span a trim result may have; below this the trimmed arc is
/// considered degenerate rather than a vanishingly short sliver.
const MIN_ARC_SPAN: f64 = 1e-4;

/// Which half of the shape to keep, relative to the trim point's parameter
/// `t`: `Start` keeps `[0, t]`, `End` keeps `[t, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimSide {
    Start,
    End,
}

/// Trims `shape` at the point on it nearest to `point`, keeping `keep`.
///
/// If the nearest point lies outside the shape's own `[0, 1]` domain (i.e.
/// `point` only lies on the shape's *extension*), the shape is first
/// extended by `extension_length` and the trim point is re-resolved against
/// the extended shape; the second element of the return value reports
/// whether this happened, so callers (the chain-offset pipeline) can record
/// it as a warning.
///
/// # Errors
///
/// Returns `DomainError::InvalidInput` if no parameter for `point` can be
/// resolved even after extension, or `GeometryError::Degenerate` if the kept
/// half would itself be degenerate (e.g. an arc span below [`MIN_ARC_SPAN`]).
pub fn trim(shape: &Shape, point: Point2, keep: TrimSide, tolerance: f64, extension_length: f64) -> Result<(Shape, bool)> {
    match nearest_param(shape, point) {
        Some(t) if (-tolerance..=1.0 + tolerance).contains(&t) => {
            let cut = trim_at(shape, t.clamp(0.0, 1.0), keep)?;
            Ok((cut, false))
        }
        _ => {
            let extended = extend::extend(shape, extension_length)?;
            let Some(t) = nearest_param(&extended, point) else {
                return Err(DomainError::InvalidInput("trim point does not lie on the shape or its extension".into()).into());
            };
            if !(-tolerance..=1.0 + tolerance).contains(&t) {
                return Err(PipelineError::Failed("trim point lies beyond the maximum extension length".into()).into());
            }
            let cut = trim_at(&extended, t.clamp(0.0, 1.0), keep)?;
            Ok((cut, true))
        }
    }
}

/// Finds the parameter on `shape` nearest to `point`, extrapolating beyond
/// `[0, 1]` where the shape's own parameterization supports it (lines and
/// arcs; polylines and splines report `None` outside their own extent since
/// they have no natural linear extrapolation of `t`).
fn nearest_param(shape: &Shape, point: Point2) -> Option<f64> {
    match shape {
        Shape::Line(l) => {
            let d = l.end - l.start;
            let len_sq = d.dot(&d);
            if len_sq < TOLERANCE {
                return None;
            }
            Some((point - l.start).dot(&d) / len_sq)
        }
        Shape::Arc(a) => {
            if a.sweep.abs() < TOLERANCE {
                return None;
            }
            let angle = (point.y - a.center.y).atan2(point.x - a.center.x);
            // Unwraps to whichever equivalent angle lands closest to the
            // arc's own span (rather than clamping to it), so a point
            // beyond either end still resolves to a well-defined t outside
            // [0, 1] for the extension fallback above to work with.
            let period = std::f64::consts::TAU / a.sweep.abs();
            let mut t = (angle - a.start_angle) / a.sweep;
            while t < 0.5 - period / 2.0 {
                t += period;
            }
            while t > 0.5 + period / 2.0 {
                t -= period;
            }
            Some(t)
        }
        Shape::Circle(_) => None,
        Shape::Ellipse(e) => {
            let angle = (point.y - e.center.y).atan2(point.x - e.center.x);
            let span = e.end_angle - e.start_angle;
            if span.abs() < TOLERANCE {
                return None;
            }
            Some((angle - e.start_angle) / span)
        }
        Shape::Polyline(pl) => nearest_param_polyline(pl, point),
        Shape::Spline(s) => nearest_param_spline(&s.curve, point),
    }
}

fn nearest_param_polyline(pl: &Polyline, point: Point2) -> Option<f64> {
    let seg_count = pl.segment_count();
    if seg_count == 0 {
        return None;
    }
    let mut best: Option<(f64, f64)> = None; // (dist_sq, global_t)
    for i in 0..seg_count {
        const SAMPLES: usize = 20;
        for j in 0..=SAMPLES {
            #[allow(clippy::cast_precision_loss)]
            let local_t = j as f64 / SAMPLES as f64;
            let Ok((p, _)) = pl.point_tangent_on_segment(i, local_t) else { continue };
            let d = (p - point).norm_squared();
            #[allow(clippy::cast_precision_loss)]
            let global_t = (i as f64 + local_t) / seg_count as f64;
            if best.is_none_or(|(bd, _)| d < bd) {
                best = Some((d, global_t));
            }
        }
    }
    best.map(|(_, t)| t)
}

fn nearest_param_spline(curve: &crate::nurbs::Spline, point: Point2) -> Option<f64> {
    const SAMPLES: usize = 200;
    let mut best: Option<(f64, f64)> = None;
    for i in 0..=SAMPLES {
        #[allow(clippy::cast_precision_loss)]
        let t = i as f64 / SAMPLES as f64;
        let Ok(p) = curve.point_at(t) else { continue };
        let d = (p - point).norm_squared();
        if best.is_none_or(|(bd, _)| d < bd) {
            best = Some((d, t));
        }
    }
    best.map(|(_, t)| t)
}

fn trim_at(shape: &Shape, t: f64, keep: TrimSide) -> Result<Shape> {
    match shape {
        Shape::Line(l) => trim_line(l, t, keep).map(Shape::Line),
        Shape::Arc(a) => trim_arc(a, t, keep).map(Shape::Arc),
        Shape::Circle(_) => Err(PipelineError::Failed("a full circle has no endpoints to trim between".into()).into()),
        Shape::Ellipse(e) => trim_ellipse(e, t, keep).map(Shape::Ellipse),
        Shape::Polyline(pl) => trim_polyline(pl, t, keep).map(Shape::Polyline),
        Shape::Spline(s) => trim_spline(&s.curve, t, keep).map(|c| Shape::Spline(crate::shape::Spline::new(c))),
    }
}

fn trim_line(line: &Line, t: f64, keep: TrimSide) -> Result<Line> {
    let cut = line.start + (line.end - line.start) * t;
    match keep {
        TrimSide::Start => Line::new(line.id, line.start, cut),
        TrimSide::End => Line::new(line.id, cut, line.end),
    }
}

fn trim_arc(arc: &Arc, t: f64, keep: TrimSide) -> Result<Arc> {
    let cut_angle = arc.start_angle + arc.sweep * t;
    let (new_start, new_sweep) = match keep {
        TrimSide::Start => (arc.start_angle, arc.sweep * t),
        TrimSide::End => (cut_angle, arc.sweep * (1.0 - t)),
    };
    if new_sweep.abs() < MIN_ARC_SPAN {
        return Err(GeometryError::Degenerate("trimmed arc span below minimum threshold".into()).into());
    }
    Arc::new(arc.id, arc.center, arc.radius, new_start, new_sweep)
}

fn trim_ellipse(e: &crate::shape::Ellipse, t: f64, keep: TrimSide) -> Result<crate::shape::Ellipse> {
    let cut_angle = e.start_angle + (e.end_angle - e.start_angle) * t;
    let (new_start, new_end) = match keep {
        TrimSide::Start => (e.start_angle, cut_angle),
        TrimSide::End => (cut_angle, e.end_angle),
    };
    if (new_end - new_start).abs() < MIN_ARC_SPAN {
        return Err(GeometryError::Degenerate("trimmed elliptical arc span below minimum threshold".into()).into());
    }
    crate::shape::Ellipse::new(e.id, e.center, e.semi_major, e.semi_minor, e.rotation, new_start, new_end)
}

fn trim_polyline(pl: &Polyline, t: f64, keep: TrimSide) -> Result<Polyline> {
    let seg_count = pl.segment_count();
    if seg_count == 0 {
        return Err(DomainError::InvalidInput("polyline has no segments to trim".into()).into());
    }
    #[allow(clippy::cast_precision_loss)]
    let scaled = (t.clamp(0.0, 1.0) * seg_count as f64).min(seg_count as f64 - f64::EPSILON);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let seg_idx = scaled.floor() as usize;
    let local_t = scaled - scaled.floor();
    let (v0, _v1) = pl.segment(seg_idx);
    let (cut_point, _) = pl.point_tangent_on_segment(seg_idx, local_t)?;

    let mut vertices = Vec::new();
    match keep {
        TrimSide::Start => {
            vertices.extend(pl.vertices[..=seg_idx].iter().copied());
            // The partial segment ending at the cut keeps v0's bulge, scaled
            // to the shorter sweep for an arc segment.
            // `vertices` was just extended with `pl.vertices[..=seg_idx]`, so
            // index `seg_idx` (the last one copied in) is always present.
            if v0.bulge.abs() > 1e-12 {
                let sweep_fraction = local_t;
                let scaled_bulge = (sweep_fraction * (4.0 * v0.bulge.atan()) / 4.0).tan();
                vertices[seg_idx].bulge = scaled_bulge;
            } else {
                vertices[seg_idx].bulge = 0.0;
            }
            vertices.push(PolylineVertex::line(cut_point.x, cut_point.y));
        }
        TrimSide::End => {
            let remaining_bulge = if v0.bulge.abs() > 1e-12 {
                let sweep_fraction = 1.0 - local_t;
                (sweep_fraction * (4.0 * v0.bulge.atan()) / 4.0).tan()
            } else {
                0.0
            };
            vertices.push(PolylineVertex::new(cut_point.x, cut_point.y, remaining_bulge));
            vertices.extend(pl.vertices[(seg_idx + 1)..].iter().copied());
        }
    }

    if vertices.len() < 2 {
        return Err(GeometryError::Degenerate("trimmed polyline has fewer than 2 vertices".into()).into());
    }
    Ok(Polyline {
        id: pl.id,
        vertices,
        closed: false,
    })
}

fn trim_spline(curve: &crate::nurbs::Spline, t: f64, keep: TrimSide) -> Result<crate::nurbs::Spline> {
    let (left, right) = curve.split(t)?;
    Ok(match keep {
        TrimSide::Start => left,
        TrimSide::End => right,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use crate::shape::ShapeId;

    #[test]
    fn trim_line_keeps_requested_half() {
        let l = Line::new(ShapeId::from_raw(1), Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)).unwrap();
        let (cut, extended) = trim(&Shape::Line(l), Point2::new(4.0, 0.0), TrimSide::Start, 1e-6, 100.0).unwrap();
        assert!(!extended);
        assert!((cut.end_point().x - 4.0).abs() < 1e-6);
    }

    #[test]
    fn trim_at_own_start_is_identity_under_end_keep() {
        let l = Line::new(ShapeId::from_raw(1), Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)).unwrap();
        let (cut, _) = trim(&Shape::Line(l), Point2::new(0.0, 0.0), TrimSide::End, 1e-6, 100.0).unwrap();
        assert!((cut.start_point().x).abs() < 1e-6);
        assert!((cut.end_point().x - 10.0).abs() < 1e-6);
    }

    #[test]
    fn trim_beyond_extent_extends_first() {
        let l = Line::new(ShapeId::from_raw(1), Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)).unwrap();
        let (cut, extended) = trim(&Shape::Line(l), Point2::new(15.0, 0.0), TrimSide::Start, 1e-6, 100.0).unwrap();
        assert!(extended);
        assert!((cut.end_point().x - 15.0).abs() < 1e-6);
    }

    #[test]
    fn trim_arc_rejects_degenerate_sliver() {
        let a = Arc::new(ShapeId::from_raw(1), Point2::origin(), 5.0, 0.0, 0.001).unwrap();
        let result = trim(&Shape::Arc(a), Point2::new(5.0, 0.0), TrimSide::Start, 1e-6, 100.0);
        assert!(result.is_err());
    }

    #[test]
    fn trim_spline_keeps_requested_half() {
        use crate::nurbs::{ControlPoint, Spline as NurbsCurve};
        let cps = vec![
            ControlPoint::new(Point2::new(0.0, 0.0), 1.0),
            ControlPoint::new(Point2::new(5.0, 0.0), 1.0),
            ControlPoint::new(Point2::new(10.0, 0.0), 1.0),
        ];
        let knots = NurbsCurve::clamped_uniform_knots(3, 1);
        let curve = NurbsCurve::new(ShapeId::from_raw(1), 1, cps, knots).unwrap();
        let shape = Shape::Spline(crate::shape::Spline::new(curve));
        let (cut, extended) = trim(&shape, Point2::new(5.0, 0.0), TrimSide::Start, 1e-6, 100.0).unwrap();
        assert!(!extended);
        assert!((cut.end_point().x - 5.0).abs() < 1e-3);
    }
}
