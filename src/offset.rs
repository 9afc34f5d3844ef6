//! Shape offset (§4.H): produces a new shape displaced by a perpendicular
//! distance, generalized across all six primitive kinds.
//!
//! Every variant is offset along the same signed-distance convention: the
//! caller picks [`OffsetSide::Inset`] or [`OffsetSide::Outset`], which this
//! module maps to a sign on the left-normal offset used throughout (the
//! same convention the polyline joinery logic below is grounded on). Whether
//! "inset" ends up meaning physically inward or outward for a given chain
//! depends on that chain's own winding — [`crate::side`] resolves that after
//! the fact, so this module only needs internal consistency between
//! adjoining shapes, not a global notion of "inward".

use crate::error::{GeometryError, Result};
use crate::math::arc2d::{arc_from_bulge, arc_tangent_at, offset_arc_segment};
use crate::math::polygon2d::{left_normal, segment_direction};
use crate::math::{Point2, Vector2, TOLERANCE};
use crate::shape::{Arc, Circle, Ellipse, Line, Polyline, PolylineVertex, Primitive2D, Shape, ShapeId};

/// Near-antiparallel cutoff for corner handling: beyond this the two offset
/// segments diverge so sharply that any joinery construction (miter or
/// round) would shoot off to an unreasonable distance, so a flat cap is
/// used instead. Matches the teacher's `raw_offset` constant.
const FLAT_CAP_COS: f64 = -0.98;

/// Which direction, relative to each shape's own tangent/winding, a shape is
/// displaced. See the module docs for why this is *not* "inward"/"outward"
/// in an absolute sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetSide {
    Inset,
    Outset,
}

/// How adjoining offset polyline segments are joined at a corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JoineryPolicy {
    Miter { limit: f64 },
    Bevel,
    Round,
}

impl Default for JoineryPolicy {
    fn default() -> Self {
        JoineryPolicy::Miter { limit: 4.0 }
    }
}

/// Parameters governing the offset operation.
#[derive(Debug, Clone, Copy)]
pub struct OffsetParams {
    /// Maximum deviation tolerated when an ellipse or spline is offset by
    /// tessellation (see [`offset`]'s ellipse/spline branches).
    pub tolerance: f64,
    pub joinery: JoineryPolicy,
}

impl Default for OffsetParams {
    fn default() -> Self {
        Self {
            tolerance: 0.05,
            joinery: JoineryPolicy::default(),
        }
    }
}

fn signed_distance(distance: f64, side: OffsetSide) -> f64 {
    match side {
        OffsetSide::Inset => distance,
        OffsetSide::Outset => -distance,
    }
}

/// Offsets `shape` by `distance` (expected positive) to one `side`.
///
/// # Errors
///
/// Returns `GeometryError::Degenerate` if the offset collapses the shape
/// (an arc or circle whose adjusted radius would be non-positive, or a
/// polyline segment that collapses the same way).
pub fn offset(shape: &Shape, distance: f64, side: OffsetSide, params: &OffsetParams) -> Result<Shape> {
    let signed = signed_distance(distance, side);
    match shape {
        Shape::Line(l) => offset_line(l, signed).map(Shape::Line),
        Shape::Arc(a) => offset_arc(a, signed).map(Shape::Arc),
        Shape::Circle(c) => offset_circle(c, signed).map(Shape::Circle),
        Shape::Polyline(p) => offset_polyline(p, signed, params).map(Shape::Polyline),
        Shape::Ellipse(e) => offset_ellipse(e, signed, params).map(Shape::Polyline),
        Shape::Spline(s) => offset_spline(&s.curve, signed, params).map(Shape::Polyline),
    }
}

fn offset_line(line: &Line, signed: f64) -> Result<Line> {
    let dir = line.direction();
    let normal = left_normal(dir);
    Line::new(line.id, line.start + normal * signed, line.end + normal * signed)
}

fn offset_arc(arc: &Arc, signed: f64) -> Result<Arc> {
    let sign = if arc.sweep >= 0.0 { 1.0 } else { -1.0 };
    let new_radius = arc.radius + sign * signed;
    if new_radius <= TOLERANCE {
        return Err(GeometryError::Degenerate("arc offset collapsed (radius would be non-positive)".into()).into());
    }
    Arc::new(arc.id, arc.center, new_radius, arc.start_angle, arc.sweep)
}

fn offset_circle(circle: &Circle, signed: f64) -> Result<Circle> {
    let new_radius = circle.radius + signed;
    if new_radius <= TOLERANCE {
        return Err(GeometryError::Degenerate("circle offset collapsed (radius would be non-positive)".into()).into());
    }
    Circle::new(circle.id, circle.center, new_radius)
}

/// A single offset segment, tangent-tagged at both ends for corner joinery.
struct OffsetSeg {
    start: Point2,
    end: Point2,
    bulge: f64,
    start_dir: Vector2,
    end_dir: Vector2,
}

fn offset_segment(v0: PolylineVertex, v1: PolylineVertex, signed: f64) -> Result<OffsetSeg> {
    if v0.bulge.abs() < 1e-12 {
        let dir = segment_direction(&v0.point(), &v1.point())?;
        let normal = left_normal(dir);
        Ok(OffsetSeg {
            start: v0.point() + normal * signed,
            end: v1.point() + normal * signed,
            bulge: 0.0,
            start_dir: dir,
            end_dir: dir,
        })
    } else {
        let (sa, sw) = {
            let (_, _, _, sa, sw) = arc_from_bulge(v0.x, v0.y, v1.x, v1.y, v0.bulge);
            (sa, sw)
        };
        let Some((x0, y0, x1, y1, bulge)) = offset_arc_segment(v0.x, v0.y, v1.x, v1.y, v0.bulge, signed) else {
            return Err(GeometryError::Degenerate("polyline arc segment offset collapsed".into()).into());
        };
        let (tx0, ty0) = arc_tangent_at(sa, sw, 0.0);
        let (tx1, ty1) = arc_tangent_at(sa, sw, 1.0);
        Ok(OffsetSeg {
            start: Point2::new(x0, y0),
            end: Point2::new(x1, y1),
            bulge,
            start_dir: Vector2::new(tx0, ty0),
            end_dir: Vector2::new(tx1, ty1),
        })
    }
}

/// Computes the signed sweep (in `[-2pi, 2pi]`) of a round fillet centered at
/// `center` from `from` to `to`, matching the turn direction implied by
/// `turn_sign` (positive for a left/CCW turn).
fn fillet_sweep(center: Point2, from: Point2, to: Point2, turn_sign: f64) -> f64 {
    let a0 = (from.y - center.y).atan2(from.x - center.x);
    let a1 = (to.y - center.y).atan2(to.x - center.x);
    let mut sweep = a1 - a0;
    if turn_sign >= 0.0 {
        if sweep < 0.0 {
            sweep += std::f64::consts::TAU;
        }
    } else if sweep > 0.0 {
        sweep -= std::f64::consts::TAU;
    }
    sweep
}

/// Joins offset segment `prev` to `next` at original corner `orig`, pushing
/// the corner vertex/vertices and finally `next`'s own start vertex (which
/// carries `next`'s bulge) into `out`.
fn push_corner(prev: &OffsetSeg, next: &OffsetSeg, orig: Point2, distance: f64, params: &OffsetParams, out: &mut Vec<PolylineVertex>) {
    if distance.abs() < TOLERANCE {
        out.push(PolylineVertex::new(next.start.x, next.start.y, next.bulge));
        return;
    }

    let cos_angle = prev.end_dir.dot(&next.start_dir);
    if cos_angle < FLAT_CAP_COS {
        out.push(PolylineVertex::line(prev.end.x, prev.end.y));
        out.push(PolylineVertex::new(next.start.x, next.start.y, next.bulge));
        return;
    }

    match params.joinery {
        JoineryPolicy::Bevel => {
            out.push(PolylineVertex::line(prev.end.x, prev.end.y));
            out.push(PolylineVertex::new(next.start.x, next.start.y, next.bulge));
        }
        JoineryPolicy::Round => {
            let turn_sign = prev.end_dir.x * next.start_dir.y - prev.end_dir.y * next.start_dir.x;
            let sweep = fillet_sweep(orig, prev.end, next.start, turn_sign);
            let bulge = (sweep / 4.0).tan();
            out.push(PolylineVertex::new(prev.end.x, prev.end.y, bulge));
            out.push(PolylineVertex::new(next.start.x, next.start.y, next.bulge));
        }
        JoineryPolicy::Miter { limit } => {
            let miter = crate::math::intersect2d::line_line_intersect_2d(&prev.end, &prev.end_dir, &next.start, &next.start_dir);
            match miter {
                Some((t, _)) => {
                    let point = prev.end + prev.end_dir * t;
                    let miter_dist = (point - orig).norm();
                    if miter_dist <= limit * distance.abs() {
                        out.push(PolylineVertex::new(point.x, point.y, next.bulge));
                    } else {
                        out.push(PolylineVertex::line(prev.end.x, prev.end.y));
                        out.push(PolylineVertex::new(next.start.x, next.start.y, next.bulge));
                    }
                }
                None => {
                    out.push(PolylineVertex::line(prev.end.x, prev.end.y));
                    out.push(PolylineVertex::new(next.start.x, next.start.y, next.bulge));
                }
            }
        }
    }
}

fn offset_polyline(pl: &Polyline, signed: f64, params: &OffsetParams) -> Result<Polyline> {
    let seg_count = pl.segment_count();
    if seg_count == 0 {
        return Err(GeometryError::Degenerate("polyline has no segments to offset".into()).into());
    }

    let mut segs = Vec::with_capacity(seg_count);
    for i in 0..seg_count {
        let (v0, v1) = pl.segment(i);
        segs.push(offset_segment(v0, v1, signed)?);
    }

    let mut out = Vec::with_capacity(pl.vertices.len());
    if pl.closed {
        // Each iteration handles the corner arriving at segment `i`'s start
        // (the join between segment `i-1` and segment `i`, wrapping for
        // `i == 0`), then pushes segment `i`'s own start vertex — so the
        // loop naturally produces exactly the closed vertex cycle with no
        // separate prepend/pop step.
        for i in 0..seg_count {
            let prev = &segs[(i + seg_count - 1) % seg_count];
            let next = &segs[i];
            let orig = pl.vertices[i].point();
            push_corner(prev, next, orig, signed, params, &mut out);
        }
    } else {
        out.push(PolylineVertex::new(segs[0].start.x, segs[0].start.y, segs[0].bulge));
        for i in 1..seg_count {
            let orig = pl.vertices[i].point();
            push_corner(&segs[i - 1], &segs[i], orig, signed, params, &mut out);
        }
        #[allow(clippy::unwrap_used)]
        let last = segs.last().unwrap();
        out.push(PolylineVertex::new(last.end.x, last.end.y, 0.0));
    }

    Ok(Polyline {
        id: pl.id,
        vertices: out,
        closed: pl.closed,
    })
}

/// Tessellates `shape`, offsetting each sample along its local left normal,
/// and rebuilds the result as a straight-segment polyline. Used for ellipse
/// and spline offsetting, where an exact offset curve generally isn't
/// representable in the same primitive family; the sample count is chosen
/// from `params.tolerance` the same way [`Polyline::to_points`] chooses an
/// arc subdivision count, via the curve's bounding-box diameter as a stand-in
/// radius.
fn offset_by_tessellation(shape: &Shape, signed: f64, tolerance: f64, id: ShapeId, closed: bool) -> Result<Polyline> {
    let diameter = shape.bounding_box().diameter().max(TOLERANCE);
    let radius_estimate = diameter / 2.0;
    let samples = if tolerance <= 0.0 || tolerance >= radius_estimate {
        32
    } else {
        let max_angle = 2.0 * (1.0 - tolerance / radius_estimate).acos();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let n = (std::f64::consts::TAU / max_angle.max(1e-6)).ceil() as usize;
        n.clamp(16, 512)
    };

    let mut vertices = Vec::with_capacity(samples + 1);
    for i in 0..=samples {
        #[allow(clippy::cast_precision_loss)]
        let t = (i as f64 / samples as f64).min(1.0);
        let p = shape.point_at(t)?;
        let tangent = shape.tangent_at(t.min(1.0 - 1e-9).max(1e-9))?;
        let normal = left_normal(tangent);
        let offset_point = p + normal * signed;
        vertices.push(PolylineVertex::line(offset_point.x, offset_point.y));
    }
    if closed {
        vertices.pop();
    }

    Ok(Polyline { id, vertices, closed })
}

fn offset_ellipse(ellipse: &Ellipse, signed: f64, params: &OffsetParams) -> Result<Polyline> {
    offset_by_tessellation(&Shape::Ellipse(ellipse.clone()), signed, params.tolerance, ellipse.id, ellipse.is_closed())
}

fn offset_spline(curve: &crate::nurbs::Spline, signed: f64, params: &OffsetParams) -> Result<Polyline> {
    let is_closed = matches!((curve.point_at(0.0), curve.point_at(1.0)), (Ok(a), Ok(b)) if (a - b).norm() < TOLERANCE);
    offset_by_tessellation(&Shape::Spline(crate::shape::Spline::new(curve.clone())), signed, params.tolerance, curve.id, is_closed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;

    #[test]
    fn line_offsets_along_left_normal() {
        let l = Line::new(ShapeId::from_raw(1), Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)).unwrap();
        let result = offset(&Shape::Line(l), 2.0, OffsetSide::Inset, &OffsetParams::default()).unwrap();
        assert!((result.start_point().y - 2.0).abs() < TOLERANCE);
        assert!((result.end_point().y - 2.0).abs() < TOLERANCE);

        let outset = offset(&Shape::Line(Line::new(ShapeId::from_raw(1), Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)).unwrap()), 2.0, OffsetSide::Outset, &OffsetParams::default()).unwrap();
        assert!((outset.start_point().y + 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn circle_offset_changes_radius() {
        let c = Circle::new(ShapeId::from_raw(1), Point2::origin(), 5.0).unwrap();
        let grown = offset(&Shape::Circle(c.clone()), 1.0, OffsetSide::Inset, &OffsetParams::default()).unwrap();
        if let Shape::Circle(grown) = grown {
            assert!((grown.radius - 6.0).abs() < TOLERANCE);
        } else {
            panic!("expected Circle");
        }
    }

    #[test]
    fn circle_offset_collapse_is_rejected() {
        let c = Circle::new(ShapeId::from_raw(1), Point2::origin(), 1.0).unwrap();
        let result = offset(&Shape::Circle(c), 2.0, OffsetSide::Outset, &OffsetParams::default());
        assert!(result.is_err());
    }

    #[test]
    fn square_polyline_offset_inward_shrinks() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        let pl = Polyline::from_points(ShapeId::from_raw(1), &pts, true).unwrap();
        let result = offset(&Shape::Polyline(pl), 1.0, OffsetSide::Inset, &OffsetParams::default()).unwrap();
        if let Shape::Polyline(result) = result {
            let bbox = result.bounding_box();
            assert!(bbox.width() < 10.0);
            assert!(bbox.height() < 10.0);
        } else {
            panic!("expected Polyline");
        }
    }

    #[test]
    fn round_joinery_inserts_arc_vertex() {
        let pts = vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(10.0, 10.0)];
        let pl = Polyline::from_points(ShapeId::from_raw(1), &pts, false).unwrap();
        let params = OffsetParams {
            tolerance: 0.05,
            joinery: JoineryPolicy::Round,
        };
        let result = offset(&Shape::Polyline(pl), 1.0, OffsetSide::Outset, &params).unwrap();
        if let Shape::Polyline(result) = result {
            assert!(result.vertices.iter().any(|v| v.bulge.abs() > 1e-9));
        } else {
            panic!("expected Polyline");
        }
    }
}
