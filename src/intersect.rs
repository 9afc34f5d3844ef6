//! The shape intersection dispatcher: the sole public entry point for
//! pairwise shape intersection, covering all 6x6 shape-kind combinations.

use log::debug;

use crate::extend;
use crate::math::arc2d::arc_from_bulge;
use crate::math::intersect2d::{
    arc_arc_intersect_2d, circle_circle_intersect_2d, line_arc_intersect_2d, line_circle_intersect_2d,
    segment_segment_intersect_2d,
};
use crate::math::{Point2, TOLERANCE};
use crate::nurbs::{self, construct};
use crate::shape::{Arc, Line, Shape, ShapeId, ShapeKind};

/// Whether intersection candidates are bounded to the shapes' true extent or
/// extended to infinite lines/full curves (only meaningful for line pairs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectionType {
    TrueSegment,
    InfiniteExtent,
}

/// Classifies the numerical character of a found intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectionKind {
    Proper,
    Tangent,
    Coincident,
}

/// A single intersection candidate, canonicalized to the caller's original
/// argument order.
#[derive(Debug, Clone, Copy)]
pub struct IntersectionResult {
    pub point: Point2,
    pub param_a: f64,
    pub param_b: f64,
    pub kind: IntersectionKind,
    pub on_extension: bool,
}

/// The sole public intersection entry point. Dispatches on the unordered
/// shape-kind pair, applies the extension policy when no intersections are
/// found on the originals, and canonicalizes the result (clustering,
/// argument-order remap, deterministic sort order).
///
/// Never raises on a numerical failure: an empty list is itself the
/// degenerate-case signal the rest of the pipeline relies on.
#[must_use]
pub fn intersect(
    a: &Shape,
    b: &Shape,
    allow_extensions: bool,
    extension_length: f64,
    intersection_type: IntersectionType,
) -> Vec<IntersectionResult> {
    let originals = dispatch(a, b, intersection_type);
    if !originals.is_empty() || !allow_extensions {
        return canonicalize(originals);
    }

    let attempts: [(bool, bool); 3] = [(true, false), (false, true), (true, true)];
    for (extend_a, extend_b) in attempts {
        let ext_a_shape;
        let ext_b_shape;
        let shape_a: &Shape = if extend_a {
            match extend::extend(a, extension_length) {
                Ok(s) => {
                    ext_a_shape = s;
                    &ext_a_shape
                }
                Err(e) => {
                    debug!("extension of shape A failed: {e}");
                    continue;
                }
            }
        } else {
            a
        };
        let shape_b: &Shape = if extend_b {
            match extend::extend(b, extension_length) {
                Ok(s) => {
                    ext_b_shape = s;
                    &ext_b_shape
                }
                Err(e) => {
                    debug!("extension of shape B failed: {e}");
                    continue;
                }
            }
        } else {
            b
        };

        let mut hits = dispatch(shape_a, shape_b, intersection_type);
        if !hits.is_empty() {
            for hit in &mut hits {
                hit.on_extension = true;
            }
            return canonicalize(hits);
        }
    }

    Vec::new()
}

/// Like [`intersect`], but returns at most one candidate: the one closest to
/// either shape's endpoints — the policy the chain-offset pipeline needs for
/// consecutive-shape joins.
#[must_use]
pub fn intersect_single_best(
    a: &Shape,
    b: &Shape,
    allow_extensions: bool,
    extension_length: f64,
    intersection_type: IntersectionType,
) -> Option<IntersectionResult> {
    let candidates = intersect(a, b, allow_extensions, extension_length, intersection_type);
    if candidates.is_empty() {
        return None;
    }

    let anchors = [a.start_point(), a.end_point(), b.start_point(), b.end_point()];
    candidates
        .into_iter()
        .min_by(|x, y| {
            let dx = anchors.iter().map(|p| (p - x.point).norm()).fold(f64::INFINITY, f64::min);
            let dy = anchors.iter().map(|p| (p - y.point).norm()).fold(f64::INFINITY, f64::min);
            dx.partial_cmp(&dy).unwrap_or(std::cmp::Ordering::Equal)
        })
}

fn dispatch(a: &Shape, b: &Shape, intersection_type: IntersectionType) -> Vec<IntersectionResult> {
    if (a.kind() as u8) > (b.kind() as u8) {
        return dispatch(b, a, intersection_type).into_iter().map(swap_params).collect();
    }

    if matches!(a, Shape::Ellipse(_) | Shape::Spline(_)) || matches!(b, Shape::Ellipse(_) | Shape::Spline(_)) {
        return via_nurbs(a, b);
    }

    match (a, b) {
        (Shape::Line(l1), Shape::Line(l2)) => line_line(l1, l2, intersection_type),
        (Shape::Line(l), Shape::Arc(arc)) => line_arc(l, arc),
        (Shape::Line(l), Shape::Circle(c)) => line_circle(l, c.center, c.radius),
        (Shape::Arc(a1), Shape::Arc(a2)) => arc_arc(a1, a2),
        (Shape::Arc(arc), Shape::Circle(c)) => arc_circle(arc, c.center, c.radius),
        (Shape::Circle(c1), Shape::Circle(c2)) => circle_circle(c1.center, c1.radius, c2.center, c2.radius),

        (Shape::Line(_) | Shape::Arc(_) | Shape::Circle(_), Shape::Polyline(pl)) => iterate_polyline(a, pl, intersection_type),
        (Shape::Polyline(p1), Shape::Polyline(p2)) => polyline_polyline(p1, p2, intersection_type),

        _ => Vec::new(),
    }
}

fn swap_params(mut r: IntersectionResult) -> IntersectionResult {
    std::mem::swap(&mut r.param_a, &mut r.param_b);
    r
}

fn line_line(l1: &Line, l2: &Line, intersection_type: IntersectionType) -> Vec<IntersectionResult> {
    match intersection_type {
        IntersectionType::TrueSegment => {
            if let Some((pt, t, u)) = segment_segment_intersect_2d(&l1.start, &l1.end, &l2.start, &l2.end) {
                return vec![IntersectionResult {
                    point: pt,
                    param_a: t,
                    param_b: u,
                    kind: IntersectionKind::Proper,
                    on_extension: false,
                }];
            }
            // Not a transversal crossing: check for a collinear overlap
            // (reported as `Coincident` with the overlap region's two
            // endpoints, per the line-line pair table).
            crate::math::intersect2d::collinear_overlap_2d(&l1.start, &l1.end, &l2.start, &l2.end)
                .into_iter()
                .flatten()
                .map(|(pt, t, u)| IntersectionResult {
                    point: pt,
                    param_a: t,
                    param_b: u,
                    kind: IntersectionKind::Coincident,
                    on_extension: false,
                })
                .collect()
        }
        IntersectionType::InfiniteExtent => {
            let d1 = l1.end - l1.start;
            let d2 = l2.end - l2.start;
            crate::math::intersect2d::line_line_intersect_2d(&l1.start, &d1, &l2.start, &d2)
                .map(|(t, u)| {
                    let pt = l1.start + d1 * t;
                    vec![IntersectionResult {
                        point: pt,
                        param_a: t,
                        param_b: u,
                        kind: IntersectionKind::Proper,
                        on_extension: false,
                    }]
                })
                .unwrap_or_default()
        }
    }
}

fn line_arc(l: &Line, arc: &Arc) -> Vec<IntersectionResult> {
    line_arc_intersect_2d(l.start.x, l.start.y, l.end.x, l.end.y, arc.center.x, arc.center.y, arc.radius, arc.start_angle, arc.sweep)
        .into_iter()
        .map(|((x, y), t_seg, t_arc)| IntersectionResult {
            point: Point2::new(x, y),
            param_a: t_seg,
            param_b: t_arc,
            kind: IntersectionKind::Proper,
            on_extension: false,
        })
        .collect()
}

fn line_circle(l: &Line, center: Point2, radius: f64) -> Vec<IntersectionResult> {
    let roots = line_circle_intersect_2d(&l.start, &l.end, center.x, center.y, radius);
    let tangent = roots.len() == 1;
    roots
        .into_iter()
        .filter(|&(_, t)| (-TOLERANCE..=1.0 + TOLERANCE).contains(&t))
        .map(|(pt, t)| {
            let angle = (pt.y - center.y).atan2(pt.x - center.x);
            IntersectionResult {
                point: pt,
                param_a: t.clamp(0.0, 1.0),
                param_b: (angle.rem_euclid(std::f64::consts::TAU)) / std::f64::consts::TAU,
                kind: if tangent { IntersectionKind::Tangent } else { IntersectionKind::Proper },
                on_extension: false,
            }
        })
        .collect()
}

fn arc_arc(a1: &Arc, a2: &Arc) -> Vec<IntersectionResult> {
    let roots = arc_arc_intersect_2d(
        a1.center.x, a1.center.y, a1.radius, a1.start_angle, a1.sweep, a2.center.x, a2.center.y, a2.radius, a2.start_angle, a2.sweep,
    );
    let tangent = roots.len() == 1;
    roots
        .into_iter()
        .map(|((x, y), t1, t2)| IntersectionResult {
            point: Point2::new(x, y),
            param_a: t1,
            param_b: t2,
            kind: if tangent { IntersectionKind::Tangent } else { IntersectionKind::Proper },
            on_extension: false,
        })
        .collect()
}

fn arc_circle(arc: &Arc, center: Point2, radius: f64) -> Vec<IntersectionResult> {
    let roots = circle_circle_intersect_2d(arc.center.x, arc.center.y, arc.radius, center.x, center.y, radius);
    let tangent = roots.len() == 1;
    roots
        .into_iter()
        .filter_map(|(x, y)| {
            let angle = (y - arc.center.y).atan2(x - arc.center.x);
            let t_arc = crate::math::intersect2d::angle_to_arc_param(angle, arc.start_angle, arc.sweep)?;
            let angle_c = (y - center.y).atan2(x - center.x);
            Some(IntersectionResult {
                point: Point2::new(x, y),
                param_a: t_arc,
                param_b: angle_c.rem_euclid(std::f64::consts::TAU) / std::f64::consts::TAU,
                kind: if tangent { IntersectionKind::Tangent } else { IntersectionKind::Proper },
                on_extension: false,
            })
        })
        .collect()
}

fn circle_circle(c1: Point2, r1: f64, c2: Point2, r2: f64) -> Vec<IntersectionResult> {
    let roots = circle_circle_intersect_2d(c1.x, c1.y, r1, c2.x, c2.y, r2);
    let tangent = roots.len() == 1;
    roots
        .into_iter()
        .map(|(x, y)| {
            let a1 = (y - c1.y).atan2(x - c1.x).rem_euclid(std::f64::consts::TAU) / std::f64::consts::TAU;
            let a2 = (y - c2.y).atan2(x - c2.x).rem_euclid(std::f64::consts::TAU) / std::f64::consts::TAU;
            IntersectionResult {
                point: Point2::new(x, y),
                param_a: a1,
                param_b: a2,
                kind: if tangent { IntersectionKind::Tangent } else { IntersectionKind::Proper },
                on_extension: false,
            }
        })
        .collect()
}

/// Builds the `Shape` for polyline segment `i` (a `Line` or an `Arc`,
/// depending on its bulge), used by the per-segment iteration method.
fn polyline_segment_shape(pl: &crate::shape::Polyline, i: usize) -> Option<Shape> {
    let (v0, v1) = pl.segment(i);
    if v0.bulge.abs() < 1e-12 {
        Line::new(ShapeId::from_raw(0), v0.point(), v1.point()).ok().map(Shape::Line)
    } else {
        let (cx, cy, radius, start_angle, sweep) = arc_from_bulge(v0.x, v0.y, v1.x, v1.y, v0.bulge);
        if radius < 1e-12 {
            return None;
        }
        Arc::new(ShapeId::from_raw(0), Point2::new(cx, cy), radius, start_angle, sweep).ok().map(Shape::Arc)
    }
}

fn iterate_polyline(other: &Shape, pl: &crate::shape::Polyline, intersection_type: IntersectionType) -> Vec<IntersectionResult> {
    let n = pl.segment_count().max(1);
    let mut out = Vec::new();
    for i in 0..pl.segment_count() {
        let Some(seg_shape) = polyline_segment_shape(pl, i) else { continue };
        for mut hit in dispatch(other, &seg_shape, intersection_type) {
            hit.param_b = (i as f64 + hit.param_b) / n as f64;
            out.push(hit);
        }
    }
    out
}

fn polyline_polyline(p1: &crate::shape::Polyline, p2: &crate::shape::Polyline, intersection_type: IntersectionType) -> Vec<IntersectionResult> {
    let n1 = p1.segment_count().max(1);
    let n2 = p2.segment_count().max(1);
    let mut out = Vec::new();
    for i in 0..p1.segment_count() {
        let Some(seg_a) = polyline_segment_shape(p1, i) else { continue };
        for j in 0..p2.segment_count() {
            let Some(seg_b) = polyline_segment_shape(p2, j) else { continue };
            for mut hit in dispatch(&seg_a, &seg_b, intersection_type) {
                hit.param_a = (i as f64 + hit.param_a) / n1 as f64;
                hit.param_b = (j as f64 + hit.param_b) / n2 as f64;
                out.push(hit);
            }
        }
    }
    out
}

/// Converts `shape` to its exact (or, for polylines, per-segment) NURBS
/// representation and runs the curve-curve intersection search — used
/// whenever one side of the pair is an ellipse or a spline.
fn via_nurbs(a: &Shape, b: &Shape) -> Vec<IntersectionResult> {
    match (a, b) {
        (Shape::Polyline(pl), other) | (other, Shape::Polyline(pl)) if !matches!(other, Shape::Polyline(_)) => {
            let Ok(other_curve) = to_nurbs(other) else { return Vec::new() };
            let n = pl.segment_count().max(1);
            let mut out = Vec::new();
            for i in 0..pl.segment_count() {
                let Some(seg_shape) = polyline_segment_shape(pl, i) else { continue };
                let Ok(seg_curve) = to_nurbs(&seg_shape) else { continue };
                for hit in nurbs::intersect::intersect_splines(&seg_curve, &other_curve, TOLERANCE) {
                    let t_seg = (i as f64 + hit.t_a) / n as f64;
                    out.push(if matches!(a, Shape::Polyline(_)) {
                        IntersectionResult {
                            point: hit.point,
                            param_a: t_seg,
                            param_b: hit.t_b,
                            kind: IntersectionKind::Proper,
                            on_extension: false,
                        }
                    } else {
                        IntersectionResult {
                            point: hit.point,
                            param_a: hit.t_b,
                            param_b: t_seg,
                            kind: IntersectionKind::Proper,
                            on_extension: false,
                        }
                    });
                }
            }
            out
        }
        _ => {
            let (Ok(ca), Ok(cb)) = (to_nurbs(a), to_nurbs(b)) else { return Vec::new() };
            nurbs::intersect::intersect_splines(&ca, &cb, TOLERANCE)
                .into_iter()
                .map(|hit| IntersectionResult {
                    point: hit.point,
                    param_a: hit.t_a,
                    param_b: hit.t_b,
                    kind: IntersectionKind::Proper,
                    on_extension: false,
                })
                .collect()
        }
    }
}

fn to_nurbs(shape: &Shape) -> crate::error::Result<nurbs::Spline> {
    match shape {
        Shape::Line(l) => construct::from_line(l.id, l.start, l.end),
        Shape::Arc(a) => construct::from_arc(a.id, a.center, a.radius, a.start_angle, a.sweep),
        Shape::Circle(c) => construct::from_circle(c.id, c.center, c.radius),
        Shape::Ellipse(e) => construct::from_ellipse(e.id, e.center, e.semi_major, e.semi_minor, e.rotation, e.start_angle, e.end_angle),
        Shape::Spline(s) => Ok(s.curve.clone()),
        Shape::Polyline(_) => Err(crate::error::DomainError::InvalidInput("polyline has no single NURBS representation".into()).into()),
    }
}

/// Clusters candidates within tolerance (averaging), sorts lexicographically
/// by `(param_a, param_b)`.
fn canonicalize(mut results: Vec<IntersectionResult>) -> Vec<IntersectionResult> {
    results.sort_by(|a, b| {
        a.param_a
            .partial_cmp(&b.param_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.param_b.partial_cmp(&b.param_b).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut clustered: Vec<IntersectionResult> = Vec::with_capacity(results.len());
    for r in results.drain(..) {
        if let Some(existing) = clustered.iter_mut().find(|c: &&mut IntersectionResult| (c.point - r.point).norm() < TOLERANCE) {
            existing.point = Point2::new((existing.point.x + r.point.x) / 2.0, (existing.point.y + r.point.y) / 2.0);
            existing.on_extension = existing.on_extension && r.on_extension;
        } else {
            clustered.push(r);
        }
    }
    clustered
}
