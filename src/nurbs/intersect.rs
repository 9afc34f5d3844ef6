//! Curve-curve intersection via recursive parameter-space subdivision with
//! bounding-box pruning, followed by Newton refinement — the standard
//! approach for free-form (NURBS) curves, where no closed-form root exists.

use crate::math::{BoundingBox, Point2, TOLERANCE};

use super::Spline;

const MAX_SUBDIVISION_DEPTH: u32 = 24;
const PARAM_TOLERANCE: f64 = 1e-9;
const NEWTON_ITERATIONS: usize = 8;

/// A found intersection, carrying both curves' parameters (each in
/// `[0, 1]`) and the shared point (averaged from both curves after Newton
/// refinement, for a single canonical coordinate).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplineIntersection {
    pub t_a: f64,
    pub t_b: f64,
    pub point: Point2,
}

/// Finds all intersections between two NURBS curves within `tolerance`,
/// returning them in deterministic order (sorted by `t_a`, then `t_b`).
///
/// Candidates closer than `tolerance` in parameter space and in the plane
/// are merged into a single reported intersection, so near-tangential
/// curves don't flood the result with a cluster of near-duplicate points.
#[must_use]
pub fn intersect_splines(a: &Spline, b: &Spline, tolerance: f64) -> Vec<SplineIntersection> {
    let mut raw = Vec::new();
    subdivide(a, 0.0, 1.0, b, 0.0, 1.0, 0, tolerance, &mut raw);

    let mut refined: Vec<SplineIntersection> = raw
        .into_iter()
        .filter_map(|(ta, tb)| newton_refine(a, b, ta, tb))
        .collect();

    refined.sort_by(|x, y| x.t_a.partial_cmp(&y.t_a).unwrap_or(std::cmp::Ordering::Equal).then(
        x.t_b.partial_cmp(&y.t_b).unwrap_or(std::cmp::Ordering::Equal),
    ));

    dedupe(refined, tolerance)
}

#[allow(clippy::too_many_arguments)]
fn subdivide(a: &Spline, a0: f64, a1: f64, b: &Spline, b0: f64, b1: f64, depth: u32, tolerance: f64, out: &mut Vec<(f64, f64)>) {
    let bbox_a = range_bbox(a, a0, a1);
    let bbox_b = range_bbox(b, b0, b1);
    if !bbox_a.overlaps(&bbox_b, tolerance) {
        return;
    }

    let a_flat = (a1 - a0) < PARAM_TOLERANCE;
    let b_flat = (b1 - b0) < PARAM_TOLERANCE;
    if depth >= MAX_SUBDIVISION_DEPTH || (a_flat && b_flat) {
        out.push(((a0 + a1) / 2.0, (b0 + b1) / 2.0));
        return;
    }

    let a_mid = (a0 + a1) / 2.0;
    let b_mid = (b0 + b1) / 2.0;

    if a_flat {
        subdivide(a, a0, a1, b, b0, b_mid, depth + 1, tolerance, out);
        subdivide(a, a0, a1, b, b_mid, b1, depth + 1, tolerance, out);
    } else if b_flat {
        subdivide(a, a0, a_mid, b, b0, b1, depth + 1, tolerance, out);
        subdivide(a, a_mid, a1, b, b0, b1, depth + 1, tolerance, out);
    } else {
        subdivide(a, a0, a_mid, b, b0, b_mid, depth + 1, tolerance, out);
        subdivide(a, a0, a_mid, b, b_mid, b1, depth + 1, tolerance, out);
        subdivide(a, a_mid, a1, b, b0, b_mid, depth + 1, tolerance, out);
        subdivide(a, a_mid, a1, b, b_mid, b1, depth + 1, tolerance, out);
    }
}

/// Bounding box over a parameter sub-range, sampled coarsely (the range has
/// already been narrowed by subdivision by the time precision matters).
fn range_bbox(s: &Spline, t0: f64, t1: f64) -> BoundingBox {
    const SAMPLES: usize = 4;
    let mut pts = Vec::with_capacity(SAMPLES + 1);
    for i in 0..=SAMPLES {
        #[allow(clippy::cast_precision_loss)]
        let t = t0 + (t1 - t0) * (i as f64 / SAMPLES as f64);
        if let Ok(p) = s.point_at(t) {
            pts.push(p);
        }
    }
    if pts.is_empty() {
        // Degenerate evaluation (e.g. zero-weight span): fall back to the
        // curve's full control-polygon box so the range is never silently
        // dropped from the search.
        return s.bounding_box();
    }
    BoundingBox::from_points(&pts)
}

/// Refines a subdivision-found candidate `(t_a, t_b)` to machine precision
/// via Newton iteration on `F(t_a, t_b) = point_at(a, t_a) - point_at(b, t_b)`.
fn newton_refine(a: &Spline, b: &Spline, mut ta: f64, mut tb: f64) -> Option<SplineIntersection> {
    for _ in 0..NEWTON_ITERATIONS {
        let pa = a.point_at(ta).ok()?;
        let pb = b.point_at(tb).ok()?;
        let residual = pa - pb;
        if residual.norm() < TOLERANCE {
            let point = Point2::new((pa.x + pb.x) / 2.0, (pa.y + pb.y) / 2.0);
            return Some(SplineIntersection { t_a: ta, t_b: tb, point });
        }

        let da = a.tangent_at(ta).ok()?;
        let db = b.tangent_at(tb).ok()?;
        // Solve [da  -db] * [delta_a; delta_b] = residual (least-squares via
        // normal equations — the 2x2 system is rarely exactly square-solvable
        // when da/db are near-parallel).
        let m00 = da.dot(&da);
        let m01 = -da.dot(&db);
        let m10 = -db.dot(&da);
        let m11 = db.dot(&db);
        let r0 = da.dot(&residual);
        let r1 = -db.dot(&residual);
        let det = m00.mul_add(m11, -(m01 * m10));
        if det.abs() < 1e-14 {
            break;
        }
        let delta_a = (r0 * m11 - m01 * r1) / det;
        let delta_b = (m00 * r1 - m10 * r0) / det;

        ta = (ta + delta_a).clamp(0.0, 1.0);
        tb = (tb + delta_b).clamp(0.0, 1.0);
    }

    let pa = a.point_at(ta).ok()?;
    let pb = b.point_at(tb).ok()?;
    if (pa - pb).norm() < 1e-6 {
        let point = Point2::new((pa.x + pb.x) / 2.0, (pa.y + pb.y) / 2.0);
        Some(SplineIntersection { t_a: ta, t_b: tb, point })
    } else {
        None
    }
}

/// Merges refined candidates that land within `tolerance` of each other in
/// the plane, keeping the first (lowest `t_a`, then `t_b`) of each cluster —
/// the sort in [`intersect_splines`] makes this a deterministic choice.
fn dedupe(sorted: Vec<SplineIntersection>, tolerance: f64) -> Vec<SplineIntersection> {
    let mut out: Vec<SplineIntersection> = Vec::with_capacity(sorted.len());
    for cand in sorted {
        if out.iter().any(|kept| (kept.point - cand.point).norm() < tolerance.max(1e-9)) {
            continue;
        }
        out.push(cand);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::nurbs::construct;
    use crate::shape::ShapeId;

    #[test]
    fn crossing_lines_intersect_at_expected_point() {
        let a = construct::from_line(ShapeId::from_raw(1), Point2::new(-1.0, 0.0), Point2::new(1.0, 0.0)).unwrap();
        let b = construct::from_line(ShapeId::from_raw(2), Point2::new(0.0, -1.0), Point2::new(0.0, 1.0)).unwrap();
        let hits = intersect_splines(&a, &b, 1e-6);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].point.coords.norm() < 1e-6);
    }

    #[test]
    fn parallel_lines_do_not_intersect() {
        let a = construct::from_line(ShapeId::from_raw(1), Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)).unwrap();
        let b = construct::from_line(ShapeId::from_raw(2), Point2::new(0.0, 1.0), Point2::new(1.0, 1.0)).unwrap();
        assert!(intersect_splines(&a, &b, 1e-6).is_empty());
    }

    #[test]
    fn circle_and_line_through_center_hit_twice() {
        let circle = construct::from_circle(ShapeId::from_raw(1), Point2::origin(), 1.0).unwrap();
        let line = construct::from_line(ShapeId::from_raw(2), Point2::new(-2.0, 0.0), Point2::new(2.0, 0.0)).unwrap();
        let hits = intersect_splines(&circle, &line, 1e-6);
        assert_eq!(hits.len(), 2);
    }
}
