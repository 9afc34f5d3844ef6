use std::f64::consts::PI;

use super::{Point2, Vector2, TOLERANCE};

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point2,
    d1: &Vector2,
    p2: &Point2,
    d2: &Vector2,
) -> Option<(f64, f64)> {
    let cross = d1.x * d2.y - d1.y * d2.x;
    if cross.abs() < TOLERANCE {
        return None;
    }
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let t = (dx * d2.y - dy * d2.x) / cross;
    let u = (dx * d1.y - dy * d1.x) / cross;
    Some((t, u))
}

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are in `[0, 1]`.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;

    let cross = da.x * db.y - da.y * db.x;
    if cross.abs() < TOLERANCE {
        return None;
    }

    let dx = b0.x - a0.x;
    let dy = b0.y - a0.y;
    let t = (dx * db.y - dy * db.x) / cross;
    let u = (dx * da.y - dy * da.x) / cross;

    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t_clamped = t.clamp(0.0, 1.0);
        let pt = Point2::new(a0.x + da.x * t_clamped, a0.y + da.y * t_clamped);
        Some((pt, t_clamped, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Detects collinear overlap between two segments.
///
/// Returns the two endpoints of the overlap region (in increasing order of
/// `a`'s parameter), each tagged with its parameter on both segments, or
/// `None` if the segments are not collinear, or are collinear but the
/// overlap region's length is below tolerance (a single touching point is
/// left to the caller's ordinary non-parallel solver path, which does not
/// apply here since collinear directions have zero cross product).
#[must_use]
pub fn collinear_overlap_2d(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2) -> Option<[(Point2, f64, f64); 2]> {
    let da = a1 - a0;
    let db = b1 - b0;
    let len_a2 = da.dot(&da);
    if len_a2 < TOLERANCE * TOLERANCE {
        return None;
    }
    let len_a = len_a2.sqrt();

    let cross = da.x * db.y - da.y * db.x;
    if cross.abs() > TOLERANCE * len_a {
        return None;
    }
    let rel = b0 - a0;
    let perp = rel.x * da.y - rel.y * da.x;
    if perp.abs() > TOLERANCE * len_a {
        return None;
    }

    let t_b0 = (b0 - a0).dot(&da) / len_a2;
    let t_b1 = (b1 - a0).dot(&da) / len_a2;
    let (t_b_lo, t_b_hi) = if t_b0 <= t_b1 { (t_b0, t_b1) } else { (t_b1, t_b0) };

    let t_lo = t_b_lo.max(0.0);
    let t_hi = t_b_hi.min(1.0);
    if (t_hi - t_lo) * len_a < TOLERANCE {
        return None;
    }

    let db_span = t_b1 - t_b0;
    let u_of = |t: f64| -> f64 {
        if db_span.abs() < TOLERANCE {
            0.0
        } else {
            ((t - t_b0) / db_span).clamp(0.0, 1.0)
        }
    };

    let p_lo = point_at(a0, &da, t_lo);
    let p_hi = point_at(a0, &da, t_hi);
    Some([(p_lo, t_lo, u_of(t_lo)), (p_hi, t_hi, u_of(t_hi))])
}

/// Linear interpolation: `origin + dir * t`.
#[must_use]
pub fn point_at(origin: &Point2, dir: &Vector2, t: f64) -> Point2 {
    Point2::new(origin.x + dir.x * t, origin.y + dir.y * t)
}

/// Intersection of two full circles in 2D via the radical-line construction.
///
/// Returns 0, 1 (tangent), or 2 intersection points.
#[must_use]
pub fn circle_circle_intersect_2d(
    c1x: f64,
    c1y: f64,
    r1: f64,
    c2x: f64,
    c2y: f64,
    r2: f64,
) -> Vec<(f64, f64)> {
    if r1 < TOLERANCE || r2 < TOLERANCE {
        return Vec::new();
    }

    let dx = c2x - c1x;
    let dy = c2y - c1y;
    let dist_sq = dx * dx + dy * dy;
    let dist = dist_sq.sqrt();

    if dist < TOLERANCE {
        return Vec::new();
    }

    let sum = r1 + r2;
    let diff = (r1 - r2).abs();
    if dist > sum + TOLERANCE || dist < diff - TOLERANCE {
        return Vec::new();
    }

    let a = (r1 * r1 - r2 * r2 + dist_sq) / (2.0 * dist);
    let h_sq = r1 * r1 - a * a;
    if h_sq < -TOLERANCE {
        return Vec::new();
    }
    let h = h_sq.max(0.0).sqrt();

    let mx = c1x + a * dx / dist;
    let my = c1y + a * dy / dist;
    let px = -dy / dist;
    let py = dx / dist;

    if h < TOLERANCE {
        vec![(mx, my)]
    } else {
        vec![(mx + h * px, my + h * py), (mx - h * px, my - h * py)]
    }
}

/// Intersection of an (infinite-length) line through two points with a full circle.
///
/// Returns `(point, t)` pairs where `t` is the parameter along `p0 -> p1`
/// (not clamped to `[0, 1]` — callers that need a bounded segment should
/// filter on `t`).
#[must_use]
pub fn line_circle_intersect_2d(
    p0: &Point2,
    p1: &Point2,
    cx: f64,
    cy: f64,
    radius: f64,
) -> Vec<(Point2, f64)> {
    let dx = p1.x - p0.x;
    let dy = p1.y - p0.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq < TOLERANCE * TOLERANCE || radius < TOLERANCE {
        return Vec::new();
    }

    let fx = p0.x - cx;
    let fy = p0.y - cy;
    let a = len_sq;
    let b = 2.0 * (fx * dx + fy * dy);
    let c = fx * fx + fy * fy - radius * radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < -TOLERANCE {
        return Vec::new();
    }
    let disc_sqrt = discriminant.max(0.0).sqrt();

    let roots = if disc_sqrt < TOLERANCE * 100.0 {
        vec![-b / (2.0 * a)]
    } else {
        vec![(-b - disc_sqrt) / (2.0 * a), (-b + disc_sqrt) / (2.0 * a)]
    };

    roots
        .into_iter()
        .map(|t| (Point2::new(p0.x + t * dx, p0.y + t * dy), t))
        .collect()
}

/// Intersection of a line segment with a circular arc in 2D.
///
/// The segment goes from `(ax0, ay0)` to `(ax1, ay1)`.
/// The arc has center `(cx, cy)`, `radius`, `start_angle`, and `sweep`.
///
/// Returns a vector of `((x, y), t_seg, t_arc)` where:
/// - `t_seg` is the parameter on the segment `[0, 1]`
/// - `t_arc` is the parameter on the arc `[0, 1]`
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn line_arc_intersect_2d(
    ax0: f64,
    ay0: f64,
    ax1: f64,
    ay1: f64,
    cx: f64,
    cy: f64,
    radius: f64,
    start_angle: f64,
    sweep: f64,
) -> Vec<((f64, f64), f64, f64)> {
    let mut results = Vec::new();
    if radius < TOLERANCE || sweep.abs() < TOLERANCE {
        return results;
    }

    let dx = ax1 - ax0;
    let dy = ay1 - ay0;
    let seg_len_sq = dx * dx + dy * dy;
    if seg_len_sq < TOLERANCE * TOLERANCE {
        return results;
    }

    let fx = ax0 - cx;
    let fy = ay0 - cy;
    let a = seg_len_sq;
    let b = 2.0 * (fx * dx + fy * dy);
    let c = fx * fx + fy * fy - radius * radius;
    let discriminant = b * b - 4.0 * a * c;

    if discriminant < -TOLERANCE {
        return results;
    }
    let disc_sqrt = discriminant.max(0.0).sqrt();

    let eps = TOLERANCE;
    let t_roots = if disc_sqrt < TOLERANCE * 100.0 {
        vec![-b / (2.0 * a)]
    } else {
        vec![(-b - disc_sqrt) / (2.0 * a), (-b + disc_sqrt) / (2.0 * a)]
    };

    for t_seg in t_roots {
        if t_seg < -eps || t_seg > 1.0 + eps {
            continue;
        }
        let t_seg = t_seg.clamp(0.0, 1.0);

        let px = ax0 + t_seg * dx;
        let py = ay0 + t_seg * dy;

        let angle = (py - cy).atan2(px - cx);
        if let Some(t_arc) = angle_to_arc_param(angle, start_angle, sweep) {
            results.push(((px, py), t_seg, t_arc));
        }
    }

    results
}

/// Intersection of two circular arcs in 2D.
///
/// Arc 1: center `(c1x, c1y)`, `r1`, `start1`, `sweep1`.
/// Arc 2: center `(c2x, c2y)`, `r2`, `start2`, `sweep2`.
///
/// Returns a vector of `((x, y), t1, t2)` where `t1` and `t2` are arc parameters in `[0, 1]`.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn arc_arc_intersect_2d(
    c1x: f64,
    c1y: f64,
    r1: f64,
    start1: f64,
    sweep1: f64,
    c2x: f64,
    c2y: f64,
    r2: f64,
    start2: f64,
    sweep2: f64,
) -> Vec<((f64, f64), f64, f64)> {
    let mut results = Vec::new();

    let eps = TOLERANCE;
    for (ix, iy) in circle_circle_intersect_2d(c1x, c1y, r1, c2x, c2y, r2) {
        let angle1 = (iy - c1y).atan2(ix - c1x);
        let angle2 = (iy - c2y).atan2(ix - c2x);

        let t1 = angle_to_arc_param(angle1, start1, sweep1);
        let t2 = angle_to_arc_param(angle2, start2, sweep2);

        if let (Some(t1), Some(t2)) = (t1, t2) {
            let d1 = ((ix - c1x).powi(2) + (iy - c1y).powi(2)).sqrt();
            let d2 = ((ix - c2x).powi(2) + (iy - c2y).powi(2)).sqrt();
            if (d1 - r1).abs() < eps && (d2 - r2).abs() < eps {
                results.push(((ix, iy), t1, t2));
            }
        }
    }

    results
}

/// Converts an absolute angle to an arc parameter `t` in `[0, 1]`.
///
/// Returns `None` if the angle is not within the arc's angular range.
pub(crate) fn angle_to_arc_param(angle: f64, start_angle: f64, sweep: f64) -> Option<f64> {
    let eps = TOLERANCE * 100.0;

    let mut delta = angle - start_angle;

    if sweep > 0.0 {
        while delta < -eps {
            delta += 2.0 * PI;
        }
        while delta > 2.0 * PI + eps {
            delta -= 2.0 * PI;
        }
    } else {
        while delta > eps {
            delta -= 2.0 * PI;
        }
        while delta < -2.0 * PI - eps {
            delta += 2.0 * PI;
        }
    }

    let t = delta / sweep;
    if t >= -eps && t <= 1.0 + eps {
        Some(t.clamp(0.0, 1.0))
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn line_line_perpendicular() {
        let p1 = Point2::new(0.0, 0.0);
        let d1 = Vector2::new(1.0, 0.0);
        let p2 = Point2::new(0.5, -1.0);
        let d2 = Vector2::new(0.0, 1.0);
        let (t, u) = line_line_intersect_2d(&p1, &d1, &p2, &d2).unwrap();
        assert!((t - 0.5).abs() < TOLERANCE);
        assert!((u - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn line_line_parallel_returns_none() {
        let p1 = Point2::new(0.0, 0.0);
        let d1 = Vector2::new(1.0, 0.0);
        let p2 = Point2::new(0.0, 1.0);
        let d2 = Vector2::new(1.0, 0.0);
        assert!(line_line_intersect_2d(&p1, &d1, &p2, &d2).is_none());
    }

    #[test]
    fn segment_segment_crossing() {
        let a0 = Point2::new(0.0, 0.0);
        let a1 = Point2::new(2.0, 2.0);
        let b0 = Point2::new(0.0, 2.0);
        let b1 = Point2::new(2.0, 0.0);
        let (pt, t, u) = segment_segment_intersect_2d(&a0, &a1, &b0, &b1).unwrap();
        assert!((pt.x - 1.0).abs() < TOLERANCE);
        assert!((pt.y - 1.0).abs() < TOLERANCE);
        assert!((t - 0.5).abs() < TOLERANCE);
        assert!((u - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn segment_segment_no_crossing() {
        let a0 = Point2::new(0.0, 0.0);
        let a1 = Point2::new(1.0, 0.0);
        let b0 = Point2::new(0.0, 1.0);
        let b1 = Point2::new(1.0, 1.0);
        assert!(segment_segment_intersect_2d(&a0, &a1, &b0, &b1).is_none());
    }

    #[test]
    fn collinear_overlap_reports_clipped_interval() {
        let a0 = Point2::new(0.0, 0.0);
        let a1 = Point2::new(10.0, 0.0);
        let b0 = Point2::new(5.0, 0.0);
        let b1 = Point2::new(15.0, 0.0);
        let [(p0, t0, u0), (p1, t1, u1)] = collinear_overlap_2d(&a0, &a1, &b0, &b1).unwrap();
        assert!((p0 - Point2::new(5.0, 0.0)).norm() < TOLERANCE);
        assert!((p1 - Point2::new(10.0, 0.0)).norm() < TOLERANCE);
        assert!((t0 - 0.5).abs() < TOLERANCE);
        assert!((t1 - 1.0).abs() < TOLERANCE);
        assert!((u0 - 0.0).abs() < TOLERANCE);
        assert!((u1 - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn collinear_but_disjoint_segments_have_no_overlap() {
        let a0 = Point2::new(0.0, 0.0);
        let a1 = Point2::new(1.0, 0.0);
        let b0 = Point2::new(2.0, 0.0);
        let b1 = Point2::new(3.0, 0.0);
        assert!(collinear_overlap_2d(&a0, &a1, &b0, &b1).is_none());
    }

    #[test]
    fn parallel_non_collinear_segments_have_no_overlap() {
        let a0 = Point2::new(0.0, 0.0);
        let a1 = Point2::new(1.0, 0.0);
        let b0 = Point2::new(0.0, 1.0);
        let b1 = Point2::new(1.0, 1.0);
        assert!(collinear_overlap_2d(&a0, &a1, &b0, &b1).is_none());
    }

    #[test]
    fn point_at_interpolation() {
        let origin = Point2::new(1.0, 2.0);
        let dir = Vector2::new(4.0, 6.0);
        let pt = point_at(&origin, &dir, 0.5);
        assert!((pt.x - 3.0).abs() < TOLERANCE);
        assert!((pt.y - 5.0).abs() < TOLERANCE);
    }

    #[test]
    fn circle_circle_two_crossings() {
        let hits = circle_circle_intersect_2d(0.0, 0.0, 1.0, 1.0, 0.0, 1.0);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn circle_circle_disjoint() {
        let hits = circle_circle_intersect_2d(0.0, 0.0, 1.0, 5.0, 0.0, 1.0);
        assert!(hits.is_empty());
    }

    #[test]
    fn line_circle_through_center() {
        let p0 = Point2::new(-2.0, 0.0);
        let p1 = Point2::new(2.0, 0.0);
        let hits = line_circle_intersect_2d(&p0, &p1, 0.0, 0.0, 1.0);
        assert_eq!(hits.len(), 2);
    }

    // ── line-arc intersection tests ──

    #[test]
    fn line_arc_two_crossings() {
        let hits = line_arc_intersect_2d(-2.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0, 0.0, PI);
        assert_eq!(hits.len(), 2, "expected 2 hits, got {}", hits.len());
    }

    #[test]
    fn line_arc_no_crossing() {
        let hits = line_arc_intersect_2d(3.0, 0.0, 4.0, 0.0, 0.0, 0.0, 1.0, 0.0, PI);
        assert!(hits.is_empty());
    }

    #[test]
    fn line_arc_tangent() {
        let hits = line_arc_intersect_2d(-1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, PI);
        assert_eq!(hits.len(), 1, "hits={hits:?}");
        assert!((hits[0].0 .0).abs() < 1e-6, "x={}", hits[0].0 .0);
        assert!((hits[0].0 .1 - 1.0).abs() < 1e-6, "y={}", hits[0].0 .1);
    }

    #[test]
    fn line_arc_miss_outside_arc_range() {
        let hits = line_arc_intersect_2d(-2.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0, PI / 4.0, PI / 4.0);
        assert!(hits.is_empty(), "hits={hits:?}");
    }

    // ── arc-arc intersection tests ──

    #[test]
    fn arc_arc_two_crossings() {
        let hits = arc_arc_intersect_2d(
            0.0, 0.0, 1.0, -PI, 2.0 * PI, 1.0, 0.0, 1.0, 0.0, 2.0 * PI,
        );
        assert_eq!(hits.len(), 2, "hits={hits:?}");
        let sqrt3_2 = 3.0_f64.sqrt() / 2.0;
        let (mut y0, mut y1) = (hits[0].0 .1, hits[1].0 .1);
        if y0 > y1 {
            std::mem::swap(&mut y0, &mut y1);
        }
        assert!((y0 + sqrt3_2).abs() < 1e-6, "y0={y0}");
        assert!((y1 - sqrt3_2).abs() < 1e-6, "y1={y1}");
    }

    #[test]
    fn arc_arc_no_overlap() {
        let hits = arc_arc_intersect_2d(0.0, 0.0, 1.0, 0.0, PI, 5.0, 0.0, 1.0, 0.0, PI);
        assert!(hits.is_empty());
    }

    #[test]
    fn arc_arc_tangent() {
        let hits = arc_arc_intersect_2d(
            0.0, 0.0, 1.0, -PI / 4.0, PI / 2.0, 2.0, 0.0, 1.0, PI / 2.0, PI,
        );
        assert_eq!(hits.len(), 1, "hits={hits:?}");
        assert!((hits[0].0 .0 - 1.0).abs() < 1e-6);
        assert!((hits[0].0 .1).abs() < 1e-6);
    }

    #[test]
    fn arc_arc_miss_outside_range() {
        let hits = arc_arc_intersect_2d(
            0.0, 0.0, 1.0, 0.0, PI / 4.0, 1.0, 0.0, 1.0, PI, PI / 4.0,
        );
        assert!(hits.is_empty(), "hits={hits:?}");
    }
}
