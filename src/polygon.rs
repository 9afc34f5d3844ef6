//! Polygon analysis: winding, simplicity, point/polygon containment, convex
//! hull, regular-polygon generation, and vertex simplification.

use crate::error::{DomainError, Result};
use crate::math::polygon2d::signed_area_2d;
use crate::math::{BoundingBox, Point2, Vector2, TOLERANCE};
use crate::raycast;
use crate::shape::{Line, Shape, ShapeId};

/// Winding direction of a polygon's vertex order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    Clockwise,
    CounterClockwise,
    Degenerate,
}

/// Result of [`analyze`].
#[derive(Debug, Clone)]
pub struct PolygonAnalysis {
    pub signed_area: f64,
    pub winding: Winding,
    pub absolute_area: f64,
    pub perimeter: f64,
    pub bounding_box: BoundingBox,
    pub is_simple: bool,
    pub is_closed: bool,
}

/// Analyzes a vertex list: area, winding, perimeter, bounding box, and
/// simplicity (no non-adjacent edges cross within `tolerance`).
///
/// Closure is inferred by proximity of the first and last vertex within
/// `tolerance * closure_slack`.
#[must_use]
pub fn analyze(points: &[Point2], tolerance: f64, closure_slack: f64) -> PolygonAnalysis {
    let signed_area = signed_area_2d(points);
    let winding = if signed_area.abs() < tolerance * tolerance {
        Winding::Degenerate
    } else if signed_area > 0.0 {
        Winding::CounterClockwise
    } else {
        Winding::Clockwise
    };

    let perimeter = perimeter_of(points);
    let bounding_box = if points.is_empty() {
        BoundingBox::from_point(Point2::origin())
    } else {
        BoundingBox::from_points(points)
    };
    let is_closed = points.len() >= 2 && (points[0] - points[points.len() - 1]).norm() <= tolerance * closure_slack.max(1.0);
    let is_simple = is_simple_polygon(points, tolerance);

    PolygonAnalysis {
        signed_area,
        winding,
        absolute_area: signed_area.abs(),
        perimeter,
        bounding_box,
        is_simple,
        is_closed,
    }
}

fn perimeter_of(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n).map(|i| (points[(i + 1) % n] - points[i]).norm()).sum()
}

/// Checks whether any pair of non-adjacent edges crosses within `tolerance`.
#[must_use]
pub fn is_simple_polygon(points: &[Point2], tolerance: f64) -> bool {
    let n = points.len();
    if n < 3 {
        return true;
    }
    for i in 0..n {
        let a0 = points[i];
        let a1 = points[(i + 1) % n];
        for j in (i + 1)..n {
            let adjacent = j == i || (j + 1) % n == i || (i + 1) % n == j;
            if adjacent {
                continue;
            }
            let b0 = points[j];
            let b1 = points[(j + 1) % n];
            if let Some((_, t, u)) = crate::math::intersect2d::segment_segment_intersect_2d(&a0, &a1, &b0, &b1) {
                let interior = t > tolerance && t < 1.0 - tolerance && u > tolerance && u < 1.0 - tolerance;
                if interior {
                    return false;
                }
            }
        }
    }
    true
}

/// Ray-casts a point against a closed polygon using the lower-inclusive
/// crossing rule (shared with [`crate::raycast`] and [`crate::chain`]).
#[must_use]
pub fn is_point_inside(point: Point2, polygon: &[Point2]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let direction = Vector2::new(1.0, 0.0);
    let mut count = 0;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        if let Some(hit) = raycast::ray_segment_hit(point, direction, a, b) {
            if hit.t > TOLERANCE {
                count += 1;
            }
        }
    }
    count % 2 == 1
}

/// Checks whether `inner`'s vertices all lie inside `outer` and no edge of
/// `inner` crosses any edge of `outer`.
#[must_use]
pub fn is_polygon_inside(inner: &[Point2], outer: &[Point2], tolerance: f64) -> bool {
    if inner.is_empty() || outer.len() < 3 {
        return false;
    }
    if !inner.iter().all(|&p| is_point_inside(p, outer)) {
        return false;
    }
    let n_inner = inner.len();
    let n_outer = outer.len();
    for i in 0..n_inner {
        let a0 = inner[i];
        let a1 = inner[(i + 1) % n_inner];
        for j in 0..n_outer {
            let b0 = outer[j];
            let b1 = outer[(j + 1) % n_outer];
            if let Some((_, t, u)) = crate::math::intersect2d::segment_segment_intersect_2d(&a0, &a1, &b0, &b1) {
                if t > tolerance && t < 1.0 - tolerance && u > tolerance && u < 1.0 - tolerance {
                    return false;
                }
            }
        }
    }
    true
}

/// A shell polygon together with the holes fully contained in it.
#[derive(Debug, Clone)]
pub struct ShellWithHoles {
    pub shell: Vec<Point2>,
    pub holes: Vec<Vec<Point2>>,
}

/// Result of [`classify_shells_and_holes`].
#[derive(Debug, Clone, Default)]
pub struct ShellHoleClassification {
    pub shells: Vec<ShellWithHoles>,
    pub orphaned_holes: Vec<Vec<Point2>>,
}

/// Classifies a flat list of polygons into shells (clockwise) with attached
/// holes (counter-clockwise fully contained in exactly one shell) and
/// orphaned holes (counter-clockwise with no containing shell).
///
/// Never fails: every input polygon is placed in exactly one output bucket.
#[must_use]
pub fn classify_shells_and_holes(polygons: &[Vec<Point2>], tolerance: f64) -> ShellHoleClassification {
    let mut shells: Vec<ShellWithHoles> = polygons
        .iter()
        .filter(|p| signed_area_2d(p) < 0.0)
        .map(|p| ShellWithHoles {
            shell: p.clone(),
            holes: Vec::new(),
        })
        .collect();

    let mut orphaned = Vec::new();
    for poly in polygons.iter().filter(|p| signed_area_2d(p) >= 0.0) {
        let home = shells.iter_mut().find(|s| is_polygon_inside(poly, &s.shell, tolerance));
        match home {
            Some(shell) => shell.holes.push(poly.clone()),
            None => orphaned.push(poly.clone()),
        }
    }

    ShellHoleClassification {
        shells,
        orphaned_holes: orphaned,
    }
}

/// Reverses vertex order iff the current winding disagrees with `target`.
/// Degenerate polygons are returned unchanged.
#[must_use]
pub fn normalize_winding(points: &[Point2], target: Winding) -> Vec<Point2> {
    let current = analyze(points, TOLERANCE, 1.0).winding;
    if current == Winding::Degenerate || current == target {
        points.to_vec()
    } else {
        let mut reversed = points.to_vec();
        reversed.reverse();
        reversed
    }
}

/// Generates the vertices of a regular polygon with the first vertex at
/// angle `rotation` from the +x axis.
///
/// # Errors
///
/// Returns `DomainError::InvalidInput` if `radius <= 0` or `sides < 3`.
pub fn regular_polygon(center: Point2, radius: f64, sides: usize, rotation: f64) -> Result<Vec<Point2>> {
    if radius <= 0.0 {
        return Err(DomainError::InvalidInput("regular polygon radius must be positive".into()).into());
    }
    if sides < 3 {
        return Err(DomainError::InvalidInput("regular polygon needs at least 3 sides".into()).into());
    }
    let step = std::f64::consts::TAU / sides as f64;
    Ok((0..sides)
        .map(|i| {
            let angle = rotation + step * i as f64;
            Point2::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect())
}

/// Parameters controlling [`simplify`].
#[derive(Debug, Clone, Copy)]
pub struct SimplifyConfig {
    pub min_distance: f64,
    pub collinearity_tolerance: f64,
    pub preserve_closure: bool,
}

/// Removes vertices too close to their predecessor or too nearly collinear
/// with their neighbors, never reducing the result below 3 vertices.
#[must_use]
pub fn simplify(points: &[Point2], config: SimplifyConfig) -> Vec<Point2> {
    if points.len() <= 3 {
        return points.to_vec();
    }
    let closed = config.preserve_closure && (points[0] - points[points.len() - 1]).norm() < TOLERANCE;
    let mut kept: Vec<Point2> = Vec::with_capacity(points.len());

    for &p in points {
        if let Some(&last) = kept.last() {
            if (p - last).norm() < config.min_distance {
                continue;
            }
        }
        kept.push(p);
    }

    if kept.len() <= 3 {
        return enforce_min_vertices(kept, points);
    }

    let mut simplified = Vec::with_capacity(kept.len());
    let n = kept.len();
    for i in 0..n {
        if simplified.len() + (n - i) <= 3 {
            simplified.push(kept[i]);
            continue;
        }
        let prev = kept[(i + n - 1) % n];
        let next = kept[(i + 1) % n];
        let a = prev - kept[i];
        let b = next - kept[i];
        let cross = (a.x * b.y - a.y * b.x).abs();
        if cross < config.collinearity_tolerance {
            continue;
        }
        simplified.push(kept[i]);
    }

    let result = enforce_min_vertices(simplified, points);
    if closed && result.first() != result.last() {
        let mut closed_result = result.clone();
        if let Some(&first) = result.first() {
            closed_result.push(first);
        }
        closed_result
    } else {
        result
    }
}

fn enforce_min_vertices(mut result: Vec<Point2>, original: &[Point2]) -> Vec<Point2> {
    if result.len() >= 3 {
        return result;
    }
    result = original.to_vec();
    result.truncate(3.max(result.len()));
    result
}

/// Graham scan convex hull. Output is counter-clockwise; collinear interior
/// points are dropped. Inputs smaller than 3 points are returned unchanged.
#[must_use]
pub fn convex_hull(points: &[Point2]) -> Vec<Point2> {
    if points.len() < 3 {
        return points.to_vec();
    }

    // `points.len() >= 3` was checked above, so `points[0]` is a safe seed
    // and the loop below never needs an `Option`-unwrapping fallback.
    let mut pivot = points[0];
    for &p in &points[1..] {
        if p.y < pivot.y || ((p.y - pivot.y).abs() < TOLERANCE && p.x < pivot.x) {
            pivot = p;
        }
    }

    let mut sorted: Vec<Point2> = points.iter().copied().filter(|&p| p != pivot).collect();
    sorted.sort_by(|a, b| {
        let angle_a = (a.y - pivot.y).atan2(a.x - pivot.x);
        let angle_b = (b.y - pivot.y).atan2(b.x - pivot.x);
        angle_a
            .partial_cmp(&angle_b)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then((a - pivot).norm().partial_cmp(&(b - pivot).norm()).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut hull: Vec<Point2> = vec![pivot];
    for p in sorted {
        while hull.len() >= 2 {
            let o = hull[hull.len() - 2];
            let a = hull[hull.len() - 1];
            let cross = (a.x - o.x) * (p.y - o.y) - (a.y - o.y) * (p.x - o.x);
            if cross <= TOLERANCE {
                hull.pop();
            } else {
                break;
            }
        }
        hull.push(p);
    }
    hull
}

/// Builds a closed `Polyline`'s vertex list from a regular polygon, wrapped
/// as a `Shape::Line` chain — a convenience used by tests and by callers
/// that need the shape-level API rather than raw points.
#[must_use]
pub fn regular_polygon_as_lines(center: Point2, radius: f64, sides: usize, rotation: f64, start_id: u64) -> Result<Vec<Shape>> {
    let pts = regular_polygon(center, radius, sides, rotation)?;
    let n = pts.len();
    let mut shapes = Vec::with_capacity(n);
    for i in 0..n {
        let line = Line::new(ShapeId::from_raw(start_id + i as u64), pts[i], pts[(i + 1) % n])?;
        shapes.push(Shape::Line(line));
    }
    Ok(shapes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn analyze_ccw_square() {
        let a = analyze(&unit_square(), TOLERANCE, 1.0);
        assert_eq!(a.winding, Winding::CounterClockwise);
        assert!((a.absolute_area - 1.0).abs() < TOLERANCE);
        assert!((a.perimeter - 4.0).abs() < TOLERANCE);
        assert!(a.is_simple);
    }

    #[test]
    fn point_inside_and_outside_square() {
        let sq = unit_square();
        assert!(is_point_inside(Point2::new(0.5, 0.5), &sq));
        assert!(!is_point_inside(Point2::new(2.0, 0.5), &sq));
    }

    #[test]
    fn hole_classified_under_shell() {
        let shell = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 4.0),
            Point2::new(4.0, 4.0),
            Point2::new(4.0, 0.0),
        ];
        let hole = vec![
            Point2::new(1.0, 1.0),
            Point2::new(3.0, 1.0),
            Point2::new(3.0, 3.0),
            Point2::new(1.0, 3.0),
        ];
        let result = classify_shells_and_holes(&[shell, hole], TOLERANCE);
        assert_eq!(result.shells.len(), 1);
        assert_eq!(result.shells[0].holes.len(), 1);
        assert!(result.orphaned_holes.is_empty());
    }

    #[test]
    fn normalize_winding_reverses_when_needed() {
        let ccw = unit_square();
        let flipped = normalize_winding(&ccw, Winding::Clockwise);
        assert_eq!(analyze(&flipped, TOLERANCE, 1.0).winding, Winding::Clockwise);
    }

    #[test]
    fn regular_polygon_first_vertex_at_rotation() {
        let pts = regular_polygon(Point2::origin(), 2.0, 4, 0.0).unwrap();
        assert_eq!(pts.len(), 4);
        assert!((pts[0].x - 2.0).abs() < TOLERANCE);
        assert!(pts[0].y.abs() < TOLERANCE);
    }

    #[test]
    fn convex_hull_drops_interior_point() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
            Point2::new(0.0, 4.0),
            Point2::new(2.0, 2.0),
        ];
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
    }

    #[test]
    fn simplify_respects_min_vertex_count() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.01, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
        ];
        let config = SimplifyConfig {
            min_distance: 0.5,
            collinearity_tolerance: 1e-6,
            preserve_closure: false,
        };
        let result = simplify(&pts, config);
        assert!(result.len() >= 3);
    }
}
