use crate::error::{DomainError, GeometryError, Result};
use crate::math::arc2d::{arc_from_bulge, arc_point_at, arc_tangent_at};
use crate::math::{BoundingBox, Point2, Vector2, TOLERANCE};

use super::{Primitive2D, ShapeId};

/// Bulge-encoded polyline vertex for mixed line/arc segments.
///
/// `bulge = tan(sweep_angle / 4)`:
/// - `0` = straight line to next vertex
/// - `> 0` = counter-clockwise arc to next vertex
/// - `< 0` = clockwise arc to next vertex
/// - `|bulge| = 1` = semicircle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolylineVertex {
    pub x: f64,
    pub y: f64,
    pub bulge: f64,
}

impl PolylineVertex {
    #[must_use]
    pub fn new(x: f64, y: f64, bulge: f64) -> Self {
        Self { x, y, bulge }
    }

    #[must_use]
    pub fn line(x: f64, y: f64) -> Self {
        Self { x, y, bulge: 0.0 }
    }

    #[must_use]
    pub fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// A chain of straight-line and circular-arc segments, encoded with the
/// AutoCAD bulge convention (see [`PolylineVertex`]).
#[derive(Debug, Clone)]
pub struct Polyline {
    pub id: ShapeId,
    pub vertices: Vec<PolylineVertex>,
    pub closed: bool,
}

impl Polyline {
    /// Creates a polyline from point data, with all-zero bulges.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if fewer than 2 points are given.
    pub fn from_points(id: ShapeId, points: &[Point2], closed: bool) -> Result<Self> {
        if points.len() < 2 {
            return Err(DomainError::InvalidInput("polyline requires at least 2 vertices".into()).into());
        }
        let vertices = points.iter().map(|p| PolylineVertex::line(p.x, p.y)).collect();
        Ok(Self { id, vertices, closed })
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        let n = self.vertices.len();
        if n < 2 {
            return 0;
        }
        if self.closed {
            n
        } else {
            n - 1
        }
    }

    /// Returns the `(start, end, bulge)` of segment `i`.
    #[must_use]
    pub fn segment(&self, i: usize) -> (PolylineVertex, PolylineVertex) {
        let n = self.vertices.len();
        (self.vertices[i], self.vertices[(i + 1) % n])
    }

    /// Tessellates arcs into straight chords within `tolerance`, returning a
    /// flat point list (used by offset/side-detection sampling and by the
    /// ellipse-self-intersection reduction).
    #[must_use]
    pub fn to_points(&self, tolerance: f64) -> Vec<Point2> {
        let n = self.vertices.len();
        if n == 0 {
            return Vec::new();
        }
        let seg_count = self.segment_count();
        let mut points = Vec::with_capacity(n * 2);

        for i in 0..seg_count {
            let (v0, v1) = self.segment(i);
            if i == 0 {
                points.push(v0.point());
            }
            if v0.bulge.abs() < 1e-12 {
                points.push(v1.point());
            } else {
                let (cx, cy, radius, start_angle, sweep) = arc_from_bulge(v0.x, v0.y, v1.x, v1.y, v0.bulge);
                if radius < 1e-12 {
                    points.push(v1.point());
                    continue;
                }
                let n_sub = arc_subdivision_count(radius, sweep.abs(), tolerance);
                for j in 1..n_sub {
                    #[allow(clippy::cast_lossless)]
                    let t = f64::from(j) / f64::from(n_sub);
                    let (px, py) = arc_point_at(cx, cy, radius, start_angle, sweep, t);
                    points.push(Point2::new(px, py));
                }
                points.push(v1.point());
            }
        }
        points
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        let m = self.vertices.len();
        if m == 0 {
            return self.clone();
        }
        let mut new_verts = Vec::with_capacity(m);
        for j in 0..m {
            let orig_idx = m - 1 - j;
            let bulge = if j < m - 1 {
                -self.vertices[m - 2 - j].bulge
            } else {
                0.0
            };
            new_verts.push(PolylineVertex::new(
                self.vertices[orig_idx].x,
                self.vertices[orig_idx].y,
                bulge,
            ));
        }
        Self {
            id: self.id,
            vertices: new_verts,
            closed: self.closed,
        }
    }

    /// Evaluates the point and unit tangent on segment `seg_idx` at local
    /// parameter `t` in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is degenerate.
    pub fn point_tangent_on_segment(&self, seg_idx: usize, t: f64) -> Result<(Point2, Vector2)> {
        let (v0, v1) = self.segment(seg_idx);
        if v0.bulge.abs() < 1e-12 {
            let d = v1.point() - v0.point();
            let len = d.norm();
            if len < TOLERANCE {
                return Err(GeometryError::ZeroVector.into());
            }
            Ok((v0.point() + d * t, d / len))
        } else {
            let (cx, cy, radius, sa, sw) = arc_from_bulge(v0.x, v0.y, v1.x, v1.y, v0.bulge);
            let (px, py) = arc_point_at(cx, cy, radius, sa, sw, t);
            let (tx, ty) = arc_tangent_at(sa, sw, t);
            Ok((Point2::new(px, py), Vector2::new(tx, ty)))
        }
    }
}

fn arc_subdivision_count(radius: f64, abs_sweep: f64, tolerance: f64) -> u32 {
    if radius < 1e-12 || abs_sweep < 1e-12 || tolerance <= 0.0 {
        return 1;
    }
    let max_angle = if tolerance >= radius {
        std::f64::consts::PI
    } else {
        2.0 * (1.0 - tolerance / radius).acos()
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = (abs_sweep / max_angle).ceil() as u32;
    n.max(1)
}

impl Primitive2D for Polyline {
    fn point_at(&self, t: f64) -> Result<Point2> {
        let seg_count = self.segment_count();
        if seg_count == 0 {
            return Err(DomainError::InvalidInput("polyline has no segments".into()).into());
        }
        #[allow(clippy::cast_precision_loss)]
        let scaled = (t.clamp(0.0, 1.0) * seg_count as f64).min(seg_count as f64 - f64::EPSILON);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let seg_idx = scaled.floor() as usize;
        let local_t = scaled - scaled.floor();
        self.point_tangent_on_segment(seg_idx, local_t).map(|(p, _)| p)
    }

    fn tangent_at(&self, t: f64) -> Result<Vector2> {
        let seg_count = self.segment_count();
        if seg_count == 0 {
            return Err(DomainError::InvalidInput("polyline has no segments".into()).into());
        }
        #[allow(clippy::cast_precision_loss)]
        let scaled = (t.clamp(0.0, 1.0) * seg_count as f64).min(seg_count as f64 - f64::EPSILON);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let seg_idx = scaled.floor() as usize;
        let local_t = scaled - scaled.floor();
        self.point_tangent_on_segment(seg_idx, local_t).map(|(_, t)| t)
    }

    fn start_point(&self) -> Point2 {
        self.vertices[0].point()
    }

    fn end_point(&self) -> Point2 {
        if self.closed {
            self.vertices[0].point()
        } else {
            #[allow(clippy::unwrap_used)]
            self.vertices.last().unwrap().point()
        }
    }

    fn bounding_box(&self) -> BoundingBox {
        let pts = self.to_points(TOLERANCE.max(1e-6));
        BoundingBox::from_points(&pts)
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn from_points_creates_line_only() {
        let pts = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)];
        let pl = Polyline::from_points(ShapeId::from_raw(1), &pts, false).unwrap();
        assert_eq!(pl.vertices.len(), 3);
        assert_eq!(pl.segment_count(), 2);
    }

    #[test]
    fn to_points_semicircle_arc() {
        let pl = Polyline {
            id: ShapeId::from_raw(1),
            vertices: vec![PolylineVertex::new(0.0, 0.0, 1.0), PolylineVertex::new(2.0, 0.0, 0.0)],
            closed: false,
        };
        let pts = pl.to_points(0.01);
        assert!(pts.len() > 2);
        assert!((pts[0].x).abs() < 1e-10);
        assert!((pts.last().unwrap().x - 2.0).abs() < 1e-10);
    }

    #[test]
    fn reversed_with_arc() {
        let pl = Polyline {
            id: ShapeId::from_raw(1),
            vertices: vec![
                PolylineVertex::line(0.0, 0.0),
                PolylineVertex::new(2.0, 0.0, 1.0),
                PolylineVertex::line(4.0, 0.0),
            ],
            closed: false,
        };
        let rev = pl.reversed();
        assert!((rev.vertices[0].bulge - (-1.0)).abs() < 1e-12);
    }

    #[test]
    fn point_at_spans_all_segments() {
        let pl = Polyline::from_points(
            ShapeId::from_raw(1),
            &[Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)],
            false,
        )
        .unwrap();
        let start = pl.point_at(0.0).unwrap();
        let end = pl.point_at(1.0).unwrap();
        assert!((start.x).abs() < TOLERANCE);
        assert!((end.x - 2.0).abs() < TOLERANCE);
    }
}
