//! Point-in-chain queries: the polygon point-in-test (§4.D) generalized to
//! closed chains of mixed shape kinds.

use crate::error::{DomainError, Result};
use crate::math::{Point2, Vector2, TOLERANCE};
use crate::raycast;
use crate::shape::Shape;

/// An ordered sequence of shapes whose consecutive endpoints coincide within
/// tolerance. `closed` additionally requires the last shape's end point to
/// meet the first shape's start point.
#[derive(Debug, Clone)]
pub struct Chain {
    pub shapes: Vec<Shape>,
    pub closed: bool,
}

impl Chain {
    #[must_use]
    pub fn new(shapes: Vec<Shape>, closed: bool) -> Self {
        Self { shapes, closed }
    }

    /// Tests whether `point` lies inside this chain via horizontal ray
    /// casting and parity, summing crossings across every shape (§4.C).
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ChainNotClosed` if the chain isn't closed, and
    /// `DomainError::EmptyChain` if it has no shapes.
    pub fn point_inside(&self, point: Point2) -> Result<bool> {
        if self.shapes.is_empty() {
            return Err(DomainError::EmptyChain().into());
        }
        if !self.closed {
            return Err(DomainError::ChainNotClosed().into());
        }

        let direction = Vector2::new(1.0, 0.0);
        let count: usize = self.shapes.iter().map(|s| raycast::crossing_count(point, direction, s)).sum();
        Ok(count % 2 == 1)
    }

    /// Batch form of [`Chain::point_inside`], preserving input order.
    ///
    /// # Errors
    ///
    /// Propagates the same errors as [`Chain::point_inside`].
    pub fn points_inside(&self, points: &[Point2]) -> Result<Vec<bool>> {
        points.iter().map(|&p| self.point_inside(p)).collect()
    }

    /// Short-circuiting "is any of these points inside" query.
    ///
    /// # Errors
    ///
    /// Propagates the same errors as [`Chain::point_inside`].
    pub fn any_inside(&self, points: &[Point2]) -> Result<bool> {
        for &p in points {
            if self.point_inside(p)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    #[must_use]
    pub fn is_endpoint_connected(&self) -> bool {
        if self.shapes.len() < 2 {
            return true;
        }
        let n = self.shapes.len();
        let upper = if self.closed { n } else { n - 1 };
        (0..upper).all(|i| {
            let a = self.shapes[i].end_point();
            let b = self.shapes[(i + 1) % n].start_point();
            (a - b).norm() < TOLERANCE
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shape::{Line, ShapeId};

    fn unit_square_chain() -> Chain {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        let shapes = (0..4)
            .map(|i| {
                Shape::Line(Line::new(ShapeId::from_raw(i as u64), pts[i], pts[(i + 1) % 4]).unwrap())
            })
            .collect();
        Chain::new(shapes, true)
    }

    #[test]
    fn center_is_inside_and_outside_is_outside() {
        let chain = unit_square_chain();
        assert!(chain.point_inside(Point2::new(5.0, 5.0)).unwrap());
        assert!(!chain.point_inside(Point2::new(-1.0, 5.0)).unwrap());
    }

    #[test]
    fn boundary_point_counts_inside_under_lower_inclusive_rule() {
        let chain = unit_square_chain();
        assert!(chain.point_inside(Point2::new(0.5, 0.0)).unwrap());
    }

    #[test]
    fn open_chain_is_rejected() {
        let pts = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)];
        let shapes = vec![
            Shape::Line(Line::new(ShapeId::from_raw(1), pts[0], pts[1]).unwrap()),
            Shape::Line(Line::new(ShapeId::from_raw(2), pts[1], pts[2]).unwrap()),
        ];
        let chain = Chain::new(shapes, false);
        assert!(chain.point_inside(Point2::new(0.5, 0.5)).is_err());
    }

    #[test]
    fn batch_preserves_order() {
        let chain = unit_square_chain();
        let pts = [Point2::new(5.0, 5.0), Point2::new(-1.0, 5.0), Point2::new(1.0, 1.0)];
        let result = chain.points_inside(&pts).unwrap();
        assert_eq!(result, vec![true, false, true]);
    }

    #[test]
    fn any_inside_short_circuits_on_first_hit() {
        let chain = unit_square_chain();
        let pts = [Point2::new(-1.0, -1.0), Point2::new(5.0, 5.0)];
        assert!(chain.any_inside(&pts).unwrap());
    }
}
