//! Side detection (§4.J): classifies an offset shape as lying inside/outside
//! a closed parent chain, or left/right of an open one.

use crate::chain::Chain;
use crate::error::Result;
use crate::math::{Point2, TOLERANCE};
use crate::shape::Shape;

/// Default number of samples taken along the offset shape for majority-vote
/// classification, matching the teacher's convention of a small fixed sample
/// count rather than an adaptive one (both branches below are deterministic
/// regardless of sample count, so there is no accuracy/determinism tradeoff
/// to tune here, only cost).
const DEFAULT_SAMPLES: usize = 10;

/// Samples per parent-chain segment used by the open-chain brute-force
/// nearest-point search.
const NEAREST_POINT_SAMPLES_PER_SEGMENT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Inner,
    Outer,
    Left,
    Right,
}

/// The outcome of classifying one offset shape against its parent chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideClassification {
    pub side: Side,
    /// `|2k - N| / N` where `k` is the count of samples agreeing with the
    /// majority and `N` the total sample count — `1.0` is unanimous, `0.0`
    /// is a dead-even split.
    pub confidence: f64,
}

/// Classifies `offset_shape` relative to `parent`.
///
/// `offset_distance` is the signed distance the shape was offset by
/// (positive convention matching [`crate::offset::OffsetSide`]'s sign); it is
/// only consulted for the open-chain tie-break (§4.J: "ties break by the
/// sign of the offset distance").
///
/// # Errors
///
/// Propagates [`Chain::point_inside`]'s errors for the closed-chain branch
/// (empty chain), and errors from `offset_shape`'s own `point_at` if it is
/// degenerate.
pub fn classify(parent: &Chain, offset_shape: &Shape, offset_distance: f64) -> Result<SideClassification> {
    if parent.closed {
        classify_closed(parent, offset_shape)
    } else {
        classify_open(parent, offset_shape, offset_distance)
    }
}

fn sample_points(shape: &Shape, n: usize) -> Result<Vec<Point2>> {
    let mut points = Vec::with_capacity(n);
    for i in 0..n {
        #[allow(clippy::cast_precision_loss)]
        let t = (i as f64 + 0.5) / n as f64;
        points.push(shape.point_at(t)?);
    }
    Ok(points)
}

fn classify_closed(parent: &Chain, offset_shape: &Shape) -> Result<SideClassification> {
    let samples = sample_points(offset_shape, DEFAULT_SAMPLES)?;
    let mut inside_count = 0;
    for p in &samples {
        if parent.point_inside(*p)? {
            inside_count += 1;
        }
    }
    let n = samples.len();
    #[allow(clippy::cast_precision_loss)]
    let confidence = (2 * inside_count).abs_diff(n) as f64 / n as f64;
    let side = if inside_count * 2 >= n { Side::Inner } else { Side::Outer };
    Ok(SideClassification { side, confidence })
}

/// Brute-force nearest point to `target` on `shape`, sampling
/// `NEAREST_POINT_SAMPLES_PER_SEGMENT` parameters (the shape is treated as
/// one segment unless it's a polyline, in which case each segment gets its
/// own allotment, matching the spec's "per segment" wording).
fn nearest_point_on_shape(shape: &Shape, target: Point2) -> Result<(Point2, crate::math::Vector2)> {
    let segment_count = match shape {
        Shape::Polyline(pl) => pl.segment_count().max(1),
        _ => 1,
    };
    let total_samples = segment_count * NEAREST_POINT_SAMPLES_PER_SEGMENT;

    let mut best: Option<(f64, Point2, crate::math::Vector2)> = None;
    for i in 0..=total_samples {
        #[allow(clippy::cast_precision_loss)]
        let t = (i as f64 / total_samples as f64).min(1.0);
        let Ok(p) = shape.point_at(t) else { continue };
        let clamped_t = t.clamp(1e-9, 1.0 - 1e-9);
        let Ok(tangent) = shape.tangent_at(clamped_t) else { continue };
        let d = (p - target).norm_squared();
        if best.as_ref().is_none_or(|(bd, _, _)| d < *bd) {
            best = Some((d, p, tangent));
        }
    }
    best.map(|(_, p, t)| (p, t)).ok_or_else(|| crate::error::DomainError::InvalidInput("parent shape has no valid sample points for nearest-point search".into()).into())
}

fn classify_open(parent: &Chain, offset_shape: &Shape, offset_distance: f64) -> Result<SideClassification> {
    let samples = sample_points(offset_shape, DEFAULT_SAMPLES)?;
    let mut right_count = 0;
    let mut valid = 0;

    for p in &samples {
        let mut best: Option<(f64, Point2, crate::math::Vector2)> = None;
        for shape in &parent.shapes {
            let Ok((np, tangent)) = nearest_point_on_shape(shape, *p) else { continue };
            let d = (np - p).norm_squared();
            if best.as_ref().is_none_or(|(bd, _, _)| d < *bd) {
                best = Some((d, np, tangent));
            }
        }
        let Some((_, nearest, tangent)) = best else { continue };
        valid += 1;

        let to_sample = p - nearest;
        let cross = tangent.x * to_sample.y - tangent.y * to_sample.x;
        let is_right = if cross.abs() < TOLERANCE {
            offset_distance > 0.0
        } else {
            cross < 0.0
        };
        if is_right {
            right_count += 1;
        }
    }

    if valid == 0 {
        return Err(crate::error::DomainError::InvalidInput("no sample point could be matched to the parent chain".into()).into());
    }

    #[allow(clippy::cast_precision_loss)]
    let confidence = (2 * right_count).abs_diff(valid) as f64 / valid as f64;
    let side = if right_count * 2 >= valid { Side::Right } else { Side::Left };
    Ok(SideClassification { side, confidence })
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
            .map(|i| Shape::Line(Line::new(ShapeId::from_raw(i as u64), pts[i], pts[(i + 1) % 4]).unwrap()))
            .collect();
        Chain::new(shapes, true)
    }

    #[test]
    fn closed_chain_inner_shape_classified_inner() {
        let parent = unit_square_chain();
        let inner_edge = Shape::Line(Line::new(ShapeId::from_raw(10), Point2::new(2.0, 2.0), Point2::new(8.0, 2.0)).unwrap());
        let result = classify(&parent, &inner_edge, 1.0).unwrap();
        assert_eq!(result.side, Side::Inner);
        assert!((result.confidence - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn closed_chain_outer_shape_classified_outer() {
        let parent = unit_square_chain();
        let outer_edge = Shape::Line(Line::new(ShapeId::from_raw(10), Point2::new(-5.0, 2.0), Point2::new(-5.0, 8.0)).unwrap());
        let result = classify(&parent, &outer_edge, 1.0).unwrap();
        assert_eq!(result.side, Side::Outer);
    }

    #[test]
    fn open_chain_right_side_shape_classified_right() {
        let base = Shape::Line(Line::new(ShapeId::from_raw(1), Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)).unwrap());
        let parent = Chain::new(vec![base], false);
        let below = Shape::Line(Line::new(ShapeId::from_raw(2), Point2::new(0.0, -2.0), Point2::new(10.0, -2.0)).unwrap());
        let result = classify(&parent, &below, 1.0).unwrap();
        assert_eq!(result.side, Side::Right);
    }

    #[test]
    fn open_chain_left_side_shape_classified_left() {
        let base = Shape::Line(Line::new(ShapeId::from_raw(1), Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)).unwrap());
        let parent = Chain::new(vec![base], false);
        let above = Shape::Line(Line::new(ShapeId::from_raw(2), Point2::new(0.0, 2.0), Point2::new(10.0, 2.0)).unwrap());
        let result = classify(&parent, &above, 1.0).unwrap();
        assert_eq!(result.side, Side::Left);
    }
}
