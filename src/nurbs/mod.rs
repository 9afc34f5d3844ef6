//! NURBS (non-uniform rational B-spline) evaluation and intersection.
//!
//! Construction, knot-span lookup, and basis-function evaluation follow the
//! textbook Cox-de Boor recursion (find_span via binary search, basis
//! functions via the triangular table), generalized here to the rational
//! (weighted) case so that circular/elliptical arcs import as exact NURBS.

use crate::error::{GeometryError, Result};
use crate::math::{BoundingBox, Point2, Vector2, TOLERANCE};
use crate::shape::ShapeId;

/// A control point with an associated weight (`w = 1` recovers a
/// non-rational B-spline).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    pub position: Point2,
    pub weight: f64,
}

impl ControlPoint {
    #[must_use]
    pub fn new(position: Point2, weight: f64) -> Self {
        Self { position, weight }
    }
}

/// A rational B-spline (NURBS) curve.
#[derive(Debug, Clone)]
pub struct Spline {
    pub id: ShapeId,
    pub degree: usize,
    pub control_points: Vec<ControlPoint>,
    pub knots: Vec<f64>,
}

impl Spline {
    /// Creates a new NURBS curve.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidKnotVector` if the knot vector length
    /// doesn't match `control_points.len() + degree + 1`, or if it isn't
    /// non-decreasing.
    pub fn new(id: ShapeId, degree: usize, control_points: Vec<ControlPoint>, knots: Vec<f64>) -> Result<Self> {
        validate_knots(&knots, control_points.len(), degree)?;
        Ok(Self {
            id,
            degree,
            control_points,
            knots,
        })
    }

    /// Builds a clamped (open) uniform knot vector for `n_control_points`
    /// control points and the given `degree`: the first and last knot each
    /// repeat `degree + 1` times, interior knots are evenly spaced.
    #[must_use]
    pub fn clamped_uniform_knots(n_control_points: usize, degree: usize) -> Vec<f64> {
        let n_knots = n_control_points + degree + 1;
        let mut knots = Vec::with_capacity(n_knots);
        let n_interior = n_knots.saturating_sub(2 * (degree + 1));
        for _ in 0..=degree {
            knots.push(0.0);
        }
        for i in 1..=n_interior {
            #[allow(clippy::cast_precision_loss)]
            knots.push(i as f64 / (n_interior as f64 + 1.0));
        }
        for _ in 0..=degree {
            knots.push(1.0);
        }
        knots
    }

    fn domain(&self) -> (f64, f64) {
        (
            self.knots[self.degree],
            self.knots[self.knots.len() - self.degree - 1],
        )
    }

    /// Evaluates the curve at parameter `t` in `[0, 1]`, mapped to the knot
    /// domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the homogeneous weight sum at `t` is zero
    /// (degenerate control polygon).
    pub fn point_at(&self, t: f64) -> Result<Point2> {
        let u = self.param_to_knot(t);
        let (num, w) = self.eval_homogeneous(u, 0);
        if w.abs() < TOLERANCE {
            return Err(GeometryError::Degenerate("zero weight sum in NURBS evaluation".into()).into());
        }
        Ok(Point2::new(num.x / w, num.y / w))
    }

    /// Evaluates the unit tangent at parameter `t` in `[0, 1]` using the
    /// analytic quotient-rule derivative of the rational curve (not a
    /// finite-difference approximation — determinism requires the result not
    /// depend on an arbitrarily chosen step size).
    ///
    /// # Errors
    ///
    /// Returns an error if the derivative is zero-length.
    pub fn tangent_at(&self, t: f64) -> Result<Vector2> {
        let u = self.param_to_knot(t);
        let (num0, w0) = self.eval_homogeneous(u, 0);
        let (num1, w1) = self.eval_homogeneous(u, 1);
        if w0.abs() < TOLERANCE {
            return Err(GeometryError::Degenerate("zero weight sum in NURBS derivative".into()).into());
        }
        // Quotient rule: d/du [N(u)/W(u)] = (N'(u)*W(u) - N(u)*W'(u)) / W(u)^2
        let dx = (num1.x * w0 - num0.x * w1) / (w0 * w0);
        let dy = (num1.y * w0 - num0.y * w1) / (w0 * w0);
        let tangent = Vector2::new(dx, dy);
        let len = tangent.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(tangent / len)
    }

    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        // The convex hull property bounds the curve; the control polygon's
        // own bbox is always a (usually loose but cheap) superset.
        let pts: Vec<Point2> = self.control_points.iter().map(|c| c.position).collect();
        BoundingBox::from_points(&pts)
    }

    fn param_to_knot(&self, t: f64) -> f64 {
        let (lo, hi) = self.domain();
        lo + t.clamp(0.0, 1.0) * (hi - lo)
    }

    /// Evaluates the `deriv`-th derivative (0 = position) of the homogeneous
    /// (weighted) curve `(w(u)*x, w(u)*y)` and its weight function `w(u)`
    /// separately, so callers can apply the quotient rule themselves.
    fn eval_homogeneous(&self, u: f64, deriv: usize) -> (Point2, f64) {
        let span = find_span(self.knots.len() - self.degree - 1, self.degree, u, &self.knots);
        let basis = if deriv == 0 {
            basis_functions(span, u, self.degree, &self.knots)
        } else {
            basis_function_derivatives(span, u, self.degree, &self.knots, deriv)
        };

        let mut x = 0.0;
        let mut y = 0.0;
        let mut w = 0.0;
        for i in 0..=self.degree {
            let cp = &self.control_points[span - self.degree + i];
            let weighted_basis = basis[i] * cp.weight;
            x += weighted_basis * cp.position.x;
            y += weighted_basis * cp.position.y;
            w += weighted_basis;
        }
        (Point2::new(x, y), w)
    }

    /// Inserts a new knot `u_bar` once, via Boehm's algorithm, returning a
    /// new (finer) but geometrically identical spline.
    #[must_use]
    pub fn insert_knot(&self, u_bar: f64) -> Self {
        let p = self.degree;
        let k = find_span(self.knots.len() - p - 1, p, u_bar, &self.knots);
        let mut new_knots = self.knots.clone();
        new_knots.insert(k + 1, u_bar);

        let n = self.control_points.len();
        let mut new_cps = Vec::with_capacity(n + 1);
        for i in 0..=k.saturating_sub(p) {
            new_cps.push(self.control_points[i]);
        }
        for i in (k.saturating_sub(p) + 1)..=k {
            let alpha = (u_bar - self.knots[i]) / (self.knots[i + p] - self.knots[i]);
            let prev = self.control_points[i - 1];
            let cur = self.control_points[i];
            let w = alpha.mul_add(cur.weight, (1.0 - alpha) * prev.weight);
            let x = alpha.mul_add(cur.weight * cur.position.x, (1.0 - alpha) * prev.weight * prev.position.x) / w;
            let y = alpha.mul_add(cur.weight * cur.position.y, (1.0 - alpha) * prev.weight * prev.position.y) / w;
            new_cps.push(ControlPoint::new(Point2::new(x, y), w));
        }
        for cp in &self.control_points[k..n] {
            new_cps.push(*cp);
        }

        Self {
            id: self.id,
            degree: p,
            control_points: new_cps,
            knots: new_knots,
        }
    }

    /// Splits the curve at parameter `t` in `(0, 1)` into two independent
    /// NURBS curves, each still parameterized over `[0, 1]`.
    ///
    /// Implemented via Boehm's algorithm: `u_bar` (the knot-domain image of
    /// `t`) is inserted until its multiplicity reaches `degree + 1`, which
    /// makes the curve interpolate a control point there and splits the knot
    /// vector cleanly into two independently clamped halves sharing that
    /// control point.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if `t` falls at (or within
    /// tolerance of) either endpoint — there is nothing to split there.
    pub fn split(&self, t: f64) -> Result<(Self, Self)> {
        let u = self.param_to_knot(t);
        let (lo, hi) = self.domain();
        if (u - lo).abs() < TOLERANCE || (u - hi).abs() < TOLERANCE {
            return Err(GeometryError::Degenerate("cannot split a curve at its own endpoint".into()).into());
        }

        let p = self.degree;
        let mut c = self.clone();
        loop {
            let mult = c.knots.iter().filter(|&&k| (k - u).abs() < 1e-9).count();
            if mult > p {
                break;
            }
            c = c.insert_knot(u);
        }

        #[allow(clippy::unwrap_used)]
        let span = c.knots.iter().rposition(|&k| (k - u).abs() < 1e-9).unwrap();

        let mut left_knots = c.knots[..=span].to_vec();
        left_knots.push(u);
        let left_cps = c.control_points[..=(span - p)].to_vec();

        let mut right_knots = vec![u];
        right_knots.extend_from_slice(&c.knots[(span - p + 1)..]);
        let right_cps = c.control_points[(span - p)..].to_vec();

        let left = Self::new(self.id, p, left_cps, left_knots)?;
        let right = Self::new(ShapeId::derive(self.id, 0xD1), p, right_cps, right_knots)?;
        Ok((left, right))
    }
}

/// Validates a knot vector's length and monotonicity.
///
/// # Errors
///
/// Returns `GeometryError::InvalidKnotVector` if the count is wrong or the
/// sequence is not non-decreasing.
pub fn validate_knots(knots: &[f64], n_control_points: usize, degree: usize) -> Result<()> {
    let expected = n_control_points + degree + 1;
    if knots.len() != expected {
        return Err(GeometryError::InvalidKnotVector(format!(
            "expected {expected} knots for {n_control_points} control points at degree {degree}, got {}",
            knots.len()
        ))
        .into());
    }
    if knots.windows(2).any(|w| w[1] < w[0]) {
        return Err(GeometryError::InvalidKnotVector("knot vector must be non-decreasing".into()).into());
    }
    Ok(())
}

/// Finds the knot span index containing `u`, via binary search over the
/// non-degenerate interior knots.
#[must_use]
pub fn find_span(n_control_points: usize, degree: usize, u: f64, knots: &[f64]) -> usize {
    let n = n_control_points - 1;
    if u >= knots[n + 1] {
        return n;
    }
    if u <= knots[degree] {
        return degree;
    }
    let (mut low, mut high) = (degree, n + 1);
    let mut mid = (low + high) / 2;
    while u < knots[mid] || u >= knots[mid + 1] {
        if u < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// Cox-de Boor basis function evaluation at span `span`, returning the
/// `degree + 1` nonzero basis values `N[span-degree..=span]`.
#[must_use]
pub fn basis_functions(span: usize, u: f64, degree: usize, knots: &[f64]) -> Vec<f64> {
    let mut n = vec![1.0_f64];
    let mut left = vec![0.0_f64; degree + 1];
    let mut right = vec![0.0_f64; degree + 1];

    for j in 1..=degree {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let temp = if denom.abs() < TOLERANCE { 0.0 } else { n[r] / denom };
            n[r] = temp.mul_add(right[r + 1], saved);
            saved = left[j - r] * temp;
        }
        n.push(saved);
    }
    n
}

/// Derivatives of the basis functions up to order `deriv_order`, returning
/// only the requested order's `degree + 1` values (the full Nurbs-book
/// algorithm computes all orders up to `deriv_order` at once; we only ever
/// need order 0 or 1 here, so we recompute from scratch for clarity rather
/// than caching lower orders).
#[must_use]
pub fn basis_function_derivatives(span: usize, u: f64, degree: usize, knots: &[f64], deriv_order: usize) -> Vec<f64> {
    if deriv_order == 0 {
        return basis_functions(span, u, degree, knots);
    }
    // First derivative via the standard B-spline derivative identity:
    // N'_{i,p}(u) = p/(knots[i+p]-knots[i]) * N_{i,p-1}(u)
    //             - p/(knots[i+p+1]-knots[i+1]) * N_{i+1,p-1}(u)
    let lower = basis_functions_full(span, u, degree - 1, knots);
    let mut result = vec![0.0; degree + 1];
    #[allow(clippy::needless_range_loop)]
    for r in 0..=degree {
        let i = span - degree + r;
        let mut val = 0.0;
        let denom_a = knots[i + degree] - knots[i];
        if denom_a.abs() > TOLERANCE && r < lower.len() {
            #[allow(clippy::cast_precision_loss)]
            {
                val += degree as f64 / denom_a * lower[r];
            }
        }
        let denom_b = knots[i + degree + 1] - knots[i + 1];
        if denom_b.abs() > TOLERANCE && r + 1 < lower.len() {
            #[allow(clippy::cast_precision_loss)]
            {
                val -= degree as f64 / denom_b * lower[r + 1];
            }
        }
        result[r] = val;
    }
    result
}

/// Basis functions of degree `degree` at span `span`, but padded/aligned to
/// the degree-`degree+1` control-point window (needed by the derivative
/// identity, which mixes degree-`p-1` basis values into the degree-`p`
/// derivative).
fn basis_functions_full(span: usize, u: f64, degree: usize, knots: &[f64]) -> Vec<f64> {
    basis_functions(span, u, degree, knots)
}

pub mod construct;
pub mod intersect;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn unit_square_cubic() -> Spline {
        // Degree-1 (polyline-equivalent) spline through 4 points, for
        // simple, hand-verifiable evaluation tests.
        let cps = vec![
            ControlPoint::new(Point2::new(0.0, 0.0), 1.0),
            ControlPoint::new(Point2::new(1.0, 0.0), 1.0),
            ControlPoint::new(Point2::new(1.0, 1.0), 1.0),
            ControlPoint::new(Point2::new(0.0, 1.0), 1.0),
        ];
        let knots = Spline::clamped_uniform_knots(4, 1);
        Spline::new(ShapeId::from_raw(1), 1, cps, knots).unwrap()
    }

    #[test]
    fn endpoints_interpolate_control_points() {
        let s = unit_square_cubic();
        let p0 = s.point_at(0.0).unwrap();
        let p1 = s.point_at(1.0).unwrap();
        assert!((p0 - Point2::new(0.0, 0.0)).norm() < 1e-9);
        assert!((p1 - Point2::new(0.0, 1.0)).norm() < 1e-9);
    }

    #[test]
    fn degree_1_is_piecewise_linear() {
        let s = unit_square_cubic();
        let mid = s.point_at(1.0 / 6.0).unwrap();
        // First third of the parameter domain traverses (0,0)->(1,0).
        assert!(mid.y.abs() < 1e-6);
    }

    #[test]
    fn invalid_knot_count_rejected() {
        let cps = vec![ControlPoint::new(Point2::origin(), 1.0); 4];
        let r = Spline::new(ShapeId::from_raw(1), 1, cps, vec![0.0, 0.0, 1.0, 1.0]);
        assert!(r.is_err());
    }

    #[test]
    fn insert_knot_preserves_endpoints() {
        let s = unit_square_cubic();
        let refined = s.insert_knot(0.2);
        assert_eq!(refined.control_points.len(), s.control_points.len() + 1);
        let p0 = refined.point_at(0.0).unwrap();
        let p1 = refined.point_at(1.0).unwrap();
        assert!((p0 - Point2::new(0.0, 0.0)).norm() < 1e-9);
        assert!((p1 - Point2::new(0.0, 1.0)).norm() < 1e-9);
    }

    #[test]
    fn tangent_is_unit_length() {
        let s = unit_square_cubic();
        let t = s.tangent_at(0.5).unwrap();
        assert!((t.norm() - 1.0).abs() < 1e-6);
    }
}
