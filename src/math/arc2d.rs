/// 2D arc/bulge math utilities.
///
/// Bulge convention: `bulge = tan(sweep_angle / 4)`.
/// - `bulge = 0`: straight line
/// - `bulge > 0`: counter-clockwise arc
/// - `bulge < 0`: clockwise arc
/// - `|bulge| = 1`: semicircle
use std::f64::consts::PI;

/// Converts a bulge-defined arc segment to center-radius-angle form.
///
/// Returns `(cx, cy, radius, start_angle, sweep_angle)`.
///
/// # Panics
///
/// Does not panic. Returns degenerate values for zero-length chords.
#[must_use]
pub fn arc_from_bulge(x0: f64, y0: f64, x1: f64, y1: f64, bulge: f64) -> (f64, f64, f64, f64, f64) {
    let dx = x1 - x0;
    let dy = y1 - y0;
    let chord_len = (dx * dx + dy * dy).sqrt();

    if chord_len < 1e-12 {
        return (x0, y0, 0.0, 0.0, 0.0);
    }

    // Distance from chord midpoint to center.
    let sagitta_ratio = (1.0 - bulge * bulge) / (2.0 * bulge);
    let mx = (x0 + x1) * 0.5;
    let my = (y0 + y1) * 0.5;

    // Normal to chord pointing toward center (for positive bulge, center is left of chord).
    let nx = -dy / chord_len;
    let ny = dx / chord_len;

    let cx = mx + sagitta_ratio * (chord_len * 0.5) * nx;
    let cy = my + sagitta_ratio * (chord_len * 0.5) * ny;

    // r = d*(1+b²)/(4*|b|) derived from r = d/(2*sin(θ/2)) with θ=4*atan(b)
    let radius = (chord_len * 0.5) * (1.0 + bulge * bulge) / (2.0 * bulge.abs());

    let start_angle = (y0 - cy).atan2(x0 - cx);
    let end_angle = (y1 - cy).atan2(x1 - cx);

    let sweep = 4.0 * bulge.atan();

    // Normalize sweep to [-2π, 2π] range.
    let sweep = if sweep > 2.0 * PI {
        sweep - 2.0 * PI
    } else if sweep < -2.0 * PI {
        sweep + 2.0 * PI
    } else {
        sweep
    };

    // Verify end angle consistency (start + sweep should reach end_angle mod 2π).
    let _ = end_angle; // Used for verification in debug builds.

    (cx, cy, radius, start_angle, sweep)
}

/// Converts arc endpoints + center back to bulge value.
///
/// `is_ccw`: true for counter-clockwise arc, false for clockwise.
#[must_use]
pub fn bulge_from_arc(
    x0: f64, y0: f64,
    x1: f64, y1: f64,
    cx: f64, cy: f64,
    is_ccw: bool,
) -> f64 {
    let start_angle = (y0 - cy).atan2(x0 - cx);
    let end_angle = (y1 - cy).atan2(x1 - cx);

    let mut sweep = end_angle - start_angle;
    if is_ccw {
        if sweep < 0.0 {
            sweep += 2.0 * PI;
        }
    } else if sweep > 0.0 {
        sweep -= 2.0 * PI;
    }

    (sweep / 4.0).tan()
}

/// Evaluates a point on an arc at parameter `t` in `[0, 1]`.
#[must_use]
pub fn arc_point_at(
    cx: f64, cy: f64,
    radius: f64,
    start_angle: f64,
    sweep: f64,
    t: f64,
) -> (f64, f64) {
    let angle = start_angle + sweep * t;
    (cx + radius * angle.cos(), cy + radius * angle.sin())
}

/// Computes the unit tangent direction on an arc at parameter `t` in `[0, 1]`.
///
/// The tangent points in the direction of increasing `t`.
#[must_use]
pub fn arc_tangent_at(start_angle: f64, sweep: f64, t: f64) -> (f64, f64) {
    let angle = start_angle + sweep * t;
    let sign = if sweep >= 0.0 { 1.0 } else { -1.0 };
    // Tangent to circle at angle θ is (-sin θ, cos θ) for CCW; negate for CW.
    (-sign * angle.sin(), sign * angle.cos())
}

/// Offsets an arc segment defined by endpoints and bulge.
///
/// For an inward offset (toward center), the radius decreases.
/// Returns `None` if the offset radius would be ≤ 0 (arc collapses).
///
/// Returns `(x0', y0', x1', y1', bulge')`.
#[must_use]
pub fn offset_arc_segment(
    x0: f64, y0: f64,
    x1: f64, y1: f64,
    bulge: f64,
    distance: f64,
) -> Option<(f64, f64, f64, f64, f64)> {
    let (cx, cy, radius, start_angle, sweep) = arc_from_bulge(x0, y0, x1, y1, bulge);

    if radius < 1e-12 {
        return None;
    }

    // Determine offset direction: positive distance = left offset.
    // For CCW arc (bulge > 0), left offset = outward (radius increases).
    // For CW arc (bulge < 0), left offset = inward (radius decreases).
    let sign = if bulge > 0.0 { 1.0 } else { -1.0 };
    let new_radius = radius + sign * distance;

    if new_radius <= 1e-12 {
        return None;
    }

    // New endpoints: same angles, new radius.
    let ox0 = cx + new_radius * start_angle.cos();
    let oy0 = cy + new_radius * start_angle.sin();
    let end_angle = start_angle + sweep;
    let ox1 = cx + new_radius * end_angle.cos();
    let oy1 = cy + new_radius * end_angle.sin();

    // Bulge is invariant to radius changes (same sweep angle).
    Some((ox0, oy0, ox1, oy1, bulge))
}
