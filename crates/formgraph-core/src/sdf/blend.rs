//! Polynomial smooth-min/max blend kernels
//!
//! The quadratic kernel gives a rounded, continuous join between distances
//! instead of a sharp crease, parameterized by blend radius `k`.

use super::Sdf;
use super::evaluable::Evaluable;
use glam::Vec3;

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Smooth minimum of two distances with blend radius `k`.
///
/// Degrades to a plain `min` when `k` is not positive.
pub fn smooth_min(d1: f32, d2: f32, k: f32) -> f32 {
    if k <= 0.0 {
        return d1.min(d2);
    }
    let h = (0.5 + 0.5 * (d2 - d1) / k).clamp(0.0, 1.0);
    lerp(d2, d1, h) - k * h * (1.0 - h)
}

/// Smooth maximum: the sign-flipped smooth minimum
pub fn smooth_max(d1: f32, d2: f32, k: f32) -> f32 {
    -smooth_min(-d1, -d2, k)
}

/// Smooth-min fold over a group of evaluables.
///
/// Returns positive infinity for an empty group (nothing anywhere).
pub fn group_distance(evaluables: &[Evaluable], k: f32, p: Vec3) -> f32 {
    let mut acc = f32::INFINITY;
    for e in evaluables {
        let d = e.distance(p);
        acc = if acc.is_finite() {
            smooth_min(acc, d, k)
        } else {
            d
        };
    }
    acc
}

/// Inverse-distance-weighted color blend over a group of evaluables.
///
/// Weight is `1 / (d² + ε)`, so the color of the nearest surface dominates
/// and ties blend smoothly. Falls back to white for an empty group.
pub fn group_color(evaluables: &[Evaluable], p: Vec3) -> Vec3 {
    const EPSILON: f32 = 1e-4;

    let mut sum = Vec3::ZERO;
    let mut weight_sum = 0.0;
    for e in evaluables {
        let d = e.distance(p);
        let w = 1.0 / (d * d + EPSILON);
        sum += e.color * w;
        weight_sum += w;
    }
    if weight_sum > 0.0 {
        sum / weight_sum
    } else {
        Vec3::ONE
    }
}
