//! Angle reduction helpers. All angles are radians.

use crate::constants::TAU;

/// Reduce `angle` into `[0, 2π)`.
///
/// Already-normalized input is returned unchanged. Non-finite input is passed
/// through as `NaN`.
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let reduced = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if reduced >= TAU { 0.0 } else { reduced }
}

/// Reduce `angle` into `(-π, π]`, keeping the sign of the shortest rotation.
#[inline]
pub fn signed_angle(angle: f64) -> f64 {
    let normalized = normalize_angle(angle);
    if normalized > std::f64::consts::PI {
        normalized - TAU
    } else {
        normalized
    }
}
