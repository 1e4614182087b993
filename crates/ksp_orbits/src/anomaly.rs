//! Mean → true anomaly conversion strategies.

use std::f64::consts::PI;

use ksp_core::angle::normalize_angle;
use thiserror::Error;
use tracing::trace;

const KEPLER_TOLERANCE: f64 = 1e-12;
const KEPLER_MAX_ITERATIONS: usize = 100;

/// How the true anomaly is derived from the mean anomaly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AnomalyMethod {
    /// Closed-form series through third order in eccentricity. Fast, accurate for
    /// near-circular orbits (sub-degree error up to e ≈ 0.2, about a degree at e ≈ 0.5).
    #[default]
    Series,
    /// Solve Kepler's equation numerically, then convert the eccentric anomaly.
    Iterative,
}

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum KeplerError {
    #[error("eccentricity {0} is outside [0, 1)")]
    InvalidEccentricity(f64),
    #[error("mean anomaly {0} is not finite")]
    NonFiniteAnomaly(f64),
    #[error("Kepler solver did not converge for M = {mean_anomaly} rad, e = {eccentricity}")]
    NoConvergence {
        mean_anomaly: f64,
        eccentricity: f64,
    },
}

/// Series expansion of the true anomaly, normalized into `[0, 2π)`.
///
/// `ν ≈ M + (2e − e³/4) sin M + (5e²/4 − 11e⁴/24) sin 2M + (13/12) e³ sin 3M`
pub fn series_true_anomaly(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let m = mean_anomaly;
    let e = eccentricity;
    let e2 = e * e;
    let e3 = e2 * e;
    let e4 = e3 * e;
    let nu = m
        + (2.0 * e - 0.25 * e3) * m.sin()
        + (1.25 * e2 - (11.0 / 24.0) * e4) * (2.0 * m).sin()
        + (13.0 / 12.0) * e3 * (3.0 * m).sin();
    normalize_angle(nu)
}

/// Solve `E − e·sin E = M` for the eccentric anomaly.
///
/// Newton–Raphson inside the bracket `[M − e, M + e]`; steps that leave the bracket
/// fall back to bisection, so the iteration cannot diverge for `e < 1`.
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> Result<f64, KeplerError> {
    if !(0.0..1.0).contains(&eccentricity) {
        return Err(KeplerError::InvalidEccentricity(eccentricity));
    }
    if !mean_anomaly.is_finite() {
        return Err(KeplerError::NonFiniteAnomaly(mean_anomaly));
    }

    let m = normalize_angle(mean_anomaly);
    let e = eccentricity;
    if e == 0.0 {
        return Ok(m);
    }

    let (mut lo, mut hi) = (m - e, m + e);
    let mut ea = if e < 0.8 { m } else { PI.clamp(lo, hi) };

    for iteration in 0..KEPLER_MAX_ITERATIONS {
        let residual = ea - e * ea.sin() - m;
        if residual.abs() < KEPLER_TOLERANCE || hi - lo < f64::EPSILON {
            return Ok(ea);
        }
        if residual > 0.0 {
            hi = ea;
        } else {
            lo = ea;
        }

        let next = ea - residual / (1.0 - e * ea.cos());
        ea = if next <= lo || next >= hi {
            trace!(iteration, "kepler: newton step left bracket, bisecting");
            0.5 * (lo + hi)
        } else {
            next
        };
    }

    Err(KeplerError::NoConvergence {
        mean_anomaly: m,
        eccentricity: e,
    })
}

/// Convert an eccentric anomaly into the true anomaly, normalized into `[0, 2π)`.
pub fn true_from_eccentric(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let half = 0.5 * eccentric_anomaly;
    let nu = 2.0
        * ((1.0 + eccentricity).sqrt() * half.sin())
            .atan2((1.0 - eccentricity).sqrt() * half.cos());
    normalize_angle(nu)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_orbits_have_no_correction() {
        for m in [0.0, 0.3, 3.14, 6.0] {
            assert_eq!(series_true_anomaly(m, 0.0), m);
            assert_eq!(solve_kepler(m, 0.0).unwrap(), m);
        }
    }

    #[test]
    fn kepler_residual_is_tiny() {
        for &(m, e) in &[(1.5, 0.2056), (0.1, 0.55), (5.9, 0.9), (3.14, 0.99)] {
            let ea = solve_kepler(m, e).unwrap();
            let residual = ea - e * ea.sin() - m;
            assert!(residual.abs() < 1e-10, "M={m} e={e} residual={residual}");
        }
    }

    #[test]
    fn series_tracks_exact_solution_for_low_eccentricity() {
        let e = 0.1;
        for step in 0..36 {
            let m = f64::from(step) * 10.0_f64.to_radians();
            let exact = true_from_eccentric(solve_kepler(m, e).unwrap(), e);
            let approx = series_true_anomaly(m, e);
            let err = ksp_core::angle::signed_angle(approx - exact).abs();
            assert!(err < 0.1_f64.to_radians(), "M={m} err={err}");
        }
    }

    #[test]
    fn rejects_open_orbits() {
        assert_eq!(
            solve_kepler(1.0, 1.0),
            Err(KeplerError::InvalidEccentricity(1.0))
        );
        assert!(matches!(
            solve_kepler(f64::NAN, 0.1),
            Err(KeplerError::NonFiniteAnomaly(_))
        ));
    }
}
