//! Analytic estimators for impulsive transfers in the coplanar, circular limit.
//!
//! Provides the Hohmann half-ellipse time of flight used by the window solver, and the
//! two-burn delta-v estimate for the same transfer, for two-body Keplerian motion with a
//! specified central GM.

use std::f64::consts::PI;

use thiserror::Error;

/// Invalid inputs to the transfer formulas.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum TransferTimeError {
    #[error("orbital radius must be positive and finite (got {0} km)")]
    InvalidRadius(f64),
    #[error("gravitational parameter must be positive and finite (got {0} km^3/s^2)")]
    InvalidMu(f64),
}

/// Result for a Hohmann transfer between circular, coplanar orbits of radii r1 and r2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HohmannResult {
    pub dv1_km_s: f64,      // signed: negative for inward (retro) burn
    pub dv2_km_s: f64,      // signed: negative for retro capture when arriving inward
    pub dv_total_km_s: f64, // |dv1| + |dv2|
    pub tof_seconds: f64,
}

fn check_inputs(r1_km: f64, r2_km: f64, mu_km3_s2: f64) -> Result<(), TransferTimeError> {
    for r in [r1_km, r2_km] {
        if !(r.is_finite() && r > 0.0) {
            return Err(TransferTimeError::InvalidRadius(r));
        }
    }
    if !(mu_km3_s2.is_finite() && mu_km3_s2 > 0.0) {
        return Err(TransferTimeError::InvalidMu(mu_km3_s2));
    }
    Ok(())
}

/// Half the period of the transfer ellipse with semi-major axis `(r1 + r2) / 2`.
///
/// Inputs:
/// - `r1_km`: departure radius (km)
/// - `r2_km`: arrival radius (km)
/// - `mu_km3_s2`: gravitational parameter of central body (km^3/s^2)
pub fn hohmann_transfer_time(
    r1_km: f64,
    r2_km: f64,
    mu_km3_s2: f64,
) -> Result<f64, TransferTimeError> {
    check_inputs(r1_km, r2_km, mu_km3_s2)?;
    let a_t = 0.5 * (r1_km + r2_km);
    Ok(PI * (a_t.powi(3) / mu_km3_s2).sqrt())
}

/// Compute the classical Hohmann transfer between two circular coplanar orbits.
pub fn hohmann(r1_km: f64, r2_km: f64, mu_km3_s2: f64) -> Result<HohmannResult, TransferTimeError> {
    let tof = hohmann_transfer_time(r1_km, r2_km, mu_km3_s2)?;

    let v1 = (mu_km3_s2 / r1_km).sqrt();
    let v2 = (mu_km3_s2 / r2_km).sqrt();
    let a_t = 0.5 * (r1_km + r2_km);

    // Transfer periapsis speed (at r1) and apoapsis speed (at r2)
    let v_t1 = (mu_km3_s2 * (2.0 / r1_km - 1.0 / a_t)).sqrt();
    let v_t2 = (mu_km3_s2 * (2.0 / r2_km - 1.0 / a_t)).sqrt();

    let dv1 = v_t1 - v1; // positive for outward, negative for inward
    let dv2 = v2 - v_t2; // positive for outward (prograde capture), negative for inward

    Ok(HohmannResult {
        dv1_km_s: dv1,
        dv2_km_s: dv2,
        dv_total_km_s: dv1.abs() + dv2.abs(),
        tof_seconds: tof,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MU_KERBOL: f64 = 1.172_332_8e9;

    #[test]
    fn equal_radii_degenerate_to_half_circular_period() {
        let r = 13_599_840.256;
        let t = hohmann_transfer_time(r, r, MU_KERBOL).unwrap();
        let expected = PI * (r.powi(3) / MU_KERBOL).sqrt();
        assert!((t - expected).abs() < 1e-6 * expected);
    }

    #[test]
    fn rejects_non_positive_inputs() {
        assert_eq!(
            hohmann_transfer_time(0.0, 1.0, MU_KERBOL),
            Err(TransferTimeError::InvalidRadius(0.0))
        );
        assert_eq!(
            hohmann_transfer_time(1.0, -2.0, MU_KERBOL),
            Err(TransferTimeError::InvalidRadius(-2.0))
        );
        assert_eq!(
            hohmann_transfer_time(1.0, 2.0, 0.0),
            Err(TransferTimeError::InvalidMu(0.0))
        );
        assert!(hohmann(1.0, f64::NAN, MU_KERBOL).is_err());
    }

    #[test]
    fn burns_flip_sign_for_inward_transfers() {
        let outward = hohmann(13_599_840.256, 20_726_155.264, MU_KERBOL).unwrap();
        let inward = hohmann(20_726_155.264, 13_599_840.256, MU_KERBOL).unwrap();
        assert!(outward.dv1_km_s > 0.0 && outward.dv2_km_s > 0.0);
        assert!(inward.dv1_km_s < 0.0 && inward.dv2_km_s < 0.0);
        assert!((outward.dv_total_km_s - inward.dv_total_km_s).abs() < 1e-9);
        assert!((outward.tof_seconds - inward.tof_seconds).abs() < 1e-6);
    }
}
