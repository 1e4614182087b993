//! Body model and derived orbital quantities.

use std::f64::consts::PI;
use std::fmt;

use ksp_core::angle::normalize_angle;
use ksp_core::constants::TAU;
use ksp_impulsive::{TransferTimeError, hohmann_transfer_time};
use thiserror::Error;

use crate::anomaly::{self, AnomalyMethod, KeplerError};

/// Physically invalid bodies or operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OrbitError {
    #[error("semi-major axis must be positive and finite (got {0} km)")]
    InvalidSemiMajorAxis(f64),
    #[error("sidereal period must be positive and finite (got {0} s)")]
    InvalidPeriod(f64),
    #[error("eccentricity {0} is outside [0, 1); open orbits are not supported")]
    InvalidEccentricity(f64),
    #[error("{field} must be finite (got {value})")]
    NonFiniteAngle { field: &'static str, value: f64 },
    #[error("{origin} and {destination} share the same period ({period_s} s); synodic period is undefined")]
    EqualPeriods {
        origin: String,
        destination: String,
        period_s: f64,
    },
    #[error(transparent)]
    TransferTime(#[from] TransferTimeError),
    #[error(transparent)]
    Kepler(#[from] KeplerError),
}

/// Orbital elements in internal units: kilometres, seconds, radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    pub semi_major_axis_km: f64,
    pub sidereal_period_s: f64,
    /// Mean anomaly at time 0.
    pub mean_anomaly_epoch: f64,
    pub eccentricity: f64,
    pub ascending_node_longitude: f64,
    pub argument_of_periapsis: f64,
}

/// A celestial body on a fixed Keplerian orbit around its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    name: String,
    code: u32,
    parent_code: u32,
    elements: OrbitalElements,
    /// Gravitational parameter of the parent, from Kepler's third law (km^3/s^2).
    parent_mu: f64,
}

impl Body {
    /// Validate the elements and derive the parent's gravitational parameter.
    pub fn new(
        name: impl Into<String>,
        code: u32,
        parent_code: u32,
        elements: OrbitalElements,
    ) -> Result<Self, OrbitError> {
        let a = elements.semi_major_axis_km;
        let period = elements.sidereal_period_s;
        if !(a.is_finite() && a > 0.0) {
            return Err(OrbitError::InvalidSemiMajorAxis(a));
        }
        if !(period.is_finite() && period > 0.0) {
            return Err(OrbitError::InvalidPeriod(period));
        }
        if !(0.0..1.0).contains(&elements.eccentricity) {
            return Err(OrbitError::InvalidEccentricity(elements.eccentricity));
        }
        for (field, value) in [
            ("mean anomaly", elements.mean_anomaly_epoch),
            ("ascending node longitude", elements.ascending_node_longitude),
            ("argument of periapsis", elements.argument_of_periapsis),
        ] {
            if !value.is_finite() {
                return Err(OrbitError::NonFiniteAngle { field, value });
            }
        }

        let parent_mu = 4.0 * PI * PI * a.powi(3) / (period * period);
        let elements = OrbitalElements {
            mean_anomaly_epoch: normalize_angle(elements.mean_anomaly_epoch),
            ..elements
        };

        Ok(Self {
            name: name.into(),
            code,
            parent_code,
            elements,
            parent_mu,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn parent_code(&self) -> u32 {
        self.parent_code
    }

    pub fn elements(&self) -> &OrbitalElements {
        &self.elements
    }

    pub fn semi_major_axis_km(&self) -> f64 {
        self.elements.semi_major_axis_km
    }

    pub fn period_s(&self) -> f64 {
        self.elements.sidereal_period_s
    }

    pub fn eccentricity(&self) -> f64 {
        self.elements.eccentricity
    }

    pub fn parent_mu(&self) -> f64 {
        self.parent_mu
    }

    /// True when both bodies orbit the same parent.
    pub fn shares_parent_with(&self, other: &Body) -> bool {
        self.parent_code == other.parent_code
    }

    /// Mean anomaly at time `t` (seconds, may be negative), in `[0, 2π)`.
    pub fn mean_anomaly(&self, t: f64) -> f64 {
        normalize_angle(self.elements.mean_anomaly_epoch + t * (TAU / self.elements.sidereal_period_s))
    }

    /// True anomaly at time `t` using the series approximation.
    pub fn true_anomaly(&self, t: f64) -> f64 {
        anomaly::series_true_anomaly(self.mean_anomaly(t), self.elements.eccentricity)
    }

    /// True anomaly at time `t` using the requested strategy.
    pub fn true_anomaly_with(&self, t: f64, method: AnomalyMethod) -> Result<f64, OrbitError> {
        match method {
            AnomalyMethod::Series => Ok(self.true_anomaly(t)),
            AnomalyMethod::Iterative => {
                let ea = self.eccentric_anomaly(t)?;
                Ok(anomaly::true_from_eccentric(ea, self.elements.eccentricity))
            }
        }
    }

    /// Eccentric anomaly at time `t`, from an exact Kepler solve.
    pub fn eccentric_anomaly(&self, t: f64) -> Result<f64, OrbitError> {
        Ok(anomaly::solve_kepler(
            self.mean_anomaly(t),
            self.elements.eccentricity,
        )?)
    }

    /// Orbital radius (km) at true anomaly `nu`.
    pub fn radius_at(&self, nu: f64) -> f64 {
        let e = self.elements.eccentricity;
        self.elements.semi_major_axis_km * (1.0 - e * e) / (1.0 + e * nu.cos())
    }

    /// Absolute phase at `t`: mean anomaly plus node and periapsis angles.
    ///
    /// Mean anomaly stands in for true anomaly here, so phases are exact only
    /// for circular orbits. All phase-angle bookkeeping uses this convention.
    pub fn total_phase(&self, t: f64) -> f64 {
        self.mean_anomaly(t)
            + self.elements.ascending_node_longitude
            + self.elements.argument_of_periapsis
    }

    /// Hohmann time of flight from this body's orbit to `other`'s (circular radii).
    pub fn transfer_time_to(&self, other: &Body) -> Result<f64, OrbitError> {
        Ok(hohmann_transfer_time(
            self.elements.semi_major_axis_km,
            other.elements.semi_major_axis_km,
            self.parent_mu,
        )?)
    }

    /// Phase angle at departure that puts `other` at the transfer apoapsis on arrival.
    ///
    /// Not normalized.
    pub fn phase_angle_for_transfer_to(&self, other: &Body) -> Result<f64, OrbitError> {
        let transfer = self.transfer_time_to(other)?;
        Ok(PI - TAU * transfer / other.elements.sidereal_period_s)
    }

    /// Signed phase of `other` relative to this body at `t`. Not normalized.
    pub fn phase_angle_with(&self, other: &Body, t: f64) -> f64 {
        other.total_phase(t) - self.total_phase(t)
    }

    /// Time between successive identical alignments with `other`.
    ///
    /// Positive when `other` has the shorter period, i.e. the phase angle grows over time.
    pub fn synodic_period(&self, other: &Body) -> Result<f64, OrbitError> {
        let rate = 1.0 / other.elements.sidereal_period_s - 1.0 / self.elements.sidereal_period_s;
        let synodic = 1.0 / rate;
        if rate == 0.0 || !synodic.is_finite() {
            return Err(OrbitError::EqualPeriods {
                origin: self.name.clone(),
                destination: other.name.clone(),
                period_s: self.elements.sidereal_period_s,
            });
        }
        Ok(synodic)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let el = &self.elements;
        writeln!(f, "{} ({})", self.name, self.code)?;
        writeln!(
            f,
            "SMA = {:.0} km; Period = {:.0} s; Ecc = {:.6}",
            el.semi_major_axis_km, el.sidereal_period_s, el.eccentricity
        )?;
        write!(
            f,
            "M = {:.0} deg; Asc Node = {:.0} deg; Arg Periapsis = {:.0} deg",
            el.mean_anomaly_epoch.to_degrees(),
            el.ascending_node_longitude.to_degrees(),
            el.argument_of_periapsis.to_degrees()
        )
    }
}
