//! Transfer window solver: circular phase estimate, then refinement against true anomalies.
//!
//! Stage 1 treats both orbits as circular and waits for the Hohmann phase angle.
//! Stage 2 replaces the circular radii with the bodies' actual radii at departure and
//! arrival and nudges the departure time until the destination really is opposite the
//! departure point when the spacecraft gets there.

use std::f64::consts::PI;

use ksp_core::angle::{normalize_angle, signed_angle};
use ksp_core::constants::TAU;
use ksp_impulsive::hohmann_transfer_time;
use ksp_orbits::{AnomalyMethod, Body, OrbitError};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_TOLERANCE_DEG: f64 = 0.25;
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;
/// Synodic cycles skipped before giving up on a window past the requested floor.
const MAX_RESEEDS: u32 = 8;

/// Refinement tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSettings {
    /// Stop once the arrival error drops below this many degrees.
    pub tolerance_deg: f64,
    pub max_iterations: u32,
    pub anomaly: AnomalyMethod,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            tolerance_deg: DEFAULT_TOLERANCE_DEG,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            anomaly: AnomalyMethod::Series,
        }
    }
}

/// A departure time for a Hohmann transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Opportunity {
    /// Refined departure time (seconds since epoch).
    pub time_s: f64,
    /// Circular-orbit estimate the refinement started from.
    pub circular_estimate_s: f64,
    /// False when the iteration cap was hit before reaching tolerance.
    pub converged: bool,
    pub iterations: u32,
    /// Signed arrival error of the last pass, radians in `(-π, π]`.
    pub final_error_rad: f64,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransferError {
    #[error(
        "{origin} orbits body {origin_parent} but {destination} orbits body {destination_parent}; a transfer needs a common parent"
    )]
    ParentMismatch {
        origin: String,
        origin_parent: u32,
        destination: String,
        destination_parent: u32,
    },
    #[error("reference time must be finite (got {0})")]
    InvalidTime(f64),
    #[error("invalid solver settings: {0}")]
    InvalidSettings(String),
    #[error("no converging transfer window found after t = {after_s} s")]
    NoWindow { after_s: f64 },
    #[error(transparent)]
    Orbit(#[from] OrbitError),
}

fn check_pair(origin: &Body, destination: &Body) -> Result<(), TransferError> {
    if !origin.shares_parent_with(destination) {
        return Err(TransferError::ParentMismatch {
            origin: origin.name().to_string(),
            origin_parent: origin.parent_code(),
            destination: destination.name().to_string(),
            destination_parent: destination.parent_code(),
        });
    }
    Ok(())
}

fn check_time(t: f64) -> Result<(), TransferError> {
    if t.is_finite() {
        Ok(())
    } else {
        Err(TransferError::InvalidTime(t))
    }
}

fn check_settings(settings: &WindowSettings) -> Result<(), TransferError> {
    let tol = settings.tolerance_deg;
    if !(tol.is_finite() && tol > 0.0) {
        return Err(TransferError::InvalidSettings(format!(
            "tolerance must be positive, got {tol} deg"
        )));
    }
    if settings.max_iterations == 0 {
        return Err(TransferError::InvalidSettings(
            "at least one refinement pass is required".to_string(),
        ));
    }
    Ok(())
}

/// Stage 1: next time at or after `t` when the circular phase condition holds.
pub fn approximate_opportunity(
    origin: &Body,
    destination: &Body,
    t: f64,
) -> Result<f64, TransferError> {
    check_pair(origin, destination)?;
    check_time(t)?;
    let synodic = origin.synodic_period(destination)?;

    let current_angle = origin.phase_angle_with(destination, t);
    let desired_angle = origin.phase_angle_for_transfer_to(destination)?;
    let travel_angle = normalize_angle(desired_angle - current_angle);

    // signed angular rate of the relative phase, seconds per radian
    let synodic_rate = synodic / TAU;
    let wait = if synodic_rate > 0.0 {
        travel_angle * synodic_rate
    } else {
        (travel_angle - TAU) * synodic_rate
    };

    Ok(t + wait)
}

/// Stage 2: refine the Stage 1 estimate against the bodies' true positions.
///
/// The refined time may land slightly before `t` when the circular estimate is close
/// to `t`; [`compute_opportunity`] handles that case.
pub fn refine_opportunity(
    origin: &Body,
    destination: &Body,
    t: f64,
    settings: &WindowSettings,
) -> Result<Opportunity, TransferError> {
    check_settings(settings)?;
    let estimate = approximate_opportunity(origin, destination, t)?;
    refine_from(origin, destination, estimate, settings)
}

/// Stage 1 followed by Stage 2, never returning a time before `t`.
pub fn compute_opportunity(
    origin: &Body,
    destination: &Body,
    t: f64,
    settings: &WindowSettings,
) -> Result<Opportunity, TransferError> {
    check_settings(settings)?;
    let estimate = approximate_opportunity(origin, destination, t)?;
    let synodic = origin.synodic_period(destination)?.abs();
    refine_not_before(origin, destination, estimate, t, synodic, settings)
}

/// The next `count` distinct opportunities at or after `t`, in increasing time order.
///
/// Each window after the first is seeded one synodic period past the previous seed and
/// must land at least half a synodic period after the previous window, so two seeds
/// that refine onto the same opportunity are never both reported.
pub fn upcoming_windows(
    origin: &Body,
    destination: &Body,
    t: f64,
    count: usize,
    settings: &WindowSettings,
) -> Result<Vec<Opportunity>, TransferError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let first = compute_opportunity(origin, destination, t, settings)?;
    let synodic = origin.synodic_period(destination)?.abs();

    let mut windows = Vec::with_capacity(count);
    let mut previous = first;
    windows.push(first);
    while windows.len() < count {
        let next = refine_not_before(
            origin,
            destination,
            previous.circular_estimate_s + synodic,
            previous.time_s + 0.5 * synodic,
            synodic,
            settings,
        )?;
        windows.push(next);
        previous = next;
    }
    Ok(windows)
}

/// Refine from `seed`, hopping one synodic period at a time until the result is at or after `floor`.
fn refine_not_before(
    origin: &Body,
    destination: &Body,
    seed: f64,
    floor: f64,
    synodic: f64,
    settings: &WindowSettings,
) -> Result<Opportunity, TransferError> {
    let mut seed = seed;
    for _ in 0..MAX_RESEEDS {
        let opportunity = refine_from(origin, destination, seed, settings)?;
        if opportunity.time_s >= floor {
            return Ok(opportunity);
        }
        debug!(
            refined_s = opportunity.time_s,
            floor_s = floor,
            "refined window precedes the floor, moving to the next synodic cycle"
        );
        seed += synodic;
    }
    Err(TransferError::NoWindow { after_s: floor })
}

fn refine_from(
    origin: &Body,
    destination: &Body,
    circular_estimate: f64,
    settings: &WindowSettings,
) -> Result<Opportunity, TransferError> {
    let sign = origin.synodic_period(destination)?.signum();
    let step_period = origin.period_s().min(destination.period_s());
    let origin_el = origin.elements();
    let dest_el = destination.elements();
    // angle between the two orbits' periapsis directions, plus half a turn
    let frame_offset = origin_el.ascending_node_longitude + origin_el.argument_of_periapsis + PI
        - dest_el.ascending_node_longitude
        - dest_el.argument_of_periapsis;

    let mut estimate = circular_estimate;
    let mut diff = 0.0;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < settings.max_iterations {
        iterations += 1;

        let nu_origin = origin.true_anomaly_with(estimate, settings.anomaly)?;
        let r_origin = origin.radius_at(nu_origin);
        let nu_target = nu_origin + frame_offset;
        let r_target = destination.radius_at(nu_target);

        let transfer = hohmann_transfer_time(r_origin, r_target, origin.parent_mu())
            .map_err(OrbitError::from)?;
        let nu_arrival = destination.true_anomaly_with(estimate + transfer, settings.anomaly)?;

        // negative when the destination arrives ahead of the target point
        diff = signed_angle(nu_target - nu_arrival);
        estimate += sign * diff / TAU * step_period;

        debug!(
            iteration = iterations,
            estimate_s = estimate,
            error_deg = diff.to_degrees(),
            "refining transfer window"
        );

        if diff.to_degrees().abs() < settings.tolerance_deg {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(
            origin = origin.name(),
            destination = destination.name(),
            iterations,
            error_deg = diff.to_degrees(),
            "transfer window refinement hit the iteration cap"
        );
    }

    Ok(Opportunity {
        time_s: estimate,
        circular_estimate_s: circular_estimate,
        converged,
        iterations,
        final_error_rad: diff,
    })
}
