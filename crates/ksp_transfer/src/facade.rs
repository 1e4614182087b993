//! Re-exported APIs for consumers of the transfer crate.

pub use crate::window::{
    Opportunity, TransferError, WindowSettings, approximate_opportunity, compute_opportunity,
    refine_opportunity, upcoming_windows,
};
pub use ksp_impulsive::HohmannResult;

use ksp_core::angle::normalize_angle;
use ksp_core::time::KerbinTime;
use ksp_core::units::rad_to_deg;
use ksp_export::report::{ReportRecord, WindowRecord};
use ksp_orbits::{Body, OrbitError};

pub mod settings {
    use ksp_config::{AnomalyConfig, SolverConfig};
    use ksp_orbits::AnomalyMethod;

    use crate::window::WindowSettings;

    /// Convert the solver section of the configuration into runtime settings.
    pub fn from_config(config: &SolverConfig) -> WindowSettings {
        WindowSettings {
            tolerance_deg: config.tolerance_deg,
            max_iterations: config.max_iterations,
            anomaly: anomaly_method(config.anomaly),
        }
    }

    pub fn anomaly_method(config: AnomalyConfig) -> AnomalyMethod {
        match config {
            AnomalyConfig::Series => AnomalyMethod::Series,
            AnomalyConfig::Iterative => AnomalyMethod::Iterative,
        }
    }
}

/// Everything the front-end shows for one origin/destination pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReport {
    pub origin: String,
    pub destination: String,
    pub reference_time_s: f64,
    pub synodic_period_s: f64,
    /// Phase of the destination ahead of the origin at the reference time, in `[0, 2π)`.
    pub current_phase_rad: f64,
    /// Phase required at departure, in `[0, 2π)`.
    pub desired_phase_rad: f64,
    pub hohmann: HohmannResult,
    pub windows: Vec<Opportunity>,
}

/// Compute the transfer summary and the next `window_count` opportunities.
pub fn plan_transfer(
    origin: &Body,
    destination: &Body,
    reference_time_s: f64,
    window_count: usize,
    settings: &WindowSettings,
) -> Result<TransferReport, TransferError> {
    let windows = upcoming_windows(origin, destination, reference_time_s, window_count, settings)?;
    let hohmann = ksp_impulsive::hohmann(
        origin.semi_major_axis_km(),
        destination.semi_major_axis_km(),
        origin.parent_mu(),
    )
    .map_err(OrbitError::from)?;

    Ok(TransferReport {
        origin: origin.name().to_string(),
        destination: destination.name().to_string(),
        reference_time_s,
        synodic_period_s: origin.synodic_period(destination)?,
        current_phase_rad: normalize_angle(origin.phase_angle_with(destination, reference_time_s)),
        desired_phase_rad: normalize_angle(origin.phase_angle_for_transfer_to(destination)?),
        hohmann,
        windows,
    })
}

impl TransferReport {
    /// First opportunity, if any were requested.
    pub fn next_window(&self) -> Option<&Opportunity> {
        self.windows.first()
    }

    /// Flatten into the serializable export record.
    pub fn to_export(&self) -> ReportRecord {
        ReportRecord {
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            reference_time_s: self.reference_time_s,
            reference_kerbin: KerbinTime::from_seconds(self.reference_time_s).to_string(),
            synodic_period_s: self.synodic_period_s,
            current_phase_deg: rad_to_deg(self.current_phase_rad),
            desired_phase_deg: rad_to_deg(self.desired_phase_rad),
            transfer_time_s: self.hohmann.tof_seconds,
            hohmann_dv1_km_s: self.hohmann.dv1_km_s,
            hohmann_dv2_km_s: self.hohmann.dv2_km_s,
            hohmann_dv_total_km_s: self.hohmann.dv_total_km_s,
            windows: self
                .windows
                .iter()
                .enumerate()
                .map(|(index, window)| WindowRecord {
                    index,
                    departure_s: window.time_s,
                    departure_kerbin: KerbinTime::from_seconds(window.time_s).to_string(),
                    wait_s: window.time_s - self.reference_time_s,
                    circular_estimate_s: window.circular_estimate_s,
                    converged: window.converged,
                    iterations: window.iterations,
                    final_error_deg: rad_to_deg(window.final_error_rad),
                })
                .collect(),
        }
    }
}
