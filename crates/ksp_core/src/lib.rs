//! Core units, constants, and shared primitives for the KSP transfer window workspace.

pub mod angle;
pub mod time;

/// Physical and calendar constants. Distances are kilometres, times are seconds.
pub mod constants {
    /// Full turn in radians.
    pub const TAU: f64 = std::f64::consts::TAU;
    /// Seconds per Kerbin minute.
    pub const SECONDS_PER_MINUTE: f64 = 60.0;
    /// Seconds per Kerbin hour.
    pub const SECONDS_PER_HOUR: f64 = 60.0 * SECONDS_PER_MINUTE;
    /// Seconds per Kerbin day (six hours).
    pub const SECONDS_PER_DAY: f64 = 6.0 * SECONDS_PER_HOUR;
    /// Seconds per Kerbin year (426 days).
    pub const SECONDS_PER_YEAR: f64 = 426.0 * SECONDS_PER_DAY;
}

/// Unit conversions for catalog input and report output.
pub mod units {
    /// Convert metres to kilometres.
    #[inline]
    pub fn m_to_km(v: f64) -> f64 {
        v / 1_000.0
    }

    /// Convert degrees to radians.
    #[inline]
    pub fn deg_to_rad(v: f64) -> f64 {
        v.to_radians()
    }

    /// Convert radians to degrees.
    #[inline]
    pub fn rad_to_deg(v: f64) -> f64 {
        v.to_degrees()
    }
}
