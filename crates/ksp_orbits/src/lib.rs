//! Orbiting body model for coplanar two-body transfers.
//!
//! A [`Body`] is built once from catalog elements and never mutated; every
//! time-dependent quantity is a pure function of the requested time.

pub mod anomaly;
pub mod body;
pub mod record;

pub use anomaly::{AnomalyMethod, KeplerError, solve_kepler};
pub use body::{Body, OrbitError, OrbitalElements};
pub use record::{FieldSource, RecordError, headers};
