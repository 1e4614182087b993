//! Transfer window planning for bodies of the Kerbol system.
//!
//! The physics and solvers live in the workspace crates; this crate stitches
//! them together so front-ends (the CLI today) depend on a single library.

pub use ksp_catalog as catalog;
pub use ksp_config as config;
pub use ksp_core as core;
pub use ksp_export as export;
pub use ksp_impulsive as impulsive;
pub use ksp_orbits as orbits;
pub use ksp_transfer as transfer;

pub mod planner;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
