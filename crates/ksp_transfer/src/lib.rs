//! Transfer façade crate: window solver plus the report built around it.

pub mod window;

pub use facade::*;
pub use ksp_impulsive as impulsive;

mod facade;
