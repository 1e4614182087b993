//! Impulsive transfer utilities: Hohmann transfer time and delta-v in the coplanar, circular limit.

pub mod transfers;

pub use transfers::{HohmannResult, TransferTimeError, hohmann, hohmann_transfer_time};
