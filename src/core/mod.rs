//! Core types and constants for the speedometer

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
