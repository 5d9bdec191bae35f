//! # lib-types
//!
//! Core type definitions for target-frequency filter design.
//!
//! This crate provides foundational types used throughout the workspace:
//! - Physical units with compile-time safety
//! - Design requests (`FilterSpec`) and resolved designs (`ResolvedDesign`)
//! - Frequency-response samples on their native angular axis
//! - Coefficient containers for analog, IIR and FIR filters

pub mod coefficients;
pub mod error;
pub mod filter;
pub mod response;
pub mod units;

pub use coefficients::*;
pub use error::TypeError;
pub use filter::*;
pub use response::*;
pub use units::*;

/// Re-export num_complex for convenience
pub use num_complex::Complex64;
