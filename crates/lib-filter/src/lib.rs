//! # lib-filter
//!
//! Cutoff resolution engine for target-frequency filter design.
//!
//! Instead of taking a cutoff, every design here takes a target frequency, the
//! band the target must land in, and the allowed magnitude deviation:
//!
//! - **AnalogCutoffSolver**: closed-form Butterworth inversion
//! - **DigitalSearchSolver**: candidate-cutoff search for windowed FIR taps,
//!   with closest-match and threshold-crossing selection
//! - **IirBridge**: analog cutoff to digital Butterworth coefficients
//!
//! The numeric primitives (Butterworth synthesis, windowed-sinc taps,
//! frequency-response evaluation) sit behind the traits in [`backend`], with
//! [`Numeric`] as the built-in implementation.

pub mod analog;
pub mod backend;
pub mod butterworth;
pub mod crossing;
pub mod error;
pub mod fft;
pub mod fir;
pub mod freqz;
pub mod iir;
pub mod sallen_key;
pub mod search;
pub mod window;

pub use analog::AnalogCutoffSolver;
pub use backend::{ButterworthSynthesizer, FirSynthesizer, Numeric, ResponseEvaluator};
pub use error::{DesignError, DesignResult};
pub use fft::FftEngine;
pub use iir::{IirBridge, IirDesign};
pub use sallen_key::SallenKeyComponents;
pub use search::{
    DegradedReason, DigitalSearchSolver, FirDesign, Quality, SearchConfig, SelectionStrategy,
};
pub use window::WindowType;
