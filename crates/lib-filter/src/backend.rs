//! Numeric collaborators consumed by the solvers.
//!
//! The solvers only see these traits. [`Numeric`] is the built-in
//! implementation backed by [`crate::butterworth`], [`crate::fir`] and
//! [`crate::freqz`].

use crate::butterworth::butter;
use crate::error::DesignResult;
use crate::fft::FftEngine;
use crate::fir::firwin;
use crate::freqz::{freqs, freqz};
use crate::window::WindowType;
use lib_types::{FilterKind, FrequencyResponse, Hertz, TransferFunction};

/// Butterworth `(b, a)` synthesis.
pub trait ButterworthSynthesizer {
    /// `cutoff` is rad/s when `analog`, otherwise normalized to Nyquist.
    fn butterworth(
        &self,
        order: usize,
        cutoff: f64,
        kind: FilterKind,
        analog: bool,
    ) -> DesignResult<TransferFunction>;
}

/// Windowed FIR tap synthesis.
pub trait FirSynthesizer {
    fn fir(
        &self,
        taps: usize,
        cutoff: Hertz,
        sample_rate: Hertz,
        window: WindowType,
        kind: FilterKind,
    ) -> DesignResult<Vec<f64>>;
}

/// Discretized frequency-response evaluation.
pub trait ResponseEvaluator {
    /// `points` samples of a digital response on `[0, π)` rad/sample.
    fn digital_response(
        &self,
        b: &[f64],
        a: &[f64],
        points: usize,
        sample_rate: Hertz,
    ) -> DesignResult<FrequencyResponse>;

    /// Analog response at each `omega` in rad/s.
    fn analog_response(&self, b: &[f64], a: &[f64], omega: &[f64])
        -> DesignResult<FrequencyResponse>;
}

/// Built-in numeric backend.
///
/// Holds the FFT planner cache, so reuse one instance across a search.
#[derive(Default)]
pub struct Numeric {
    fft: FftEngine,
}

impl Numeric {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ButterworthSynthesizer for Numeric {
    fn butterworth(
        &self,
        order: usize,
        cutoff: f64,
        kind: FilterKind,
        analog: bool,
    ) -> DesignResult<TransferFunction> {
        butter(order, cutoff, kind, analog)
    }
}

impl FirSynthesizer for Numeric {
    fn fir(
        &self,
        taps: usize,
        cutoff: Hertz,
        sample_rate: Hertz,
        window: WindowType,
        kind: FilterKind,
    ) -> DesignResult<Vec<f64>> {
        firwin(taps, cutoff, sample_rate, window, kind)
    }
}

impl ResponseEvaluator for Numeric {
    fn digital_response(
        &self,
        b: &[f64],
        a: &[f64],
        points: usize,
        sample_rate: Hertz,
    ) -> DesignResult<FrequencyResponse> {
        freqz(&self.fft, b, a, points, sample_rate)
    }

    fn analog_response(
        &self,
        b: &[f64],
        a: &[f64],
        omega: &[f64],
    ) -> DesignResult<FrequencyResponse> {
        freqs(b, a, omega)
    }
}

impl<T: ButterworthSynthesizer + ?Sized> ButterworthSynthesizer for &T {
    fn butterworth(
        &self,
        order: usize,
        cutoff: f64,
        kind: FilterKind,
        analog: bool,
    ) -> DesignResult<TransferFunction> {
        (**self).butterworth(order, cutoff, kind, analog)
    }
}

impl<T: FirSynthesizer + ?Sized> FirSynthesizer for &T {
    fn fir(
        &self,
        taps: usize,
        cutoff: Hertz,
        sample_rate: Hertz,
        window: WindowType,
        kind: FilterKind,
    ) -> DesignResult<Vec<f64>> {
        (**self).fir(taps, cutoff, sample_rate, window, kind)
    }
}

impl<T: ResponseEvaluator + ?Sized> ResponseEvaluator for &T {
    fn digital_response(
        &self,
        b: &[f64],
        a: &[f64],
        points: usize,
        sample_rate: Hertz,
    ) -> DesignResult<FrequencyResponse> {
        (**self).digital_response(b, a, points, sample_rate)
    }

    fn analog_response(
        &self,
        b: &[f64],
        a: &[f64],
        omega: &[f64],
    ) -> DesignResult<FrequencyResponse> {
        (**self).analog_response(b, a, omega)
    }
}
