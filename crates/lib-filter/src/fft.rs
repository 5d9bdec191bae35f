//! Real-input FFT used to sample polynomial frequency responses.
//!
//! This module wraps realfft with:
//! - Planner caching for the repeated transforms of a cutoff search
//! - Time-aliasing of sequences longer than the transform, so any
//!   coefficient length can be sampled on any grid

use crate::error::{DesignError, DesignResult};
use num_complex::Complex64;
use realfft::{RealFftPlanner, RealToComplex};
use std::sync::{Arc, Mutex};

/// FFT engine with a cached real-to-complex planner.
///
/// Plans are shared behind a mutex so the engine can be used from the
/// worker threads of a parallel search; the transform itself runs unlocked.
pub struct FftEngine {
    planner: Mutex<RealFftPlanner<f64>>,
}

impl FftEngine {
    /// Create a new FFT engine.
    pub fn new() -> Self {
        Self {
            planner: Mutex::new(RealFftPlanner::new()),
        }
    }

    /// Get a cached forward plan for length `len`.
    pub fn plan(&self, len: usize) -> DesignResult<Arc<dyn RealToComplex<f64>>> {
        let mut planner = self
            .planner
            .lock()
            .map_err(|_| {
                DesignError::NumericalInstability("FFT planner lock poisoned".to_string())
            })?;
        Ok(planner.plan_fft_forward(len))
    }

    /// Forward real FFT of `data` at length `len`, zero-padding or
    /// time-aliasing (`x[n mod len]` summed) as needed.
    ///
    /// Returns `len / 2 + 1` bins.
    pub fn rfft_len(&self, data: &[f64], len: usize) -> DesignResult<Vec<Complex64>> {
        if len == 0 {
            return Err(DesignError::invalid("fft_len", "must be positive"));
        }

        let r2c = self.plan(len)?;
        let mut input = r2c.make_input_vec();
        for (i, &x) in data.iter().enumerate() {
            input[i % len] += x;
        }
        let mut output = r2c.make_output_vec();

        r2c.process(&mut input, &mut output)
            .map_err(|e| DesignError::NumericalInstability(e.to_string()))?;

        Ok(output)
    }
}

impl Default for FftEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_rfft_matches_dtft() {
        let engine = FftEngine::new();
        let data = [0.25, 0.5, 0.25];
        let len = 16;

        let spectrum = engine.rfft_len(&data, len).unwrap();
        assert_eq!(spectrum.len(), len / 2 + 1);

        for (k, bin) in spectrum.iter().enumerate() {
            let w = 2.0 * PI * k as f64 / len as f64;
            // 0.25 + 0.5 e^{-jw} + 0.25 e^{-2jw} has magnitude 0.5 (1 + cos w)
            let expected = 0.5 * (1.0 + w.cos());
            assert!((bin.norm() - expected).abs() < 1e-12, "bin {}", k);
        }
    }

    #[test]
    fn test_time_aliasing_preserves_sampled_dtft() {
        let engine = FftEngine::new();
        let data: Vec<f64> = (0..13).map(|i| (i as f64 * 0.7).sin()).collect();
        let len = 8;

        let spectrum = engine.rfft_len(&data, len).unwrap();
        for (k, bin) in spectrum.iter().enumerate() {
            let w = 2.0 * PI * k as f64 / len as f64;
            let direct: Complex64 = data
                .iter()
                .enumerate()
                .map(|(n, &x)| Complex64::from_polar(x, -w * n as f64))
                .sum();
            assert!((*bin - direct).norm() < 1e-10, "bin {}", k);
        }
    }

    #[test]
    fn test_zero_length_rejected() {
        let engine = FftEngine::new();
        assert!(engine.rfft_len(&[1.0], 0).is_err());
    }
}
