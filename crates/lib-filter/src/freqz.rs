//! Frequency-response evaluation of rational transfer functions.
//!
//! - [`freqz`]: digital `B(z)/A(z)` sampled at `n` points on `[0, π)`
//! - [`freqs`]: analog `B(s)/A(s)` evaluated at `s = jω`

use crate::error::{DesignError, DesignResult};
use crate::fft::FftEngine;
use lib_types::{Complex64, FrequencyResponse, Hertz, ResponseDomain};
use std::f64::consts::PI;

/// Sample `B(e^{jω}) / A(e^{jω})` at `ω_k = πk/points`, `k = 0..points`.
///
/// Each polynomial is transformed with a real FFT of length `2·points`, so the
/// cost is independent of how the coefficient count compares to the grid.
pub fn freqz(
    engine: &FftEngine,
    b: &[f64],
    a: &[f64],
    points: usize,
    sample_rate: Hertz,
) -> DesignResult<FrequencyResponse> {
    if points < 2 {
        return Err(DesignError::invalid(
            "grid_points",
            format!("need at least 2 frequency points, got {}", points),
        ));
    }
    if b.is_empty() || a.is_empty() {
        return Err(DesignError::invalid(
            "coefficients",
            "numerator and denominator must be non-empty",
        ));
    }

    let len = 2 * points;
    let mut values = engine.rfft_len(b, len)?;
    values.truncate(points);

    // FIR fast path: denominator is the constant 1
    if !(a.len() == 1 && a[0] == 1.0) {
        let den = engine.rfft_len(a, len)?;
        for (h, d) in values.iter_mut().zip(den.iter()) {
            *h /= *d;
        }
    }

    if let Some(k) = values.iter().position(|h| !h.re.is_finite() || !h.im.is_finite()) {
        return Err(DesignError::NumericalInstability(format!(
            "non-finite response at bin {} of {}",
            k, points
        )));
    }

    let omega = (0..points).map(|k| PI * k as f64 / points as f64).collect();
    Ok(FrequencyResponse::new(omega, values, ResponseDomain::Digital { sample_rate }))
}

/// Evaluate a descending-power polynomial at `x` by Horner's rule.
#[inline]
fn polyval(coeffs: &[f64], x: Complex64) -> Complex64 {
    coeffs
        .iter()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * x + c)
}

/// Evaluate the analog response `B(jω) / A(jω)` at each `ω` in rad/s.
pub fn freqs(b: &[f64], a: &[f64], omega: &[f64]) -> DesignResult<FrequencyResponse> {
    if b.is_empty() || a.is_empty() {
        return Err(DesignError::invalid(
            "coefficients",
            "numerator and denominator must be non-empty",
        ));
    }

    let mut values = Vec::with_capacity(omega.len());
    for &w in omega {
        let s = Complex64::new(0.0, w);
        let h = polyval(b, s) / polyval(a, s);
        if !h.re.is_finite() || !h.im.is_finite() {
            return Err(DesignError::NumericalInstability(format!(
                "non-finite analog response at {} rad/s",
                w
            )));
        }
        values.push(h);
    }

    Ok(FrequencyResponse::new(omega.to_vec(), values, ResponseDomain::Analog))
}
