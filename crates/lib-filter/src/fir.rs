//! Windowed-sinc FIR synthesis.
//!
//! Linear-phase taps from a truncated ideal response shaped by one of the
//! windows in [`crate::window`]. Taps are scaled to unity gain at DC for
//! lowpass designs and at Nyquist for highpass designs.

use crate::error::{DesignError, DesignResult};
use crate::window::{generate_window, WindowType};
use lib_types::{FilterKind, Hertz};
use std::f64::consts::PI;

/// Normalized sinc, `sin(πx) / (πx)`.
#[inline]
fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// Design `taps` FIR coefficients with the given cutoff.
///
/// # Errors
///
/// - `taps == 0`
/// - `cutoff` outside `(0, fs/2)`
/// - even `taps` for a highpass design, which would force a zero at Nyquist
pub fn firwin(
    taps: usize,
    cutoff: Hertz,
    sample_rate: Hertz,
    window: WindowType,
    kind: FilterKind,
) -> DesignResult<Vec<f64>> {
    if taps == 0 {
        return Err(DesignError::invalid("taps", "must be at least 1"));
    }
    if !sample_rate.is_finite() || sample_rate.0 <= 0.0 {
        return Err(DesignError::invalid(
            "sample_rate",
            format!("must be positive, got {}", sample_rate.0),
        ));
    }

    let nyquist = sample_rate.nyquist();
    if !cutoff.is_finite() || cutoff.0 <= 0.0 || cutoff >= nyquist {
        return Err(DesignError::invalid(
            "cutoff",
            format!("{} Hz must lie in (0, {}) Hz", cutoff.0, nyquist.0),
        ));
    }
    if kind == FilterKind::Highpass && taps % 2 == 0 {
        return Err(DesignError::invalid(
            "taps",
            format!("highpass FIR needs an odd tap count, got {}", taps),
        ));
    }

    let c = cutoff / nyquist;
    let alpha = (taps - 1) as f64 / 2.0;
    let win = generate_window(window, taps);

    let mut h: Vec<f64> = (0..taps)
        .map(|n| {
            let m = n as f64 - alpha;
            let ideal = match kind {
                FilterKind::Lowpass => c * sinc(c * m),
                FilterKind::Highpass => sinc(m) - c * sinc(c * m),
            };
            ideal * win[n]
        })
        .collect();

    let scale: f64 = match kind {
        FilterKind::Lowpass => h.iter().sum(),
        FilterKind::Highpass => h
            .iter()
            .enumerate()
            .map(|(n, &x)| x * (PI * (n as f64 - alpha)).cos())
            .sum(),
    };
    if !scale.is_finite() || scale.abs() < f64::EPSILON {
        return Err(DesignError::NumericalInstability(format!(
            "degenerate FIR gain {} at cutoff {} Hz",
            scale, cutoff.0
        )));
    }
    h.iter_mut().for_each(|x| *x /= scale);

    Ok(h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowpass_unity_dc_gain() {
        let h = firwin(51, Hertz(200.0), Hertz(2000.0), WindowType::Hamming, FilterKind::Lowpass)
            .unwrap();
        assert_eq!(h.len(), 51);

        let sum: f64 = h.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);

        // Center tap largest, symmetric
        assert!(h[25] > h[24].abs() && h[25] > h[26].abs());
        for i in 0..25 {
            assert!((h[i] - h[50 - i]).abs() < 1e-15);
        }
    }

    #[test]
    fn test_highpass_unity_nyquist_gain() {
        let h = firwin(31, Hertz(300.0), Hertz(1000.0), WindowType::Hann, FilterKind::Highpass)
            .unwrap();
        let alternating: f64 = h
            .iter()
            .enumerate()
            .map(|(n, &x)| if n % 2 == 0 { x } else { -x })
            .sum();
        assert!((alternating.abs() - 1.0).abs() < 1e-12);

        // Small DC gain
        let dc: f64 = h.iter().sum();
        assert!(dc.abs() < 0.05);
    }

    #[test]
    fn test_single_tap_lowpass() {
        let h =
            firwin(1, Hertz(10.0), Hertz(100.0), WindowType::Hamming, FilterKind::Lowpass).unwrap();
        assert_eq!(h, vec![1.0]);
    }

    #[test]
    fn test_invalid_inputs() {
        let fs = Hertz(1000.0);
        assert!(firwin(0, Hertz(100.0), fs, WindowType::Hamming, FilterKind::Lowpass).is_err());
        assert!(firwin(21, Hertz(500.0), fs, WindowType::Hamming, FilterKind::Lowpass).is_err());
        assert!(firwin(21, Hertz(0.0), fs, WindowType::Hamming, FilterKind::Lowpass).is_err());

        let err =
            firwin(20, Hertz(100.0), fs, WindowType::Hamming, FilterKind::Highpass).unwrap_err();
        assert!(err.is_invalid_parameter());
    }
}
