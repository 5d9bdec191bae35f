//! Window functions for windowed-sinc FIR design.
//!
//! All windows are the symmetric variant (denominator `N - 1`), which keeps
//! the designed taps linear phase.

use crate::error::DesignError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Window function types for FIR tap shaping.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    /// No windowing (boxcar).
    Rectangular,

    /// Hann (raised cosine) window.
    Hann,

    /// Hamming window, about 43 dB of sidelobe rejection.
    Hamming,

    /// Blackman window.
    Blackman,

    /// Kaiser window; larger `beta` trades main-lobe width for sidelobe level.
    Kaiser { beta: f64 },
}

impl Default for WindowType {
    fn default() -> Self {
        Self::Hamming
    }
}

impl FromStr for WindowType {
    type Err = DesignError;

    /// Accepts `hamming`, `hann`, `blackman`, `rectangular`/`boxcar`,
    /// and `kaiser` or `kaiser:<beta>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let (name, arg) = match lower.split_once(':') {
            Some((n, a)) => (n, Some(a)),
            None => (lower.as_str(), None),
        };
        match (name, arg) {
            ("rectangular" | "boxcar", None) => Ok(Self::Rectangular),
            ("hann" | "hanning", None) => Ok(Self::Hann),
            ("hamming", None) => Ok(Self::Hamming),
            ("blackman", None) => Ok(Self::Blackman),
            ("kaiser", None) => Ok(Self::Kaiser { beta: 6.0 }),
            ("kaiser", Some(beta)) => beta
                .parse::<f64>()
                .ok()
                .filter(|b| b.is_finite() && *b >= 0.0)
                .map(|beta| Self::Kaiser { beta })
                .ok_or_else(|| {
                    DesignError::invalid("window", format!("bad kaiser beta '{}'", beta))
                }),
            _ => Err(DesignError::invalid("window", format!("unknown window '{}'", s))),
        }
    }
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rectangular => f.write_str("rectangular"),
            Self::Hann => f.write_str("hann"),
            Self::Hamming => f.write_str("hamming"),
            Self::Blackman => f.write_str("blackman"),
            Self::Kaiser { beta } => write!(f, "kaiser:{}", beta),
        }
    }
}

/// `I_0(x)`, Abramowitz & Stegun 9.8.1 / 9.8.2 polynomial fits.
fn bessel_i0(x: f64) -> f64 {
    let ax = x.abs();

    if ax < 3.75 {
        let t = (x / 3.75).powi(2);
        1.0 + t * (3.5156229
            + t * (3.0899424
                + t * (1.2067492
                    + t * (0.2659732
                        + t * (0.0360768 + t * 0.0045813)))))
    } else {
        let t = 3.75 / ax;
        (ax.exp() / ax.sqrt())
            * (0.39894228
                + t * (0.01328592
                    + t * (0.00225319
                        + t * (-0.00157565
                            + t * (0.00916281
                                + t * (-0.02057706
                                    + t * (0.02635537
                                        + t * (-0.01647633 + t * 0.00392377))))))))
    }
}

/// Generate symmetric window coefficients of the given length.
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    match length {
        0 => return Vec::new(),
        1 => return vec![1.0],
        _ => {}
    }

    let span = (length - 1) as f64;
    let phase = |i: usize| 2.0 * PI * i as f64 / span;

    match window_type {
        WindowType::Rectangular => vec![1.0; length],
        WindowType::Hann => (0..length).map(|i| 0.5 - 0.5 * phase(i).cos()).collect(),
        WindowType::Hamming => (0..length).map(|i| 0.54 - 0.46 * phase(i).cos()).collect(),
        WindowType::Blackman => (0..length)
            .map(|i| 0.42 - 0.5 * phase(i).cos() + 0.08 * (2.0 * phase(i)).cos())
            .collect(),
        WindowType::Kaiser { beta } => {
            let denom = bessel_i0(beta);
            (0..length)
                .map(|i| {
                    let x = 2.0 * i as f64 / span - 1.0;
                    bessel_i0(beta * (1.0 - x * x).max(0.0).sqrt()) / denom
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bessel_i0() {
        assert!((bessel_i0(0.0) - 1.0).abs() < 1e-10);
        assert!((bessel_i0(1.0) - 1.266).abs() < 0.001);
        assert!((bessel_i0(3.0) - 4.881).abs() < 0.001);
        assert!((bessel_i0(-2.0) - bessel_i0(2.0)).abs() < 1e-10);
    }

    #[test]
    fn test_hamming_endpoints() {
        let window = generate_window(WindowType::Hamming, 21);
        assert_eq!(window.len(), 21);

        assert!((window[0] - 0.08).abs() < 1e-12);
        assert!((window[20] - 0.08).abs() < 1e-12);
        assert!((window[10] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_window_symmetry() {
        for window_type in [
            WindowType::Hann,
            WindowType::Hamming,
            WindowType::Blackman,
            WindowType::Kaiser { beta: 6.0 },
        ] {
            let window = generate_window(window_type, 20);
            for i in 0..10 {
                assert!(
                    (window[i] - window[19 - i]).abs() < 1e-12,
                    "{} asymmetric at {}",
                    window_type,
                    i
                );
            }
        }
    }

    #[test]
    fn test_degenerate_lengths() {
        assert!(generate_window(WindowType::Hann, 0).is_empty());
        assert_eq!(generate_window(WindowType::Hann, 1), vec![1.0]);
    }

    #[test]
    fn test_parse_window() {
        assert_eq!("Hamming".parse::<WindowType>().unwrap(), WindowType::Hamming);
        assert_eq!("boxcar".parse::<WindowType>().unwrap(), WindowType::Rectangular);
        assert_eq!(
            "kaiser:8.6".parse::<WindowType>().unwrap(),
            WindowType::Kaiser { beta: 8.6 }
        );
        assert!("kaiser:-1".parse::<WindowType>().is_err());
        assert!("triangle".parse::<WindowType>().is_err());
    }
}
