//! Physical units with type safety.
//!
//! These newtypes keep ordinary frequency, angular frequency and the passive
//! component values used for analog realizations from being mixed up.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::ops::{Div, Mul};

/// Frequency in Hertz.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Hertz(pub f64);

impl Hertz {
    pub const ZERO: Self = Self(0.0);

    #[inline]
    pub fn from_khz(khz: f64) -> Self {
        Self(khz * 1e3)
    }

    #[inline]
    pub fn as_khz(&self) -> f64 {
        self.0 * 1e-3
    }

    /// Angular frequency (omega = 2 * pi * f).
    #[inline]
    pub fn to_angular(&self) -> RadiansPerSecond {
        RadiansPerSecond(2.0 * PI * self.0)
    }

    /// Normalized digital frequency in radians/sample for the given sample rate.
    ///
    /// DC maps to 0 and the Nyquist frequency maps to pi.
    #[inline]
    pub fn to_radians_per_sample(&self, sample_rate: Hertz) -> f64 {
        2.0 * PI * self.0 / sample_rate.0
    }

    /// Inverse of [`Hertz::to_radians_per_sample`].
    #[inline]
    pub fn from_radians_per_sample(w: f64, sample_rate: Hertz) -> Self {
        Self(w * sample_rate.0 / (2.0 * PI))
    }

    /// Half of this rate, i.e. the Nyquist frequency when `self` is a sample rate.
    #[inline]
    pub fn nyquist(&self) -> Hertz {
        Hertz(self.0 / 2.0)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

impl Mul<f64> for Hertz {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self(self.0 * rhs)
    }
}

impl Div<f64> for Hertz {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self(self.0 / rhs)
    }
}

impl Div<Hertz> for Hertz {
    type Output = f64;
    fn div(self, rhs: Hertz) -> f64 {
        self.0 / rhs.0
    }
}

impl fmt::Display for Hertz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "{:.*} Hz", p, self.0),
            None => write!(f, "{} Hz", self.0),
        }
    }
}

/// Angular frequency in radians per second.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct RadiansPerSecond(pub f64);

impl RadiansPerSecond {
    #[inline]
    pub fn to_hertz(&self) -> Hertz {
        Hertz(self.0 / (2.0 * PI))
    }
}

impl Mul<f64> for RadiansPerSecond {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self(self.0 * rhs)
    }
}

impl Div<f64> for RadiansPerSecond {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self(self.0 / rhs)
    }
}

/// Resistance in Ohms.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Ohms(pub f64);

impl Ohms {
    /// 1 kOhm, the usual starting point for Sallen-Key resistor pairs.
    pub const R_1K: Self = Self(1e3);

    #[inline]
    pub fn from_kohm(kohm: f64) -> Self {
        Self(kohm * 1e3)
    }
}

/// Capacitance in Farads.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Farads(pub f64);

impl Farads {
    #[inline]
    pub fn as_nf(&self) -> f64 {
        self.0 * 1e9
    }

    #[inline]
    pub fn as_uf(&self) -> f64 {
        self.0 * 1e6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angular_roundtrip() {
        let f = Hertz(1000.0);
        let w = f.to_angular();

        assert!((w.0 - 2000.0 * PI).abs() < 1e-9);
        assert!((w.to_hertz().0 - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_radians_per_sample() {
        let fs = Hertz(1000.0);

        // Nyquist maps to pi
        assert!((fs.nyquist().to_radians_per_sample(fs) - PI).abs() < 1e-12);

        let back = Hertz::from_radians_per_sample(PI / 5.0, fs);
        assert!((back.0 - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_display_precision() {
        assert_eq!(format!("{:.1}", Hertz(223.6068)), "223.6 Hz");
        assert_eq!(format!("{}", Hertz(50.0)), "50 Hz");
    }
}
