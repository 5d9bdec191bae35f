//! Filter design requests and resolved designs.
//!
//! A [`FilterSpec`] states *where* a tolerance must hold (target frequency and
//! band) instead of naming a cutoff directly. Solvers turn it into a
//! [`ResolvedDesign`], whose frequencies are derived from the chosen cutoff and
//! cannot be set on their own.

use crate::error::TypeError;
use crate::units::Hertz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Response shape of the filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Lowpass,
    Highpass,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lowpass => "lowpass",
            Self::Highpass => "highpass",
        }
    }
}

impl FromStr for FilterKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lowpass" | "lp" | "low" => Ok(Self::Lowpass),
            "highpass" | "hp" | "high" => Ok(Self::Highpass),
            _ => Err(TypeError::UnknownFilterKind(s.to_string())),
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Band the target frequency must fall in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    /// Magnitude at the target must stay at least `1 - deviation`.
    Pass,
    /// Magnitude at the target must stay at most `deviation`.
    Stop,
}

impl Band {
    /// The other band.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Pass => Self::Stop,
            Self::Stop => Self::Pass,
        }
    }

    /// Magnitude bound for this band given the allowed deviation.
    #[inline]
    pub fn bound(&self, deviation: f64) -> f64 {
        match self {
            Self::Pass => 1.0 - deviation,
            Self::Stop => deviation,
        }
    }

    /// Whether `magnitude` satisfies this band's bound.
    #[inline]
    pub fn admits(&self, magnitude: f64, deviation: f64) -> bool {
        match self {
            Self::Pass => magnitude >= 1.0 - deviation,
            Self::Stop => magnitude <= deviation,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Stop => "stop",
        }
    }
}

impl FromStr for Band {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pass" | "passband" => Ok(Self::Pass),
            "stop" | "stopband" | "reject" | "rejection" => Ok(Self::Stop),
            _ => Err(TypeError::UnknownBand(s.to_string())),
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A target-frequency filter request.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Frequency at which the tolerance must hold.
    pub target: Hertz,

    /// Butterworth order, or tap count for FIR designs.
    pub order: usize,

    /// Lowpass or highpass.
    pub kind: FilterKind,

    /// Allowed magnitude slack, strictly inside (0, 1).
    pub deviation: f64,

    /// Band the target belongs to.
    pub band: Band,
}

impl FilterSpec {
    pub fn new(target: Hertz, order: usize, kind: FilterKind, deviation: f64, band: Band) -> Self {
        Self {
            target,
            order,
            kind,
            deviation,
            band,
        }
    }

    /// Whether the target sits in the passband.
    #[inline]
    pub fn target_in_passband(&self) -> bool {
        self.band == Band::Pass
    }

    /// Magnitude the response must meet at the target frequency.
    #[inline]
    pub fn target_bound(&self) -> f64 {
        self.band.bound(self.deviation)
    }

    /// Magnitude bound of the opposite band.
    #[inline]
    pub fn complementary_bound(&self) -> f64 {
        self.band.opposite().bound(self.deviation)
    }

    /// True when a cutoff search moves from the target towards Nyquist.
    ///
    /// Lowpass with the target in the passband and highpass with the target in
    /// the rejection band both need a cutoff above the target.
    #[inline]
    pub fn searches_upward(&self) -> bool {
        matches!(
            (self.kind, self.band),
            (FilterKind::Lowpass, Band::Pass) | (FilterKind::Highpass, Band::Stop)
        )
    }

    /// Check order, deviation and target range.
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.order < 1 {
            return Err(TypeError::invalid_value("order", "must be at least 1"));
        }
        if !(self.deviation > 0.0 && self.deviation < 1.0) {
            return Err(TypeError::invalid_value(
                "deviation",
                format!("must lie strictly in (0, 1), got {}", self.deviation),
            ));
        }
        if !self.target.is_finite() || self.target.0 <= 0.0 {
            return Err(TypeError::invalid_value(
                "target",
                format!("must be a positive frequency, got {}", self.target.0),
            ));
        }
        Ok(())
    }

    /// [`FilterSpec::validate`] plus the digital requirement `0 < target < fs/2`.
    pub fn validate_digital(&self, sample_rate: Hertz) -> Result<(), TypeError> {
        if !sample_rate.is_finite() || sample_rate.0 <= 0.0 {
            return Err(TypeError::invalid_value(
                "sample_rate",
                format!("must be a positive frequency, got {}", sample_rate.0),
            ));
        }
        self.validate()?;
        let nyquist = sample_rate.nyquist();
        if self.target >= nyquist {
            return Err(TypeError::invalid_value(
                "target",
                format!(
                    "{} Hz must lie below the Nyquist frequency ({} Hz)",
                    self.target.0, nyquist.0
                ),
            ));
        }
        Ok(())
    }
}

/// Cutoff and band edges resolved for a [`FilterSpec`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDesign {
    spec: FilterSpec,
    cutoff: Hertz,
    band_edge: Hertz,
    complementary_edge: Hertz,
}

impl ResolvedDesign {
    pub fn new(
        spec: FilterSpec,
        cutoff: Hertz,
        band_edge: Hertz,
        complementary_edge: Hertz,
    ) -> Self {
        Self {
            spec,
            cutoff,
            band_edge,
            complementary_edge,
        }
    }

    /// The request this design was resolved for.
    #[inline]
    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    #[inline]
    pub fn target(&self) -> Hertz {
        self.spec.target
    }

    /// Cutoff parameter of the designed filter.
    #[inline]
    pub fn cutoff(&self) -> Hertz {
        self.cutoff
    }

    /// Where the magnitude crosses the bound of the target's band.
    #[inline]
    pub fn band_edge(&self) -> Hertz {
        self.band_edge
    }

    /// Where the magnitude crosses the bound of the opposite band.
    #[inline]
    pub fn complementary_edge(&self) -> Hertz {
        self.complementary_edge
    }

    /// Passband edge regardless of which band the target was in.
    pub fn passband_edge(&self) -> Hertz {
        match self.spec.band {
            Band::Pass => self.band_edge,
            Band::Stop => self.complementary_edge,
        }
    }

    /// Rejection band edge regardless of which band the target was in.
    pub fn stopband_edge(&self) -> Hertz {
        match self.spec.band {
            Band::Pass => self.complementary_edge,
            Band::Stop => self.band_edge,
        }
    }

    /// Largest of the reported frequencies, used to size plot ranges.
    pub fn max_frequency(&self) -> Hertz {
        Hertz(
            self.spec
                .target
                .0
                .max(self.cutoff.0)
                .max(self.band_edge.0)
                .max(self.complementary_edge.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(kind: FilterKind, band: Band) -> FilterSpec {
        FilterSpec::new(Hertz(1000.0), 2, kind, 0.05, band)
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("LowPass".parse::<FilterKind>().unwrap(), FilterKind::Lowpass);
        assert_eq!("hp".parse::<FilterKind>().unwrap(), FilterKind::Highpass);
        assert!(matches!(
            "bandpass".parse::<FilterKind>(),
            Err(TypeError::UnknownFilterKind(_))
        ));
    }

    #[test]
    fn test_bounds() {
        let pass = spec(FilterKind::Lowpass, Band::Pass);
        assert!((pass.target_bound() - 0.95).abs() < 1e-12);
        assert!((pass.complementary_bound() - 0.05).abs() < 1e-12);

        let stop = spec(FilterKind::Lowpass, Band::Stop);
        assert!((stop.target_bound() - 0.05).abs() < 1e-12);
        assert!((stop.complementary_bound() - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_search_direction() {
        assert!(spec(FilterKind::Lowpass, Band::Pass).searches_upward());
        assert!(!spec(FilterKind::Lowpass, Band::Stop).searches_upward());
        assert!(!spec(FilterKind::Highpass, Band::Pass).searches_upward());
        assert!(spec(FilterKind::Highpass, Band::Stop).searches_upward());
    }

    #[test]
    fn test_validation() {
        let mut s = spec(FilterKind::Lowpass, Band::Pass);
        assert!(s.validate().is_ok());

        s.deviation = 0.0;
        assert!(s.validate().is_err());
        s.deviation = 1.0;
        assert!(s.validate().is_err());
        s.deviation = f64::NAN;
        assert!(s.validate().is_err());

        s.deviation = 0.05;
        s.order = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_digital_validation_requires_target_below_nyquist() {
        let s = spec(FilterKind::Lowpass, Band::Pass);
        assert!(s.validate_digital(Hertz(4000.0)).is_ok());
        assert!(s.validate_digital(Hertz(2000.0)).is_err());
        assert!(s.validate_digital(Hertz(0.0)).is_err());
    }

    #[test]
    fn test_band_edges_by_role() {
        let s = spec(FilterKind::Lowpass, Band::Stop);
        let d = ResolvedDesign::new(s, Hertz(200.0), Hertz(1000.0), Hertz(120.0));

        assert_eq!(d.stopband_edge(), Hertz(1000.0));
        assert_eq!(d.passband_edge(), Hertz(120.0));
        assert_eq!(d.max_frequency(), Hertz(1000.0));
    }

    #[test]
    fn test_spec_serde_names() {
        let s = spec(FilterKind::Highpass, Band::Stop);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"highpass\""));
        assert!(json.contains("\"stop\""));
    }
}
