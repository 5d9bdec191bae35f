//! Frequency-response samples.
//!
//! A response is stored on its native angular axis (radians/sample for
//! digital filters, radians/second for analog ones). Conversion to Hz only
//! happens when points are reported, so searches never mix axes.

use crate::units::{Hertz, RadiansPerSecond};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Axis a response was evaluated on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ResponseDomain {
    /// Discrete-time response, `omega` in radians/sample.
    Digital { sample_rate: Hertz },
    /// Continuous-time response, `omega` in radians/second.
    Analog,
}

/// A single (frequency, magnitude) pair for reporting and plotting.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrequencyResponsePoint {
    pub frequency: Hertz,
    pub magnitude: f64,
}

/// Complex frequency response sampled on an ascending angular grid.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyResponse {
    /// Ascending angular frequencies.
    pub omega: Vec<f64>,

    /// Complex response at each angular frequency.
    pub values: Vec<Complex64>,

    /// Axis units of `omega`.
    pub domain: ResponseDomain,
}

impl FrequencyResponse {
    pub fn new(omega: Vec<f64>, values: Vec<Complex64>, domain: ResponseDomain) -> Self {
        debug_assert_eq!(omega.len(), values.len());
        Self {
            omega,
            values,
            domain,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Magnitude of sample `index`.
    #[inline]
    pub fn magnitude(&self, index: usize) -> f64 {
        self.values[index].norm()
    }

    /// Magnitudes of all samples.
    pub fn magnitudes(&self) -> Vec<f64> {
        self.values.iter().map(|h| h.norm()).collect()
    }

    /// Convert an angular value on this response's axis to Hz.
    #[inline]
    pub fn omega_to_hertz(&self, omega: f64) -> Hertz {
        match self.domain {
            ResponseDomain::Digital { sample_rate } => {
                Hertz::from_radians_per_sample(omega, sample_rate)
            }
            ResponseDomain::Analog => RadiansPerSecond(omega).to_hertz(),
        }
    }

    /// Convert a frequency in Hz to this response's angular axis.
    #[inline]
    pub fn hertz_to_omega(&self, frequency: Hertz) -> f64 {
        match self.domain {
            ResponseDomain::Digital { sample_rate } => frequency.to_radians_per_sample(sample_rate),
            ResponseDomain::Analog => frequency.to_angular().0,
        }
    }

    /// Frequency of sample `index` in Hz.
    #[inline]
    pub fn frequency_at(&self, index: usize) -> Hertz {
        self.omega_to_hertz(self.omega[index])
    }

    /// Index of the grid sample closest to `frequency`.
    ///
    /// Returns 0 for an empty response.
    pub fn nearest_index(&self, frequency: Hertz) -> usize {
        if self.omega.len() < 2 {
            return 0;
        }
        let w = self.hertz_to_omega(frequency);
        let upper = self.omega.partition_point(|&x| x < w);
        if upper == 0 {
            return 0;
        }
        if upper >= self.omega.len() {
            return self.omega.len() - 1;
        }
        let lower = upper - 1;
        if (w - self.omega[lower]).abs() <= (self.omega[upper] - w).abs() {
            lower
        } else {
            upper
        }
    }

    /// Magnitude at the grid sample closest to `frequency`.
    pub fn magnitude_at(&self, frequency: Hertz) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.magnitude(self.nearest_index(frequency)))
    }

    /// Spacing between the first two grid samples in Hz.
    pub fn resolution(&self) -> Option<Hertz> {
        if self.omega.len() < 2 {
            return None;
        }
        Some(Hertz(self.frequency_at(1).0 - self.frequency_at(0).0))
    }

    /// Reporting view: (Hz, |H|) pairs.
    pub fn points(&self) -> Vec<FrequencyResponsePoint> {
        self.omega
            .iter()
            .zip(self.values.iter())
            .map(|(&w, h)| FrequencyResponsePoint {
                frequency: self.omega_to_hertz(w),
                magnitude: h.norm(),
            })
            .collect()
    }
}
