//! Locating magnitude-bound crossings on a sampled response.
//!
//! All positions are on the response's own angular axis; callers convert to
//! Hz with [`FrequencyResponse::omega_to_hertz`] when reporting.

use lib_types::{Band, FrequencyResponse};

/// Linear interpolation of the axis position where the magnitude equals `bound`
/// between two bracketing samples.
#[inline]
fn interpolate(w0: f64, m0: f64, w1: f64, m1: f64, bound: f64) -> f64 {
    let dm = m1 - m0;
    if dm.abs() < f64::EPSILON {
        return w1;
    }
    let t = ((bound - m0) / dm).clamp(0.0, 1.0);
    w0 + t * (w1 - w0)
}

/// First position, scanning up from the lowest sample, where `|H| - bound`
/// changes sign or touches zero.
///
/// Returns `None` when the magnitude stays strictly on one side of `bound`.
pub fn first_crossing(response: &FrequencyResponse, bound: f64) -> Option<f64> {
    let mags = response.magnitudes();
    let omega = &response.omega;

    if mags.first().is_some_and(|&m| m == bound) {
        return omega.first().copied();
    }

    (1..mags.len()).find_map(|k| {
        let d0 = mags[k - 1] - bound;
        let d1 = mags[k] - bound;
        if d1 == 0.0 || (d0 < 0.0) != (d1 < 0.0) {
            Some(interpolate(omega[k - 1], mags[k - 1], omega[k], mags[k], bound))
        } else {
            None
        }
    })
}

/// Where the response leaves `band`, scanning up from DC (`upward`) or down
/// from the top of the grid.
///
/// The exit is interpolated between the last in-band sample and the first
/// sample outside the band. If the very first sample scanned is already outside,
/// its position is returned. If the band spans the whole grid, the grid end in
/// the scan direction is returned.
pub fn band_exit(
    response: &FrequencyResponse,
    band: Band,
    deviation: f64,
    upward: bool,
) -> Option<f64> {
    let n = response.len();
    if n == 0 {
        return None;
    }

    let bound = band.bound(deviation);
    let order: Box<dyn Iterator<Item = usize>> = if upward {
        Box::new(0..n)
    } else {
        Box::new((0..n).rev())
    };

    let mut previous: Option<usize> = None;
    for k in order {
        let m = response.magnitude(k);
        // Bound itself counts as leaving the band
        let inside = match band {
            Band::Pass => m > bound,
            Band::Stop => m < bound,
        };
        if !inside {
            return Some(match previous {
                Some(p) => interpolate(
                    response.omega[p],
                    response.magnitude(p),
                    response.omega[k],
                    m,
                    bound,
                ),
                None => response.omega[k],
            });
        }
        previous = Some(k);
    }

    previous.map(|p| response.omega[p])
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::{Complex64, Hertz, ResponseDomain};
    use std::f64::consts::PI;

    /// |H| falls linearly from 1 at DC to 0 at the top bin.
    fn ramp(n: usize) -> FrequencyResponse {
        let omega: Vec<f64> = (0..n).map(|k| PI * k as f64 / (n - 1) as f64).collect();
        let values = omega.iter().map(|&w| Complex64::new(1.0 - w / PI, 0.0)).collect();
        FrequencyResponse::new(omega, values, ResponseDomain::Digital { sample_rate: Hertz(2.0) })
    }

    #[test]
    fn test_first_crossing_interpolates() {
        let r = ramp(11);
        let w = first_crossing(&r, 0.55).unwrap();
        assert!((w - 0.45 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_first_crossing_missing() {
        let r = ramp(11);
        assert!(first_crossing(&r, 1.5).is_none());
    }

    #[test]
    fn test_first_crossing_exact_sample() {
        let r = ramp(11);
        let w = first_crossing(&r, 0.7).unwrap();
        assert!((w - 0.3 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_band_exit_directions() {
        let r = ramp(11);

        // Passband (|H| > 0.9) seen from DC ends around 0.1 pi
        let pass = band_exit(&r, Band::Pass, 0.1, true).unwrap();
        assert!((pass - 0.1 * PI).abs() < 1e-12);

        // Stopband (|H| < 0.25) seen from the top ends around 0.75 pi
        let stop = band_exit(&r, Band::Stop, 0.25, false).unwrap();
        assert!((stop - 0.75 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_band_exit_passband_from_top() {
        // |H| rises linearly from 0 at DC to 1 at the top bin, like a highpass
        let r = ramp(11);
        let rising = FrequencyResponse::new(
            r.omega.clone(),
            r.omega.iter().map(|&w| Complex64::new(w / PI, 0.0)).collect(),
            ResponseDomain::Digital { sample_rate: Hertz(2.0) },
        );

        // Passband (|H| > 0.85) seen from the top ends between 0.9 pi and 0.8 pi
        let pass = band_exit(&rising, Band::Pass, 0.15, false).unwrap();
        assert!((pass - 0.85 * PI).abs() < 1e-12);

        // Scanning up from DC leaves no passband to exit
        assert_eq!(band_exit(&rising, Band::Pass, 0.15, true), Some(0.0));
    }

    #[test]
    fn test_band_exit_whole_grid() {
        let r = ramp(11);
        let flat = FrequencyResponse::new(
            r.omega.clone(),
            vec![Complex64::new(0.01, 0.0); 11],
            ResponseDomain::Analog,
        );
        assert!((band_exit(&flat, Band::Stop, 0.05, true).unwrap() - PI).abs() < 1e-12);
        assert!(band_exit(&flat, Band::Stop, 0.05, false).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_band_exit_immediately_outside() {
        let r = ramp(11);
        // DC magnitude 1.0 is already outside a stopband
        assert_eq!(band_exit(&r, Band::Stop, 0.05, true), Some(0.0));
    }
}
