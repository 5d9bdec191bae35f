//! Butterworth transfer-function synthesis.
//!
//! Designs go through zero/pole/gain form:
//!
//! 1. Prototype poles on the unit circle, `p_k = exp(jπ(2k + n + 1) / 2n)`
//! 2. Lowpass (`p·ωc`) or highpass (`ωc/p`, `n` zeros at the origin) transform
//! 3. Digital designs only: pre-warp the cutoff and apply the bilinear
//!    transform with the normalized convention `fs = 2`, so `cutoff = 1`
//!    is the Nyquist frequency
//! 4. Expand roots into real polynomial coefficients

use crate::error::{DesignError, DesignResult};
use lib_types::{FilterKind, TransferFunction};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Bilinear-transform constant `2·fs` for the normalized `fs = 2` convention.
const FS2: f64 = 4.0;

/// Zero/pole/gain representation.
#[derive(Clone, Debug)]
struct Zpk {
    zeros: Vec<Complex64>,
    poles: Vec<Complex64>,
    gain: f64,
}

/// Analog Butterworth prototype poles with unit cutoff.
fn prototype_poles(order: usize) -> Vec<Complex64> {
    let n = order as f64;
    (0..order)
        .map(|k| {
            let theta = PI * (2.0 * k as f64 + n + 1.0) / (2.0 * n);
            Complex64::from_polar(1.0, theta)
        })
        .collect()
}

/// Move the prototype to cutoff `wc` (rad/s) as a lowpass or highpass.
fn analog_zpk(order: usize, wc: f64, kind: FilterKind) -> Zpk {
    let poles = prototype_poles(order);
    match kind {
        FilterKind::Lowpass => Zpk {
            zeros: Vec::new(),
            poles: poles.iter().map(|p| *p * wc).collect(),
            gain: wc.powi(order as i32),
        },
        FilterKind::Highpass => {
            // k' = k · Re(∏(-z) / ∏(-p)) with no prototype zeros
            let prod: Complex64 = poles.iter().map(|p| -*p).product();
            Zpk {
                zeros: vec![Complex64::new(0.0, 0.0); order],
                poles: poles.iter().map(|p| wc / *p).collect(),
                gain: (Complex64::new(1.0, 0.0) / prod).re,
            }
        }
    }
}

/// Bilinear transform `s = 2·fs·(z − 1)/(z + 1)`; zeros at infinity land on `z = −1`.
fn bilinear_zpk(analog: &Zpk) -> Zpk {
    let map = |s: &Complex64| (FS2 + *s) / (FS2 - *s);

    let mut zeros: Vec<Complex64> = analog.zeros.iter().map(map).collect();
    let poles: Vec<Complex64> = analog.poles.iter().map(map).collect();
    zeros.resize(poles.len(), Complex64::new(-1.0, 0.0));

    let num: Complex64 = analog.zeros.iter().map(|z| FS2 - *z).product();
    let den: Complex64 = analog.poles.iter().map(|p| FS2 - *p).product();

    Zpk {
        zeros,
        poles,
        gain: analog.gain * (num / den).re,
    }
}

/// Expand `∏(x − r)` into descending-power coefficients, keeping real parts.
///
/// Roots come in conjugate pairs (or are real), so imaginary parts cancel.
pub(crate) fn poly_from_roots(roots: &[Complex64]) -> Vec<f64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for r in roots {
        let mut next = vec![Complex64::new(0.0, 0.0); coeffs.len() + 1];
        for (i, c) in coeffs.iter().enumerate() {
            next[i] += *c;
            next[i + 1] -= *c * *r;
        }
        coeffs = next;
    }
    coeffs.into_iter().map(|c| c.re).collect()
}

fn zpk_to_tf(zpk: &Zpk) -> TransferFunction {
    let b = poly_from_roots(&zpk.zeros)
        .into_iter()
        .map(|c| c * zpk.gain)
        .collect();
    let a = poly_from_roots(&zpk.poles);
    TransferFunction::new(b, a)
}

/// Butterworth `(b, a)` design.
///
/// `cutoff` is in rad/s when `analog` is true, otherwise normalized so that
/// 1.0 is the Nyquist frequency and it must lie in `(0, 1)`.
pub fn butter(
    order: usize,
    cutoff: f64,
    kind: FilterKind,
    analog: bool,
) -> DesignResult<TransferFunction> {
    if order == 0 {
        return Err(DesignError::invalid("order", "must be at least 1"));
    }
    if !cutoff.is_finite() || cutoff <= 0.0 {
        return Err(DesignError::invalid(
            "cutoff",
            format!("must be positive and finite, got {}", cutoff),
        ));
    }

    if analog {
        return Ok(zpk_to_tf(&analog_zpk(order, cutoff, kind)));
    }

    if cutoff >= 1.0 {
        return Err(DesignError::invalid(
            "cutoff",
            format!("normalized digital cutoff must lie in (0, 1), got {}", cutoff),
        ));
    }

    let warped = FS2 * (PI * cutoff / 2.0).tan();
    let digital = bilinear_zpk(&analog_zpk(order, warped, kind));
    let tf = zpk_to_tf(&digital).normalized();

    if tf.b.iter().chain(tf.a.iter()).any(|c| !c.is_finite()) {
        return Err(DesignError::NumericalInstability(format!(
            "non-finite Butterworth coefficients for order {} at cutoff {}",
            order, cutoff
        )));
    }

    tracing::trace!(
        order,
        cutoff,
        %kind,
        "Butterworth digital coefficients: b={:?} a={:?}",
        tf.b,
        tf.a
    );
    Ok(tf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_z(coeffs: &[f64], z: Complex64) -> Complex64 {
        coeffs.iter().fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z + c)
    }

    #[test]
    fn test_poly_from_roots() {
        // (x - 1)(x + 2) = x^2 + x - 2
        let coeffs = poly_from_roots(&[Complex64::new(1.0, 0.0), Complex64::new(-2.0, 0.0)]);
        assert_eq!(coeffs, vec![1.0, 1.0, -2.0]);
    }

    #[test]
    fn test_analog_second_order_prototype() {
        // s^2 + sqrt(2) s + 1
        let tf = butter(2, 1.0, FilterKind::Lowpass, true).unwrap();
        assert!((tf.b[0] - 1.0).abs() < 1e-12);
        assert!((tf.a[0] - 1.0).abs() < 1e-12);
        assert!((tf.a[1] - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!((tf.a[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_analog_highpass_numerator() {
        let wc = 2.0 * PI * 100.0;
        let tf = butter(3, wc, FilterKind::Highpass, true).unwrap();

        assert_eq!(tf.b.len(), 4);
        assert!((tf.b[0] - 1.0).abs() < 1e-12);
        assert!(tf.b[1..].iter().all(|c| c.abs() < 1e-9));

        // |H(j wc)| = 1/sqrt(2)
        let s = Complex64::new(0.0, wc);
        let h = eval_z(&tf.b, s) / eval_z(&tf.a, s);
        assert!((h.norm() - 1.0 / 2.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_digital_lowpass_known_coefficients() {
        // Second-order, cutoff at half Nyquist
        let tf = butter(2, 0.5, FilterKind::Lowpass, false).unwrap();
        let expected_b = [0.29289321881345254, 0.5857864376269051, 0.29289321881345254];
        let expected_a = [1.0, 0.0, 0.1715728752538099];

        for (got, want) in tf.b.iter().zip(expected_b.iter()) {
            assert!((got - want).abs() < 1e-12, "b: {} vs {}", got, want);
        }
        for (got, want) in tf.a.iter().zip(expected_a.iter()) {
            assert!((got - want).abs() < 1e-12, "a: {} vs {}", got, want);
        }
    }

    #[test]
    fn test_digital_gains() {
        let one = Complex64::new(1.0, 0.0);
        let lp = butter(4, 0.2, FilterKind::Lowpass, false).unwrap();
        assert!((eval_z(&lp.b, one) / eval_z(&lp.a, one) - one).norm() < 1e-9);

        let minus_one = Complex64::new(-1.0, 0.0);
        let hp = butter(5, 0.3, FilterKind::Highpass, false).unwrap();
        let h = eval_z(&hp.b, minus_one) / eval_z(&hp.a, minus_one);
        assert!((h.norm() - 1.0).abs() < 1e-9);

        // -3 dB at the cutoff: z = e^{j pi 0.3}
        let zc = Complex64::from_polar(1.0, PI * 0.3);
        let hc = eval_z(&hp.b, zc) / eval_z(&hp.a, zc);
        assert!((hc.norm() - 1.0 / 2.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_cutoffs() {
        assert!(butter(2, 1.0, FilterKind::Lowpass, false).is_err());
        assert!(butter(2, 0.0, FilterKind::Lowpass, false).is_err());
        assert!(butter(2, f64::NAN, FilterKind::Lowpass, true).is_err());
        assert!(butter(0, 0.5, FilterKind::Lowpass, false).is_err());
    }
}
