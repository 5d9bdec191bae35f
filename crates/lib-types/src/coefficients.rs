//! Filter coefficient containers.
//!
//! Polynomials are stored in descending powers (of `s` for analog filters,
//! of `z` for digital ones), the same layout used by `b`/`a` vectors in
//! most filter design tools.

use serde::{Deserialize, Serialize};

/// Rational transfer function `B / A`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferFunction {
    /// Numerator coefficients.
    pub b: Vec<f64>,

    /// Denominator coefficients.
    pub a: Vec<f64>,
}

impl TransferFunction {
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Self {
        Self { b, a }
    }

    /// Polynomial order (degree of the denominator).
    pub fn order(&self) -> usize {
        self.a.len().saturating_sub(1)
    }

    /// Scale both polynomials so that `a[0] == 1`.
    pub fn normalized(mut self) -> Self {
        if let Some(&a0) = self.a.first() {
            if a0 != 0.0 && a0 != 1.0 {
                self.b.iter_mut().for_each(|c| *c /= a0);
                self.a.iter_mut().for_each(|c| *c /= a0);
            }
        }
        self
    }
}

/// Coefficients handed back to the caller after a design.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CoefficientSet {
    /// Continuous-time transfer function, `s` in radians/second.
    Analog(TransferFunction),
    /// Discrete-time recursive filter.
    Iir(TransferFunction),
    /// Discrete-time FIR taps.
    Fir { taps: Vec<f64> },
}

impl CoefficientSet {
    /// Numerator (or taps).
    pub fn numerator(&self) -> &[f64] {
        match self {
            Self::Analog(tf) | Self::Iir(tf) => &tf.b,
            Self::Fir { taps } => taps,
        }
    }

    /// Denominator; FIR filters have the trivial denominator `[1]`.
    pub fn denominator(&self) -> &[f64] {
        const ONE: [f64; 1] = [1.0];
        match self {
            Self::Analog(tf) | Self::Iir(tf) => &tf.a,
            Self::Fir { .. } => &ONE,
        }
    }

    pub fn is_digital(&self) -> bool {
        !matches!(self, Self::Analog(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Analog(_) => "analog",
            Self::Iir(_) => "iir",
            Self::Fir { .. } => "fir",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized() {
        let tf = TransferFunction::new(vec![2.0, 4.0], vec![2.0, 1.0]).normalized();
        assert_eq!(tf.b, vec![1.0, 2.0]);
        assert_eq!(tf.a, vec![1.0, 0.5]);
        assert_eq!(tf.order(), 1);
    }

    #[test]
    fn test_fir_denominator() {
        let set = CoefficientSet::Fir { taps: vec![0.25, 0.5, 0.25] };
        assert_eq!(set.denominator(), &[1.0]);
        assert_eq!(set.numerator().len(), 3);
        assert!(set.is_digital());
    }
}
