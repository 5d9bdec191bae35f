//! Analog-to-digital bridge for Butterworth IIR designs.
//!
//! The analog cutoff from [`AnalogCutoffSolver`] is normalized to the Nyquist
//! frequency and handed to the digital Butterworth synthesizer. The bilinear
//! transform warps the frequency axis, so the digital magnitude at the target
//! drifts from the analog bound as the target approaches Nyquist;
//! [`IirBridge::design`] measures where the digital edges actually land.

use crate::analog::AnalogCutoffSolver;
use crate::backend::{ButterworthSynthesizer, Numeric, ResponseEvaluator};
use crate::crossing::first_crossing;
use crate::error::{DesignError, DesignResult};
use lib_types::{
    CoefficientSet, FilterKind, FilterSpec, FrequencyResponse, Hertz, ResolvedDesign,
    TransferFunction,
};
use tracing::{debug, info};

/// Response samples in [`IirBridge::design`] unless overridden.
pub const DEFAULT_IIR_GRID_POINTS: usize = 512;

/// A digital Butterworth design derived from the analog solution.
#[derive(Clone, Debug)]
pub struct IirDesign {
    /// Closed-form analog resolution the coefficients were built from.
    pub analog: ResolvedDesign,
    pub tf: TransferFunction,
    pub response: FrequencyResponse,
    /// `|H|` at the grid bin nearest the target.
    pub achieved_magnitude: f64,
    /// First crossing of the target-band bound in the digital response.
    pub measured_band_edge: Option<Hertz>,
    /// First crossing of the opposite-band bound in the digital response.
    pub measured_complementary_edge: Option<Hertz>,
}

impl IirDesign {
    pub fn coefficients(&self) -> CoefficientSet {
        CoefficientSet::Iir(self.tf.clone())
    }
}

/// Analog cutoff to digital Butterworth coefficients.
pub struct IirBridge<B = Numeric> {
    backend: B,
    grid_points: usize,
}

impl IirBridge<Numeric> {
    pub fn new() -> Self {
        Self::with_backend(Numeric::new())
    }
}

impl Default for IirBridge<Numeric> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ButterworthSynthesizer + ResponseEvaluator> IirBridge<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            grid_points: DEFAULT_IIR_GRID_POINTS,
        }
    }

    /// Samples used when evaluating the digital response.
    pub fn with_grid_points(mut self, grid_points: usize) -> Self {
        self.grid_points = grid_points;
        self
    }

    /// Digital `(b, a)` for an analog cutoff in Hz.
    ///
    /// # Errors
    ///
    /// [`DesignError::InvalidParameter`] when `analog_cutoff / (fs/2)` is
    /// outside `(0, 1)`.
    pub fn to_digital(
        &self,
        analog_cutoff: Hertz,
        sample_rate: Hertz,
        order: usize,
        kind: FilterKind,
    ) -> DesignResult<TransferFunction> {
        if !sample_rate.is_finite() || sample_rate.0 <= 0.0 {
            return Err(DesignError::invalid(
                "sample_rate",
                format!("must be positive, got {}", sample_rate.0),
            ));
        }

        let normalized = analog_cutoff / sample_rate.nyquist();
        if !(normalized > 0.0 && normalized < 1.0) {
            return Err(DesignError::invalid(
                "cutoff",
                format!(
                    "{} Hz normalizes to {} at fs = {} Hz; must lie in (0, 1)",
                    analog_cutoff.0, normalized, sample_rate.0
                ),
            ));
        }

        debug!(normalized, "Normalized analog cutoff");
        self.backend.butterworth(order, normalized, kind, false)
    }

    /// Resolve `spec` in closed form, map it to the digital domain and measure
    /// the result.
    pub fn design(&self, spec: &FilterSpec, sample_rate: Hertz) -> DesignResult<IirDesign> {
        spec.validate_digital(sample_rate)?;

        let analog = AnalogCutoffSolver::with_backend(&self.backend).solve(spec)?;
        let tf = self.to_digital(analog.cutoff(), sample_rate, spec.order, spec.kind)?;
        let response = self
            .backend
            .digital_response(&tf.b, &tf.a, self.grid_points, sample_rate)?;

        let achieved_magnitude = response
            .magnitude_at(spec.target)
            .ok_or_else(|| DesignError::NumericalInstability("empty response grid".to_string()))?;
        let measured_band_edge =
            first_crossing(&response, spec.target_bound()).map(|w| response.omega_to_hertz(w));
        let measured_complementary_edge = first_crossing(&response, spec.complementary_bound())
            .map(|w| response.omega_to_hertz(w));

        info!(
            cutoff_hz = analog.cutoff().0,
            achieved = achieved_magnitude,
            "Resolved order-{} {} IIR",
            spec.order,
            spec.kind
        );

        Ok(IirDesign {
            analog,
            tf,
            response,
            achieved_magnitude,
            measured_band_edge,
            measured_complementary_edge,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::Band;

    #[test]
    fn test_to_digital_matches_direct_design() {
        let bridge = IirBridge::new();
        let tf = bridge
            .to_digital(Hertz(250.0), Hertz(1000.0), 2, FilterKind::Lowpass)
            .unwrap();

        // 250 Hz at fs = 1 kHz is half Nyquist
        assert!((tf.b[0] - 0.29289321881345254).abs() < 1e-12);
        assert!((tf.a[2] - 0.1715728752538099).abs() < 1e-12);
    }

    #[test]
    fn test_to_digital_rejects_out_of_range() {
        let bridge = IirBridge::new();
        let fs = Hertz(1000.0);
        for fc in [0.0, -10.0, 500.0, 800.0, f64::NAN] {
            let err = bridge.to_digital(Hertz(fc), fs, 2, FilterKind::Lowpass).unwrap_err();
            assert!(err.is_invalid_parameter(), "fc = {}", fc);
        }
    }

    #[test]
    fn test_design_lowpass_passband() {
        let bridge = IirBridge::new().with_grid_points(2000);
        let spec = FilterSpec::new(Hertz(1000.0), 2, FilterKind::Lowpass, 0.05, Band::Pass);
        let design = bridge.design(&spec, Hertz(20_000.0)).unwrap();

        assert!((design.analog.cutoff().0 - 1744.3).abs() < 1.0);
        assert_eq!(design.tf.a.len(), 3);

        // Bilinear warping keeps the target slightly inside the passband
        assert!(design.achieved_magnitude >= 0.95);
        assert!(design.achieved_magnitude < 0.96);

        let edge = design.measured_band_edge.unwrap();
        let comp = design.measured_complementary_edge.unwrap();
        assert!(edge < comp);
        assert!((edge.0 - 1000.0).abs() < 50.0);
    }

    #[test]
    fn test_design_rejects_target_above_nyquist() {
        let bridge = IirBridge::new();
        let spec = FilterSpec::new(Hertz(1000.0), 2, FilterKind::Highpass, 0.05, Band::Pass);
        assert!(bridge.design(&spec, Hertz(1500.0)).unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_design_cutoff_beyond_nyquist() {
        // The stopband target forces a highpass cutoff far above the target
        let bridge = IirBridge::new();
        let spec = FilterSpec::new(Hertz(1000.0), 2, FilterKind::Highpass, 0.05, Band::Stop);
        assert!(bridge.design(&spec, Hertz(4000.0)).unwrap_err().is_invalid_parameter());
    }
}
