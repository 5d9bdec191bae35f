//! Closed-form cutoff resolution for analog Butterworth filters.
//!
//! The Butterworth magnitude `|H|² = 1 / (1 + (f/fc)^2n)` (highpass: `fc/f`)
//! inverts exactly. For a target magnitude `M` let
//!
//! ```text
//! A = (1/M² - 1)^(1 / 2n)
//! ```
//!
//! then a lowpass has `fc = f_target / A` and a highpass `fc = f_target · A`.
//! The complementary edge reuses the same formula with the opposite band's
//! bound while holding `fc` fixed.

use crate::backend::{ButterworthSynthesizer, Numeric};
use crate::error::{DesignError, DesignResult};
use lib_types::{
    FilterKind, FilterSpec, FrequencyResponsePoint, Hertz, ResolvedDesign, TransferFunction,
};
use tracing::{debug, info};

/// Samples in [`AnalogCutoffSolver::response_curve`] when none are requested.
pub const DEFAULT_CURVE_POINTS: usize = 1000;

/// Curves extend to this multiple of the highest design frequency.
const CURVE_SPAN: f64 = 1.5;

/// `A = (1/M² - 1)^(1/2n)`.
fn shape_factor(magnitude: f64, order: usize) -> DesignResult<f64> {
    let a = (1.0 / (magnitude * magnitude) - 1.0).powf(1.0 / (2.0 * order as f64));
    if !a.is_finite() || a <= 0.0 {
        return Err(DesignError::invalid(
            "deviation",
            format!("bound {} gives no finite cutoff ratio at order {}", magnitude, order),
        ));
    }
    Ok(a)
}

/// Closed-form analog Butterworth solver.
pub struct AnalogCutoffSolver<B = Numeric> {
    synth: B,
}

impl AnalogCutoffSolver<Numeric> {
    pub fn new() -> Self {
        Self { synth: Numeric::new() }
    }
}

impl Default for AnalogCutoffSolver<Numeric> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ButterworthSynthesizer> AnalogCutoffSolver<B> {
    /// Use a custom synthesizer for [`Self::transfer_function`].
    pub fn with_backend(synth: B) -> Self {
        Self { synth }
    }

    /// Resolve the cutoff placing `|H(target)|` exactly on the band bound.
    pub fn solve(&self, spec: &FilterSpec) -> DesignResult<ResolvedDesign> {
        spec.validate()?;

        let a = shape_factor(spec.target_bound(), spec.order)?;
        let a_comp = shape_factor(spec.complementary_bound(), spec.order)?;

        let target = spec.target;
        let (cutoff, band_edge, complementary_edge) = match spec.kind {
            FilterKind::Lowpass => {
                let fc = target / a;
                (fc, fc * a, fc * a_comp)
            }
            FilterKind::Highpass => {
                let fc = target * a;
                (fc, fc / a, fc / a_comp)
            }
        };

        for (name, f) in [
            ("cutoff", cutoff),
            ("band_edge", band_edge),
            ("complementary_edge", complementary_edge),
        ] {
            if !f.is_finite() || f.0 <= 0.0 {
                return Err(DesignError::invalid(name, format!("closed form produced {}", f.0)));
            }
        }

        debug!(a, a_comp, "Butterworth shape factors");
        info!(
            target_hz = target.0,
            cutoff_hz = cutoff.0,
            complementary_hz = complementary_edge.0,
            "Resolved {} {} analog cutoff",
            spec.kind,
            spec.order
        );

        Ok(ResolvedDesign::new(*spec, cutoff, band_edge, complementary_edge))
    }

    /// Closed-form magnitude of the resolved filter at `frequency`.
    pub fn magnitude(&self, design: &ResolvedDesign, frequency: Hertz) -> f64 {
        let spec = design.spec();
        let ratio = match spec.kind {
            FilterKind::Lowpass => frequency / design.cutoff(),
            FilterKind::Highpass => design.cutoff() / frequency,
        };
        1.0 / (1.0 + ratio.powi(2 * spec.order as i32)).sqrt()
    }

    /// Closed-form curve from DC to 1.5x the highest design frequency.
    pub fn response_curve(
        &self,
        design: &ResolvedDesign,
        points: usize,
    ) -> DesignResult<Vec<FrequencyResponsePoint>> {
        if points < 2 {
            return Err(DesignError::invalid(
                "points",
                format!("need at least 2 curve points, got {}", points),
            ));
        }

        let f_max = design.max_frequency().0 * CURVE_SPAN;
        let step = f_max / (points - 1) as f64;
        Ok((0..points)
            .map(|i| {
                let frequency = Hertz(step * i as f64);
                FrequencyResponsePoint {
                    frequency,
                    magnitude: self.magnitude(design, frequency),
                }
            })
            .collect())
    }

    /// Analog `(b, a)` in powers of `s` (rad/s) at the resolved cutoff.
    pub fn transfer_function(&self, design: &ResolvedDesign) -> DesignResult<TransferFunction> {
        let spec = design.spec();
        self.synth
            .butterworth(spec.order, design.cutoff().to_angular().0, spec.kind, true)
    }
}
