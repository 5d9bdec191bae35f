//! Candidate-cutoff search for windowed FIR designs.
//!
//! A windowed-sinc response has no closed-form inverse, so the cutoff that puts
//! `|H(target)|` on the band bound is found by scanning a uniform grid of
//! candidate cutoffs.
//!
//! # Scan order
//!
//! Candidates start at the target frequency and move away from it:
//!
//! - upward to just below Nyquist when the target must end up on the low side
//!   of the transition (lowpass passband, highpass stopband)
//! - downward toward DC otherwise
//!
//! The target itself is always the first candidate. Both selection strategies
//! and all tie-breaks are defined against this order, including when the
//! evaluations run in parallel.

use crate::backend::{FirSynthesizer, Numeric, ResponseEvaluator};
use crate::crossing::{band_exit, first_crossing};
use crate::error::{DesignError, DesignResult};
use crate::window::WindowType;
use lib_types::{CoefficientSet, FilterKind, FilterSpec, FrequencyResponse, Hertz, ResolvedDesign};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

/// How the scanned candidates are ranked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Exhaustive scan minimizing `|mag(target) - M|`, earliest candidate wins ties.
    #[default]
    ClosestMatch,

    /// First candidate whose band reaches the target in the scan direction.
    ThresholdCrossing,
}

impl SelectionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClosestMatch => "closest_match",
            Self::ThresholdCrossing => "threshold_crossing",
        }
    }
}

impl FromStr for SelectionStrategy {
    type Err = DesignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "closest" | "closest_match" => Ok(Self::ClosestMatch),
            "threshold" | "threshold_crossing" | "crossing" => Ok(Self::ThresholdCrossing),
            _ => Err(DesignError::invalid("strategy", format!("unknown strategy '{}'", s))),
        }
    }
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of candidate cutoffs, both interval ends included.
    pub candidates: usize,

    /// Frequency samples per evaluated response.
    pub grid_points: usize,

    pub window: WindowType,

    pub strategy: SelectionStrategy,

    /// Lower end of a downward search as a fraction of the target.
    pub floor_fraction: f64,

    /// Distance kept below Nyquist by an upward search, in Hz.
    pub nyquist_guard_hz: f64,

    /// Slack on the achieved magnitude before a result counts as degraded.
    pub match_tolerance: f64,

    /// Stop after this many candidate evaluations.
    pub max_evaluations: Option<usize>,

    /// Evaluate candidates on the rayon pool.
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            candidates: 10_000,
            grid_points: 4096,
            window: WindowType::Hamming,
            strategy: SelectionStrategy::ClosestMatch,
            floor_fraction: 1e-3,
            nyquist_guard_hz: 1e-3,
            match_tolerance: 1e-3,
            max_evaluations: None,
            parallel: false,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> DesignResult<()> {
        if self.candidates == 0 {
            return Err(DesignError::invalid("candidates", "must be at least 1"));
        }
        if self.grid_points < 2 {
            return Err(DesignError::invalid(
                "grid_points",
                format!("must be at least 2, got {}", self.grid_points),
            ));
        }
        if !(self.floor_fraction > 0.0 && self.floor_fraction < 1.0) {
            return Err(DesignError::invalid(
                "floor_fraction",
                format!("must lie in (0, 1), got {}", self.floor_fraction),
            ));
        }
        // The upward scan ends at Nyquist minus the guard, and Nyquist itself has no taps
        if !(self.nyquist_guard_hz.is_finite() && self.nyquist_guard_hz > 0.0) {
            return Err(DesignError::invalid(
                "nyquist_guard_hz",
                format!("must be positive, got {}", self.nyquist_guard_hz),
            ));
        }
        if !self.match_tolerance.is_finite() || self.match_tolerance < 0.0 {
            return Err(DesignError::invalid(
                "match_tolerance",
                format!("must be non-negative, got {}", self.match_tolerance),
            ));
        }
        if self.max_evaluations == Some(0) {
            return Err(DesignError::invalid("max_evaluations", "must be at least 1 when set"));
        }
        Ok(())
    }
}

/// Which derived edge a [`DegradedReason::EdgeNotFound`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Band,
    Complementary,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Band => f.write_str("band"),
            Self::Complementary => f.write_str("complementary"),
        }
    }
}

/// Why a design may not meet its tolerance.
#[derive(Clone, Debug, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DegradedReason {
    #[error("no candidate reached the target; using the boundary cutoff")]
    NoCandidateAccepted,

    #[error("evaluation cap of {cap} reached before the scan finished")]
    EvaluationCapReached { cap: usize },

    #[error("magnitude {achieved:.6} at the target misses the bound {bound:.6}")]
    ToleranceNotMet { achieved: f64, bound: f64 },

    #[error("{edge} edge not found on the response grid")]
    EdgeNotFound { edge: Edge },
}

/// Whether a design is guaranteed to meet its tolerance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reasons", rename_all = "snake_case")]
pub enum Quality {
    Met,
    Degraded(Vec<DegradedReason>),
}

impl Quality {
    fn from_reasons(reasons: Vec<DegradedReason>) -> Self {
        if reasons.is_empty() {
            Self::Met
        } else {
            Self::Degraded(reasons)
        }
    }

    pub fn is_met(&self) -> bool {
        matches!(self, Self::Met)
    }

    pub fn reasons(&self) -> &[DegradedReason] {
        match self {
            Self::Met => &[],
            Self::Degraded(reasons) => reasons,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Met => f.write_str("met"),
            Self::Degraded(reasons) => {
                f.write_str("degraded: ")?;
                for (i, r) in reasons.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{}", r)?;
                }
                Ok(())
            }
        }
    }
}

/// Result of a FIR cutoff search.
#[derive(Clone, Debug)]
pub struct FirDesign {
    pub taps: Vec<f64>,
    pub design: ResolvedDesign,
    /// Response recomputed at the chosen cutoff.
    pub response: FrequencyResponse,
    pub quality: Quality,
    /// Candidates evaluated during the scan.
    pub evaluations: usize,
    /// `|H|` at the grid bin nearest the target.
    pub achieved_magnitude: f64,
}

impl FirDesign {
    pub fn coefficients(&self) -> CoefficientSet {
        CoefficientSet::Fir {
            taps: self.taps.clone(),
        }
    }

    /// Turn a degraded design into [`DesignError::Degraded`].
    pub fn require_met(self) -> DesignResult<Self> {
        match &self.quality {
            Quality::Met => Ok(self),
            degraded => Err(DesignError::Degraded(degraded.to_string())),
        }
    }
}

/// Outcome of the candidate scan, before the final recompute.
struct Selection {
    index: usize,
    evaluations: usize,
    /// Every candidate handed to the scan was evaluated.
    exhausted: bool,
    reasons: Vec<DegradedReason>,
}

/// FIR cutoff search.
pub struct DigitalSearchSolver<B = Numeric> {
    config: SearchConfig,
    backend: B,
}

impl DigitalSearchSolver<Numeric> {
    pub fn new(config: SearchConfig) -> Self {
        Self::with_backend(config, Numeric::new())
    }
}

impl Default for DigitalSearchSolver<Numeric> {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl<B> DigitalSearchSolver<B>
where
    B: FirSynthesizer + ResponseEvaluator + Sync,
{
    pub fn with_backend(config: SearchConfig, backend: B) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Candidate cutoffs in canonical scan order.
    pub fn candidates(&self, spec: &FilterSpec, sample_rate: Hertz) -> Vec<Hertz> {
        let target = spec.target.0;
        let far = if spec.searches_upward() {
            (sample_rate.nyquist().0 - self.config.nyquist_guard_hz).max(target)
        } else {
            target * self.config.floor_fraction
        };

        let n = self.config.candidates;
        if n == 1 {
            return vec![spec.target];
        }
        let step = (far - target) / (n - 1) as f64;
        (0..n)
            .map(|i| if i == n - 1 { Hertz(far) } else { Hertz(target + step * i as f64) })
            .collect()
    }

    /// Run the search for `spec` at `sample_rate`.
    ///
    /// `spec.order` is the tap count.
    pub fn solve(&self, spec: &FilterSpec, sample_rate: Hertz) -> DesignResult<FirDesign> {
        self.config.validate()?;
        spec.validate_digital(sample_rate)?;
        if spec.kind == FilterKind::Highpass && spec.order % 2 == 0 {
            return Err(DesignError::invalid(
                "order",
                format!("highpass FIR needs an odd tap count, got {}", spec.order),
            ));
        }

        let candidates = self.candidates(spec, sample_rate);
        let limit = self
            .config
            .max_evaluations
            .map_or(candidates.len(), |cap| cap.min(candidates.len()));

        debug!(
            strategy = %self.config.strategy,
            upward = spec.searches_upward(),
            first_hz = candidates[0].0,
            last_hz = candidates[candidates.len() - 1].0,
            limit,
            "Scanning {} candidate cutoffs",
            candidates.len()
        );

        let scanned = &candidates[..limit];
        let mut selection = match self.config.strategy {
            SelectionStrategy::ClosestMatch => self.select_closest(spec, sample_rate, scanned)?,
            SelectionStrategy::ThresholdCrossing => {
                self.select_threshold(spec, sample_rate, scanned)?
            }
        };
        if limit < candidates.len() && selection.exhausted {
            selection
                .reasons
                .insert(0, DegradedReason::EvaluationCapReached { cap: limit });
        }

        self.finish(spec, sample_rate, candidates[selection.index], selection)
    }

    fn evaluate(
        &self,
        spec: &FilterSpec,
        sample_rate: Hertz,
        cutoff: Hertz,
    ) -> DesignResult<(Vec<f64>, FrequencyResponse)> {
        let taps = self
            .backend
            .fir(spec.order, cutoff, sample_rate, self.config.window, spec.kind)?;
        let response = self
            .backend
            .digital_response(&taps, &[1.0], self.config.grid_points, sample_rate)?;
        Ok((taps, response))
    }

    /// `|mag(target) - M|` for one candidate.
    fn match_error(
        &self,
        spec: &FilterSpec,
        sample_rate: Hertz,
        cutoff: Hertz,
    ) -> DesignResult<f64> {
        let (_, response) = self.evaluate(spec, sample_rate, cutoff)?;
        let mag = response
            .magnitude_at(spec.target)
            .ok_or_else(|| DesignError::NumericalInstability("empty response grid".to_string()))?;
        Ok((mag - spec.target_bound()).abs())
    }

    /// Whether the candidate's band reaches the target in the scan direction.
    fn accepts(&self, spec: &FilterSpec, sample_rate: Hertz, cutoff: Hertz) -> DesignResult<bool> {
        let (_, response) = self.evaluate(spec, sample_rate, cutoff)?;
        let upward = spec.searches_upward();
        let crossing = band_exit(&response, spec.band, spec.deviation, upward)
            .ok_or_else(|| DesignError::NumericalInstability("empty response grid".to_string()))?;
        let target = response.hertz_to_omega(spec.target);
        Ok(if upward { crossing >= target } else { crossing <= target })
    }

    fn select_closest(
        &self,
        spec: &FilterSpec,
        sample_rate: Hertz,
        candidates: &[Hertz],
    ) -> DesignResult<Selection> {
        let errors: Vec<f64> = if self.config.parallel {
            candidates
                .par_iter()
                .map(|&c| self.match_error(spec, sample_rate, c))
                .collect::<DesignResult<Vec<_>>>()?
        } else {
            candidates
                .iter()
                .map(|&c| self.match_error(spec, sample_rate, c))
                .collect::<DesignResult<Vec<_>>>()?
        };

        // Strict `<` keeps the earliest candidate on ties
        let mut best = 0;
        for (i, &err) in errors.iter().enumerate().skip(1) {
            if err < errors[best] {
                best = i;
            }
        }

        Ok(Selection {
            index: best,
            evaluations: errors.len(),
            exhausted: true,
            reasons: Vec::new(),
        })
    }

    fn select_threshold(
        &self,
        spec: &FilterSpec,
        sample_rate: Hertz,
        candidates: &[Hertz],
    ) -> DesignResult<Selection> {
        let found = if self.config.parallel {
            // Earliest index whose evaluation accepted or failed
            let first = candidates
                .par_iter()
                .map(|&c| self.accepts(spec, sample_rate, c))
                .position_first(|r| !matches!(r, Ok(false)));
            match first {
                Some(i) => {
                    // Re-run to surface the error, if that is what stopped the scan
                    self.accepts(spec, sample_rate, candidates[i])?;
                    Some(i)
                }
                None => None,
            }
        } else {
            let mut found = None;
            for (i, &c) in candidates.iter().enumerate() {
                if self.accepts(spec, sample_rate, c)? {
                    found = Some(i);
                    break;
                }
            }
            found
        };

        Ok(match found {
            Some(i) => Selection {
                index: i,
                evaluations: i + 1,
                exhausted: false,
                reasons: Vec::new(),
            },
            None => Selection {
                index: candidates.len() - 1,
                evaluations: candidates.len(),
                exhausted: true,
                reasons: vec![DegradedReason::NoCandidateAccepted],
            },
        })
    }

    /// Recompute at the chosen cutoff and derive the edges.
    fn finish(
        &self,
        spec: &FilterSpec,
        sample_rate: Hertz,
        cutoff: Hertz,
        selection: Selection,
    ) -> DesignResult<FirDesign> {
        let Selection {
            evaluations,
            mut reasons,
            ..
        } = selection;

        let (taps, response) = self.evaluate(spec, sample_rate, cutoff)?;
        let achieved = response
            .magnitude_at(spec.target)
            .ok_or_else(|| DesignError::NumericalInstability("empty response grid".to_string()))?;

        let bound = spec.target_bound();
        if !spec.band.admits(achieved, spec.deviation + self.config.match_tolerance) {
            reasons.push(DegradedReason::ToleranceNotMet { achieved, bound });
        }

        let grid_end = response.omega.last().copied().unwrap_or(0.0);
        let mut edge = |bound: f64, which: Edge| match first_crossing(&response, bound) {
            Some(w) => response.omega_to_hertz(w),
            None => {
                reasons.push(DegradedReason::EdgeNotFound { edge: which });
                response.omega_to_hertz(grid_end)
            }
        };
        let band_edge = edge(bound, Edge::Band);
        let complementary_edge = edge(spec.complementary_bound(), Edge::Complementary);

        let design = ResolvedDesign::new(*spec, cutoff, band_edge, complementary_edge);
        let quality = Quality::from_reasons(reasons);

        match &quality {
            Quality::Met => info!(
                cutoff_hz = cutoff.0,
                band_edge_hz = band_edge.0,
                complementary_hz = complementary_edge.0,
                achieved,
                evaluations,
                "Resolved {}-tap {} FIR",
                spec.order,
                spec.kind
            ),
            Quality::Degraded(_) => warn!(
                cutoff_hz = cutoff.0,
                achieved,
                evaluations,
                "FIR design {}",
                quality
            ),
        }

        Ok(FirDesign {
            taps,
            design,
            response,
            quality,
            evaluations,
            achieved_magnitude: achieved,
        })
    }
}
