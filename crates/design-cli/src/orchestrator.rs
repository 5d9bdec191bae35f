//! Design orchestration.

use crate::config::{DesignFile, DesignMethod, DesignRequest};
use anyhow::{Context, Result};
use lib_filter::{
    AnalogCutoffSolver, DigitalSearchSolver, IirBridge, Quality, SallenKeyComponents, SearchConfig,
};
use lib_types::{CoefficientSet, FrequencyResponsePoint, Hertz, ResolvedDesign};

/// Runs every request in a design file.
pub struct Orchestrator {
    config: DesignFile,
}

impl Orchestrator {
    /// Create a new orchestrator.
    pub fn new(config: DesignFile) -> Result<Self> {
        Ok(Self { config })
    }

    /// Run all designs in file order.
    pub fn run(&self) -> Result<Vec<DesignOutcome>> {
        tracing::info!("Running {} designs", self.config.designs.len());

        let outcomes = self
            .config
            .designs
            .iter()
            .map(|request| {
                run_request(request, request.search_config(&self.config.search))
                    .with_context(|| format!("Design '{}' failed", request.name))
            })
            .collect::<Result<Vec<_>>>()?;

        let degraded = outcomes.iter().filter(|o| o.is_degraded()).count();
        if degraded > 0 {
            tracing::warn!("{} of {} designs are degraded", degraded, outcomes.len());
        }

        tracing::info!("Design run complete");
        Ok(outcomes)
    }
}

/// One finished design, flattened for reporting.
#[derive(Clone, Debug)]
pub struct DesignOutcome {
    pub name: String,
    pub method: DesignMethod,
    pub design: ResolvedDesign,
    pub sample_rate: Option<Hertz>,
    pub coefficients: CoefficientSet,
    /// Curve for the plot sink, in Hz.
    pub response: Vec<FrequencyResponsePoint>,
    /// `|H(target)|` of the realized filter.
    pub achieved_magnitude: f64,
    /// Search quality; `None` for designs without a search.
    pub quality: Option<Quality>,
    /// Candidates evaluated by a FIR search.
    pub evaluations: Option<usize>,
    /// Band edges measured on a digital IIR response.
    pub measured_edges: Option<(Option<Hertz>, Option<Hertz>)>,
    pub sallen_key: Option<SallenKeyComponents>,
}

impl DesignOutcome {
    pub fn is_degraded(&self) -> bool {
        self.quality.as_ref().is_some_and(|q| !q.is_met())
    }

    /// Error out on degraded designs.
    pub fn require_met(&self) -> Result<()> {
        if let Some(quality) = self.quality.as_ref().filter(|q| !q.is_met()) {
            anyhow::bail!("Design '{}' is {}", self.name, quality);
        }
        Ok(())
    }
}

/// Run a single request.
pub fn run_request(request: &DesignRequest, search: &SearchConfig) -> Result<DesignOutcome> {
    crate::config::validate_request(request)?;
    let spec = request.spec();

    tracing::info!(
        "Design '{}': {} {} order {} at {} ({} band, d = {})",
        request.name,
        request.method.as_str(),
        spec.kind,
        spec.order,
        spec.target,
        spec.band,
        spec.deviation
    );

    match request.method {
        DesignMethod::Analog => {
            let solver = AnalogCutoffSolver::new();
            let design = solver.solve(&spec)?;
            let tf = solver.transfer_function(&design)?;
            let response = solver.response_curve(&design, request.response_points)?;
            let sallen_key = request
                .resistance()
                .map(|r| SallenKeyComponents::for_cutoff(design.cutoff(), r))
                .transpose()?;

            Ok(DesignOutcome {
                name: request.name.clone(),
                method: request.method,
                achieved_magnitude: solver.magnitude(&design, spec.target),
                design,
                sample_rate: None,
                coefficients: CoefficientSet::Analog(tf),
                response,
                quality: None,
                evaluations: None,
                measured_edges: None,
                sallen_key,
            })
        }
        DesignMethod::Fir => {
            let sample_rate = request.sample_rate()?;
            let fir = DigitalSearchSolver::new(search.clone()).solve(&spec, sample_rate)?;
            let coefficients = fir.coefficients();
            let response = fir.response.points();

            Ok(DesignOutcome {
                name: request.name.clone(),
                method: request.method,
                design: fir.design,
                sample_rate: Some(sample_rate),
                coefficients,
                response,
                achieved_magnitude: fir.achieved_magnitude,
                quality: Some(fir.quality),
                evaluations: Some(fir.evaluations),
                measured_edges: None,
                sallen_key: None,
            })
        }
        DesignMethod::Iir => {
            let sample_rate = request.sample_rate()?;
            let iir = IirBridge::new()
                .with_grid_points(request.response_points)
                .design(&spec, sample_rate)?;
            let coefficients = iir.coefficients();
            let response = iir.response.points();

            Ok(DesignOutcome {
                name: request.name.clone(),
                method: request.method,
                design: iir.analog,
                sample_rate: Some(sample_rate),
                coefficients,
                response,
                achieved_magnitude: iir.achieved_magnitude,
                quality: None,
                evaluations: None,
                measured_edges: Some((iir.measured_band_edge, iir.measured_complementary_edge)),
                sallen_key: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::{Band, Ohms};

    #[test]
    fn test_analog_request_with_sallen_key() {
        let mut request = DesignRequest::new("rc", DesignMethod::Analog, 1000.0, 2);
        request.band = Band::Stop;
        request.resistance_ohm = Some(1000.0);

        let outcome = run_request(&request, &SearchConfig::default()).unwrap();
        assert!((outcome.achieved_magnitude - 0.05).abs() < 1e-12);
        assert_eq!(outcome.response.len(), 1000);
        assert_eq!(outcome.coefficients.label(), "analog");

        let parts = outcome.sallen_key.unwrap();
        assert_eq!(parts.resistance, Ohms(1000.0));
        assert!((parts.cutoff().0 - outcome.design.cutoff().0).abs() < 1e-9);
        assert!(outcome.require_met().is_ok());
    }

    #[test]
    fn test_fir_request() {
        let mut request = DesignRequest::new("aa", DesignMethod::Fir, 100.0, 20);
        request.band = Band::Stop;
        request.sample_rate_hz = Some(1000.0);
        let search = SearchConfig {
            candidates: 500,
            grid_points: 2000,
            ..SearchConfig::default()
        };

        let outcome = run_request(&request, &search).unwrap();
        assert_eq!(outcome.coefficients.numerator().len(), 20);
        assert_eq!(outcome.evaluations, Some(500));
        assert_eq!(outcome.response.len(), 2000);
        assert!(outcome.achieved_magnitude <= 0.05 + 1e-3);
    }

    #[test]
    fn test_degraded_fir_fails_strict() {
        let mut request = DesignRequest::new("capped", DesignMethod::Fir, 100.0, 20);
        request.band = Band::Stop;
        request.sample_rate_hz = Some(1000.0);
        let search = SearchConfig {
            candidates: 500,
            grid_points: 1024,
            max_evaluations: Some(2),
            ..SearchConfig::default()
        };

        let outcome = run_request(&request, &search).unwrap();
        assert!(outcome.is_degraded());
        assert!(outcome.require_met().is_err());
    }

    #[test]
    fn test_iir_request() {
        let mut request = DesignRequest::new("iir", DesignMethod::Iir, 1000.0, 2);
        request.sample_rate_hz = Some(20_000.0);
        request.response_points = 512;

        let outcome = run_request(&request, &SearchConfig::default()).unwrap();
        assert_eq!(outcome.coefficients.denominator().len(), 3);
        assert_eq!(outcome.response.len(), 512);
        assert!(outcome.measured_edges.is_some());
    }

    #[test]
    fn test_orchestrator_adds_context() {
        let config = DesignFile {
            search: SearchConfig::default(),
            designs: vec![DesignRequest::new("no_rate", DesignMethod::Iir, 100.0, 2)],
        };
        let err = Orchestrator::new(config).unwrap().run().unwrap_err();
        assert!(format!("{:#}", err).contains("no_rate"));
    }
}
