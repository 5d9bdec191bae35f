//! Design request file loading and validation.

use anyhow::{Context, Result};
use lib_filter::{SearchConfig, SelectionStrategy, WindowType};
use lib_types::{Band, FilterKind, FilterSpec, Hertz, Ohms};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Top-level request file: shared search tuning plus a list of designs.
///
/// ```toml
/// [search]
/// candidates = 4000
///
/// [[design]]
/// name = "anti_alias"
/// method = "fir"
/// target_hz = 100.0
/// order = 21
/// band = "stop"
/// sample_rate_hz = 1000.0
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DesignFile {
    /// Search tuning applied to every FIR design without its own.
    #[serde(default)]
    pub search: SearchConfig,

    /// Designs to run, in file order.
    #[serde(rename = "design")]
    pub designs: Vec<DesignRequest>,
}

/// How a request is realized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesignMethod {
    /// Closed-form analog Butterworth.
    Analog,
    /// Windowed FIR via cutoff search.
    Fir,
    /// Digital Butterworth through the analog solution.
    Iir,
}

impl DesignMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analog => "analog",
            Self::Fir => "fir",
            Self::Iir => "iir",
        }
    }

    pub fn is_digital(&self) -> bool {
        !matches!(self, Self::Analog)
    }
}

/// One design.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DesignRequest {
    /// Used as the output file prefix.
    pub name: String,

    pub method: DesignMethod,

    /// Target frequency in Hz.
    pub target_hz: f64,

    /// Filter order; the tap count for FIR designs.
    pub order: usize,

    #[serde(default = "default_kind")]
    pub kind: FilterKind,

    /// Allowed magnitude deviation.
    #[serde(default = "default_deviation")]
    pub deviation: f64,

    /// Band the target must land in.
    #[serde(default = "default_band")]
    pub band: Band,

    /// Required for digital methods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate_hz: Option<f64>,

    /// Sallen-Key resistor for analog designs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance_ohm: Option<f64>,

    /// Samples in the reported response curve (closed-form and IIR designs).
    #[serde(default = "default_response_points")]
    pub response_points: usize,

    /// Per-design search tuning, replacing the file-level `[search]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchConfig>,
}

fn default_kind() -> FilterKind { FilterKind::Lowpass }
fn default_deviation() -> f64 { 0.05 }
fn default_band() -> Band { Band::Pass }
fn default_response_points() -> usize { 1000 }

impl DesignRequest {
    /// Request with defaults for everything but the core design inputs.
    pub fn new(
        name: impl Into<String>,
        method: DesignMethod,
        target_hz: f64,
        order: usize,
    ) -> Self {
        Self {
            name: name.into(),
            method,
            target_hz,
            order,
            kind: default_kind(),
            deviation: default_deviation(),
            band: default_band(),
            sample_rate_hz: None,
            resistance_ohm: None,
            response_points: default_response_points(),
            search: None,
        }
    }

    pub fn spec(&self) -> FilterSpec {
        FilterSpec::new(Hertz(self.target_hz), self.order, self.kind, self.deviation, self.band)
    }

    pub fn sample_rate(&self) -> Result<Hertz> {
        self.sample_rate_hz
            .map(Hertz)
            .with_context(|| {
                format!(
                    "Design '{}': {} designs need sample_rate_hz",
                    self.name,
                    self.method.as_str()
                )
            })
    }

    pub fn resistance(&self) -> Option<Ohms> {
        self.resistance_ohm.map(Ohms)
    }

    /// Search tuning for this request given the file-level default.
    pub fn search_config<'a>(&'a self, shared: &'a SearchConfig) -> &'a SearchConfig {
        self.search.as_ref().unwrap_or(shared)
    }
}

/// Search knobs shared by the `fir` subcommand.
#[derive(Clone, Debug)]
pub struct SearchArgs {
    pub strategy: SelectionStrategy,
    pub candidates: usize,
    pub grid_points: usize,
    pub window: WindowType,
    pub parallel: bool,
    pub max_evaluations: Option<usize>,
}

impl From<SearchArgs> for SearchConfig {
    fn from(args: SearchArgs) -> Self {
        SearchConfig {
            candidates: args.candidates,
            grid_points: args.grid_points,
            window: args.window,
            strategy: args.strategy,
            max_evaluations: args.max_evaluations,
            parallel: args.parallel,
            ..SearchConfig::default()
        }
    }
}

/// Load a request file, JSON by extension, TOML otherwise.
pub fn load_config(path: &Path) -> Result<DesignFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config = parse_config(&content, path.extension().map_or(false, |e| e == "json"))?;
    validate_config(&config)?;

    Ok(config)
}

fn parse_config(content: &str, json: bool) -> Result<DesignFile> {
    Ok(if json {
        serde_json::from_str(content).with_context(|| "Failed to parse config as JSON")?
    } else {
        // Assume TOML
        toml::from_str(content).with_context(|| "Failed to parse config as TOML")?
    })
}

/// Validate configuration.
pub fn validate_config(config: &DesignFile) -> Result<()> {
    if config.designs.is_empty() {
        anyhow::bail!("Config contains no [[design]] entries");
    }

    config
        .search
        .validate()
        .with_context(|| "Invalid [search] section")?;

    let mut names = HashSet::new();
    for request in &config.designs {
        validate_request(request)?;
        if !names.insert(request.name.as_str()) {
            anyhow::bail!("Duplicate design name: '{}'", request.name);
        }
    }

    Ok(())
}

/// Validate one request before any design work starts.
pub fn validate_request(request: &DesignRequest) -> Result<()> {
    let name = &request.name;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        anyhow::bail!(
            "Design name '{}' must be non-empty and use only letters, digits, '_' or '-'",
            name
        );
    }

    let spec = request.spec();
    let checked = if request.method.is_digital() {
        spec.validate_digital(request.sample_rate()?)
    } else {
        spec.validate()
    };
    checked.with_context(|| format!("Design '{}'", name))?;

    if request.response_points < 2 {
        anyhow::bail!(
            "Design '{}': response_points must be at least 2 (got {})",
            name,
            request.response_points
        );
    }

    if let Some(search) = &request.search {
        if request.method != DesignMethod::Fir {
            tracing::warn!(
                "Design '{}': search settings ignored for {} designs",
                name,
                request.method.as_str()
            );
        }
        search
            .validate()
            .with_context(|| format!("Design '{}': invalid search section", name))?;
    }

    if let Some(r) = request.resistance_ohm {
        if !(r.is_finite() && r > 0.0) {
            anyhow::bail!("Design '{}': resistance_ohm must be positive (got {})", name, r);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[search]
candidates = 500
strategy = "threshold_crossing"

[[design]]
name = "rc_stage"
method = "analog"
target_hz = 1000.0
order = 2
band = "stop"
resistance_ohm = 1000.0

[[design]]
name = "fir_aa"
method = "fir"
target_hz = 100.0
order = 20
band = "stop"
sample_rate_hz = 1000.0

[design.search]
candidates = 200
window = "hann"
"#;

    #[test]
    fn test_parse_toml_with_defaults() {
        let config = parse_config(SAMPLE, false).unwrap();
        validate_config(&config).unwrap();

        assert_eq!(config.designs.len(), 2);
        assert_eq!(config.search.candidates, 500);
        assert_eq!(config.search.strategy, SelectionStrategy::ThresholdCrossing);

        let analog = &config.designs[0];
        assert_eq!(analog.kind, FilterKind::Lowpass);
        assert!((analog.deviation - 0.05).abs() < 1e-12);
        assert_eq!(analog.response_points, 1000);
        assert_eq!(analog.search_config(&config.search).candidates, 500);

        let fir = &config.designs[1];
        let search = fir.search_config(&config.search);
        assert_eq!(search.candidates, 200);
        assert_eq!(search.window, WindowType::Hann);
        // Per-design section replaces the shared one wholesale
        assert_eq!(search.strategy, SelectionStrategy::ClosestMatch);
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"design": [{"name": "hp", "method": "iir", "target_hz": 50.0,
            "order": 3, "kind": "highpass", "sample_rate_hz": 1000.0}]}"#;
        let config = parse_config(json, true).unwrap();
        validate_config(&config).unwrap();
        assert_eq!(config.designs[0].kind, FilterKind::Highpass);
        assert_eq!(config.designs[0].band, Band::Pass);
    }

    #[test]
    fn test_digital_requires_sample_rate() {
        let request = DesignRequest::new("x", DesignMethod::Fir, 100.0, 21);
        assert!(validate_request(&request).is_err());
    }

    #[test]
    fn test_rejects_bad_requests() {
        let mut request = DesignRequest::new("bad/name", DesignMethod::Analog, 100.0, 2);
        assert!(validate_request(&request).is_err());

        request.name = "ok".to_string();
        assert!(validate_request(&request).is_ok());

        request.deviation = 1.0;
        assert!(validate_request(&request).is_err());

        let mut digital = DesignRequest::new("d", DesignMethod::Iir, 600.0, 2);
        digital.sample_rate_hz = Some(1000.0);
        assert!(validate_request(&digital).is_err());
    }

    #[test]
    fn test_duplicate_names() {
        let config = DesignFile {
            search: SearchConfig::default(),
            designs: vec![
                DesignRequest::new("a", DesignMethod::Analog, 100.0, 2),
                DesignRequest::new("a", DesignMethod::Analog, 200.0, 2),
            ],
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_search_args_conversion() {
        let args = SearchArgs {
            strategy: "threshold".parse().unwrap(),
            candidates: 300,
            grid_points: 1024,
            window: WindowType::Blackman,
            parallel: true,
            max_evaluations: Some(50),
        };
        let search = SearchConfig::from(args);
        assert_eq!(search.strategy, SelectionStrategy::ThresholdCrossing);
        assert_eq!(search.candidates, 300);
        assert_eq!(search.max_evaluations, Some(50));
        assert!(search.parallel);
        assert!(search.validate().is_ok());
    }
}
