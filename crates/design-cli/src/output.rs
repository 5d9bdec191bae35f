//! Result output formatting and writing.

use crate::orchestrator::DesignOutcome;
use crate::OutputFormat;
use anyhow::Result;
use lib_types::{CoefficientSet, FrequencyResponsePoint};
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

/// Summary document for one design in the requested format.
pub fn render_summary(outcome: &DesignOutcome, format: OutputFormat) -> Result<String> {
    let d = &outcome.design;
    let spec = d.spec();
    let mut s = String::new();

    match format {
        OutputFormat::Text | OutputFormat::C => {
            writeln!(s, "Design: {} ({})", outcome.name, outcome.method.as_str())?;
            writeln!(s, "  Filter:             order {} {}", spec.order, spec.kind)?;
            if let Some(fs) = outcome.sample_rate {
                writeln!(s, "  Sample rate:        {:.3}", fs)?;
            }
            writeln!(
                s,
                "  Target:             {:.3} ({} band, d = {})",
                d.target(),
                spec.band,
                spec.deviation
            )?;
            writeln!(s, "  Cutoff:             {:.3}", d.cutoff())?;
            writeln!(s, "  Band edge:          {:.3}", d.band_edge())?;
            writeln!(s, "  Complementary edge: {:.3}", d.complementary_edge())?;
            writeln!(s, "  |H(target)|:        {:.6}", outcome.achieved_magnitude)?;
            if let Some((edge, comp)) = outcome.measured_edges {
                writeln!(s, "  Digital band edge:  {}", fmt_edge(edge))?;
                writeln!(s, "  Digital comp. edge: {}", fmt_edge(comp))?;
            }
            if let Some(n) = outcome.evaluations {
                writeln!(s, "  Evaluations:        {}", n)?;
            }
            if let Some(quality) = &outcome.quality {
                writeln!(s, "  Quality:            {}", quality)?;
            }
            if let Some(parts) = &outcome.sallen_key {
                writeln!(
                    s,
                    "  Sallen-Key:         R = {} ohm, C = {:.3} nF",
                    parts.resistance.0,
                    parts.capacitance.as_nf()
                )?;
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "name": outcome.name,
                "method": outcome.method,
                "spec": spec,
                "sample_rate_hz": outcome.sample_rate.map(|f| f.0),
                "cutoff_hz": d.cutoff().0,
                "band_edge_hz": d.band_edge().0,
                "complementary_edge_hz": d.complementary_edge().0,
                "achieved_magnitude": outcome.achieved_magnitude,
                "measured_edges_hz": outcome
                    .measured_edges
                    .map(|(e, c)| (e.map(|f| f.0), c.map(|f| f.0))),
                "evaluations": outcome.evaluations,
                "quality": outcome.quality,
                "sallen_key": outcome.sallen_key,
                "coefficients": outcome.coefficients,
            });
            writeln!(s, "{}", serde_json::to_string_pretty(&json)?)?;
        }
        OutputFormat::Csv => {
            writeln!(s, "metric,value")?;
            writeln!(s, "name,{}", outcome.name)?;
            writeln!(s, "method,{}", outcome.method.as_str())?;
            writeln!(s, "kind,{}", spec.kind)?;
            writeln!(s, "order,{}", spec.order)?;
            writeln!(s, "band,{}", spec.band)?;
            writeln!(s, "deviation,{}", spec.deviation)?;
            writeln!(s, "target_hz,{}", d.target().0)?;
            writeln!(s, "cutoff_hz,{}", d.cutoff().0)?;
            writeln!(s, "band_edge_hz,{}", d.band_edge().0)?;
            writeln!(s, "complementary_edge_hz,{}", d.complementary_edge().0)?;
            writeln!(s, "achieved_magnitude,{}", outcome.achieved_magnitude)?;
            if let Some(fs) = outcome.sample_rate {
                writeln!(s, "sample_rate_hz,{}", fs.0)?;
            }
            if let Some(n) = outcome.evaluations {
                writeln!(s, "evaluations,{}", n)?;
            }
            if let Some(quality) = &outcome.quality {
                writeln!(s, "quality,{}", if quality.is_met() { "met" } else { "degraded" })?;
            }
            if let Some(parts) = &outcome.sallen_key {
                writeln!(s, "capacitance_f,{}", parts.capacitance.0)?;
            }
        }
    }

    Ok(s)
}

fn fmt_edge(edge: Option<lib_types::Hertz>) -> String {
    edge.map_or_else(|| "not found".to_string(), |f| format!("{:.3}", f))
}

/// `frequency_hz,magnitude` rows.
pub fn render_response_csv(points: &[FrequencyResponsePoint]) -> String {
    let mut s = String::from("frequency_hz,magnitude\n");
    for p in points {
        let _ = writeln!(s, "{},{}", p.frequency.0, p.magnitude);
    }
    s
}

/// `index,b,a` rows; FIR sets leave `a` empty past the leading 1.
pub fn render_coefficients_csv(coefficients: &CoefficientSet) -> String {
    let b = coefficients.numerator();
    let a = coefficients.denominator();
    let mut s = String::from("index,b,a\n");
    for i in 0..b.len().max(a.len()) {
        let cell = |c: &[f64]| c.get(i).map_or_else(String::new, |v| format!("{:e}", v));
        let _ = writeln!(s, "{},{},{}", i, cell(b), cell(a));
    }
    s
}

/// Lowercase C identifier derived from a design name.
pub fn c_identifier(name: &str) -> String {
    let mut id: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if id.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        id.insert(0, '_');
    }
    id
}

fn write_c_array(s: &mut String, ident: &str, values: &[f64]) -> std::fmt::Result {
    writeln!(s, "static const double {}[{}] = {{", ident, values.len())?;
    for chunk in values.chunks(4) {
        let row: Vec<String> = chunk.iter().map(|v| format!("{:.17e}", v)).collect();
        writeln!(s, "    {},", row.join(", "))?;
    }
    writeln!(s, "}};")
}

/// Header with the coefficient tables for firmware use.
pub fn render_c_header(outcome: &DesignOutcome) -> Result<String> {
    let id = c_identifier(&outcome.name);
    let guard = format!("{}_COEFFS_H", id.to_ascii_uppercase());
    let spec = outcome.design.spec();
    let mut s = String::new();

    writeln!(
        s,
        "/* {}: {} {} order {}, cutoff {:.6} Hz */",
        outcome.name,
        outcome.coefficients.label(),
        spec.kind,
        spec.order,
        outcome.design.cutoff().0
    )?;
    writeln!(s, "#ifndef {}", guard)?;
    writeln!(s, "#define {}", guard)?;
    writeln!(s)?;
    if let Some(fs) = outcome.sample_rate {
        writeln!(s, "#define {}_SAMPLE_RATE_HZ {:.6}", id.to_ascii_uppercase(), fs.0)?;
    }

    match &outcome.coefficients {
        CoefficientSet::Fir { taps } => {
            writeln!(s, "#define {}_NUM_TAPS {}", id.to_ascii_uppercase(), taps.len())?;
            writeln!(s)?;
            write_c_array(&mut s, &format!("{}_taps", id), taps)?;
        }
        CoefficientSet::Iir(tf) | CoefficientSet::Analog(tf) => {
            writeln!(s, "#define {}_ORDER {}", id.to_ascii_uppercase(), tf.order())?;
            writeln!(s)?;
            write_c_array(&mut s, &format!("{}_b", id), &tf.b)?;
            write_c_array(&mut s, &format!("{}_a", id), &tf.a)?;
        }
    }

    writeln!(s)?;
    writeln!(s, "#endif /* {} */", guard)?;
    Ok(s)
}

/// Print one design to stdout.
pub fn print_outcome(outcome: &DesignOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::C => print!("{}", render_c_header(outcome)?),
        _ => print!("{}", render_summary(outcome, format)?),
    }
    Ok(())
}

/// Write every design's files into `output_dir`.
pub fn write_results(
    outcomes: &[DesignOutcome],
    output_dir: &Path,
    format: OutputFormat,
) -> Result<()> {
    let summary_ext = match format {
        OutputFormat::Text | OutputFormat::C => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Csv => "csv",
    };

    for outcome in outcomes {
        let summary_path = output_dir.join(format!("{}_summary.{}", outcome.name, summary_ext));
        std::fs::write(&summary_path, render_summary(outcome, format)?)?;
        tracing::info!("Wrote summary to {:?}", summary_path);

        let response_path = output_dir.join(format!("{}_response.csv", outcome.name));
        write_response(&outcome.response, &response_path)?;

        let coeff_path = output_dir.join(format!("{}_coefficients.csv", outcome.name));
        std::fs::write(&coeff_path, render_coefficients_csv(&outcome.coefficients))?;
        tracing::info!("Wrote coefficients to {:?}", coeff_path);

        if matches!(format, OutputFormat::C) {
            let header_path = output_dir.join(format!("{}_coefficients.h", outcome.name));
            std::fs::write(&header_path, render_c_header(outcome)?)?;
            tracing::info!("Wrote C header to {:?}", header_path);
        }
    }

    // Write index
    let index_path = output_dir.join("summary.txt");
    let mut f = std::fs::File::create(&index_path)?;

    writeln!(f, "targetfit Design Summary")?;
    writeln!(f, "========================")?;
    writeln!(f)?;
    for outcome in outcomes {
        let status = match &outcome.quality {
            Some(q) if !q.is_met() => "DEGRADED",
            _ => "OK",
        };
        writeln!(
            f,
            "{:<20} {:<6} cutoff {:>12.3} Hz  |H(target)| {:.6}  {}",
            outcome.name,
            outcome.method.as_str(),
            outcome.design.cutoff().0,
            outcome.achieved_magnitude,
            status
        )?;
    }

    tracing::info!("Wrote summary to {:?}", index_path);

    Ok(())
}

/// Write a response curve as CSV.
pub fn write_response(points: &[FrequencyResponsePoint], path: &Path) -> Result<()> {
    std::fs::write(path, render_response_csv(points))?;
    tracing::info!("Wrote response curve to {:?} ({} points)", path, points.len());
    Ok(())
}
