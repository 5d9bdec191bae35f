//! Target-frequency design example.
//!
//! This example demonstrates:
//! 1. Resolving an analog Butterworth cutoff in closed form
//! 2. Sizing a Sallen-Key stage for it
//! 3. Mapping the same design to digital IIR coefficients
//! 4. Searching a 20-tap FIR for the same target

use lib_filter::{
    AnalogCutoffSolver, DigitalSearchSolver, IirBridge, SallenKeyComponents, SearchConfig,
};
use lib_types::{Band, FilterKind, FilterSpec, Hertz, Ohms};

fn main() -> anyhow::Result<()> {
    println!("=== targetfit design example ===\n");

    // 1 kHz must sit in the rejection band of a 2nd order lowpass
    let spec = FilterSpec::new(Hertz(1000.0), 2, FilterKind::Lowpass, 0.05, Band::Stop);

    println!("Resolving analog cutoff...");
    let solver = AnalogCutoffSolver::new();
    let analog = solver.solve(&spec)?;
    println!("  Cutoff: {:.2}", analog.cutoff());
    println!("  Stopband edge: {:.2}", analog.stopband_edge());
    println!("  Passband edge: {:.2}", analog.passband_edge());
    println!("  |H(target)|: {:.4}", solver.magnitude(&analog, spec.target));

    let parts = SallenKeyComponents::for_cutoff(analog.cutoff(), Ohms::R_1K)?;
    println!("  Sallen-Key C at 1 kOhm: {:.2} nF", parts.capacitance.as_nf());

    println!("\nMapping to digital IIR at 20 kHz...");
    let iir = IirBridge::new().design(&spec, Hertz(20_000.0))?;
    println!("  b = {:?}", iir.tf.b);
    println!("  a = {:?}", iir.tf.a);
    println!("  |H(target)|: {:.4}", iir.achieved_magnitude);

    println!("\nSearching 20-tap FIR at 1 kHz for a 100 Hz stopband target...");
    let fir_spec = FilterSpec::new(Hertz(100.0), 20, FilterKind::Lowpass, 0.05, Band::Stop);
    let fir = DigitalSearchSolver::new(SearchConfig::default()).solve(&fir_spec, Hertz(1000.0))?;
    println!("  Cutoff: {:.3}", fir.design.cutoff());
    println!("  |H(target)|: {:.4}", fir.achieved_magnitude);
    println!("  Quality: {}", fir.quality);
    println!("  Evaluations: {}", fir.evaluations);

    Ok(())
}
