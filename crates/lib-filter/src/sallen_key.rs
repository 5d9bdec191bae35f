//! Unity-gain Sallen-Key component selection.
//!
//! With equal resistors and equal capacitors the second-order section has its
//! cutoff at `fc = 1 / (2π·R·C)`, so fixing `R` determines `C`.

use crate::error::{DesignError, DesignResult};
use lib_types::{Farads, Hertz, Ohms};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Equal-component Sallen-Key values for one cutoff.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SallenKeyComponents {
    pub resistance: Ohms,
    pub capacitance: Farads,
}

/// Capacitor value `C = 1 / (2π·fc·R)`.
pub fn capacitance(cutoff: Hertz, resistance: Ohms) -> DesignResult<Farads> {
    if !cutoff.is_finite() || cutoff.0 <= 0.0 {
        return Err(DesignError::invalid(
            "cutoff",
            format!("must be a positive frequency, got {}", cutoff.0),
        ));
    }
    if !resistance.0.is_finite() || resistance.0 <= 0.0 {
        return Err(DesignError::invalid(
            "resistance",
            format!("must be positive, got {} ohm", resistance.0),
        ));
    }
    Ok(Farads(1.0 / (2.0 * PI * cutoff.0 * resistance.0)))
}

impl SallenKeyComponents {
    /// Components for `cutoff` with the given resistor value.
    pub fn for_cutoff(cutoff: Hertz, resistance: Ohms) -> DesignResult<Self> {
        Ok(Self {
            resistance,
            capacitance: capacitance(cutoff, resistance)?,
        })
    }

    /// Cutoff realized by these components.
    pub fn cutoff(&self) -> Hertz {
        Hertz(1.0 / (2.0 * PI * self.resistance.0 * self.capacitance.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacitance_1k() {
        let c = capacitance(Hertz(1000.0), Ohms::R_1K).unwrap();
        assert!((c.as_nf() - 159.15494309189535).abs() < 1e-9);
    }

    #[test]
    fn test_components_roundtrip_cutoff() {
        let parts = SallenKeyComponents::for_cutoff(Hertz(223.6), Ohms::from_kohm(4.7)).unwrap();
        assert!((parts.cutoff().0 - 223.6).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(capacitance(Hertz(0.0), Ohms::R_1K).is_err());
        assert!(capacitance(Hertz(100.0), Ohms(-1.0)).is_err());
    }
}
