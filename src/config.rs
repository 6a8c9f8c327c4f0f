// Centralized configuration for cell design parameters

use serde::{Deserialize, Serialize};

// ====================
// Composite Completion
// ====================
/// Fraction of the composite mass that is active material when unspecified.
/// Binder and conductive additive are not modeled separately.
pub const DEFAULT_ACTIVE_FRACTION: f64 = 0.95;
/// Maximum relative disagreement between derivations of the same field.
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 0.001;

// ====================
// Cell Formation
// ====================
/// Fraction of capacity retained after formation losses.
pub const DEFAULT_FORMATION_LOSS_FACTOR: f64 = 0.95;

// ====================
// Current Collector Densities (g/cm³)
// ====================
pub const COPPER_DENSITY: f64 = 8.96;
pub const ALUMINUM_DENSITY: f64 = 2.7;

// ====================
// Electrolyte Density Model
// ====================
/// Slope of electrolyte density against salt concentration, (g/cm³)/(mol/L).
pub const ELECTROLYTE_DENSITY_SLOPE: f64 = 0.091;
/// Solvent density at zero salt concentration (g/cm³).
pub const ELECTROLYTE_DENSITY_BASE: f64 = 1.1;

/// Knobs for the composite-completion engine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletionSettings {
    /// Relative tolerance for agreement between derivations.
    #[serde(default = "default_relative_tolerance")]
    pub relative_tolerance: f64,
    /// Re-check every identity against the completed set, including fields
    /// that were supplied directly.
    #[serde(default)]
    pub verify_supplied: bool,
}

fn default_relative_tolerance() -> f64 {
    DEFAULT_RELATIVE_TOLERANCE
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            relative_tolerance: DEFAULT_RELATIVE_TOLERANCE,
            verify_supplied: false,
        }
    }
}

impl CompletionSettings {
    pub fn with_tolerance(relative_tolerance: f64) -> Self {
        Self {
            relative_tolerance,
            ..Self::default()
        }
    }
}
