// electrode/components.rs
// Passive cell components: current collectors, separator, electrolyte

use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{require, CellResult};
use crate::quantity::Quantity;
use crate::units;

/// Metal foil carrying the composite coating.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CurrentCollector {
    pub name: String,
    pub thickness: Quantity,
    pub density: Quantity,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CurrentCollectorSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub thickness: Option<Quantity>,
    /// Defaults to the bulk density for `Cu` and `Al`.
    #[serde(default)]
    pub density: Option<Quantity>,
}

/// Bulk density of common foil metals.
pub fn foil_density(name: &str) -> Option<Quantity> {
    let density = match name {
        "Cu" => config::COPPER_DENSITY,
        "Al" => config::ALUMINUM_DENSITY,
        _ => return None,
    };
    Some(Quantity::new(density, units::grams_per_cubic_centimeter()))
}

impl CurrentCollectorSpec {
    pub fn build(&self) -> CellResult<CurrentCollector> {
        const RECORD: &str = "current collector";
        let name = require(self.name.clone(), RECORD, "name")?;
        let density = self.density.clone().or_else(|| foil_density(&name));
        let collector = CurrentCollector {
            thickness: require(self.thickness.clone(), RECORD, "thickness")?,
            density: require(density, RECORD, "density")?,
            name,
        };
        collector.thickness.ensure_commensurable(&units::micrometers())?;
        collector.density.ensure_commensurable(&units::grams_per_cubic_centimeter())?;
        Ok(collector)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Separator {
    pub name: String,
    pub thickness: Quantity,
    pub porosity: Quantity,
    pub density: Quantity,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SeparatorSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub thickness: Option<Quantity>,
    #[serde(default)]
    pub porosity: Option<Quantity>,
    #[serde(default)]
    pub density: Option<Quantity>,
}

impl SeparatorSpec {
    pub fn build(&self) -> CellResult<Separator> {
        const RECORD: &str = "separator";
        let separator = Separator {
            name: require(self.name.clone(), RECORD, "name")?,
            thickness: require(self.thickness.clone(), RECORD, "thickness")?,
            porosity: require(self.porosity.clone(), RECORD, "porosity")?,
            density: require(self.density.clone(), RECORD, "density")?,
        };
        separator.thickness.ensure_commensurable(&units::micrometers())?;
        separator.porosity.ensure_commensurable(&crate::units::Unit::dimensionless())?;
        separator.density.ensure_commensurable(&units::grams_per_cubic_centimeter())?;
        Ok(separator)
    }
}

/// Liquid electrolyte. Density follows a linear fit in salt concentration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Electrolyte {
    pub name: String,
    pub concentration: Quantity,
    pub density: Quantity,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ElectrolyteSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub concentration: Option<Quantity>,
}

/// ρ = 0.091 (g/cm³)/(mol/L) · c + 1.1 g/cm³
pub fn electrolyte_density(concentration: &Quantity) -> CellResult<Quantity> {
    let c = concentration.to(&units::moles_per_liter())?;
    let slope = Quantity::new(
        config::ELECTROLYTE_DENSITY_SLOPE,
        units::grams_per_cubic_centimeter().div(&units::moles_per_liter()),
    );
    let base = Quantity::new(config::ELECTROLYTE_DENSITY_BASE, units::grams_per_cubic_centimeter());
    base.try_add(&(&slope * &c))
}

impl ElectrolyteSpec {
    pub fn build(&self) -> CellResult<Electrolyte> {
        const RECORD: &str = "electrolyte";
        let name = require(self.name.clone(), RECORD, "name")?;
        let concentration = require(self.concentration.clone(), RECORD, "concentration")?
            .to(&units::moles_per_liter())?;
        let density = electrolyte_density(&concentration)?;
        Ok(Electrolyte {
            name,
            concentration,
            density,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CellError;

    #[test]
    fn copper_density_defaults_from_name() {
        let cc = CurrentCollectorSpec {
            name: Some("Cu".to_string()),
            thickness: Some(Quantity::parse(8.0, "um").unwrap()),
            density: None,
        }
        .build()
        .unwrap();
        assert_eq!(cc.density.nominal(), config::COPPER_DENSITY);
    }

    #[test]
    fn unknown_foil_needs_explicit_density() {
        let err = CurrentCollectorSpec {
            name: Some("Ni".to_string()),
            thickness: Some(Quantity::parse(10.0, "um").unwrap()),
            density: None,
        }
        .build()
        .unwrap_err();
        assert!(matches!(err, CellError::MissingField { field: "density", .. }));
    }

    #[test]
    fn separator_requires_every_field() {
        let err = SeparatorSpec {
            name: Some("PE".to_string()),
            thickness: Some(Quantity::parse(12.0, "um").unwrap()),
            porosity: None,
            density: Some(Quantity::parse(0.95, "g/cm^3").unwrap()),
        }
        .build()
        .unwrap_err();
        assert!(matches!(err, CellError::MissingField { record: "separator", field: "porosity" }));
    }

    #[test]
    fn electrolyte_density_from_molarity() {
        let e = ElectrolyteSpec {
            name: Some("LP30".to_string()),
            concentration: Some(Quantity::parse(1.0, "M").unwrap()),
        }
        .build()
        .unwrap();
        let rho = e.density.value_in(&units::grams_per_cubic_centimeter()).unwrap();
        assert!((rho - 1.191).abs() < 1e-12);
    }

    #[test]
    fn electrolyte_concentration_accepts_millimolar_units() {
        let e = ElectrolyteSpec {
            name: Some("dilute".to_string()),
            concentration: Some(Quantity::parse(500.0, "mmol/L").unwrap()),
        }
        .build()
        .unwrap();
        assert!((e.concentration.nominal() - 0.5).abs() < 1e-12);
    }
}
