// design.rs
// Handles loading a whole-cell design from TOML and evaluating it

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::cell::{
    compute_cylindrical_cell, compute_pouch_cell, compute_single_layer_pouch_cell, Cell, CellFormat,
    CylindricalGeometry, FormationFactors, PouchGeometry,
};
use crate::config::CompletionSettings;
use crate::electrode::{CellStack, CellStackSpec, ElectrodeSpec, ElectrolyteSpec, SeparatorSpec};
use crate::error::CellResult;

/// Cell format and its geometry, tagged by `kind` in design files.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormatSpec {
    Cylindrical(CylindricalGeometry),
    Pouch(PouchGeometry),
    SingleLayerPouch(PouchGeometry),
}

impl FormatSpec {
    pub fn format(&self) -> CellFormat {
        match self {
            FormatSpec::Cylindrical(_) => CellFormat::Cylindrical,
            FormatSpec::Pouch(_) => CellFormat::PouchStacked,
            FormatSpec::SingleLayerPouch(_) => CellFormat::PouchSingleLayer,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Design {
    pub name: String,
    /// Completion tolerance and verification. Falls back to the defaults when omitted.
    #[serde(default)]
    pub completion: CompletionSettings,
    pub positive: Option<ElectrodeSpec>,
    pub negative: Option<ElectrodeSpec>,
    pub separator: Option<SeparatorSpec>,
    pub electrolyte: Option<ElectrolyteSpec>,
    pub formation: FormationFactors,
    pub format: FormatSpec,
}

impl Design {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CellResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let design = Self::from_toml_str(&content)?;
        info!("loaded design '{}' from {}", design.name, path.as_ref().display());
        Ok(design)
    }

    pub fn from_toml_str(content: &str) -> CellResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> CellResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> CellResult<()> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn stack_spec(&self) -> CellStackSpec {
        CellStackSpec {
            positive: self.positive.clone(),
            negative: self.negative.clone(),
            separator: self.separator.clone(),
            electrolyte: self.electrolyte.clone(),
        }
    }

    pub fn build_stack(&self) -> CellResult<CellStack> {
        self.stack_spec().build(&self.completion)
    }

    /// Completes both composites, assembles the stack and computes the cell.
    pub fn build(&self) -> CellResult<Cell> {
        let stack = self.build_stack()?;
        let cell = match &self.format {
            FormatSpec::Cylindrical(g) => compute_cylindrical_cell(&stack, g, &self.formation)?,
            FormatSpec::Pouch(g) => compute_pouch_cell(&stack, g, &self.formation)?,
            FormatSpec::SingleLayerPouch(g) => compute_single_layer_pouch_cell(&stack, g, &self.formation)?,
        };
        Ok(cell.with_name(self.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CellError;

    const POUCH: &str = r#"
        name = "demo pouch"

        [formation]
        electrolyte_ratio = { value = 1.8, unit = "mL/Ah" }

        [positive.composite]
        active = { preset = "nmc" }
        porosity = 0.3
        areal_capacity = { value = 3.0, unit = "mAh/cm^2" }

        [positive.current_collector]
        name = "Al"
        thickness = { value = 15, unit = "um" }

        [negative.composite]
        active = { preset = "graphite" }
        porosity = 0.3
        areal_capacity = { value = 3.3, unit = "mAh/cm^2" }

        [negative.current_collector]
        name = "Cu"
        thickness = { value = 10, unit = "um" }

        [separator]
        name = "PE"
        thickness = { value = 12, unit = "um" }
        porosity = 0.4
        density = { value = 0.95, unit = "g/cm^3" }

        [electrolyte]
        name = "LP30"
        concentration = { value = 1.0, unit = "M" }

        [format]
        kind = "pouch"
        width = { value = 10, unit = "cm" }
        height = { value = 20, unit = "cm" }
        layers = 10
        pouch_thickness = { value = 150, unit = "um" }
        pouch_density = { value = 1.5, unit = "g/cm^3" }
        clearance = { value = 1, unit = "mm" }
        tab_height = { value = 1, unit = "cm" }
        tab_width = { value = 2, unit = "cm" }
        tab_thickness = { value = 100, unit = "um" }
        positive_tab_density = { value = 2.7, unit = "g/cm^3" }
        negative_tab_density = { value = 8.9, unit = "g/cm^3" }
        extra_mass = { value = 1, unit = "g" }
    "#;

    #[test]
    fn pouch_design_builds() {
        let design = Design::from_toml_str(POUCH).unwrap();
        assert_eq!(design.format.format(), CellFormat::PouchStacked);
        assert_eq!(design.formation.loss_factor, crate::config::DEFAULT_FORMATION_LOSS_FACTOR);
        let cell = design.build().unwrap();
        assert_eq!(cell.name, "demo pouch");
        assert!((cell.capacity.nominal() - 11.4).abs() < 1e-9);
    }

    #[test]
    fn design_survives_toml_round_trip() {
        let design = Design::from_toml_str(POUCH).unwrap();
        let text = design.to_toml_string().unwrap();
        let again = Design::from_toml_str(&text).unwrap();
        assert_eq!(design.build().unwrap().mass.total, again.build().unwrap().mass.total);
    }

    #[test]
    fn missing_electrolyte_is_reported() {
        let text = POUCH.replace("[electrolyte]", "[unused]");
        let design = Design::from_toml_str(&text).unwrap();
        let err = design.build().unwrap_err();
        assert!(matches!(err, CellError::MissingField { field: "electrolyte", .. }));
    }

    #[test]
    fn unknown_format_kind_fails_to_parse() {
        let text = POUCH.replace("kind = \"pouch\"", "kind = \"prismatic\"");
        assert!(matches!(Design::from_toml_str(&text), Err(CellError::Toml(_))));
    }
}
