// electrode/material.rs
// Active material records and typical chemistry presets

use serde::{Deserialize, Serialize};

use crate::error::{require, CellResult};
use crate::quantity::Quantity;
use crate::units;

/// Role of the electrode in the cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElectrodeRole {
    /// Negative electrode (oxidized during discharge)
    Anode,
    /// Positive electrode (reduced during discharge)
    Cathode,
}

/// Known electrode material types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialType {
    /// Lithium metal foil
    LithiumMetal,
    /// Synthetic graphite anode
    Graphite,
    /// Hard carbon (disordered carbon) anode
    HardCarbon,
    /// Silicon oxide composite anode
    SiliconOxide,
    /// Lithium titanate (Li₄Ti₅O₁₂) anode
    #[serde(rename = "lto")]
    LTO,
    /// Lithium iron phosphate (LiFePO₄) cathode
    #[serde(rename = "lfp")]
    LFP,
    /// Lithium manganese iron phosphate cathode
    #[serde(rename = "lmfp")]
    LMFP,
    /// Nickel manganese cobalt oxide (high-nickel)
    #[serde(rename = "nmc")]
    NMC,
    /// Nickel cobalt aluminum oxide cathode
    #[serde(rename = "nca")]
    NCA,
}

impl MaterialType {
    /// Get the electrode role for this material
    pub fn role(&self) -> ElectrodeRole {
        match self {
            MaterialType::LithiumMetal => ElectrodeRole::Anode,
            MaterialType::Graphite => ElectrodeRole::Anode,
            MaterialType::HardCarbon => ElectrodeRole::Anode,
            MaterialType::SiliconOxide => ElectrodeRole::Anode,
            MaterialType::LTO => ElectrodeRole::Anode,
            MaterialType::LFP => ElectrodeRole::Cathode,
            MaterialType::LMFP => ElectrodeRole::Cathode,
            MaterialType::NMC => ElectrodeRole::Cathode,
            MaterialType::NCA => ElectrodeRole::Cathode,
        }
    }

    /// Practical reversible specific capacity (mAh/g)
    pub fn specific_capacity(&self) -> f64 {
        match self {
            MaterialType::LithiumMetal => 3860.0,
            MaterialType::Graphite => 350.0,
            MaterialType::HardCarbon => 300.0,
            MaterialType::SiliconOxide => 1500.0, // SiOₓ/C blend
            MaterialType::LTO => 175.0,
            MaterialType::LFP => 160.0,
            MaterialType::LMFP => 150.0,
            MaterialType::NMC => 200.0,           // NMC811
            MaterialType::NCA => 200.0,
        }
    }

    /// Average discharge voltage (V vs Li/Li⁺)
    pub fn average_voltage(&self) -> f64 {
        match self {
            MaterialType::LithiumMetal => 0.0, // Reference electrode
            MaterialType::Graphite => 0.15,
            MaterialType::HardCarbon => 0.25,
            MaterialType::SiliconOxide => 0.35,
            MaterialType::LTO => 1.55,
            MaterialType::LFP => 3.4,
            MaterialType::LMFP => 3.7,         // Fe and Mn plateaus combined
            MaterialType::NMC => 3.8,
            MaterialType::NCA => 3.7,
        }
    }

    /// Crystallographic density (g/cm³)
    pub fn density(&self) -> f64 {
        match self {
            MaterialType::LithiumMetal => 0.534,
            MaterialType::Graphite => 2.2,
            MaterialType::HardCarbon => 1.5,
            MaterialType::SiliconOxide => 2.2,
            MaterialType::LTO => 3.5,
            MaterialType::LFP => 3.6,
            MaterialType::LMFP => 3.5,
            MaterialType::NMC => 4.7,
            MaterialType::NCA => 4.8,
        }
    }

    /// Display name for reports
    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialType::LithiumMetal => "Lithium Metal",
            MaterialType::Graphite => "Graphite",
            MaterialType::HardCarbon => "Hard Carbon",
            MaterialType::SiliconOxide => "Silicon Oxide (SiOₓ)",
            MaterialType::LTO => "LTO (Li₄Ti₅O₁₂)",
            MaterialType::LFP => "LFP (LiFePO₄)",
            MaterialType::LMFP => "LMFP (LiMn₀.₆Fe₀.₄PO₄)",
            MaterialType::NMC => "NMC (LiNiMnCoO₂)",
            MaterialType::NCA => "NCA (LiNiCoAlO₂)",
        }
    }

    /// Fully specified active material record for this preset.
    pub fn active_material(&self) -> ActiveMaterial {
        ActiveMaterial {
            name: self.display_name().to_string(),
            specific_capacity: Quantity::new(self.specific_capacity(), units::milliamp_hours_per_gram()),
            average_voltage: Quantity::new(self.average_voltage(), units::volts()),
            density: Quantity::new(self.density(), units::grams_per_cubic_centimeter()),
            preset: Some(*self),
        }
    }
}

/// Electrochemically active phase of a composite. Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActiveMaterial {
    name: String,
    specific_capacity: Quantity,
    average_voltage: Quantity,
    density: Quantity,
    #[serde(skip_serializing_if = "Option::is_none")]
    preset: Option<MaterialType>,
}

impl ActiveMaterial {
    /// Validates that each value has the expected dimensions.
    pub fn new(
        name: impl Into<String>,
        specific_capacity: Quantity,
        average_voltage: Quantity,
        density: Quantity,
    ) -> CellResult<Self> {
        specific_capacity.ensure_commensurable(&units::milliamp_hours_per_gram())?;
        average_voltage.ensure_commensurable(&units::volts())?;
        density.ensure_commensurable(&units::grams_per_cubic_centimeter())?;
        Ok(Self {
            name: name.into(),
            specific_capacity,
            average_voltage,
            density,
            preset: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn specific_capacity(&self) -> &Quantity {
        &self.specific_capacity
    }

    pub fn average_voltage(&self) -> &Quantity {
        &self.average_voltage
    }

    pub fn density(&self) -> &Quantity {
        &self.density
    }

    pub fn preset(&self) -> Option<MaterialType> {
        self.preset
    }
}

/// Partially specified active material as written in design files.
///
/// A `preset` fills whichever fields are left out; explicit fields win.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ActiveMaterialSpec {
    #[serde(default)]
    pub preset: Option<MaterialType>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub specific_capacity: Option<Quantity>,
    #[serde(default)]
    pub average_voltage: Option<Quantity>,
    #[serde(default)]
    pub density: Option<Quantity>,
}

impl ActiveMaterialSpec {
    pub fn build(&self) -> CellResult<ActiveMaterial> {
        const RECORD: &str = "active material";
        let base = self.preset.map(|p| p.active_material());
        let pick = |explicit: &Option<Quantity>, preset: Option<&Quantity>| {
            explicit.clone().or_else(|| preset.cloned())
        };

        let name = self
            .name
            .clone()
            .or_else(|| base.as_ref().map(|b| b.name.clone()));
        let specific_capacity = pick(&self.specific_capacity, base.as_ref().map(|b| &b.specific_capacity));
        let average_voltage = pick(&self.average_voltage, base.as_ref().map(|b| &b.average_voltage));
        let density = pick(&self.density, base.as_ref().map(|b| &b.density));

        let mut material = ActiveMaterial::new(
            require(name, RECORD, "name")?,
            require(specific_capacity, RECORD, "specific_capacity")?,
            require(average_voltage, RECORD, "average_voltage")?,
            require(density, RECORD, "density")?,
        )?;
        material.preset = self.preset;
        Ok(material)
    }
}

impl From<&ActiveMaterial> for ActiveMaterialSpec {
    fn from(m: &ActiveMaterial) -> Self {
        Self {
            preset: m.preset,
            name: Some(m.name.clone()),
            specific_capacity: Some(m.specific_capacity.clone()),
            average_voltage: Some(m.average_voltage.clone()),
            density: Some(m.density.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CellError;

    const ANODE_MATERIALS: &[MaterialType] = &[
        MaterialType::LithiumMetal,
        MaterialType::Graphite,
        MaterialType::HardCarbon,
        MaterialType::SiliconOxide,
        MaterialType::LTO,
    ];

    const CATHODE_MATERIALS: &[MaterialType] = &[
        MaterialType::LFP,
        MaterialType::LMFP,
        MaterialType::NMC,
        MaterialType::NCA,
    ];

    #[test]
    fn presets_are_physically_plausible() {
        for material in ANODE_MATERIALS.iter().chain(CATHODE_MATERIALS.iter()) {
            let v = material.average_voltage();
            assert!((0.0..=5.0).contains(&v), "{:?}: voltage {} out of range", material, v);
            assert!(material.density() > 0.0);
            assert!(material.specific_capacity() > 0.0);
        }
    }

    #[test]
    fn roles_match_material_lists() {
        assert!(ANODE_MATERIALS.iter().all(|m| m.role() == ElectrodeRole::Anode));
        assert!(CATHODE_MATERIALS.iter().all(|m| m.role() == ElectrodeRole::Cathode));
    }

    #[test]
    fn spec_without_preset_reports_first_missing_field() {
        let spec = ActiveMaterialSpec {
            name: Some("mystery".to_string()),
            ..Default::default()
        };
        let err = spec.build().unwrap_err();
        assert!(matches!(
            err,
            CellError::MissingField { field: "specific_capacity", .. }
        ));
    }

    #[test]
    fn explicit_fields_override_preset() {
        let spec = ActiveMaterialSpec {
            preset: Some(MaterialType::NMC),
            specific_capacity: Some(Quantity::parse(185.0, "mAh/g").unwrap()),
            ..Default::default()
        };
        let m = spec.build().unwrap();
        assert_eq!(m.specific_capacity().nominal(), 185.0);
        assert_eq!(m.density().nominal(), MaterialType::NMC.density());
        assert_eq!(m.preset(), Some(MaterialType::NMC));
    }

    #[test]
    fn wrong_dimensions_are_rejected() {
        let err = ActiveMaterial::new(
            "bad",
            Quantity::parse(170.0, "mAh/g").unwrap(),
            Quantity::parse(3.4, "V").unwrap(),
            Quantity::parse(2.2, "g/cm^2").unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, CellError::IncompatibleUnits { .. }));
    }

    #[test]
    fn preset_names_deserialize_in_snake_case() {
        #[derive(Deserialize)]
        struct Doc {
            preset: MaterialType,
        }
        let doc: Doc = toml::from_str("preset = \"nmc\"").unwrap();
        assert_eq!(doc.preset, MaterialType::NMC);
        let doc: Doc = toml::from_str("preset = \"hard_carbon\"").unwrap();
        assert_eq!(doc.preset, MaterialType::HardCarbon);
    }
}
