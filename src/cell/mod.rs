// cell/mod.rs
// Cell-level roll-up: capacity, energy, component masses, volume
//
// Three formats share the same jellyroll bookkeeping and differ only in how
// the active area, casing mass and envelope volume are computed.

pub mod cylindrical;
pub mod pouch;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config;
use crate::electrode::{CellStack, CoatingSides};
use crate::error::{CellError, CellResult};
use crate::quantity::Quantity;
use crate::units;

pub use cylindrical::{compute_cylindrical_cell, CylindricalGeometry};
pub use pouch::{compute_pouch_cell, compute_single_layer_pouch_cell, PouchGeometry, TabLocation};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellFormat {
    Cylindrical,
    PouchStacked,
    PouchSingleLayer,
}

impl CellFormat {
    pub fn coating(&self) -> CoatingSides {
        match self {
            CellFormat::Cylindrical | CellFormat::PouchStacked => CoatingSides::Double,
            CellFormat::PouchSingleLayer => CoatingSides::Single,
        }
    }
}

impl fmt::Display for CellFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CellFormat::Cylindrical => "cylindrical",
            CellFormat::PouchStacked => "pouch stacked",
            CellFormat::PouchSingleLayer => "pouch single layer",
        })
    }
}

/// Formation losses and electrolyte fill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormationFactors {
    /// Fraction of capacity retained after formation.
    #[serde(default = "default_loss_factor")]
    pub loss_factor: f64,
    /// Electrolyte volume per unit capacity, typically ~1.8 mL/Ah.
    pub electrolyte_ratio: Quantity,
}

fn default_loss_factor() -> f64 {
    config::DEFAULT_FORMATION_LOSS_FACTOR
}

impl FormationFactors {
    pub fn new(electrolyte_ratio: Quantity) -> Self {
        Self {
            loss_factor: config::DEFAULT_FORMATION_LOSS_FACTOR,
            electrolyte_ratio,
        }
    }

    fn validate(&self) -> CellResult<()> {
        if !(self.loss_factor > 0.0 && self.loss_factor <= 1.0) {
            return Err(CellError::InvalidValue {
                field: "loss_factor",
                reason: format!("{} is outside (0, 1]", self.loss_factor),
            });
        }
        self.electrolyte_ratio
            .ensure_commensurable(&units::milliliters_per_ampere_hour())
    }
}

/// Mass of every cell component, in grams.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MassBreakdown {
    pub case: Quantity,
    pub electrolyte: Quantity,
    pub positive: Quantity,
    pub positive_cc: Quantity,
    pub negative: Quantity,
    pub negative_cc: Quantity,
    pub separator: Quantity,
    pub jellyroll: Quantity,
    pub total: Quantity,
}

impl MassBreakdown {
    /// Components that add up to the total, in display order.
    pub fn components(&self) -> [(&'static str, &Quantity); 7] {
        [
            ("case", &self.case),
            ("electrolyte", &self.electrolyte),
            ("positive", &self.positive),
            ("positive_cc", &self.positive_cc),
            ("negative", &self.negative),
            ("negative_cc", &self.negative_cc),
            ("separator", &self.separator),
        ]
    }

    pub fn as_map(&self) -> BTreeMap<&'static str, Quantity> {
        let mut map: BTreeMap<_, _> = self
            .components()
            .into_iter()
            .map(|(k, v)| (k, v.clone()))
            .collect();
        map.insert("jellyroll", self.jellyroll.clone());
        map.insert("total", self.total.clone());
        map
    }

    /// Percent of the total mass per component.
    pub fn fractions(&self) -> Vec<(&'static str, f64)> {
        let total = self.total.nominal();
        self.components()
            .into_iter()
            .map(|(k, v)| (k, 100.0 * v.nominal() / total))
            .collect()
    }
}

/// Geometry the cell was computed from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellGeometry {
    Cylindrical(CylindricalGeometry),
    Pouch(PouchGeometry),
}

/// A fully computed cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Cell {
    pub name: String,
    pub format: CellFormat,
    pub stack: CellStack,
    pub geometry: CellGeometry,
    pub formation: FormationFactors,
    /// Electrode area facing the counter electrode, cm².
    pub area: Quantity,
    /// Ah
    pub capacity: Quantity,
    /// Wh
    pub energy: Quantity,
    /// cm³
    pub volume: Quantity,
    /// Repeat-unit thickness, µm.
    pub stack_thickness: Quantity,
    /// Pouch depth including the laminate, cm. Not set for cylindrical cells.
    pub depth: Option<Quantity>,
    pub average_voltage: Quantity,
    pub np_ratio: f64,
    pub mass: MassBreakdown,
}

impl Cell {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Component masses and capacity that only depend on the stack and area.
pub(crate) struct Jellyroll {
    pub capacity: Quantity,
    pub energy: Quantity,
    pub average_voltage: Quantity,
    pub stack_thickness: Quantity,
    pub electrolyte: Quantity,
    pub positive: Quantity,
    pub positive_cc: Quantity,
    pub negative: Quantity,
    pub negative_cc: Quantity,
    pub separator: Quantity,
}

impl Jellyroll {
    pub fn compute(
        stack: &CellStack,
        area: &Quantity,
        sides: CoatingSides,
        formation: &FormationFactors,
    ) -> CellResult<Jellyroll> {
        formation.validate()?;
        let k = sides.factor();
        let g = units::grams();

        let limiting = stack
            .positive
            .composite
            .areal_capacity()
            .min_nominal(stack.negative.composite.areal_capacity())?;
        let capacity = (limiting * (formation.loss_factor * k) * area).to(&units::ampere_hours())?;
        let average_voltage = stack.average_voltage()?;
        let energy = (&capacity * &average_voltage).to(&units::watt_hours())?;

        let coating_mass = |t: &Quantity, rho: &Quantity| (area * (t * k) * rho).to(&g);
        let foil_mass = |t: &Quantity, rho: &Quantity| (area * t * rho).to(&g);

        let positive = &stack.positive;
        let negative = &stack.negative;
        Ok(Jellyroll {
            electrolyte: (&formation.electrolyte_ratio * &capacity * &stack.electrolyte.density).to(&g)?,
            positive: coating_mass(positive.composite.thickness(), positive.composite.density())?,
            positive_cc: foil_mass(&positive.current_collector.thickness, &positive.current_collector.density)?,
            negative: coating_mass(negative.composite.thickness(), negative.composite.density())?,
            negative_cc: foil_mass(&negative.current_collector.thickness, &negative.current_collector.density)?,
            separator: coating_mass(&stack.separator.thickness, &stack.separator.density)?,
            stack_thickness: stack.repeat_thickness(sides)?,
            capacity,
            energy,
            average_voltage,
        })
    }

    pub fn mass(&self) -> CellResult<Quantity> {
        self.positive
            .try_add(&self.positive_cc)?
            .try_add(&self.negative)?
            .try_add(&self.negative_cc)?
            .try_add(&self.separator)?
            .try_add(&self.electrolyte)
    }

    pub fn breakdown(&self, case: Quantity) -> CellResult<MassBreakdown> {
        let case = case.to(&units::grams())?;
        let jellyroll = self.mass()?;
        let total = case.try_add(&jellyroll)?;
        Ok(MassBreakdown {
            case,
            electrolyte: self.electrolyte.clone(),
            positive: self.positive.clone(),
            positive_cc: self.positive_cc.clone(),
            negative: self.negative.clone(),
            negative_cc: self.negative_cc.clone(),
            separator: self.separator.clone(),
            jellyroll,
            total,
        })
    }
}

/// Fails with `InvalidValue` unless `q` is strictly positive.
pub(crate) fn ensure_positive(q: &Quantity, field: &'static str) -> CellResult<()> {
    if q.nominal() > 0.0 {
        Ok(())
    } else {
        Err(CellError::InvalidValue {
            field,
            reason: format!("{} must be positive", q),
        })
    }
}
