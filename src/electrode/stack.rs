// electrode/stack.rs
// Electrodes and the repeating positive/separator/negative stack

use log::warn;
use serde::{Deserialize, Serialize};

use crate::composite::{Composite, CompositeSpec};
use crate::config::CompletionSettings;
use crate::error::{require, CellResult};
use crate::quantity::Quantity;
use crate::units;

use super::components::{CurrentCollector, CurrentCollectorSpec, Electrolyte, ElectrolyteSpec, Separator, SeparatorSpec};
use super::material::ElectrodeRole;

/// A completed composite coated on a current collector.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Electrode {
    pub composite: Composite,
    pub current_collector: CurrentCollector,
}

pub fn make_electrode(composite: Composite, current_collector: CurrentCollector) -> Electrode {
    Electrode {
        composite,
        current_collector,
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ElectrodeSpec {
    pub composite: CompositeSpec,
    pub current_collector: CurrentCollectorSpec,
}

impl ElectrodeSpec {
    pub fn build(&self, settings: &CompletionSettings) -> CellResult<Electrode> {
        let composite = self.composite.complete(settings)?;
        let current_collector = self.current_collector.build()?;
        Ok(make_electrode(composite, current_collector))
    }
}

/// Number of composite coatings per current collector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoatingSides {
    Single,
    Double,
}

impl CoatingSides {
    pub fn factor(&self) -> f64 {
        match self {
            CoatingSides::Single => 1.0,
            CoatingSides::Double => 2.0,
        }
    }
}

/// Positive electrode, negative electrode, separator and electrolyte.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CellStack {
    pub positive: Electrode,
    pub negative: Electrode,
    pub separator: Separator,
    pub electrolyte: Electrolyte,
}

pub fn make_cell_stack(
    positive: Electrode,
    negative: Electrode,
    separator: Separator,
    electrolyte: Electrolyte,
) -> CellStack {
    warn_on_swapped_role(&positive, ElectrodeRole::Cathode, "positive");
    warn_on_swapped_role(&negative, ElectrodeRole::Anode, "negative");
    CellStack {
        positive,
        negative,
        separator,
        electrolyte,
    }
}

fn warn_on_swapped_role(electrode: &Electrode, expected: ElectrodeRole, side: &str) {
    if let Some(preset) = electrode.composite.active().preset() {
        if preset.role() != expected {
            warn!(
                "{} electrode uses {} which is normally an {:?} material",
                side,
                preset.display_name(),
                preset.role()
            );
        }
    }
}

impl CellStack {
    /// Thickness of one repeat unit of the stack.
    ///
    /// Double-sided coating puts two composite layers and two separators in
    /// each repeat; single-sided puts one of each.
    pub fn repeat_thickness(&self, sides: CoatingSides) -> CellResult<Quantity> {
        let k = sides.factor();
        let um = units::micrometers();
        let total = (self.positive.composite.thickness() * k)
            .to(&um)?
            .try_add(&self.positive.current_collector.thickness)?
            .try_add(&(self.negative.composite.thickness() * k))?
            .try_add(&self.negative.current_collector.thickness)?
            .try_add(&(&self.separator.thickness * k))?;
        Ok(total)
    }

    /// Per-layer thicknesses of one repeat, in µm, in stacking order.
    pub fn layer_thicknesses(&self, sides: CoatingSides) -> CellResult<Vec<(&'static str, Quantity)>> {
        let um = units::micrometers();
        let mut layers = Vec::new();
        let coating = |label: &'static str, t: &Quantity| -> CellResult<(&'static str, Quantity)> {
            Ok((label, t.to(&um)?))
        };

        layers.push(coating("positive current collector", &self.positive.current_collector.thickness)?);
        layers.push(coating("positive composite", self.positive.composite.thickness())?);
        layers.push(coating("separator", &self.separator.thickness)?);
        layers.push(coating("negative composite", self.negative.composite.thickness())?);
        layers.push(coating("negative current collector", &self.negative.current_collector.thickness)?);
        if sides == CoatingSides::Double {
            layers.push(coating("negative composite", self.negative.composite.thickness())?);
            layers.push(coating("separator", &self.separator.thickness)?);
            layers.push(coating("positive composite", self.positive.composite.thickness())?);
        }
        Ok(layers)
    }

    /// Negative over positive areal capacity, nominal values only.
    pub fn np_ratio(&self) -> CellResult<f64> {
        let mah_cm2 = units::milliamp_hours_per_square_centimeter();
        let negative = self.negative.composite.areal_capacity().value_in(&mah_cm2)?;
        let positive = self.positive.composite.areal_capacity().value_in(&mah_cm2)?;
        Ok(negative / positive)
    }

    /// Positive minus negative average voltage.
    pub fn average_voltage(&self) -> CellResult<Quantity> {
        self.positive
            .composite
            .active()
            .average_voltage()
            .try_sub(self.negative.composite.active().average_voltage())
    }
}

/// Cell stack as written in a design file. Every part is mandatory.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CellStackSpec {
    #[serde(default)]
    pub positive: Option<ElectrodeSpec>,
    #[serde(default)]
    pub negative: Option<ElectrodeSpec>,
    #[serde(default)]
    pub separator: Option<SeparatorSpec>,
    #[serde(default)]
    pub electrolyte: Option<ElectrolyteSpec>,
}

impl CellStackSpec {
    pub fn build(&self, settings: &CompletionSettings) -> CellResult<CellStack> {
        const RECORD: &str = "cell stack";
        let positive = require(self.positive.as_ref(), RECORD, "positive")?.build(settings)?;
        let negative = require(self.negative.as_ref(), RECORD, "negative")?.build(settings)?;
        let separator = require(self.separator.as_ref(), RECORD, "separator")?.build()?;
        let electrolyte = require(self.electrolyte.as_ref(), RECORD, "electrolyte")?.build()?;
        Ok(make_cell_stack(positive, negative, separator, electrolyte))
    }
}
