// composite/field.rs
// The five interdependent composite quantities and their partial container

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::quantity::Quantity;
use crate::units::{self, Unit};

/// A quantity of the coated composite layer that the engine can infer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeField {
    Porosity,
    ArealLoading,
    ArealCapacity,
    Density,
    Thickness,
}

impl CompositeField {
    /// Order in which missing fields are derived. Later fields may use
    /// values derived earlier in the same pass.
    pub const COMPLETION_ORDER: [CompositeField; 5] = [
        CompositeField::Porosity,
        CompositeField::ArealLoading,
        CompositeField::ArealCapacity,
        CompositeField::Density,
        CompositeField::Thickness,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CompositeField::Porosity => "porosity",
            CompositeField::ArealLoading => "areal_loading",
            CompositeField::ArealCapacity => "areal_capacity",
            CompositeField::Density => "density",
            CompositeField::Thickness => "thickness",
        }
    }

    /// Unit that derived values are stored in.
    pub fn canonical_unit(&self) -> Unit {
        match self {
            CompositeField::Porosity => Unit::dimensionless(),
            CompositeField::ArealLoading => units::grams_per_square_centimeter(),
            CompositeField::ArealCapacity => units::milliamp_hours_per_square_centimeter(),
            CompositeField::Density => units::grams_per_cubic_centimeter(),
            CompositeField::Thickness => units::micrometers(),
        }
    }
}

impl fmt::Display for CompositeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Values of the five composite fields, any of which may be unset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub porosity: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub areal_loading: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub areal_capacity: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<Quantity>,
}

impl CompositeFields {
    pub fn get(&self, field: CompositeField) -> Option<&Quantity> {
        match field {
            CompositeField::Porosity => self.porosity.as_ref(),
            CompositeField::ArealLoading => self.areal_loading.as_ref(),
            CompositeField::ArealCapacity => self.areal_capacity.as_ref(),
            CompositeField::Density => self.density.as_ref(),
            CompositeField::Thickness => self.thickness.as_ref(),
        }
    }

    fn slot(&mut self, field: CompositeField) -> &mut Option<Quantity> {
        match field {
            CompositeField::Porosity => &mut self.porosity,
            CompositeField::ArealLoading => &mut self.areal_loading,
            CompositeField::ArealCapacity => &mut self.areal_capacity,
            CompositeField::Density => &mut self.density,
            CompositeField::Thickness => &mut self.thickness,
        }
    }

    pub fn set(&mut self, field: CompositeField, value: Quantity) {
        *self.slot(field) = Some(value);
    }

    pub fn clear(&mut self, field: CompositeField) {
        *self.slot(field) = None;
    }

    /// Builder-style setter.
    pub fn with(mut self, field: CompositeField, value: Quantity) -> Self {
        self.set(field, value);
        self
    }

    pub fn is_known(&self, field: CompositeField) -> bool {
        self.get(field).is_some()
    }

    pub fn known(&self) -> Vec<CompositeField> {
        CompositeField::COMPLETION_ORDER
            .into_iter()
            .filter(|f| self.is_known(*f))
            .collect()
    }

    pub fn missing(&self) -> Vec<CompositeField> {
        CompositeField::COMPLETION_ORDER
            .into_iter()
            .filter(|f| !self.is_known(*f))
            .collect()
    }
}
