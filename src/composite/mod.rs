// composite/mod.rs
// Electrode composite layer: active material plus porosity, loading,
// capacity, density and thickness. Any two independent fields determine
// the rest.

pub mod engine;
pub mod field;
pub mod identities;


use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{self, CompletionSettings};
use crate::electrode::material::{ActiveMaterial, ActiveMaterialSpec};
use crate::error::{CellError, CellResult};
use crate::quantity::Quantity;

pub use engine::{complete_fields, derive_candidates, reconcile, Derivation};
pub use field::{CompositeField, CompositeFields};
pub use identities::{identities_for, Constants, Identity, IDENTITIES};

/// A fully specified composite. Every field is present and, unless supplied
/// values were inconsistent with each other, agrees with every identity.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Composite {
    active: ActiveMaterial,
    active_fraction: f64,
    porosity: Quantity,
    areal_loading: Quantity,
    areal_capacity: Quantity,
    density: Quantity,
    thickness: Quantity,
    #[serde(skip)]
    supplied: Vec<CompositeField>,
}

impl Composite {
    pub fn active(&self) -> &ActiveMaterial {
        &self.active
    }

    pub fn active_fraction(&self) -> f64 {
        self.active_fraction
    }

    pub fn porosity(&self) -> &Quantity {
        &self.porosity
    }

    pub fn areal_loading(&self) -> &Quantity {
        &self.areal_loading
    }

    pub fn areal_capacity(&self) -> &Quantity {
        &self.areal_capacity
    }

    pub fn density(&self) -> &Quantity {
        &self.density
    }

    pub fn thickness(&self) -> &Quantity {
        &self.thickness
    }

    pub fn get(&self, field: CompositeField) -> &Quantity {
        match field {
            CompositeField::Porosity => &self.porosity,
            CompositeField::ArealLoading => &self.areal_loading,
            CompositeField::ArealCapacity => &self.areal_capacity,
            CompositeField::Density => &self.density,
            CompositeField::Thickness => &self.thickness,
        }
    }

    /// Fields that were given rather than derived.
    pub fn supplied(&self) -> &[CompositeField] {
        &self.supplied
    }

    pub fn constants(&self) -> Constants {
        material_constants(&self.active, self.active_fraction)
    }

    pub fn fields(&self) -> CompositeFields {
        CompositeFields {
            porosity: Some(self.porosity.clone()),
            areal_loading: Some(self.areal_loading.clone()),
            areal_capacity: Some(self.areal_capacity.clone()),
            density: Some(self.density.clone()),
            thickness: Some(self.thickness.clone()),
        }
    }

    /// Checks every identity against the stored values, including those that
    /// were supplied directly and therefore never cross-checked.
    pub fn verify(&self, relative_tolerance: f64) -> CellResult<()> {
        engine::check_consistency(&self.fields(), &self.constants(), relative_tolerance)
    }
}

fn material_constants(active: &ActiveMaterial, active_fraction: f64) -> Constants {
    Constants {
        specific_capacity: active.specific_capacity().clone(),
        effective_density: active.density() * active_fraction,
    }
}

fn validate_inputs(active_fraction: f64, known: &CompositeFields, settings: &CompletionSettings) -> CellResult<()> {
    if !(active_fraction > 0.0 && active_fraction <= 1.0) {
        return Err(CellError::InvalidValue {
            field: "active_fraction",
            reason: format!("{} is outside (0, 1]", active_fraction),
        });
    }
    if !(settings.relative_tolerance >= 0.0) {
        return Err(CellError::InvalidValue {
            field: "relative_tolerance",
            reason: format!("{} must be non-negative", settings.relative_tolerance),
        });
    }
    for field in known.known() {
        if let Some(q) = known.get(field) {
            q.ensure_commensurable(&field.canonical_unit())?;
            if !q.nominal().is_finite() {
                return Err(CellError::InvalidValue {
                    field: field.name(),
                    reason: format!("{} is not a finite number", q),
                });
            }
        }
    }
    if let Some(phi) = &known.porosity {
        let phi = phi.value_in(&CompositeField::Porosity.canonical_unit())?;
        if !(0.0..1.0).contains(&phi) {
            return Err(CellError::InvalidValue {
                field: "porosity",
                reason: format!("{} is outside [0, 1)", phi),
            });
        }
    }
    Ok(())
}

/// Builds a complete composite from any sufficient subset of its fields,
/// using the default tolerance.
pub fn complete_composite(
    active: ActiveMaterial,
    active_fraction: f64,
    known: CompositeFields,
) -> CellResult<Composite> {
    complete_composite_with(active, active_fraction, known, &CompletionSettings::default())
}

pub fn complete_composite_with(
    active: ActiveMaterial,
    active_fraction: f64,
    known: CompositeFields,
    settings: &CompletionSettings,
) -> CellResult<Composite> {
    validate_inputs(active_fraction, &known, settings)?;
    let constants = material_constants(&active, active_fraction);
    let supplied = known.known();
    debug!(
        "completing composite of {} from {:?}",
        active.name(),
        supplied.iter().map(|f| f.name()).collect::<Vec<_>>()
    );

    let completed = complete_fields(&known, &constants, settings)?;
    let take = |field: CompositeField| {
        completed
            .get(field)
            .cloned()
            .ok_or(CellError::Underspecified { field: field.name() })
    };

    let composite = Composite {
        porosity: take(CompositeField::Porosity)?,
        areal_loading: take(CompositeField::ArealLoading)?,
        areal_capacity: take(CompositeField::ArealCapacity)?,
        density: take(CompositeField::Density)?,
        thickness: take(CompositeField::Thickness)?,
        active,
        active_fraction,
        supplied,
    };

    if settings.verify_supplied {
        composite.verify(settings.relative_tolerance)?;
    }
    Ok(composite)
}

/// Composite as written in a design file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CompositeSpec {
    pub active: ActiveMaterialSpec,
    /// Defaults to `config::DEFAULT_ACTIVE_FRACTION`.
    #[serde(default)]
    pub active_fraction: Option<f64>,
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

impl CompositeSpec {
    pub fn known_fields(&self) -> CompositeFields {
        CompositeFields {
            porosity: self.porosity.clone(),
            areal_loading: self.areal_loading.clone(),
            areal_capacity: self.areal_capacity.clone(),
            density: self.density.clone(),
            thickness: self.thickness.clone(),
        }
    }

    pub fn set(&mut self, field: CompositeField, value: Option<Quantity>) {
        let slot = match field {
            CompositeField::Porosity => &mut self.porosity,
            CompositeField::ArealLoading => &mut self.areal_loading,
            CompositeField::ArealCapacity => &mut self.areal_capacity,
            CompositeField::Density => &mut self.density,
            CompositeField::Thickness => &mut self.thickness,
        };
        *slot = value;
    }

    pub fn complete(&self, settings: &CompletionSettings) -> CellResult<Composite> {
        let active = self.active.build()?;
        let fraction = self.active_fraction.unwrap_or(config::DEFAULT_ACTIVE_FRACTION);
        complete_composite_with(active, fraction, self.known_fields(), settings)
    }
}
