// cell/cylindrical.rs
// Wound cylindrical cell: jellyroll length from an Archimedes spiral

use std::f64::consts::PI;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::electrode::CellStack;
use crate::error::{CellError, CellResult};
use crate::profile_scope;
use crate::quantity::Quantity;
use crate::units::{self, Unit};

use super::{ensure_positive, Cell, CellFormat, CellGeometry, FormationFactors, Jellyroll};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CylindricalGeometry {
    /// Outer can diameter.
    pub diameter: Quantity,
    /// Outer can height.
    pub height: Quantity,
    pub can_thickness: Quantity,
    pub can_density: Quantity,
    /// Hollow core left by the winding mandrel.
    pub mandrel_diameter: Quantity,
    /// Space above the jellyroll reserved for tabs and the cap.
    pub headspace: Quantity,
    /// Tabs, cap and anything else not modelled.
    pub extra_mass: Quantity,
}

/// Arc length of r = aθ from 0 to θ.
fn spiral_length(a: &Quantity, theta: &Quantity) -> CellResult<Quantity> {
    let theta = theta.to(&Unit::dimensionless())?;
    let root = theta.powi(2).try_add(&Quantity::dimensionless(1.0))?.sqrt()?;
    // ln(θ + √(1+θ²)) is taken at the nominal value
    let log_term = Quantity::dimensionless(theta.nominal().asinh());
    Ok(a / 2.0 * (&theta * &root).try_add(&log_term)?)
}

impl CylindricalGeometry {
    /// Diameter available to the jellyroll inside the can wall.
    pub fn inner_diameter(&self) -> CellResult<Quantity> {
        self.diameter.try_sub(&(&self.can_thickness * 2.0))
    }

    pub fn winding_height(&self) -> CellResult<Quantity> {
        self.height
            .try_sub(&self.headspace)?
            .try_sub(&(&self.can_thickness * 2.0))
    }

    /// Length of electrode wound between the mandrel and the can wall for a
    /// stack repeat of the given thickness.
    pub fn winding_length(&self, stack_thickness: &Quantity) -> CellResult<Quantity> {
        let cm = units::centimeters();
        let stack = stack_thickness.to(&cm)?;
        let a = &stack / (2.0 * PI);
        let theta_outer = self.inner_diameter()?.to(&cm)? / 2.0 * (2.0 * PI) / &stack;
        let theta_inner = self.mandrel_diameter.to(&cm)? / 2.0 * (2.0 * PI) / &stack;
        spiral_length(&a, &theta_outer)?
            .to(&cm)?
            .try_sub(&spiral_length(&a, &theta_inner)?)
    }

    fn validate(&self) -> CellResult<()> {
        let cm = units::centimeters();
        for (q, field) in [
            (&self.diameter, "diameter"),
            (&self.height, "height"),
            (&self.can_thickness, "can_thickness"),
        ] {
            q.ensure_commensurable(&cm)?;
            ensure_positive(q, field)?;
        }
        self.mandrel_diameter.ensure_commensurable(&cm)?;
        self.headspace.ensure_commensurable(&cm)?;
        self.can_density
            .ensure_commensurable(&units::grams_per_cubic_centimeter())?;
        self.extra_mass.ensure_commensurable(&units::grams())?;

        let inner = self.inner_diameter()?;
        let mandrel = self.mandrel_diameter.value_in(&cm)?;
        if mandrel < 0.0 || inner.value_in(&cm)? <= mandrel {
            return Err(CellError::InvalidValue {
                field: "mandrel_diameter",
                reason: format!("{} leaves no room inside a {} can interior", self.mandrel_diameter, inner),
            });
        }
        ensure_positive(&self.winding_height()?, "headspace")
    }

    /// ρ·t·(πDH + 2π(D/2)²) + extra
    pub fn can_mass(&self) -> CellResult<Quantity> {
        let radius = &self.diameter / 2.0;
        let wall = &self.diameter * &self.height * PI;
        let ends = radius.powi(2) * (2.0 * PI);
        let shell = wall.try_add(&ends)?;
        (&self.can_density * &self.can_thickness * shell)
            .to(&units::grams())?
            .try_add(&self.extra_mass)
    }

    /// π(D/2)²H
    pub fn volume(&self) -> CellResult<Quantity> {
        ((&self.diameter / 2.0).powi(2) * PI * &self.height).to(&units::cubic_centimeters())
    }
}

pub fn compute_cylindrical_cell(
    stack: &CellStack,
    geometry: &CylindricalGeometry,
    formation: &FormationFactors,
) -> CellResult<Cell> {
    profile_scope!("cylindrical_cell");
    geometry.validate()?;

    let format = CellFormat::Cylindrical;
    let stack_thickness = stack.repeat_thickness(format.coating())?;
    ensure_positive(&stack_thickness, "stack_thickness")?;

    let winding = geometry.winding_length(&stack_thickness)?;
    let area = (geometry.winding_height()? * &winding).to(&units::square_centimeters())?;
    debug!("jellyroll winding {} over {}", winding, area);

    let jelly = Jellyroll::compute(stack, &area, format.coating(), formation)?;
    let mass = jelly.breakdown(geometry.can_mass()?)?;

    Ok(Cell {
        name: String::new(),
        format,
        stack: stack.clone(),
        geometry: CellGeometry::Cylindrical(geometry.clone()),
        formation: formation.clone(),
        area,
        capacity: jelly.capacity,
        energy: jelly.energy,
        volume: geometry.volume()?,
        stack_thickness: jelly.stack_thickness,
        depth: None,
        average_voltage: jelly.average_voltage,
        np_ratio: stack.np_ratio()?,
        mass,
    })
}
