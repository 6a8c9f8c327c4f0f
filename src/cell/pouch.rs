// cell/pouch.rs
// Stacked and single-layer pouch cells

use log::debug;
use serde::{Deserialize, Serialize};

use crate::electrode::CellStack;
use crate::error::{CellError, CellResult};
use crate::profile_scope;
use crate::quantity::Quantity;
use crate::units;

use super::{ensure_positive, Cell, CellFormat, CellGeometry, FormationFactors, Jellyroll};

/// Where the tabs leave the pouch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabLocation {
    /// Both tabs on the top edge.
    #[default]
    Top,
    /// One tab on each side edge.
    Sides,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PouchGeometry {
    /// Electrode width.
    pub width: Quantity,
    /// Electrode height.
    pub height: Quantity,
    /// Number of repeat units in the stack.
    pub layers: u32,
    pub pouch_thickness: Quantity,
    pub pouch_density: Quantity,
    /// Sealing margin added to each edge dimension, typically ~1 mm.
    pub clearance: Quantity,
    pub tab_height: Quantity,
    pub tab_width: Quantity,
    pub tab_thickness: Quantity,
    #[serde(default)]
    pub tab_location: TabLocation,
    /// Usually aluminium, 2.7 g/cm³.
    pub positive_tab_density: Quantity,
    /// Usually nickel or copper, ~8.9 g/cm³.
    pub negative_tab_density: Quantity,
    pub extra_mass: Quantity,
}

impl PouchGeometry {
    /// Total electrode area over all layers.
    pub fn electrode_area(&self) -> CellResult<Quantity> {
        (&self.width * &self.height * f64::from(self.layers)).to(&units::square_centimeters())
    }

    fn sealed_face(&self) -> CellResult<Quantity> {
        Ok(self.width.try_add(&self.clearance)? * self.height.try_add(&self.clearance)?)
    }

    /// Volume of one tab including the length buried in the seal.
    fn tab_volume(&self) -> CellResult<Quantity> {
        Ok(self.tab_height.try_add(&self.clearance)? * &self.tab_width * &self.tab_thickness)
    }

    /// Two laminate sheets sealed together.
    pub fn pouch_mass(&self) -> CellResult<Quantity> {
        (&self.pouch_density * &self.pouch_thickness * self.sealed_face()? * 2.0).to(&units::grams())
    }

    pub fn tab_mass(&self) -> CellResult<Quantity> {
        let densities = self.positive_tab_density.try_add(&self.negative_tab_density)?;
        (self.tab_volume()? * densities).to(&units::grams())
    }

    pub fn case_mass(&self) -> CellResult<Quantity> {
        self.pouch_mass()?
            .try_add(&self.tab_mass()?)?
            .try_add(&self.extra_mass)
    }

    /// Stack depth plus both laminate sheets.
    pub fn depth(&self, stack_thickness: &Quantity) -> CellResult<Quantity> {
        (stack_thickness * f64::from(self.layers))
            .to(&units::centimeters())?
            .try_add(&(&self.pouch_thickness * 2.0))
    }

    pub fn volume(&self, stack_thickness: &Quantity) -> CellResult<Quantity> {
        let body = self.sealed_face()? * self.depth(stack_thickness)?;
        let tabs = self.tab_volume()? * 2.0;
        body.to(&units::cubic_centimeters())?.try_add(&tabs)
    }

    /// Outer width and height of the sealed pouch with tabs protruding.
    pub fn outline(&self) -> CellResult<(Quantity, Quantity)> {
        let cm = units::centimeters();
        let width = self.width.try_add(&self.clearance)?.to(&cm)?;
        let height = self.height.try_add(&self.clearance)?.to(&cm)?;
        Ok(match self.tab_location {
            TabLocation::Top => {
                let height = height.try_add(&self.tab_height)?;
                (width, height)
            }
            TabLocation::Sides => {
                let width = width.try_add(&(&self.tab_height * 2.0))?;
                (width, height)
            }
        })
    }

    fn validate(&self) -> CellResult<()> {
        if self.layers == 0 {
            return Err(CellError::InvalidValue {
                field: "layers",
                reason: "a pouch needs at least one layer".to_string(),
            });
        }
        let cm = units::centimeters();
        for (q, field) in [
            (&self.width, "width"),
            (&self.height, "height"),
            (&self.pouch_thickness, "pouch_thickness"),
        ] {
            q.ensure_commensurable(&cm)?;
            ensure_positive(q, field)?;
        }
        for q in [&self.clearance, &self.tab_height, &self.tab_width, &self.tab_thickness] {
            q.ensure_commensurable(&cm)?;
        }
        let density = units::grams_per_cubic_centimeter();
        for q in [&self.pouch_density, &self.positive_tab_density, &self.negative_tab_density] {
            q.ensure_commensurable(&density)?;
        }
        self.extra_mass.ensure_commensurable(&units::grams())
    }
}

fn compute_pouch(
    stack: &CellStack,
    geometry: &PouchGeometry,
    formation: &FormationFactors,
    format: CellFormat,
) -> CellResult<Cell> {
    profile_scope!("pouch_cell");
    geometry.validate()?;

    let area = geometry.electrode_area()?;
    let jelly = Jellyroll::compute(stack, &area, format.coating(), formation)?;
    let mass = jelly.breakdown(geometry.case_mass()?)?;
    let depth = geometry.depth(&jelly.stack_thickness)?;
    debug!("{} pouch: {} layers, depth {}", format, geometry.layers, depth);

    Ok(Cell {
        name: String::new(),
        format,
        stack: stack.clone(),
        geometry: CellGeometry::Pouch(geometry.clone()),
        formation: formation.clone(),
        volume: geometry.volume(&jelly.stack_thickness)?,
        area,
        capacity: jelly.capacity,
        energy: jelly.energy,
        stack_thickness: jelly.stack_thickness,
        depth: Some(depth),
        average_voltage: jelly.average_voltage,
        np_ratio: stack.np_ratio()?,
        mass,
    })
}

/// Stacked pouch with double-coated electrodes.
pub fn compute_pouch_cell(
    stack: &CellStack,
    geometry: &PouchGeometry,
    formation: &FormationFactors,
) -> CellResult<Cell> {
    compute_pouch(stack, geometry, formation, CellFormat::PouchStacked)
}

/// Pouch whose layers each carry a single coating per electrode.
pub fn compute_single_layer_pouch_cell(
    stack: &CellStack,
    geometry: &PouchGeometry,
    formation: &FormationFactors,
) -> CellResult<Cell> {
    compute_pouch(stack, geometry, formation, CellFormat::PouchSingleLayer)
}
