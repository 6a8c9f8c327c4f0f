// composite/identities.rs
// Algebraic relations linking porosity, loading, capacity, density and thickness
//
// Symbols used in identity labels:
//   phi   porosity
//   AL    areal loading (g/cm²)
//   AC    areal capacity (mAh/cm²)
//   rho   composite density (g/cm³)
//   t     thickness
//   s     specific capacity of the active material
//   rho_a effective active density = active density × active fraction

use once_cell::sync::Lazy;

use crate::error::{CellError, CellResult};
use crate::quantity::Quantity;

use super::field::{CompositeField, CompositeFields};

/// Material constants every identity may draw on.
#[derive(Clone, Debug)]
pub struct Constants {
    /// `s`
    pub specific_capacity: Quantity,
    /// `rho_a`
    pub effective_density: Quantity,
}

type Formula = fn(&[&Quantity], &Constants) -> CellResult<Quantity>;

/// One way of computing `target` from a fixed set of other fields.
pub struct Identity {
    pub target: CompositeField,
    pub label: &'static str,
    pub inputs: &'static [CompositeField],
    formula: Formula,
}

impl Identity {
    /// Evaluates the identity if every input is present.
    ///
    /// Returns `Ok(None)` when an input is missing, so callers can skip the
    /// path without treating it as a failure. The result is expressed in the
    /// target field's canonical unit; a non-finite result is `InvalidValue`.
    pub fn evaluate(&self, fields: &CompositeFields, constants: &Constants) -> CellResult<Option<Quantity>> {
        let mut operands = Vec::with_capacity(self.inputs.len());
        for input in self.inputs {
            match fields.get(*input) {
                Some(q) => operands.push(q),
                None => return Ok(None),
            }
        }
        let value = (self.formula)(&operands, constants)?.to(&self.target.canonical_unit())?;
        if !value.nominal().is_finite() || !value.uncertainty().is_finite() {
            return Err(CellError::InvalidValue {
                field: self.target.name(),
                reason: format!("{} evaluates to {}", self.label, value.nominal()),
            });
        }
        Ok(Some(value))
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} := {}", self.target, self.label)
    }
}

use CompositeField::{ArealCapacity as AC, ArealLoading as AL, Density as RHO, Porosity as PHI, Thickness as T};

/// Every identity, grouped by target in completion order. Within a group the
/// first entry supplies the nominal value when several paths apply.
pub static IDENTITIES: Lazy<Vec<Identity>> = Lazy::new(|| {
    vec![
        // ==================== POROSITY ====================
        Identity {
            target: PHI,
            label: "1 - rho/rho_a",
            inputs: &[RHO],
            formula: |x, c| (x[0] / &c.effective_density).complement(),
        },
        Identity {
            target: PHI,
            label: "1 - AC/(s*t*rho_a)",
            inputs: &[AC, T],
            formula: |x, c| (x[0] / (&c.specific_capacity * x[1] * &c.effective_density)).complement(),
        },
        Identity {
            target: PHI,
            label: "1 - AL/(t*rho_a)",
            inputs: &[AL, T],
            formula: |x, c| (x[0] / (x[1] * &c.effective_density)).complement(),
        },
        // ==================== AREAL LOADING ====================
        Identity {
            target: AL,
            label: "AC/s",
            inputs: &[AC],
            formula: |x, c| Ok(x[0] / &c.specific_capacity),
        },
        Identity {
            target: AL,
            label: "rho*t",
            inputs: &[RHO, T],
            formula: |x, _| Ok(x[0] * x[1]),
        },
        Identity {
            target: AL,
            label: "rho_a*(1-phi)*t",
            inputs: &[PHI, T],
            formula: |x, c| Ok(&c.effective_density * x[0].complement()? * x[1]),
        },
        // ==================== AREAL CAPACITY ====================
        Identity {
            target: AC,
            label: "s*AL",
            inputs: &[AL],
            formula: |x, c| Ok(&c.specific_capacity * x[0]),
        },
        Identity {
            target: AC,
            label: "s*t*rho",
            inputs: &[T, RHO],
            formula: |x, c| Ok(&c.specific_capacity * x[0] * x[1]),
        },
        Identity {
            target: AC,
            label: "s*t*rho_a*(1-phi)",
            inputs: &[T, PHI],
            formula: |x, c| Ok(&c.specific_capacity * x[0] * &c.effective_density * x[1].complement()?),
        },
        // ==================== DENSITY ====================
        Identity {
            target: RHO,
            label: "(AC/s)/t",
            inputs: &[AC, T],
            formula: |x, c| Ok(x[0] / &c.specific_capacity / x[1]),
        },
        Identity {
            target: RHO,
            label: "rho_a*(1-phi)",
            inputs: &[PHI],
            formula: |x, c| Ok(&c.effective_density * x[0].complement()?),
        },
        Identity {
            target: RHO,
            label: "AL/t",
            inputs: &[AL, T],
            formula: |x, _| Ok(x[0] / x[1]),
        },
        // ==================== THICKNESS ====================
        Identity {
            target: T,
            label: "AL/rho",
            inputs: &[AL, RHO],
            formula: |x, _| Ok(x[0] / x[1]),
        },
        Identity {
            target: T,
            label: "AC/(s*rho)",
            inputs: &[AC, RHO],
            formula: |x, c| Ok(x[0] / (&c.specific_capacity * x[1])),
        },
        Identity {
            target: T,
            label: "AL/(rho_a*(1-phi))",
            inputs: &[AL, PHI],
            formula: |x, c| Ok(x[0] / (&c.effective_density * x[1].complement()?)),
        },
    ]
});

/// Identities that compute `field`, in preference order.
pub fn identities_for(field: CompositeField) -> impl Iterator<Item = &'static Identity> {
    IDENTITIES.iter().filter(move |id| id.target == field)
}
