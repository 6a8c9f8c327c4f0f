// composite/engine.rs
// Fills in missing composite fields and reconciles redundant derivations

use log::{debug, trace};

use crate::config::CompletionSettings;
use crate::error::{Candidate, CellError, CellResult};
use crate::profile_scope;
use crate::quantity::Quantity;

use super::field::{CompositeField, CompositeFields};
use super::identities::{identities_for, Constants, Identity};

/// A value produced by one identity.
#[derive(Clone, Debug)]
pub struct Derivation {
    pub identity: &'static Identity,
    pub value: Quantity,
}

impl Derivation {
    fn candidate(&self) -> Candidate {
        Candidate {
            identity: self.identity.label,
            value: self.value.nominal(),
            unit: self.value.unit().symbol().to_string(),
        }
    }
}

/// Evaluates every identity for `field` whose inputs are all present.
pub fn derive_candidates(
    field: CompositeField,
    fields: &CompositeFields,
    constants: &Constants,
) -> CellResult<Vec<Derivation>> {
    let mut found = Vec::new();
    for identity in identities_for(field) {
        match identity.evaluate(fields, constants)? {
            Some(value) => {
                trace!("{} via {} = {}", field, identity.label, value);
                found.push(Derivation { identity, value });
            }
            None => trace!("{} via {}: inputs missing", field, identity.label),
        }
    }
    Ok(found)
}

/// Collapses candidate values into one.
///
/// The first candidate's nominal value is kept; every other candidate must
/// agree with it within `relative_tolerance`. The reconciled uncertainty is
/// the largest candidate uncertainty.
pub fn reconcile(
    field: CompositeField,
    candidates: &[Derivation],
    relative_tolerance: f64,
) -> CellResult<Quantity> {
    let (first, rest) = candidates
        .split_first()
        .ok_or(CellError::Underspecified { field: field.name() })?;

    let mut reconciled = first.value.clone();
    for other in rest {
        let diff = first.value.relative_difference(&other.value)?;
        if !(diff <= relative_tolerance) {
            return Err(CellError::ConflictingInputs {
                field: field.name(),
                candidates: candidates.iter().map(Derivation::candidate).collect(),
            });
        }
        reconciled = reconciled.combine_max(&other.value)?;
    }
    Ok(reconciled)
}

/// Completes every missing field in a single ordered pass.
///
/// Supplied fields are passed through untouched. Each missing field is
/// derived from supplied fields and from fields derived earlier in
/// `CompositeField::COMPLETION_ORDER`.
pub fn complete_fields(
    known: &CompositeFields,
    constants: &Constants,
    settings: &CompletionSettings,
) -> CellResult<CompositeFields> {
    profile_scope!("composite_completion");

    let mut fields = known.clone();
    for field in CompositeField::COMPLETION_ORDER {
        if fields.is_known(field) {
            continue;
        }
        let candidates = derive_candidates(field, &fields, constants)?;
        let value = reconcile(field, &candidates, settings.relative_tolerance)?;
        debug!(
            "derived {} = {} from {} candidate(s)",
            field,
            value,
            candidates.len()
        );
        fields.set(field, value);
    }
    Ok(fields)
}

/// Re-evaluates every identity against a complete set of fields and fails on
/// the first stored value that disagrees with a derivation.
pub fn check_consistency(
    fields: &CompositeFields,
    constants: &Constants,
    relative_tolerance: f64,
) -> CellResult<()> {
    for field in CompositeField::COMPLETION_ORDER {
        let Some(stored) = fields.get(field) else {
            return Err(CellError::Underspecified { field: field.name() });
        };
        for derivation in derive_candidates(field, fields, constants)? {
            if !(stored.relative_difference(&derivation.value)? <= relative_tolerance) {
                let stored = stored.to(&field.canonical_unit())?;
                return Err(CellError::ConflictingInputs {
                    field: field.name(),
                    candidates: vec![
                        Candidate {
                            identity: "stored",
                            value: stored.nominal(),
                            unit: stored.unit().symbol().to_string(),
                        },
                        derivation.candidate(),
                    ],
                });
            }
        }
    }
    Ok(())
}
