// error.rs
// Error taxonomy shared by every record constructor and calculator

use thiserror::Error;

/// One derivation result that took part in a failed reconciliation.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Identity that produced the value, e.g. `"1 - rho/rho_a"`.
    pub identity: &'static str,
    /// Nominal value in the field's canonical unit.
    pub value: f64,
    pub unit: String,
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {} {}", self.identity, self.value, self.unit)
    }
}

fn list_candidates(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum CellError {
    /// A mandatory field of a non-inferring record was never supplied.
    #[error("{record}: required field '{field}' was not specified")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    #[error("incompatible units: cannot convert {from} to {to}")]
    IncompatibleUnits { from: String, to: String },

    /// No identity could derive the field from the supplied inputs.
    #[error("composite field '{field}' is underspecified: no derivation path from the given inputs")]
    Underspecified { field: &'static str },

    /// Independent derivations of a field disagree beyond tolerance.
    #[error("conflicting inputs for composite field '{field}': {}", list_candidates(.candidates))]
    ConflictingInputs {
        field: &'static str,
        candidates: Vec<Candidate>,
    },

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("cannot parse unit '{input}': {reason}")]
    UnitParse { input: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CellResult<T> = Result<T, CellError>;

/// Unwrap a mandatory record field or report it as missing.
pub fn require<T>(value: Option<T>, record: &'static str, field: &'static str) -> CellResult<T> {
    value.ok_or(CellError::MissingField { record, field })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_lists_every_candidate() {
        let err = CellError::ConflictingInputs {
            field: "porosity",
            candidates: vec![
                Candidate { identity: "a", value: 0.2, unit: String::new() },
                Candidate { identity: "b", value: 0.3, unit: String::new() },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("porosity"));
        assert!(msg.contains("a = 0.2"));
        assert!(msg.contains("b = 0.3"));
    }

    #[test]
    fn missing_field_names_record_and_field() {
        let err = CellError::MissingField { record: "separator", field: "thickness" };
        assert_eq!(err.to_string(), "separator: required field 'thickness' was not specified");
    }
}
