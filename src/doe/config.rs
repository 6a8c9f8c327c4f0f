/// DOE configuration structures
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::composite::CompositeField;
use crate::design::{Design, FormatSpec};
use crate::error::{require, CellError, CellResult};
use crate::quantity::Quantity;
use crate::units::Unit;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoeConfig {
    /// Name of the DOE study
    pub study_name: String,

    /// Design file every case starts from
    pub base_design: String,

    /// Swept parameters; cases are the full factorial combination
    #[serde(default)]
    pub parameters: Vec<SweepParameter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepParameter {
    /// Design value to vary, e.g. `positive.areal_capacity`
    pub parameter: DesignParameter,

    /// Values to try, in order
    pub values: Vec<Quantity>,

    /// Composite field to unset when this one is swept, so the composite
    /// stays exactly determined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaces: Option<CompositeField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectrodeSide {
    Positive,
    Negative,
}

impl ElectrodeSide {
    pub fn name(&self) -> &'static str {
        match self {
            ElectrodeSide::Positive => "positive",
            ElectrodeSide::Negative => "negative",
        }
    }
}

/// A single scalar in a design that a sweep can vary. Written in study files
/// as a dotted path such as `negative.porosity` or `format.layers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DesignParameter {
    Composite {
        side: ElectrodeSide,
        field: CompositeField,
    },
    ActiveFraction(ElectrodeSide),
    CurrentCollectorThickness(ElectrodeSide),
    SeparatorThickness,
    ElectrolyteConcentration,
    ElectrolyteRatio,
    LossFactor,
    Layers,
    Width,
    Height,
    Diameter,
}

impl fmt::Display for DesignParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesignParameter::Composite { side, field } => write!(f, "{}.{}", side.name(), field.name()),
            DesignParameter::ActiveFraction(side) => write!(f, "{}.active_fraction", side.name()),
            DesignParameter::CurrentCollectorThickness(side) => {
                write!(f, "{}.current_collector.thickness", side.name())
            }
            DesignParameter::SeparatorThickness => f.write_str("separator.thickness"),
            DesignParameter::ElectrolyteConcentration => f.write_str("electrolyte.concentration"),
            DesignParameter::ElectrolyteRatio => f.write_str("formation.electrolyte_ratio"),
            DesignParameter::LossFactor => f.write_str("formation.loss_factor"),
            DesignParameter::Layers => f.write_str("format.layers"),
            DesignParameter::Width => f.write_str("format.width"),
            DesignParameter::Height => f.write_str("format.height"),
            DesignParameter::Diameter => f.write_str("format.diameter"),
        }
    }
}

impl FromStr for DesignParameter {
    type Err = CellError;

    fn from_str(s: &str) -> CellResult<Self> {
        let unknown = || CellError::Config(format!("unknown design parameter '{}'", s));
        let (head, tail) = s.split_once('.').ok_or_else(unknown)?;
        let side = match head {
            "positive" => Some(ElectrodeSide::Positive),
            "negative" => Some(ElectrodeSide::Negative),
            _ => None,
        };
        if let Some(side) = side {
            let field = CompositeField::COMPLETION_ORDER
                .into_iter()
                .find(|f| f.name() == tail);
            return match (field, tail) {
                (Some(field), _) => Ok(DesignParameter::Composite { side, field }),
                (None, "active_fraction") => Ok(DesignParameter::ActiveFraction(side)),
                (None, "current_collector.thickness") => Ok(DesignParameter::CurrentCollectorThickness(side)),
                _ => Err(unknown()),
            };
        }
        match s {
            "separator.thickness" => Ok(DesignParameter::SeparatorThickness),
            "electrolyte.concentration" => Ok(DesignParameter::ElectrolyteConcentration),
            "formation.electrolyte_ratio" => Ok(DesignParameter::ElectrolyteRatio),
            "formation.loss_factor" => Ok(DesignParameter::LossFactor),
            "format.layers" => Ok(DesignParameter::Layers),
            "format.width" => Ok(DesignParameter::Width),
            "format.height" => Ok(DesignParameter::Height),
            "format.diameter" => Ok(DesignParameter::Diameter),
            _ => Err(unknown()),
        }
    }
}

impl TryFrom<String> for DesignParameter {
    type Error = CellError;

    fn try_from(s: String) -> CellResult<Self> {
        s.parse()
    }
}

impl From<DesignParameter> for String {
    fn from(p: DesignParameter) -> Self {
        p.to_string()
    }
}

fn scalar(value: &Quantity, parameter: DesignParameter) -> CellResult<f64> {
    value.value_in(&Unit::dimensionless()).map_err(|_| CellError::InvalidValue {
        field: "sweep value",
        reason: format!("{} expects a plain number, got {}", parameter, value),
    })
}

fn format_mismatch(parameter: DesignParameter, format: &FormatSpec) -> CellError {
    CellError::Config(format!("{} does not apply to a {} design", parameter, format.format()))
}

impl DesignParameter {
    /// Writes `value` into `design`, clearing `replaces` when sweeping a
    /// composite field.
    pub fn apply(&self, design: &mut Design, value: &Quantity, replaces: Option<CompositeField>) -> CellResult<()> {
        let parameter = *self;
        match parameter {
            DesignParameter::Composite { side, field } => {
                let electrode = electrode_mut(design, side)?;
                if let Some(cleared) = replaces {
                    electrode.composite.set(cleared, None);
                }
                electrode.composite.set(field, Some(value.clone()));
            }
            DesignParameter::ActiveFraction(side) => {
                electrode_mut(design, side)?.composite.active_fraction = Some(scalar(value, parameter)?);
            }
            DesignParameter::CurrentCollectorThickness(side) => {
                electrode_mut(design, side)?.current_collector.thickness = Some(value.clone());
            }
            DesignParameter::SeparatorThickness => {
                require(design.separator.as_mut(), "design", "separator")?.thickness = Some(value.clone());
            }
            DesignParameter::ElectrolyteConcentration => {
                require(design.electrolyte.as_mut(), "design", "electrolyte")?.concentration = Some(value.clone());
            }
            DesignParameter::ElectrolyteRatio => design.formation.electrolyte_ratio = value.clone(),
            DesignParameter::LossFactor => design.formation.loss_factor = scalar(value, parameter)?,
            DesignParameter::Layers => {
                let layers = scalar(value, parameter)?;
                if layers < 1.0 || layers.fract() != 0.0 {
                    return Err(CellError::InvalidValue {
                        field: "layers",
                        reason: format!("{} is not a positive whole number", layers),
                    });
                }
                match &mut design.format {
                    FormatSpec::Pouch(g) | FormatSpec::SingleLayerPouch(g) => g.layers = layers as u32,
                    other => return Err(format_mismatch(parameter, other)),
                }
            }
            DesignParameter::Width => match &mut design.format {
                FormatSpec::Pouch(g) | FormatSpec::SingleLayerPouch(g) => g.width = value.clone(),
                other => return Err(format_mismatch(parameter, other)),
            },
            DesignParameter::Height => match &mut design.format {
                FormatSpec::Pouch(g) | FormatSpec::SingleLayerPouch(g) => g.height = value.clone(),
                FormatSpec::Cylindrical(g) => g.height = value.clone(),
            },
            DesignParameter::Diameter => match &mut design.format {
                FormatSpec::Cylindrical(g) => g.diameter = value.clone(),
                other => return Err(format_mismatch(parameter, other)),
            },
        }
        Ok(())
    }
}

fn electrode_mut(design: &mut Design, side: ElectrodeSide) -> CellResult<&mut crate::electrode::ElectrodeSpec> {
    let slot = match side {
        ElectrodeSide::Positive => design.positive.as_mut(),
        ElectrodeSide::Negative => design.negative.as_mut(),
    };
    require(slot, "design", side.name())
}

/// One combination of swept values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoeCase {
    /// Unique case ID
    pub case_id: String,

    /// Parameter assignments applied on top of the base design
    pub assignments: Vec<(DesignParameter, Quantity)>,
}

impl DoeCase {
    /// Human-readable summary of the assignments, e.g. `format.layers=12`.
    pub fn label(&self) -> String {
        if self.assignments.is_empty() {
            return "baseline".to_string();
        }
        self.assignments
            .iter()
            .map(|(p, v)| format!("{}={}", p, v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl DoeConfig {
    /// Full factorial combination of every swept parameter. With no
    /// parameters the study is a single baseline case.
    pub fn generate_cases(&self) -> Vec<DoeCase> {
        let mut combos: Vec<Vec<(DesignParameter, Quantity)>> = vec![Vec::new()];
        for sweep in &self.parameters {
            combos = combos
                .into_iter()
                .flat_map(|combo| {
                    sweep.values.iter().map(move |value| {
                        let mut next = combo.clone();
                        next.push((sweep.parameter, value.clone()));
                        next
                    })
                })
                .collect();
        }

        let width = combos.len().to_string().len().max(3);
        combos
            .into_iter()
            .enumerate()
            .map(|(idx, assignments)| DoeCase {
                case_id: format!("CASE{:0width$}", idx + 1, width = width),
                assignments,
            })
            .collect()
    }

    /// Base design with one case's assignments applied.
    pub fn design_for(&self, base: &Design, case: &DoeCase) -> CellResult<Design> {
        let mut design = base.clone();
        for (parameter, value) in &case.assignments {
            let replaces = self
                .parameters
                .iter()
                .find(|s| s.parameter == *parameter)
                .and_then(|s| s.replaces);
            parameter.apply(&mut design, value, replaces)?;
        }
        design.name = format!("{} [{}]", base.name, case.case_id);
        Ok(design)
    }

    /// Load DOE configuration from TOML file
    pub fn from_file(path: &str) -> CellResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save DOE configuration to TOML file
    pub fn to_file(&self, path: &str) -> CellResult<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
