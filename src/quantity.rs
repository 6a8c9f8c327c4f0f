// quantity.rs
// Physical value with a unit and a symmetric standard uncertainty

use std::fmt;
use std::ops::{Div, Mul};

use serde::{Deserialize, Serialize};

use crate::error::{CellError, CellResult};
use crate::units::Unit;

/// A measured or derived physical value.
///
/// The uncertainty is a one-sigma error that defaults to zero, so exact
/// inputs and measurements share one type. Arithmetic uses first-order
/// propagation for independent operands:
/// - sums and differences add absolute uncertainties in quadrature
/// - products and quotients add relative uncertainties in quadrature
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuantityRepr", into = "QuantityRepr")]
pub struct Quantity {
    nominal: f64,
    uncertainty: f64,
    unit: Unit,
}

impl Quantity {
    pub fn new(nominal: f64, unit: Unit) -> Self {
        Self {
            nominal,
            uncertainty: 0.0,
            unit,
        }
    }

    pub fn with_uncertainty(nominal: f64, uncertainty: f64, unit: Unit) -> Self {
        Self {
            nominal,
            uncertainty: uncertainty.abs(),
            unit,
        }
    }

    pub fn dimensionless(nominal: f64) -> Self {
        Self::new(nominal, Unit::dimensionless())
    }

    /// Build a quantity from a unit expression, e.g. `Quantity::parse(1.6, "g/cm^3")`.
    pub fn parse(nominal: f64, unit: &str) -> CellResult<Self> {
        Ok(Self::new(nominal, Unit::parse(unit)?))
    }

    pub fn nominal(&self) -> f64 {
        self.nominal
    }

    pub fn uncertainty(&self) -> f64 {
        self.uncertainty
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn relative_uncertainty(&self) -> f64 {
        if self.nominal == 0.0 {
            if self.uncertainty == 0.0 { 0.0 } else { f64::INFINITY }
        } else {
            self.uncertainty / self.nominal.abs()
        }
    }

    /// Fails with `IncompatibleUnits` unless this quantity has the dimensions of `expected`.
    pub fn ensure_commensurable(&self, expected: &Unit) -> CellResult<()> {
        self.unit.conversion_factor(expected).map(|_| ())
    }

    /// Same quantity expressed in `target`.
    pub fn to(&self, target: &Unit) -> CellResult<Quantity> {
        let k = self.unit.conversion_factor(target)?;
        Ok(Quantity {
            nominal: self.nominal * k,
            uncertainty: self.uncertainty * k.abs(),
            unit: target.clone(),
        })
    }

    /// Nominal magnitude in `target`, uncertainty dropped.
    pub fn value_in(&self, target: &Unit) -> CellResult<f64> {
        Ok(self.nominal * self.unit.conversion_factor(target)?)
    }

    pub fn try_add(&self, rhs: &Quantity) -> CellResult<Quantity> {
        let rhs = rhs.to(&self.unit)?;
        Ok(Quantity {
            nominal: self.nominal + rhs.nominal,
            uncertainty: self.uncertainty.hypot(rhs.uncertainty),
            unit: self.unit.clone(),
        })
    }

    pub fn try_sub(&self, rhs: &Quantity) -> CellResult<Quantity> {
        let rhs = rhs.to(&self.unit)?;
        Ok(Quantity {
            nominal: self.nominal - rhs.nominal,
            uncertainty: self.uncertainty.hypot(rhs.uncertainty),
            unit: self.unit.clone(),
        })
    }

    /// `1 - self`, for dimensionless fractions such as porosity.
    pub fn complement(&self) -> CellResult<Quantity> {
        Quantity::dimensionless(1.0).try_sub(self)
    }

    pub fn powi(&self, n: i32) -> Quantity {
        let derivative = if n == 0 {
            0.0
        } else {
            (n as f64 * self.nominal.powi(n - 1)).abs()
        };
        Quantity {
            nominal: self.nominal.powi(n),
            uncertainty: derivative * self.uncertainty,
            unit: self.unit.powi(n),
        }
    }

    /// Square root; every dimension exponent must be even.
    pub fn sqrt(&self) -> CellResult<Quantity> {
        let dims = self.unit.dims().sqrt().ok_or_else(|| CellError::InvalidValue {
            field: "sqrt",
            reason: format!("odd dimension exponents in {}", self.unit.describe()),
        })?;
        let si = self.to(&Unit::si(self.unit.dims()))?;
        let nominal = si.nominal.sqrt();
        let uncertainty = if nominal == 0.0 { 0.0 } else { si.uncertainty / (2.0 * nominal) };
        Ok(Quantity {
            nominal,
            uncertainty,
            unit: Unit::si(dims),
        })
    }

    /// Natural logarithm of a dimensionless quantity.
    pub fn ln(&self) -> CellResult<Quantity> {
        let x = self.to(&Unit::dimensionless())?;
        Ok(Quantity {
            nominal: x.nominal.ln(),
            uncertainty: x.uncertainty / x.nominal.abs(),
            unit: Unit::dimensionless(),
        })
    }

    /// `|1 - other/self|` in a common unit. When `self` is exactly zero the
    /// absolute difference is returned instead.
    pub fn relative_difference(&self, other: &Quantity) -> CellResult<f64> {
        let other = other.value_in(&self.unit)?;
        if self.nominal == 0.0 {
            Ok(other.abs())
        } else {
            Ok((1.0 - other / self.nominal).abs())
        }
    }

    /// Reconcile two measurements of the same quantity: keep this nominal
    /// value and the larger of the two uncertainties.
    pub fn combine_max(&self, other: &Quantity) -> CellResult<Quantity> {
        let other = other.to(&self.unit)?;
        Ok(Quantity {
            nominal: self.nominal,
            uncertainty: self.uncertainty.max(other.uncertainty),
            unit: self.unit.clone(),
        })
    }

    /// Smaller of two commensurable quantities by nominal value, in `self`'s unit.
    pub fn min_nominal(&self, other: &Quantity) -> CellResult<Quantity> {
        let other = other.to(&self.unit)?;
        Ok(if other.nominal < self.nominal { other } else { self.clone() })
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(p) if self.uncertainty > 0.0 => {
                write!(f, "{:.*} ± {:.*}", p, self.nominal, p, self.uncertainty)?
            }
            Some(p) => write!(f, "{:.*}", p, self.nominal)?,
            None if self.uncertainty > 0.0 => write!(f, "{} ± {}", self.nominal, self.uncertainty)?,
            None => write!(f, "{}", self.nominal)?,
        }
        if !self.unit.symbol().is_empty() {
            write!(f, " {}", self.unit)?;
        }
        Ok(())
    }
}

fn mul_quantities(a: &Quantity, b: &Quantity) -> Quantity {
    Quantity {
        nominal: a.nominal * b.nominal,
        uncertainty: (a.uncertainty * b.nominal).hypot(a.nominal * b.uncertainty),
        unit: a.unit.mul(&b.unit),
    }
}

fn div_quantities(a: &Quantity, b: &Quantity) -> Quantity {
    let b2 = b.nominal * b.nominal;
    Quantity {
        nominal: a.nominal / b.nominal,
        uncertainty: (a.uncertainty / b.nominal).hypot(a.nominal * b.uncertainty / b2),
        unit: a.unit.div(&b.unit),
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $func:ident) => {
        impl $trait<&Quantity> for &Quantity {
            type Output = Quantity;
            fn $method(self, rhs: &Quantity) -> Quantity {
                $func(self, rhs)
            }
        }

        impl $trait<Quantity> for Quantity {
            type Output = Quantity;
            fn $method(self, rhs: Quantity) -> Quantity {
                $func(&self, &rhs)
            }
        }

        impl $trait<&Quantity> for Quantity {
            type Output = Quantity;
            fn $method(self, rhs: &Quantity) -> Quantity {
                $func(&self, rhs)
            }
        }

        impl $trait<Quantity> for &Quantity {
            type Output = Quantity;
            fn $method(self, rhs: Quantity) -> Quantity {
                $func(self, &rhs)
            }
        }
    };
}

impl_binary_op!(Mul, mul, mul_quantities);
impl_binary_op!(Div, div, div_quantities);

impl Mul<f64> for &Quantity {
    type Output = Quantity;
    fn mul(self, k: f64) -> Quantity {
        Quantity {
            nominal: self.nominal * k,
            uncertainty: self.uncertainty * k.abs(),
            unit: self.unit.clone(),
        }
    }
}

impl Mul<f64> for Quantity {
    type Output = Quantity;
    fn mul(self, k: f64) -> Quantity {
        &self * k
    }
}

impl Div<f64> for &Quantity {
    type Output = Quantity;
    fn div(self, k: f64) -> Quantity {
        Quantity {
            nominal: self.nominal / k,
            uncertainty: self.uncertainty / k.abs(),
            unit: self.unit.clone(),
        }
    }
}

impl Div<f64> for Quantity {
    type Output = Quantity;
    fn div(self, k: f64) -> Quantity {
        &self / k
    }
}

/// Serialized form: either a bare number (dimensionless, exact) or an
/// inline table `{ value, unit, uncertainty }`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum QuantityRepr {
    Bare(f64),
    Full {
        value: f64,
        #[serde(default)]
        unit: String,
        #[serde(default, skip_serializing_if = "is_zero")]
        uncertainty: f64,
    },
}

fn is_zero(x: &f64) -> bool {
    *x == 0.0
}

impl TryFrom<QuantityRepr> for Quantity {
    type Error = CellError;

    fn try_from(repr: QuantityRepr) -> CellResult<Self> {
        match repr {
            QuantityRepr::Bare(value) => Ok(Quantity::dimensionless(value)),
            QuantityRepr::Full {
                value,
                unit,
                uncertainty,
            } => {
                if uncertainty < 0.0 {
                    return Err(CellError::InvalidValue {
                        field: "uncertainty",
                        reason: format!("must be non-negative, got {}", uncertainty),
                    });
                }
                Ok(Quantity::with_uncertainty(value, uncertainty, Unit::parse(&unit)?))
            }
        }
    }
}

impl From<Quantity> for QuantityRepr {
    fn from(q: Quantity) -> Self {
        QuantityRepr::Full {
            value: q.nominal,
            unit: q.unit.symbol().to_string(),
            uncertainty: q.uncertainty,
        }
    }
}
