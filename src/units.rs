//! Physical unit definitions and conversions.
//!
//! Every unit is a dimension vector plus a scale factor to the coherent SI
//! unit of that dimension. Base dimensions:
//! - Mass: kilogram (kg)
//! - Length: meter (m)
//! - Time: second (s)
//! - Current: ampere (A)
//! - Amount: mole (mol)
//!
//! Display symbols are kept alongside so that derived values print the way
//! they were entered (`mAh/g`, `g/cm^3`, ...). Symbols produced here are
//! always accepted again by [`Unit::parse`].

use std::collections::HashMap;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{CellError, CellResult};

/// Gram in kilograms.
pub const GRAM: f64 = 1.0e-3;
/// Centimeter in meters.
pub const CENTIMETER: f64 = 1.0e-2;
/// Micrometer in meters.
pub const MICROMETER: f64 = 1.0e-6;
/// Liter in cubic meters.
pub const LITER: f64 = 1.0e-3;
/// Hour in seconds.
pub const HOUR: f64 = 3600.0;

/// Exponents of the SI base dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub mass: i8,
    pub length: i8,
    pub time: i8,
    pub current: i8,
    pub amount: i8,
}

impl Dimensions {
    pub const NONE: Dimensions = Dimensions::new(0, 0, 0, 0, 0);
    pub const MASS: Dimensions = Dimensions::new(1, 0, 0, 0, 0);
    pub const LENGTH: Dimensions = Dimensions::new(0, 1, 0, 0, 0);
    pub const TIME: Dimensions = Dimensions::new(0, 0, 1, 0, 0);
    pub const CURRENT: Dimensions = Dimensions::new(0, 0, 0, 1, 0);
    pub const AMOUNT: Dimensions = Dimensions::new(0, 0, 0, 0, 1);
    /// Electric charge (A·s).
    pub const CHARGE: Dimensions = Dimensions::new(0, 0, 1, 1, 0);
    /// Energy (kg·m²/s²).
    pub const ENERGY: Dimensions = Dimensions::new(1, 2, -2, 0, 0);
    /// Power (kg·m²/s³).
    pub const POWER: Dimensions = Dimensions::new(1, 2, -3, 0, 0);
    /// Electric potential (kg·m²/(s³·A)).
    pub const VOLTAGE: Dimensions = Dimensions::new(1, 2, -3, -1, 0);

    pub const fn new(mass: i8, length: i8, time: i8, current: i8, amount: i8) -> Self {
        Self {
            mass,
            length,
            time,
            current,
            amount,
        }
    }

    fn as_array(&self) -> [i8; 5] {
        [self.mass, self.length, self.time, self.current, self.amount]
    }

    fn from_array(a: [i8; 5]) -> Self {
        Self::new(a[0], a[1], a[2], a[3], a[4])
    }

    pub fn is_dimensionless(&self) -> bool {
        *self == Self::NONE
    }

    pub fn mul(self, other: Dimensions) -> Dimensions {
        let (a, b) = (self.as_array(), other.as_array());
        Self::from_array(std::array::from_fn(|i| a[i] + b[i]))
    }

    pub fn div(self, other: Dimensions) -> Dimensions {
        let (a, b) = (self.as_array(), other.as_array());
        Self::from_array(std::array::from_fn(|i| a[i] - b[i]))
    }

    pub fn powi(self, n: i32) -> Dimensions {
        let a = self.as_array();
        Self::from_array(std::array::from_fn(|i| (a[i] as i32 * n) as i8))
    }

    /// Square root of the dimension vector, `None` when any exponent is odd.
    pub fn sqrt(self) -> Option<Dimensions> {
        let a = self.as_array();
        if a.iter().any(|e| e % 2 != 0) {
            return None;
        }
        Some(Self::from_array(std::array::from_fn(|i| a[i] / 2)))
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "[1]");
        }
        let names = ["M", "L", "T", "I", "N"];
        let parts: Vec<String> = names
            .iter()
            .zip(self.as_array())
            .filter(|(_, e)| *e != 0)
            .map(|(n, e)| if e == 1 { n.to_string() } else { format!("{}^{}", n, e) })
            .collect();
        write!(f, "[{}]", parts.join(" "))
    }
}

/// A physical unit: dimensions, SI scale factor and display symbol.
#[derive(Clone, Debug)]
pub struct Unit {
    dims: Dimensions,
    scale: f64,
    symbol: String,
}

impl PartialEq for Unit {
    /// Units are equal when they describe the same scale of the same
    /// dimension, regardless of how the symbol was spelled.
    fn eq(&self, other: &Self) -> bool {
        self.dims == other.dims && ((self.scale - other.scale).abs() <= 1e-12 * self.scale.abs())
    }
}

impl Unit {
    pub fn new(symbol: impl Into<String>, dims: Dimensions, scale: f64) -> Self {
        Self {
            dims,
            scale,
            symbol: symbol.into(),
        }
    }

    pub fn dimensionless() -> Self {
        Self::new("", Dimensions::NONE, 1.0)
    }

    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn is_dimensionless(&self) -> bool {
        self.dims.is_dimensionless()
    }

    pub fn is_commensurable(&self, other: &Unit) -> bool {
        self.dims == other.dims
    }

    /// Factor that converts a magnitude in `self` into a magnitude in `target`.
    pub fn conversion_factor(&self, target: &Unit) -> CellResult<f64> {
        if !self.is_commensurable(target) {
            return Err(CellError::IncompatibleUnits {
                from: self.describe(),
                to: target.describe(),
            });
        }
        Ok(self.scale / target.scale)
    }

    /// Symbol plus dimensions, used in error messages.
    pub fn describe(&self) -> String {
        if self.symbol.is_empty() {
            format!("dimensionless {}", self.dims)
        } else {
            format!("{} {}", self.symbol, self.dims)
        }
    }

    pub fn mul(&self, other: &Unit) -> Unit {
        let symbol = match (self.is_plain_one(), other.is_plain_one()) {
            (true, true) => String::new(),
            (true, false) => other.symbol.clone(),
            (false, true) => self.symbol.clone(),
            (false, false) => format!("{}·{}", self.symbol, wrap_if(&other.symbol, &['/'])),
        };
        Unit::new(symbol, self.dims.mul(other.dims), self.scale * other.scale)
    }

    pub fn div(&self, other: &Unit) -> Unit {
        let symbol = if other.is_plain_one() {
            self.symbol.clone()
        } else {
            let numerator = if self.symbol.is_empty() { "1" } else { &self.symbol };
            format!("{}/{}", numerator, wrap_if(&other.symbol, &['/', '·']))
        };
        Unit::new(symbol, self.dims.div(other.dims), self.scale / other.scale)
    }

    pub fn powi(&self, n: i32) -> Unit {
        let symbol = match n {
            0 => String::new(),
            1 => self.symbol.clone(),
            _ if self.symbol.is_empty() => String::new(),
            _ => format!("{}^{}", wrap_if(&self.symbol, &['/', '·', '^']), n),
        };
        Unit::new(symbol, self.dims.powi(n), self.scale.powi(n))
    }

    /// Coherent SI unit of the given dimensions (scale 1).
    pub fn si(dims: Dimensions) -> Unit {
        Unit::new(si_symbol(dims), dims, 1.0)
    }

    fn is_plain_one(&self) -> bool {
        self.dims.is_dimensionless() && self.scale == 1.0
    }

    /// Parse a unit expression such as `mAh/g`, `g/cm^3` or `mA*h/cm**2`.
    pub fn parse(input: &str) -> CellResult<Unit> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed == "1" || trimmed.eq_ignore_ascii_case("dimensionless") {
            return Ok(Unit::dimensionless());
        }
        let mut parser = UnitParser {
            input: trimmed,
            chars: trimmed.chars().peekable(),
        };
        let (dims, scale) = parser.expr()?;
        parser.skip_ws();
        if let Some(&c) = parser.chars.peek() {
            return Err(parser.error(format!("unexpected character '{}'", c)));
        }
        Ok(Unit::new(trimmed, dims, scale))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

fn wrap_if(symbol: &str, separators: &[char]) -> String {
    if symbol.contains(separators) {
        format!("({})", symbol)
    } else {
        symbol.to_string()
    }
}

fn si_symbol(dims: Dimensions) -> String {
    let names = ["kg", "m", "s", "A", "mol"];
    let parts: Vec<String> = names
        .iter()
        .zip(dims.as_array())
        .filter(|(_, e)| *e != 0)
        .map(|(n, e)| if e == 1 { n.to_string() } else { format!("{}^{}", n, e) })
        .collect();
    parts.join("*")
}

// ====================
// Canonical units
// ====================

pub fn grams() -> Unit {
    Unit::new("g", Dimensions::MASS, GRAM)
}

pub fn kilograms() -> Unit {
    Unit::new("kg", Dimensions::MASS, 1.0)
}

pub fn micrometers() -> Unit {
    Unit::new("um", Dimensions::LENGTH, MICROMETER)
}

pub fn millimeters() -> Unit {
    Unit::new("mm", Dimensions::LENGTH, 1.0e-3)
}

pub fn centimeters() -> Unit {
    Unit::new("cm", Dimensions::LENGTH, CENTIMETER)
}

pub fn square_centimeters() -> Unit {
    Unit::new("cm^2", Dimensions::LENGTH.powi(2), CENTIMETER * CENTIMETER)
}

pub fn cubic_centimeters() -> Unit {
    Unit::new("cm^3", Dimensions::LENGTH.powi(3), CENTIMETER.powi(3))
}

pub fn liters() -> Unit {
    Unit::new("L", Dimensions::LENGTH.powi(3), LITER)
}

pub fn volts() -> Unit {
    Unit::new("V", Dimensions::VOLTAGE, 1.0)
}

pub fn ampere_hours() -> Unit {
    Unit::new("Ah", Dimensions::CHARGE, HOUR)
}

pub fn watt_hours() -> Unit {
    Unit::new("Wh", Dimensions::ENERGY, HOUR)
}

/// g/cm³, the unit composite and component densities are reported in.
pub fn grams_per_cubic_centimeter() -> Unit {
    Unit::new("g/cm^3", Dimensions::MASS.div(Dimensions::LENGTH.powi(3)), GRAM / CENTIMETER.powi(3))
}

/// g/cm², areal loading.
pub fn grams_per_square_centimeter() -> Unit {
    Unit::new("g/cm^2", Dimensions::MASS.div(Dimensions::LENGTH.powi(2)), GRAM / CENTIMETER.powi(2))
}

/// mAh/cm², areal capacity.
pub fn milliamp_hours_per_square_centimeter() -> Unit {
    Unit::new(
        "mAh/cm^2",
        Dimensions::CHARGE.div(Dimensions::LENGTH.powi(2)),
        1.0e-3 * HOUR / CENTIMETER.powi(2),
    )
}

/// mAh/g, specific capacity.
pub fn milliamp_hours_per_gram() -> Unit {
    Unit::new("mAh/g", Dimensions::CHARGE.div(Dimensions::MASS), 1.0e-3 * HOUR / GRAM)
}

pub fn moles_per_liter() -> Unit {
    Unit::new("mol/L", Dimensions::AMOUNT.div(Dimensions::LENGTH.powi(3)), 1.0 / LITER)
}

pub fn milliliters_per_ampere_hour() -> Unit {
    Unit::new("mL/Ah", Dimensions::LENGTH.powi(3).div(Dimensions::CHARGE), 1.0e-3 * LITER / HOUR)
}

pub fn watt_hours_per_kilogram() -> Unit {
    Unit::new("Wh/kg", Dimensions::ENERGY.div(Dimensions::MASS), HOUR)
}

pub fn watt_hours_per_liter() -> Unit {
    Unit::new("Wh/L", Dimensions::ENERGY.div(Dimensions::LENGTH.powi(3)), HOUR / LITER)
}

// ====================
// Symbol table
// ====================

static UNIT_SYMBOLS: Lazy<HashMap<&'static str, (Dimensions, f64)>> = Lazy::new(|| {
    use Dimensions as D;
    let volume = D::LENGTH.powi(3);
    let mut m = HashMap::new();
    // mass
    m.insert("kg", (D::MASS, 1.0));
    m.insert("g", (D::MASS, GRAM));
    m.insert("mg", (D::MASS, 1.0e-6));
    // length
    m.insert("m", (D::LENGTH, 1.0));
    m.insert("cm", (D::LENGTH, CENTIMETER));
    m.insert("mm", (D::LENGTH, 1.0e-3));
    m.insert("um", (D::LENGTH, MICROMETER));
    m.insert("µm", (D::LENGTH, MICROMETER));
    m.insert("μm", (D::LENGTH, MICROMETER));
    m.insert("micron", (D::LENGTH, MICROMETER));
    m.insert("nm", (D::LENGTH, 1.0e-9));
    // volume
    m.insert("L", (volume, LITER));
    m.insert("l", (volume, LITER));
    m.insert("mL", (volume, 1.0e-3 * LITER));
    m.insert("ml", (volume, 1.0e-3 * LITER));
    m.insert("cc", (volume, CENTIMETER.powi(3)));
    // time
    m.insert("s", (D::TIME, 1.0));
    m.insert("min", (D::TIME, 60.0));
    m.insert("h", (D::TIME, HOUR));
    m.insert("hr", (D::TIME, HOUR));
    // current and charge
    m.insert("A", (D::CURRENT, 1.0));
    m.insert("mA", (D::CURRENT, 1.0e-3));
    m.insert("C", (D::CHARGE, 1.0));
    m.insert("Ah", (D::CHARGE, HOUR));
    m.insert("mAh", (D::CHARGE, 1.0e-3 * HOUR));
    // potential, power, energy
    m.insert("V", (D::VOLTAGE, 1.0));
    m.insert("mV", (D::VOLTAGE, 1.0e-3));
    m.insert("W", (D::POWER, 1.0));
    m.insert("mW", (D::POWER, 1.0e-3));
    m.insert("J", (D::ENERGY, 1.0));
    m.insert("Wh", (D::ENERGY, HOUR));
    m.insert("mWh", (D::ENERGY, 1.0e-3 * HOUR));
    m.insert("kWh", (D::ENERGY, 1.0e3 * HOUR));
    // amount
    m.insert("mol", (D::AMOUNT, 1.0));
    m.insert("mmol", (D::AMOUNT, 1.0e-3));
    m.insert("M", (D::AMOUNT.div(volume), 1.0 / LITER));
    // dimensionless
    m.insert("%", (D::NONE, 0.01));
    m.insert("percent", (D::NONE, 0.01));
    m
});

/// Recursive-descent parser over `expr := factor (('*'|'·'|'/') factor)*`,
/// `factor := primary (('^'|'**') int | '²' | '³')?`,
/// `primary := symbol | '1' | '(' expr ')'`.
struct UnitParser<'a> {
    input: &'a str,
    chars: Peekable<Chars<'a>>,
}

impl<'a> UnitParser<'a> {
    fn error(&self, reason: String) -> CellError {
        CellError::UnitParse {
            input: self.input.to_string(),
            reason,
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn expr(&mut self) -> CellResult<(Dimensions, f64)> {
        let (mut dims, mut scale) = self.factor()?;
        loop {
            self.skip_ws();
            match self.chars.peek().copied() {
                Some('*') => {
                    self.chars.next();
                    let (d, s) = self.factor()?;
                    dims = dims.mul(d);
                    scale *= s;
                }
                Some('·') | Some('.') => {
                    self.chars.next();
                    let (d, s) = self.factor()?;
                    dims = dims.mul(d);
                    scale *= s;
                }
                Some('/') => {
                    self.chars.next();
                    let (d, s) = self.factor()?;
                    dims = dims.div(d);
                    scale /= s;
                }
                _ => return Ok((dims, scale)),
            }
        }
    }

    fn factor(&mut self) -> CellResult<(Dimensions, f64)> {
        let (dims, scale) = self.primary()?;
        self.skip_ws();
        let exponent = match self.chars.peek().copied() {
            Some('^') => {
                self.chars.next();
                Some(self.integer()?)
            }
            Some('*') => {
                let mut lookahead = self.chars.clone();
                lookahead.next();
                if lookahead.peek() == Some(&'*') {
                    self.chars.next();
                    self.chars.next();
                    Some(self.integer()?)
                } else {
                    None
                }
            }
            Some('²') => {
                self.chars.next();
                Some(2)
            }
            Some('³') => {
                self.chars.next();
                Some(3)
            }
            _ => None,
        };
        Ok(match exponent {
            Some(n) => (dims.powi(n), scale.powi(n)),
            None => (dims, scale),
        })
    }

    fn integer(&mut self) -> CellResult<i32> {
        self.skip_ws();
        let mut text = String::new();
        let parenthesized = self.chars.peek() == Some(&'(');
        if parenthesized {
            self.chars.next();
        }
        if matches!(self.chars.peek(), Some('-') | Some('+')) {
            text.extend(self.chars.next());
        }
        while let Some(c) = self.chars.peek().copied() {
            if c.is_ascii_digit() {
                text.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if parenthesized && self.chars.next() != Some(')') {
            return Err(self.error("unclosed exponent parenthesis".to_string()));
        }
        text.parse::<i32>()
            .map_err(|_| self.error(format!("invalid exponent '{}'", text)))
    }

    fn primary(&mut self) -> CellResult<(Dimensions, f64)> {
        self.skip_ws();
        match self.chars.peek().copied() {
            Some('(') => {
                self.chars.next();
                let inner = self.expr()?;
                self.skip_ws();
                if self.chars.next() != Some(')') {
                    return Err(self.error("unclosed parenthesis".to_string()));
                }
                Ok(inner)
            }
            Some('1') => {
                self.chars.next();
                Ok((Dimensions::NONE, 1.0))
            }
            Some(c) if is_symbol_char(c) => {
                let mut symbol = String::new();
                while let Some(c) = self.chars.peek().copied() {
                    if is_symbol_char(c) {
                        symbol.push(c);
                        self.chars.next();
                    } else {
                        break;
                    }
                }
                UNIT_SYMBOLS
                    .get(symbol.as_str())
                    .copied()
                    .ok_or_else(|| self.error(format!("unknown unit symbol '{}'", symbol)))
            }
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
            None => Err(self.error("unexpected end of expression".to_string())),
        }
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_alphabetic() || c == '%' || c == 'µ' || c == 'μ'
}
