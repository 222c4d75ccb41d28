//! CSS length values as they appear in style props.
//!
//! Lengths live in the element tree as JSON literals: a bare number means
//! pixels, a string carries its unit (`"50%"`, `"12px"`, `"2rem"`).

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use winnow::ascii::digit1;
use winnow::combinator::{alt, opt};
use winnow::prelude::*;
use winnow::token::one_of;

/// 2^53: past this an `f64` no longer holds every integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthUnit {
    Px,
    Percent,
    Em,
    Rem,
    Vw,
    Vh,
}

impl LengthUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Px => "px",
            Self::Percent => "%",
            Self::Em => "em",
            Self::Rem => "rem",
            Self::Vw => "vw",
            Self::Vh => "vh",
        }
    }
}

/// A number with an optional unit. `unit: None` is a unitless literal,
/// which style props treat as pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CssNumber {
    pub value: f64,
    pub unit: Option<LengthUnit>,
}

impl CssNumber {
    pub const fn px(value: f64) -> Self {
        Self {
            value,
            unit: Some(LengthUnit::Px),
        }
    }

    pub const fn unitless(value: f64) -> Self {
        Self { value, unit: None }
    }

    pub const fn percent(value: f64) -> Self {
        Self {
            value,
            unit: Some(LengthUnit::Percent),
        }
    }

    pub fn parse(input: &str) -> CoreResult<Self> {
        let mut rest = input.trim();
        let parsed = parse_css_number
            .parse_next(&mut rest)
            .map_err(|_| CoreError::InvalidCssLength(input.to_string()))?;
        if !rest.trim().is_empty() {
            return Err(CoreError::InvalidCssLength(input.to_string()));
        }
        Ok(parsed)
    }

    /// Read a length out of a JSON literal.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map(Self::unitless),
            serde_json::Value::String(s) => Self::parse(s).ok(),
            _ => None,
        }
    }

    /// Write back in the same shape it was read: unitless stays a number,
    /// and a whole number stays an integer.
    pub fn to_json(&self) -> serde_json::Value {
        match self.unit {
            None if self.value.fract() == 0.0 && self.value.abs() < MAX_EXACT_INTEGER => {
                serde_json::json!(self.value as i64)
            }
            None => serde_json::json!(self.value),
            Some(_) => serde_json::Value::String(self.to_string()),
        }
    }

    /// Add a pixel delta. Percentages are rebased onto `parent_dimension`
    /// when it is known; font- and viewport-relative units are refused.
    pub fn adjust_by(&self, delta_px: f64, parent_dimension: Option<f64>) -> Option<Self> {
        match self.unit {
            None | Some(LengthUnit::Px) => Some(Self {
                value: self.value + delta_px,
                unit: self.unit,
            }),
            Some(LengthUnit::Percent) => match parent_dimension {
                Some(parent) if parent != 0.0 => Some(Self {
                    value: self.value + delta_px / parent * 100.0,
                    unit: self.unit,
                }),
                _ => None,
            },
            Some(_) => None,
        }
    }
}

impl fmt::Display for CssNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        if let Some(unit) = self.unit {
            f.write_str(unit.as_str())?;
        }
        Ok(())
    }
}

fn parse_unit(input: &mut &str) -> ModalResult<LengthUnit> {
    alt((
        "px".value(LengthUnit::Px),
        "%".value(LengthUnit::Percent),
        "rem".value(LengthUnit::Rem),
        "em".value(LengthUnit::Em),
        "vw".value(LengthUnit::Vw),
        "vh".value(LengthUnit::Vh),
    ))
    .parse_next(input)
}

/// `12`, `1.5`, `.5` and `1e3`. An `e` not followed by digits is left for
/// the unit parser, so `2em` stays two ems.
fn parse_float(input: &mut &str) -> ModalResult<f64> {
    let mantissa = alt(((digit1, opt(('.', digit1))).void(), ('.', digit1).void()));
    let exponent = opt((one_of(['e', 'E']), opt(one_of(['-', '+'])), digit1));
    (opt(one_of(['-', '+'])), mantissa, exponent)
        .take()
        .try_map(str::parse::<f64>)
        .parse_next(input)
}

fn parse_css_number(input: &mut &str) -> ModalResult<CssNumber> {
    let value = parse_float.parse_next(input)?;
    let unit = opt(parse_unit).parse_next(input)?;
    Ok(CssNumber { value, unit })
}
