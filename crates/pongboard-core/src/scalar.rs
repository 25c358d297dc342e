// Cell values and the lenient numeric coercions used by every normalizer.
//
// Parsing is strict (a cell becomes a number only when the whole cell is a
// number); coercion is lenient (a numeric prefix is enough, anything else is
// treated as absent and the caller picks the fallback).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Cells at or beyond this magnitude stay textual: they cannot round-trip
/// through an `f64` without losing integer precision.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A single decoded CSV cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(f64),
}

impl Scalar {
    /// Decode a raw cell. Only fully numeric cells become [`Scalar::Number`];
    /// `"12abc"`, `"+5"`, `"True"` and the empty string all stay text.
    pub fn parse_cell(raw: &str) -> Self {
        let trimmed = raw.trim();
        if is_numeric_literal(trimmed) {
            if let Ok(value) = trimmed.parse::<f64>() {
                if value.is_finite() && value.abs() < MAX_SAFE_INTEGER {
                    return Scalar::Number(value);
                }
            }
        }
        Scalar::Text(raw.to_string())
    }

    /// Render the cell as a string. Integral numbers print without a
    /// fractional part so that a tour `3` reads back as `"3"`.
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Text(text) => text.clone(),
            Scalar::Number(value) => format_number(*value),
        }
    }

    /// True for text cells that are empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Scalar::Text(text) => text.trim().is_empty(),
            Scalar::Number(_) => false,
        }
    }

    /// Lenient float view: numbers as-is, text through [`leading_float`].
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Scalar::Number(value) => Some(*value),
            Scalar::Text(text) => leading_float(text),
        }
    }

    /// Lenient integer view: numbers truncated, text through [`leading_int`].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Number(value) => Some(value.trunc() as i64),
            Scalar::Text(text) => leading_int(text),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Render a number the way the CSV exports write it: integral values have no
/// fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// A whole cell that is a plain decimal literal.
static NUMERIC_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?([0-9]+\.?|\.[0-9]+|[0-9]+\.[0-9]+)([eE][-+]?[0-9]+)?$")
        .expect("numeric literal pattern is valid")
});

/// Longest float prefix: sign, mantissa, optional exponent.
static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][-+]?[0-9]+)?")
        .expect("float prefix pattern is valid")
});

static INT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?[0-9]+").expect("integer prefix pattern is valid"));

fn is_numeric_literal(s: &str) -> bool {
    NUMERIC_LITERAL.is_match(s)
}

// ---------------------------------------------------------------------------
// Lenient coercions
// ---------------------------------------------------------------------------

/// Parse the longest numeric prefix of `s` (after leading whitespace), the
/// way spreadsheet exports are usually read: `"12.5 pts"` is `12.5`,
/// `"abc"` is `None`. Non-finite results are `None`.
pub fn leading_float(s: &str) -> Option<f64> {
    FLOAT_PREFIX
        .find(s.trim_start())
        .and_then(|prefix| prefix.as_str().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

/// Parse an optionally signed run of leading digits: `"5 (forfait)"` is `5`,
/// `"3.7"` is `3`, `"F"` is `None`.
pub fn leading_int(s: &str) -> Option<i64> {
    INT_PREFIX
        .find(s.trim_start())
        .and_then(|prefix| prefix.as_str().parse::<i64>().ok())
}
