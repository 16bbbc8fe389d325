//! Placeholders for missing values at the spreadsheet boundary.
//!
//! Records keep `None` for absent data; only the export turns that into a
//! visible placeholder.

/// Placeholder for absent text.
pub const MISSING_TEXT: &str = "-";

/// Placeholder for absent numbers.
pub const MISSING_NUMBER: f64 = 0.0;

/// One spreadsheet cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            Cell::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(_) => None,
        }
    }
}

/// Text cell, with `-` for missing or empty text.
pub fn text_or_dash(value: Option<&str>) -> Cell {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => Cell::Text(s.to_string()),
        _ => Cell::Text(MISSING_TEXT.to_string()),
    }
}

/// Number cell, with 0 for a missing or non-finite number.
pub fn number_or_zero(value: Option<f64>) -> Cell {
    match value {
        Some(n) if n.is_finite() => Cell::Number(n),
        _ => Cell::Number(MISSING_NUMBER),
    }
}
