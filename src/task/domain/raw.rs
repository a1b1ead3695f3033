//! Loosely typed table rows as exchanged with the backing worksheet.
//!
//! Worksheet cells arrive as whatever the remote service chose to send:
//! native booleans, numbers, free text, or nothing at all. [`Cell`] keeps
//! that shape intact and offers explicit coercions with a fixed vocabulary
//! of accepted spellings.

use super::ParseCellError;
use serde::{Deserialize, Serialize};
use std::num::FpCategory;

/// Text spellings read as `true`, compared case-insensitively.
const TRUE_SPELLINGS: [&str; 5] = ["true", "1", "yes", "y", "t"];

/// Text spellings read as `false`, compared case-insensitively.
const FALSE_SPELLINGS: [&str; 5] = ["false", "0", "no", "n", "f"];

/// Text spellings that represent an absent value.
const MISSING_MARKERS: [&str; 4] = ["", "nan", "none", "null"];

/// Largest magnitude a fractional rank may have before it is rejected.
const RANK_FLOAT_LIMIT: f64 = 9.0e15;

static EMPTY_CELL: Cell = Cell::Empty;

/// A single worksheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Cell {
    /// No value.
    #[default]
    Empty,
    /// Native boolean.
    Bool(bool),
    /// Whole number.
    Int(i64),
    /// Fractional number.
    Float(f64),
    /// Free text.
    Text(String),
}

impl Cell {
    /// Creates a text cell.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns `true` when the cell holds no meaningful value.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Float(value) => value.is_nan(),
            Self::Text(text) => is_missing_marker(text),
            Self::Bool(_) | Self::Int(_) => false,
        }
    }

    /// Coerces the cell into a boolean.
    ///
    /// Native booleans pass through, numbers are true when non-zero and
    /// text must be one of the accepted spellings. Missing cells read as
    /// `false`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseCellError::NotBoolean`] for any other text.
    pub fn to_bool(&self) -> Result<bool, ParseCellError> {
        match self {
            Self::Empty => Ok(false),
            Self::Bool(value) => Ok(*value),
            Self::Int(value) => Ok(*value != 0),
            Self::Float(value) => Ok(!matches!(
                value.classify(),
                FpCategory::Zero | FpCategory::Nan
            )),
            Self::Text(text) => parse_bool_text(text),
        }
    }

    /// Renders the cell as trimmed text, or `None` when it is missing.
    ///
    /// Integral floats render without a fractional part so that `3.0`
    /// written back by a spreadsheet compares equal to `3`.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        if self.is_missing() {
            return None;
        }
        match self {
            Self::Empty => None,
            Self::Bool(value) => Some(value.to_string()),
            Self::Int(value) => Some(value.to_string()),
            Self::Float(value) => Some(render_float(*value)),
            Self::Text(text) => Some(text.trim().to_owned()),
        }
    }

    /// Reads the cell as a free-text label, exactly as written.
    ///
    /// Unlike [`Cell::render`], text is neither trimmed nor matched against
    /// the missing-value markers, so a label such as `"None"` survives.
    /// Only empty cells and NaN count as missing.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Empty | Self::Bool(_) | Self::Int(_) | Self::Float(_) => self.render(),
        }
    }

    /// Reads the cell as a sort rank, or `None` when it is missing.
    ///
    /// Fractional values are rounded to the nearest whole rank.
    ///
    /// # Errors
    ///
    /// Returns [`ParseCellError::NotNumber`] for booleans, non-numeric text
    /// and non-finite numbers.
    pub fn to_rank(&self) -> Result<Option<i64>, ParseCellError> {
        match self {
            Self::Empty => Ok(None),
            Self::Int(value) => Ok(Some(*value)),
            Self::Float(value) => float_to_rank(*value),
            Self::Bool(value) => Err(ParseCellError::NotNumber(value.to_string())),
            Self::Text(text) => {
                if is_missing_marker(text) {
                    return Ok(None);
                }
                let trimmed = text.trim();
                if let Ok(whole) = trimmed.parse::<i64>() {
                    return Ok(Some(whole));
                }
                trimmed
                    .parse::<f64>()
                    .map_err(|_| ParseCellError::NotNumber(text.clone()))
                    .and_then(float_to_rank)
                    .and_then(|rank| rank.ok_or_else(|| ParseCellError::NotNumber(text.clone())))
                    .map(Some)
            }
        }
    }
}

fn is_missing_marker(text: &str) -> bool {
    let normalized = text.trim().to_ascii_lowercase();
    MISSING_MARKERS.contains(&normalized.as_str())
}

fn parse_bool_text(text: &str) -> Result<bool, ParseCellError> {
    let normalized = text.trim().to_ascii_lowercase();
    if TRUE_SPELLINGS.contains(&normalized.as_str()) {
        return Ok(true);
    }
    if FALSE_SPELLINGS.contains(&normalized.as_str()) || is_missing_marker(&normalized) {
        return Ok(false);
    }
    Err(ParseCellError::NotBoolean(text.to_owned()))
}

fn render_float(value: f64) -> String {
    if value.fract().classify() == FpCategory::Zero {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn float_to_rank(value: f64) -> Result<Option<i64>, ParseCellError> {
    if value.is_nan() {
        return Ok(None);
    }
    let rounded = value.round();
    if !rounded.is_finite() || rounded.abs() > RANK_FLOAT_LIMIT {
        return Err(ParseCellError::NotNumber(value.to_string()));
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "magnitude is bounded by RANK_FLOAT_LIMIT"
    )]
    let whole = rounded as i64;
    Ok(Some(whole))
}

/// A whole worksheet: a header row plus data rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Creates a table with the given header and no rows.
    #[must_use]
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a data row. Short rows read as trailing empty cells.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Appends a data row, returning the table for chaining.
    #[must_use]
    pub fn with_row(mut self, row: Vec<Cell>) -> Self {
        self.push_row(row);
        self
    }

    /// Returns the header.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the data rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Returns the number of data rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when the table has no data rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the position of a named column.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Returns the cell at `row` in the named column, or an empty cell when
    /// either is absent.
    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> &Cell {
        self.column_index(column)
            .and_then(|index| self.rows.get(row).and_then(|cells| cells.get(index)))
            .unwrap_or(&EMPTY_CELL)
    }
}
