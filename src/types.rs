use serde::{Deserialize, Serialize};
use std::fmt;

//==============================================================================
// Cells
//==============================================================================

/// A single spreadsheet cell as seen by the import/export pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    /// Blank cell inside a row (or a column the row doesn't reach)
    #[default]
    Empty,
}

impl CellValue {
    /// Build a cell from raw text, coercing numeric-looking content to a number.
    ///
    /// Surrounding whitespace is ignored for the check ("  42 " → 42), but
    /// blank text stays text.
    pub fn coerce(text: &str) -> Self {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            if let Ok(n) = trimmed.parse::<f64>() {
                if n.is_finite() {
                    return CellValue::Number(n);
                }
            }
        }
        CellValue::Text(text.to_string())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

//==============================================================================
// Records
//==============================================================================

/// One `{name, age}` entry, the unit of import and export.
///
/// Fields hold whatever sat in the mapped column; nothing checks that `name`
/// is text or `age` is a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub name: CellValue,
    pub age: CellValue,
}

impl Record {
    pub fn new(name: impl Into<CellValue>, age: impl Into<CellValue>) -> Self {
        Self {
            name: name.into(),
            age: age.into(),
        }
    }

    /// Map a parsed row onto a record by column position
    pub fn from_row(row: &[CellValue], mapping: &ColumnMapping) -> Self {
        let cell = |idx: usize| row.get(idx).cloned().unwrap_or_default();
        Self {
            name: cell(mapping.name),
            age: cell(mapping.age),
        }
    }
}

/// A record together with the identity the store assigned on creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    #[serde(flatten)]
    pub record: Record,
}

//==============================================================================
// Column mapping
//==============================================================================

/// Last column index a worksheet can hold (XFD)
pub const MAX_COLUMN_INDEX: usize = 16_383;

/// Which column holds which record field (0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub name: usize,
    pub age: usize,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self { name: 0, age: 1 }
    }
}

//==============================================================================
// Parsed sheet
//==============================================================================

/// Header row plus data rows read from the first worksheet of an upload
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParsedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ParsedSheet {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when there is nothing to show: no header or no data rows
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() || self.rows.is_empty()
    }

    /// Map every data row onto a record
    pub fn to_records(&self, mapping: &ColumnMapping) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| Record::from_row(row, mapping))
            .collect()
    }
}
