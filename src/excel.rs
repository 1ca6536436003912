//! Spreadsheet row reading for the two time-clock export formats.
//!
//! Provides:
//! - A single [`CellValue`] type abstracting calamine's cell representation
//! - [`read_first_sheet`], which decodes `.xls` or `.xlsx`/`.xlsm` and
//!   retries with the alternate decoder when a file's extension lies about
//!   its actual container format

// Allow unused code - some accessors are only used in tests
#![allow(dead_code)]

use std::path::Path;

use calamine::{open_workbook, Data, Range, Reader, Xls, Xlsx};
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Cell Values
// ─────────────────────────────────────────────────────────────────────────────

/// Cell value from an Excel file, independent of the source format.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell.
    Empty,
    /// Numeric value.
    Number(f64),
    /// String value.
    Text(String),
    /// Boolean value.
    Bool(bool),
    /// Error value.
    Error(String),
}

impl CellValue {
    /// Returns the numeric value if this is a number.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string value if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the cell as trimmed text, whatever its type.
    ///
    /// Marker and day cells usually arrive as text, but legacy exports
    /// deliver matricules and HJ codes as floats; integral numbers render
    /// without the spurious `.0` so substring matching works either way.
    pub fn display_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => format_number(*n),
            Self::Bool(b) => b.to_string(),
            Self::Error(e) => e.clone(),
        }
    }

    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<&Data> for CellValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(dt: &Data) -> Self {
        match dt {
            Data::Empty => Self::Empty,
            Data::Int(i) => Self::Number(*i as f64),
            Data::Float(f) => Self::Number(*f),
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Self::Text(s.clone()),
            Data::Bool(b) => Self::Bool(*b),
            Data::Error(e) => Self::Error(format!("{e:?}")),
            Data::DateTime(dt) => Self::Number(dt.as_f64()),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Workbook Reading
// ─────────────────────────────────────────────────────────────────────────────

/// Failure to decode a workbook with either decoder.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("cannot read {file}: {primary}; alternate decoder: {fallback}")]
    UnreadableWorkbook {
        file: String,
        primary: String,
        fallback: String,
    },
}

/// Reads the first worksheet of a workbook as rows of [`CellValue`].
///
/// The extension selects the decoder tried first (`.xls` → legacy BIFF,
/// anything else → OOXML). Exports renamed across formats are common, so a
/// failure of the extension-selected decoder is retried once with the
/// alternate one before the file is given up on.
pub fn read_first_sheet(path: &Path) -> Result<Vec<Vec<CellValue>>, ReadError> {
    let legacy_ext = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("xls"));

    let (primary, fallback): (DecodeFn, DecodeFn) = if legacy_ext {
        (read_as_xls, read_as_xlsx)
    } else {
        (read_as_xlsx, read_as_xls)
    };

    let primary_err = match primary(path) {
        Ok(rows) => return Ok(rows),
        Err(e) => e,
    };

    match fallback(path) {
        Ok(rows) => {
            eprintln!(
                "Warning: '{}' does not match its extension; decoded with the alternate format",
                file_name(path)
            );
            Ok(rows)
        }
        Err(fallback_err) => Err(ReadError::UnreadableWorkbook {
            file: file_name(path),
            primary: primary_err,
            fallback: fallback_err,
        }),
    }
}

type DecodeFn = fn(&Path) -> Result<Vec<Vec<CellValue>>, String>;

fn read_as_xlsx(path: &Path) -> Result<Vec<Vec<CellValue>>, String> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| format!("xlsx: {e}"))?;
    let Some(name) = workbook.sheet_names().into_iter().next() else {
        return Err("xlsx: workbook has no worksheets".to_string());
    };
    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| format!("xlsx: failed to read sheet {name}: {e}"))?;
    Ok(range_to_rows(&range))
}

fn read_as_xls(path: &Path) -> Result<Vec<Vec<CellValue>>, String> {
    let mut workbook: Xls<_> = open_workbook(path).map_err(|e| format!("xls: {e}"))?;
    let Some(name) = workbook.sheet_names().into_iter().next() else {
        return Err("xls: workbook has no worksheets".to_string());
    };
    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| format!("xls: failed to read sheet {name}: {e}"))?;
    Ok(range_to_rows(&range))
}

fn range_to_rows(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    range
        .rows()
        .map(|row| row.iter().map(CellValue::from).collect())
        .collect()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

// ─────────────────────────────────────────────────────────────────────────────
// Test Fixtures
// ─────────────────────────────────────────────────────────────────────────────


// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
