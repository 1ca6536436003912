//! Attendance record extraction: a stateful scan over sheet rows that
//! segments the sheet into per-employee blocks and emits one normalized
//! [`DailyRecord`] per calendar day worked.
//!
//! Sheet layout (one block per employee, repeated down the sheet):
//!
//! ```text
//! SERVICE / SECTION : ADMINISTRATION
//! NOM : DUPONT JEAN
//! MATRICULE : 1042
//! Date        HJ      Heures
//! Lu 01       100     08:01 12:30 13:02 17:45
//! ...
//! ```

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::classify;
use crate::excel::CellValue;
use crate::types::{DailyRecord, DayKind, SourceContext, WEEKDAY_PREFIXES};

// Block and row markers, exact substrings on trimmed cell text.
pub const SERVICE_MARKER: &str = "SERVICE / SECTION :";
pub const NAME_MARKER: &str = "NOM :";
pub const MATRICULE_MARKER: &str = "MATRICULE :";
/// Hyphenated leave rows are dropped outright.
pub const LEAVE_ROW_MARKER: &str = "CONGE-";
pub const HOLIDAY_MARKER: &str = "JOUR FERIE";
pub const LEAVE_MARKER: &str = "CONGE";
pub const ABSENCE_MARKER: &str = "ABSENCE NON JUSTIFIÉE-";

// ─────────────────────────────────────────────────────────────────────────────
// Name Normalization
// ─────────────────────────────────────────────────────────────────────────────

/// Normalizes an employee name into the cross-file join key.
///
/// Uppercased, every whitespace character (including non-breaking spaces
/// and tabs) mapped to a plain space, runs collapsed, ends trimmed.
/// Idempotent: exports of the same person across months normalize to the
/// same string.
pub fn normalize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.extend(ch.to_uppercase());
        }
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Filename Month/Year Inference
// ─────────────────────────────────────────────────────────────────────────────

const FRENCH_MONTHS: [(&str, &str); 12] = [
    ("JANVIER", "01"),
    ("FEVRIER", "02"),
    ("MARS", "03"),
    ("AVRIL", "04"),
    ("MAI", "05"),
    ("JUIN", "06"),
    ("JUILLET", "07"),
    ("AOUT", "08"),
    ("SEPTEMBRE", "09"),
    ("OCTOBRE", "10"),
    ("NOVEMBRE", "11"),
    ("DECEMBRE", "12"),
];

/// Infers (month, year) from an export's file name.
///
/// The exports carry no date cells in older layouts, but their names do:
/// a French month name and a four-digit year ("POINTAGE AOUT 2024.xls").
/// Falls back to a standalone numeric month, then to the configured
/// defaults.
pub fn month_year_from_filename(
    file_name: &str,
    default_month: &str,
    default_year: &str,
) -> (String, String) {
    static YEAR_RE: OnceLock<Regex> = OnceLock::new();
    static MONTH_NUM_RE: OnceLock<Regex> = OnceLock::new();

    let upper = file_name.to_uppercase();

    let year = YEAR_RE
        .get_or_init(|| Regex::new(r"\b(20\d{2})\b").expect("valid year pattern"))
        .find(&upper)
        .map_or_else(|| default_year.to_string(), |m| m.as_str().to_string());

    for (name, num) in FRENCH_MONTHS {
        if upper.contains(name) {
            return (num.to_string(), year);
        }
    }

    let month = MONTH_NUM_RE
        .get_or_init(|| Regex::new(r"\b(0[1-9]|1[0-2])\b").expect("valid month pattern"))
        .find(&upper)
        .map_or_else(|| default_month.to_string(), |m| m.as_str().to_string());

    (month, year)
}

// ─────────────────────────────────────────────────────────────────────────────
// Day-Row Parsing Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// First integer substring of a day cell, e.g. "Je 01/08" -> 1.
fn day_number(text: &str) -> u32 {
    static DAY_NUM_RE: OnceLock<Regex> = OnceLock::new();
    DAY_NUM_RE
        .get_or_init(|| Regex::new(r"\d+").expect("valid day pattern"))
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Full dd/mm/yyyy date when the day cell carries one (monthly layouts).
fn full_date(text: &str) -> Option<NaiveDate> {
    static DATE_RE: OnceLock<Regex> = OnceLock::new();
    let caps = DATE_RE
        .get_or_init(|| Regex::new(r"(\d{2})/(\d{2})/(\d{4})").expect("valid date pattern"))
        .captures(text)?;
    let day = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let year = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn is_day_row(first_cell: &str) -> bool {
    WEEKDAY_PREFIXES.iter().any(|p| first_cell.starts_with(p))
        && first_cell.chars().any(|c| c.is_ascii_digit())
}

/// Day kind from the combined (uppercased) first/scan cell text.
/// Hyphenated leave rows never reach this point.
fn day_kind(combined: &str, first_cell: &str) -> DayKind {
    if combined.contains(HOLIDAY_MARKER) {
        // A holiday tag on a Sunday adds nothing: it is a rest day anyway.
        if first_cell.starts_with("Di") {
            DayKind::Worked
        } else {
            DayKind::Holiday
        }
    } else if combined.contains(LEAVE_MARKER) {
        DayKind::Leave
    } else if combined.contains(ABSENCE_MARKER) {
        DayKind::UnjustifiedAbsence
    } else {
        DayKind::Worked
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Employee Segmenter
// ─────────────────────────────────────────────────────────────────────────────

/// In-progress per-employee buffer. Replaced wholesale at each block-start
/// marker; its records pass through the role classifier on flush.
#[derive(Debug, Default)]
struct EmployeeBlock {
    service: String,
    name: String,
    matricule: String,
    records: Vec<DailyRecord>,
}

/// Stateful scan over one sheet's rows.
///
/// One block is in flight at a time: "SERVICE / SECTION :" and "NOM :"
/// markers flush the current block through [`classify::filter_block`] and
/// start a fresh one; end of sheet flushes the last.
pub struct SheetExtractor<'a> {
    source: SourceContext,
    worker_codes: &'a [String],
    current: EmployeeBlock,
    emitted: Vec<DailyRecord>,
}

impl<'a> SheetExtractor<'a> {
    pub fn new(source: SourceContext, worker_codes: &'a [String]) -> Self {
        Self {
            source,
            worker_codes,
            current: EmployeeBlock::default(),
            emitted: Vec::new(),
        }
    }

    /// Consumes the row sequence and returns every record that survived
    /// classification, in sheet order.
    pub fn extract(mut self, rows: &[Vec<CellValue>]) -> Vec<DailyRecord> {
        for row in rows {
            self.push_row(row);
        }
        self.flush();
        self.emitted
    }

    fn push_row(&mut self, row: &[CellValue]) {
        let first = row.first().map(CellValue::display_text).unwrap_or_default();
        if first.is_empty() {
            return;
        }

        if first.contains(SERVICE_MARKER) {
            self.flush();
            self.current.service = remainder(&first, SERVICE_MARKER);
        } else if first.contains(NAME_MARKER) {
            // The new block inherits the service heading above it.
            let service = std::mem::take(&mut self.current.service);
            self.flush();
            self.current.service = service;
            self.current.name = normalize_name(&remainder(&first, NAME_MARKER));
        } else if first.contains(MATRICULE_MARKER) {
            self.current.matricule = remainder(&first, MATRICULE_MARKER);
        } else if is_day_row(&first) {
            self.push_day_row(&first, row);
        }
    }

    fn push_day_row(&mut self, first: &str, row: &[CellValue]) {
        let hj_code = row.get(1).map(CellValue::display_text).unwrap_or_default();
        let scan_text = row.get(2).map(CellValue::display_text).unwrap_or_default();

        let combined = format!("{first} {scan_text}").to_uppercase();
        if combined.contains(LEAVE_ROW_MARKER) {
            return;
        }
        // Repeated column-header rows inside the sheet body.
        if first.contains("Date") || first.contains("Heures") {
            return;
        }

        let kind = day_kind(&combined, first);
        let scan_times = if kind == DayKind::Worked {
            crate::scan::scan_tokens(&scan_text)
        } else {
            Vec::new()
        };

        self.current.records.push(DailyRecord {
            employee_name: self.current.name.clone(),
            service: self.current.service.clone(),
            matricule: self.current.matricule.clone(),
            day_numeric: day_number(first),
            day_label: first
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string(),
            full_date: full_date(first),
            hj_code,
            scan_times,
            day_kind: kind,
            source: self.source.clone(),
        });
    }

    /// Flush-and-reset: the current block goes through the role classifier,
    /// survivors are appended to the output, and a fresh block begins.
    fn flush(&mut self) {
        let block = std::mem::take(&mut self.current);
        self.emitted
            .extend(classify::filter_block(block.records, self.worker_codes));
    }
}

/// Extracts all records from one sheet's rows.
pub fn extract_sheet(
    rows: &[Vec<CellValue>],
    source: SourceContext,
    worker_codes: &[String],
) -> Vec<DailyRecord> {
    SheetExtractor::new(source, worker_codes).extract(rows)
}

fn remainder(cell: &str, marker: &str) -> String {
    cell.replacen(marker, "", 1).trim().to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
