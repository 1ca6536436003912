//! Common types for pointage: the extracted record model, the derived
//! metrics, and the per-file batch report.

#![allow(dead_code)]

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Recognized French weekday abbreviations, Monday through Sunday.
///
/// A sheet row is a day row only when its first cell starts with one of
/// these prefixes.
pub const WEEKDAY_PREFIXES: [&str; 7] = ["Lu", "Ma", "Me", "Je", "Ve", "Sa", "Di"];

// ─────────────────────────────────────────────────────────────────────────────
// Daily Records
// ─────────────────────────────────────────────────────────────────────────────

/// What kind of day a record describes, from the leave/holiday markers on
/// the row. Only `Worked` rows carry scan times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    Worked,
    /// "JOUR FERIE" marker (ignored on Sundays, which are rest days anyway).
    Holiday,
    /// Unhyphenated "CONGE" marker.
    Leave,
    /// "ABSENCE NON JUSTIFIÉE-" marker.
    UnjustifiedAbsence,
}

impl DayKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Worked => "worked",
            Self::Holiday => "holiday",
            Self::Leave => "leave",
            Self::UnjustifiedAbsence => "unjustified_absence",
        }
    }
}

/// Where a record came from: file name plus the month/year inferred from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceContext {
    pub file: String,
    /// Two-digit month, "01".."12".
    pub month: String,
    /// Four-digit year.
    pub year: String,
}

/// One employee's attendance for one calendar day, as extracted from the
/// sheet. Immutable once emitted; derived flags live in [`DayMetrics`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Normalized employee name — the join key across files and months.
    pub employee_name: String,
    pub service: String,
    pub matricule: String,
    /// Day of month, 1..=31 (0 when the row carried no parsable day number).
    pub day_numeric: u32,
    /// Weekday token as written in the sheet, e.g. "Lu" or "Je".
    pub day_label: String,
    /// Full date when the day cell carries a dd/mm/yyyy date (monthly exports).
    pub full_date: Option<NaiveDate>,
    /// Raw HJ status code; only the prefix before any '.' is meaningful.
    pub hj_code: String,
    /// Ordered HH:MM scan punches from the scan cell.
    pub scan_times: Vec<String>,
    pub day_kind: DayKind,
    pub source: SourceContext,
}

impl DailyRecord {
    pub fn scan_count(&self) -> usize {
        self.scan_times.len()
    }

    pub fn is_saturday(&self) -> bool {
        self.day_label.starts_with("Sa")
    }

    pub fn is_sunday(&self) -> bool {
        self.day_label.starts_with("Di")
    }

    pub fn is_weekend(&self) -> bool {
        self.is_saturday() || self.is_sunday()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Derived Metrics
// ─────────────────────────────────────────────────────────────────────────────

/// Flags and durations derived from a single record by the rule engine.
///
/// A pure function of the record: computed once, attached alongside the
/// extraction, never written back into it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DayMetrics {
    /// Paired in/out durations summed, rounded to 2 decimals.
    pub hours_worked: f64,
    /// First scan after 09:30 (but not after 10:00).
    pub late_930: bool,
    /// First scan after 10:00 (but not after 14:00).
    pub late_1000: bool,
    /// First scan after 14:00.
    pub late_1400: bool,
    /// Fewer than two full in/out pairs recorded.
    pub no_lunch: bool,
    /// Worked a positive amount but less than the daily target.
    pub under_hours: bool,
    /// Morning-only or afternoon-only attendance.
    pub half_day: bool,
    /// 4.0 on Saturday, 8.0 otherwise; 0.0 when nothing was worked.
    pub target_hours: f64,
    /// Gap between the 2nd and 3rd scan, in minutes.
    pub lunch_minutes: f64,
    pub has_lunch_break: bool,
}

/// An extracted record together with its derived metrics — the unit the
/// aggregation/reporting layer consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedRecord {
    #[serde(flatten)]
    pub record: DailyRecord,
    pub metrics: DayMetrics,
}

// ─────────────────────────────────────────────────────────────────────────────
// Batch Report
// ─────────────────────────────────────────────────────────────────────────────

/// Per-file result of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// File decoded and segmented; `records` survived classification.
    Parsed { file: String, records: usize },
    /// File skipped with a reason; never fatal to the run.
    Skipped { file: String, reason: String },
}

impl FileOutcome {
    pub fn file(&self) -> &str {
        match self {
            Self::Parsed { file, .. } | Self::Skipped { file, .. } => file,
        }
    }

    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Aggregated per-file outcomes for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn parsed_files(&self) -> usize {
        self.outcomes.len() - self.skipped_files()
    }

    pub fn skipped_files(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }

    /// Records extracted across all parsed files, before the exclusion
    /// filter and period trim.
    pub fn extracted_records(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o {
                FileOutcome::Parsed { records, .. } => *records,
                FileOutcome::Skipped { .. } => 0,
            })
            .sum()
    }
}
