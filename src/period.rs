//! Period completeness resolution.
//!
//! A bundle's rows are chronological even when the sheet spans a month
//! boundary (…, 30, 31, 1, 2), so the day sequence is taken in first
//! occurrence order, never sorted. The most recent day may still be in
//! progress at export time; it is dropped when most of its records have at
//! most one punch.

use serde::Serialize;

use crate::types::DailyRecord;

/// Share of `scan_count <= 1` records above which the most recent day is
/// considered still in progress.
const INCOMPLETE_DAY_RATIO: f64 = 0.5;

const FRENCH_MONTH_NAMES: [(&str, &str); 12] = [
    ("01", "Janvier"),
    ("02", "Février"),
    ("03", "Mars"),
    ("04", "Avril"),
    ("05", "Mai"),
    ("06", "Juin"),
    ("07", "Juillet"),
    ("08", "Août"),
    ("09", "Septembre"),
    ("10", "Octobre"),
    ("11", "Novembre"),
    ("12", "Décembre"),
];

/// Resolved chronology of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodSummary {
    /// Distinct day-of-month values in first-occurrence order, before any
    /// incomplete-day trim.
    pub days_in_order: Vec<u32>,
    pub start_day: u32,
    /// Most recent complete day; daily reporting filters on this.
    pub target_day: u32,
    /// Index of the last day of the earlier month when the sequence crosses
    /// a month boundary.
    pub month_pivot: Option<usize>,
    /// Day dropped as still in progress, if any.
    pub dropped_day: Option<u32>,
    pub month: String,
    pub month_name: String,
    pub year: String,
}

/// Runs the completeness check over the merged record collection.
///
/// Returns the (possibly trimmed) working set and the period summary, or
/// `None` when there is nothing to resolve.
pub fn resolve(records: Vec<DailyRecord>) -> Option<(Vec<DailyRecord>, PeriodSummary)> {
    let first = records.first()?;
    let month = first.source.month.clone();
    let year = first.source.year.clone();

    let mut days_in_order: Vec<u32> = Vec::new();
    for record in &records {
        if !days_in_order.contains(&record.day_numeric) {
            days_in_order.push(record.day_numeric);
        }
    }

    let start_day = days_in_order[0];
    let mut target_day = *days_in_order.last().expect("records are non-empty");
    let month_pivot = days_in_order.windows(2).position(|w| w[0] > w[1]);

    let mut dropped_day = None;
    let mut records = records;
    if last_day_is_incomplete(&records, target_day) {
        dropped_day = Some(target_day);
        records.retain(|r| r.day_numeric != target_day);
        if days_in_order.len() > 1 {
            target_day = days_in_order[days_in_order.len() - 2];
        }
    }

    let month_name = FRENCH_MONTH_NAMES
        .iter()
        .find(|(num, _)| *num == month)
        .map_or_else(|| format!("Mois {month}"), |(_, name)| (*name).to_string());

    let summary = PeriodSummary {
        days_in_order,
        start_day,
        target_day,
        month_pivot,
        dropped_day,
        month,
        month_name,
        year,
    };
    Some((records, summary))
}

/// The day is incomplete when strictly more than half of its records have
/// at most one punch — people are still at work.
#[allow(clippy::cast_precision_loss)]
fn last_day_is_incomplete(records: &[DailyRecord], target_day: u32) -> bool {
    let day_records = records.iter().filter(|r| r.day_numeric == target_day);
    let (mut total, mut incomplete) = (0usize, 0usize);
    for record in day_records {
        total += 1;
        if record.scan_count() <= 1 {
            incomplete += 1;
        }
    }
    total > 0 && (incomplete as f64 / total as f64) > INCOMPLETE_DAY_RATIO
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
