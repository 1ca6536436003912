//! Worker/administrative classification of a finalized employee block.
//!
//! Shift workers are tracked by a separate scheduling system; their rows
//! still appear in the exports and must be dropped before analysis. The
//! signal is the HJ code: a majority of worker-coded weekdays marks the
//! whole block as a worker's.

use crate::types::DailyRecord;

/// HJ code prefixes that mark a shift-worker ("ouvrier") day.
pub const DEFAULT_WORKER_CODES: [&str; 4] = ["130", "140", "141", "131"];

/// Semantic prefix of an HJ code: everything before the first '.'.
///
/// Legacy exports deliver codes as floats, so "130.0" means "130".
pub fn hj_prefix(raw: &str) -> &str {
    match raw.split_once('.') {
        Some((head, _)) => head.trim(),
        None => raw.trim(),
    }
}

/// Keeps or discards a finalized block's records.
///
/// Majority vote over weekday records only: weekend HJ codes do not
/// distinguish worker from admin. Returns the records untouched when there
/// is no weekday signal at all, and discards everything (weekends included)
/// when strictly more than half the weekdays carry a worker code — an exact
/// 50/50 split keeps the block.
#[allow(clippy::cast_precision_loss)]
pub fn filter_block(records: Vec<DailyRecord>, worker_codes: &[String]) -> Vec<DailyRecord> {
    if records.is_empty() {
        return records;
    }

    let weekday_count = records.iter().filter(|r| !r.is_weekend()).count();
    if weekday_count == 0 {
        return records;
    }

    let matches = records
        .iter()
        .filter(|r| !r.is_weekend())
        .filter(|r| {
            let prefix = hj_prefix(&r.hj_code);
            worker_codes.iter().any(|code| code == prefix)
        })
        .count();

    let ratio = matches as f64 / weekday_count as f64;
    if ratio > 0.5 {
        Vec::new()
    } else {
        records
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DayKind, SourceContext};

    fn worker_codes() -> Vec<String> {
        DEFAULT_WORKER_CODES.iter().map(ToString::to_string).collect()
    }

    fn record(day_label: &str, hj_code: &str) -> DailyRecord {
        DailyRecord {
            employee_name: "DUPONT JEAN".to_string(),
            service: String::new(),
            matricule: String::new(),
            day_numeric: 1,
            day_label: day_label.to_string(),
            full_date: None,
            hj_code: hj_code.to_string(),
            scan_times: Vec::new(),
            day_kind: DayKind::Worked,
            source: SourceContext {
                file: "f.xlsx".to_string(),
                month: "01".to_string(),
                year: "2025".to_string(),
            },
        }
    }

    #[test]
    fn hj_prefix_splits_on_dot() {
        assert_eq!(hj_prefix("130.0"), "130");
        assert_eq!(hj_prefix("130"), "130");
        assert_eq!(hj_prefix(" 141 . 0"), "141");
        assert_eq!(hj_prefix(""), "");
    }

    #[test]
    fn block_without_weekday_records_is_kept() {
        let records = vec![record("Sa", "130"), record("Di", "140.0")];
        let kept = filter_block(records.clone(), &worker_codes());
        assert_eq!(kept, records);
    }

    #[test]
    fn exact_half_split_is_kept() {
        let records = vec![
            record("Lu", "130"),
            record("Ma", "100"),
            record("Me", "140.0"),
            record("Je", "100"),
        ];
        let kept = filter_block(records.clone(), &worker_codes());
        assert_eq!(kept, records);
    }

    #[test]
    fn worker_majority_discards_weekends_too() {
        let records = vec![
            record("Lu", "130.0"),
            record("Ma", "131"),
            record("Me", "100"),
            record("Sa", "100"),
        ];
        // 2 of 3 weekdays match: the Saturday goes with them.
        assert!(filter_block(records, &worker_codes()).is_empty());
    }

    #[test]
    fn admin_majority_keeps_everything() {
        let records = vec![
            record("Lu", "100"),
            record("Ma", "100"),
            record("Me", "130"),
        ];
        let kept = filter_block(records.clone(), &worker_codes());
        assert_eq!(kept, records);
    }

    #[test]
    fn empty_block_stays_empty() {
        assert!(filter_block(Vec::new(), &worker_codes()).is_empty());
    }
}
