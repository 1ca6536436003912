//! Business-rule engine: derives lateness, half-day, no-lunch and
//! under-hours flags plus worked duration from one day's raw scans.
//!
//! Pure per-record function; nothing here mutates the extraction.

use chrono::NaiveTime;

use crate::scan;
use crate::types::{DailyRecord, DayKind, DayMetrics};

const SATURDAY_TARGET_HOURS: f64 = 4.0;
const WEEKDAY_TARGET_HOURS: f64 = 8.0;
/// A morning-only day shorter than this counts as a half-day.
const HALF_DAY_HOURS_CEILING: f64 = 7.0;

fn at(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("in-range constant")
}

/// Computes the full metric set for one record.
///
/// Leave/holiday/absence days and scan-less days yield the all-false,
/// zero-hours default.
pub fn annotate(record: &DailyRecord) -> DayMetrics {
    let mut m = DayMetrics::default();
    if record.day_kind != DayKind::Worked {
        return m;
    }
    let scans = &record.scan_times;
    if scans.is_empty() {
        return m;
    }

    let saturday = record.is_saturday();
    m.hours_worked = scan::worked_hours(scans);

    // Lateness tiers: strict priority on the first scan, highest threshold
    // wins, never more than one flag set.
    if let Some(first) = scan::parse_hhmm(&scans[0]) {
        if first > at(14, 0) {
            m.late_1400 = true;
        } else if first > at(10, 0) {
            m.late_1000 = true;
        } else if first > at(9, 30) {
            m.late_930 = true;
        }
    }

    // Fewer than two full in/out pairs means no lunch break was punched.
    // Not applicable on Saturdays (half-day schedule) or after a 14:00
    // arrival (afternoon-only attendance has no lunch to track).
    m.no_lunch = !m.late_1400 && !saturday && scans.len() < 4;

    let target = if saturday {
        SATURDAY_TARGET_HOURS
    } else {
        WEEKDAY_TARGET_HOURS
    };
    m.under_hours = m.hours_worked > 0.0 && m.hours_worked < target;
    m.target_hours = if m.hours_worked > 0.0 { target } else { 0.0 };

    half_day(&mut m, scans, saturday);
    lunch_break(&mut m, scans, saturday);
    m
}

/// Half-day: afternoon-only arrival (first scan at or after 13:00), or a
/// morning-only shift (last scan by 14:00) that stayed under 7 hours.
/// Never on Saturday, never without worked hours.
fn half_day(m: &mut DayMetrics, scans: &[String], saturday: bool) {
    if saturday || scans.len() < 2 || m.hours_worked <= 0.0 {
        return;
    }
    let (Some(first), Some(last)) = (
        scan::parse_hhmm(&scans[0]),
        scan::parse_hhmm(&scans[scans.len() - 1]),
    ) else {
        return;
    };

    let afternoon_only = first >= at(13, 0);
    // A last scan past midnight belongs to the next day and cannot be an
    // early departure.
    let wrapped = last < first;
    let morning_only = !wrapped && last <= at(14, 0) && m.hours_worked < HALF_DAY_HOURS_CEILING;

    m.half_day = afternoon_only || morning_only;
}

/// Lunch gap between the morning-out and afternoon-in punches, tracked only
/// when both pairs exist and the day is not a Saturday.
fn lunch_break(m: &mut DayMetrics, scans: &[String], saturday: bool) {
    if saturday || scans.len() < 4 {
        return;
    }
    if let (Some(out), Some(back)) = (scan::parse_hhmm(&scans[1]), scan::parse_hhmm(&scans[2])) {
        #[allow(clippy::cast_precision_loss)]
        {
            m.lunch_minutes = scan::span_minutes(out, back) as f64;
        }
        m.has_lunch_break = true;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceContext;

    fn record(day_label: &str, scans: &[&str]) -> DailyRecord {
        DailyRecord {
            employee_name: "DUPONT JEAN".to_string(),
            service: String::new(),
            matricule: String::new(),
            day_numeric: 4,
            day_label: day_label.to_string(),
            full_date: None,
            hj_code: "100".to_string(),
            scan_times: scans.iter().map(ToString::to_string).collect(),
            day_kind: DayKind::Worked,
            source: SourceContext {
                file: "f.xlsx".to_string(),
                month: "08".to_string(),
                year: "2025".to_string(),
            },
        }
    }

    fn annotate_day(day_label: &str, scans: &[&str]) -> DayMetrics {
        annotate(&record(day_label, scans))
    }

    fn lateness_flags(m: &DayMetrics) -> (bool, bool, bool) {
        (m.late_930, m.late_1000, m.late_1400)
    }

    #[test]
    fn clean_full_day_has_no_flags() {
        let m = annotate_day("Lu", &["08:00", "12:00", "13:00", "17:00"]);
        assert_eq!(m.hours_worked, 8.0);
        assert_eq!(lateness_flags(&m), (false, false, false));
        assert!(!m.no_lunch);
        assert!(!m.under_hours);
        assert!(!m.half_day);
        assert_eq!(m.target_hours, 8.0);
        assert_eq!(m.lunch_minutes, 60.0);
        assert!(m.has_lunch_break);
    }

    #[test]
    fn zero_scans_yield_defaults() {
        let m = annotate_day("Lu", &[]);
        assert_eq!(m, DayMetrics::default());
    }

    #[test]
    fn non_worked_kinds_yield_defaults() {
        let mut r = record("Je", &["08:00", "17:00"]);
        r.day_kind = DayKind::Holiday;
        // Scans on a marker row would be junk anyway.
        assert_eq!(annotate(&r), DayMetrics::default());
    }

    #[test]
    fn lateness_tiers_are_mutually_exclusive() {
        let cases: [(&str, (bool, bool, bool)); 6] = [
            ("09:30", (false, false, false)),
            ("09:31", (true, false, false)),
            ("10:00", (true, false, false)),
            ("10:01", (false, true, false)),
            ("14:00", (false, true, false)),
            ("14:01", (false, false, true)),
        ];
        for (first, expected) in cases {
            let m = annotate_day("Lu", &[first, "18:00"]);
            assert_eq!(lateness_flags(&m), expected, "first scan {first}");
            let set = [m.late_930, m.late_1000, m.late_1400]
                .iter()
                .filter(|f| **f)
                .count();
            assert!(set <= 1);
        }
    }

    #[test]
    fn overnight_shift_wraps_at_midnight() {
        let m = annotate_day("Lu", &["22:00", "02:00"]);
        assert_eq!(m.hours_worked, 4.0);
        assert!(m.under_hours);
    }

    #[test]
    fn no_lunch_single_pair() {
        let m = annotate_day("Lu", &["08:00", "16:00"]);
        assert!(m.no_lunch);
    }

    #[test]
    fn no_lunch_odd_scan_count() {
        // Three punches: a missed punch still reads as no lunch.
        let m = annotate_day("Lu", &["08:00", "12:00", "13:00"]);
        assert!(m.no_lunch);
    }

    #[test]
    fn no_lunch_suppressed_on_saturday_and_after_1400() {
        assert!(!annotate_day("Sa", &["08:00", "12:00"]).no_lunch);
        assert!(!annotate_day("Lu", &["14:30", "18:00"]).no_lunch);
    }

    #[test]
    fn under_hours_uses_saturday_target() {
        assert!(annotate_day("Lu", &["08:00", "15:00"]).under_hours);
        assert!(!annotate_day("Sa", &["08:00", "12:30"]).under_hours);
        assert!(annotate_day("Sa", &["08:00", "11:00"]).under_hours);
    }

    #[test]
    fn under_hours_requires_worked_hours() {
        // A lone scan computes zero hours and cannot be under-hours.
        let m = annotate_day("Lu", &["08:00"]);
        assert_eq!(m.hours_worked, 0.0);
        assert!(!m.under_hours);
        assert_eq!(m.target_hours, 0.0);
    }

    #[test]
    fn half_day_afternoon_arrival() {
        let m = annotate_day("Lu", &["13:00", "17:00"]);
        assert!(m.half_day);
    }

    #[test]
    fn half_day_early_departure() {
        let m = annotate_day("Lu", &["08:00", "13:30"]);
        assert!(m.half_day);
    }

    #[test]
    fn full_morning_to_evening_is_not_half_day() {
        let m = annotate_day("Lu", &["08:00", "17:00"]);
        assert!(!m.half_day);
    }

    #[test]
    fn half_day_never_on_saturday() {
        let m = annotate_day("Sa", &["13:00", "17:00"]);
        assert!(!m.half_day);
    }

    #[test]
    fn late_1400_is_also_half_day() {
        let m = annotate_day("Lu", &["14:30", "18:00"]);
        assert!(m.late_1400);
        assert!(m.half_day);
    }

    #[test]
    fn lunch_break_not_tracked_on_saturday() {
        let m = annotate_day("Sa", &["08:00", "12:00", "13:00", "15:00"]);
        assert_eq!(m.lunch_minutes, 0.0);
        assert!(!m.has_lunch_break);
    }

    #[test]
    fn unparsable_first_scan_sets_no_lateness() {
        let m = annotate_day("Lu", &["25:99", "12:00", "13:00", "17:00"]);
        assert_eq!(lateness_flags(&m), (false, false, false));
        assert_eq!(m.hours_worked, 4.0);
    }
}
