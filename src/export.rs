//! Record-stream export.
//!
//! The aggregation and reporting layers live in other tools; this module is
//! the seam they consume: the full run output as JSON, or the annotated
//! records flattened to CSV rows.

use std::io::Write;

use crate::runner::RunOutput;
use crate::types::AnnotatedRecord;

const CSV_HEADER: [&str; 22] = [
    "source_file",
    "month",
    "year",
    "service",
    "name",
    "matricule",
    "day",
    "day_label",
    "date",
    "day_kind",
    "hj_code",
    "scan_count",
    "scans",
    "hours_worked",
    "late_930",
    "late_1000",
    "late_1400",
    "no_lunch",
    "under_hours",
    "half_day",
    "target_hours",
    "lunch_minutes",
];

/// Writes the full run output (records, period summary, batch report) as
/// pretty-printed JSON.
pub fn write_json<W: Write>(writer: W, output: &RunOutput) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(writer, output)?;
    Ok(())
}

/// Writes one CSV row per annotated record.
pub fn write_csv<W: Write>(writer: W, records: &[AnnotatedRecord]) -> anyhow::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;
    for annotated in records {
        let r = &annotated.record;
        let m = &annotated.metrics;
        let row = vec![
            r.source.file.clone(),
            r.source.month.clone(),
            r.source.year.clone(),
            r.service.clone(),
            r.employee_name.clone(),
            r.matricule.clone(),
            r.day_numeric.to_string(),
            r.day_label.clone(),
            r.full_date.map(|d| d.to_string()).unwrap_or_default(),
            r.day_kind.as_str().to_string(),
            r.hj_code.clone(),
            r.scan_count().to_string(),
            r.scan_times.join(" "),
            m.hours_worked.to_string(),
            m.late_930.to_string(),
            m.late_1000.to_string(),
            m.late_1400.to_string(),
            m.no_lunch.to_string(),
            m.under_hours.to_string(),
            m.half_day.to_string(),
            m.target_hours.to_string(),
            m.lunch_minutes.to_string(),
        ];
        csv.write_record(&row)?;
    }
    csv.flush()?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
