//! Batch runner - drives the whole extraction pipeline.
//!
//! Orchestrates one run over a bundle of export files:
//! 1. Discover spreadsheet files in the input directory
//! 2. Read and segment each file independently (in parallel)
//! 3. Merge per-file records, apply the name-exclusion filter
//! 4. Resolve the period chronology and trim an in-progress last day
//! 5. Annotate every surviving record with the rule engine

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use crate::config::RunConfig;
use crate::excel;
use crate::extract;
use crate::period::{self, PeriodSummary};
use crate::rules;
use crate::types::{AnnotatedRecord, BatchReport, DailyRecord, FileOutcome, SourceContext};

/// Output prefixes and temp files that must not be re-ingested when the
/// input directory doubles as the report directory.
const SKIPPED_NAME_PREFIXES: [&str; 4] = ["~$", "Daily_Analysis", "Monthly", "Master"];
const SKIPPED_REPORT_PREFIX: &str = "POINTAGE ANALYSE";

// ─────────────────────────────────────────────────────────────────────────────
// Run Results
// ─────────────────────────────────────────────────────────────────────────────

/// Everything a consumer (aggregation, reporting) needs from one run.
#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub period: PeriodSummary,
    pub records: Vec<AnnotatedRecord>,
    pub report: BatchReport,
}

impl RunOutput {
    /// Distinct employees present in the annotated stream.
    pub fn employee_count(&self) -> usize {
        let mut names: Vec<&str> = self
            .records
            .iter()
            .map(|r| r.record.employee_name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    }
}

/// Result of a batch run. An empty bundle is an expected state, not an
/// error.
#[derive(Debug)]
pub enum RunOutcome {
    NoData(BatchReport),
    Complete(Box<RunOutput>),
}

// ─────────────────────────────────────────────────────────────────────────────
// Batch Runner
// ─────────────────────────────────────────────────────────────────────────────

/// Batch runner for one input directory.
pub struct BatchRunner {
    config: RunConfig,
    files: Vec<PathBuf>,
}

impl BatchRunner {
    /// Creates a runner over the spreadsheet files in `input_dir`.
    ///
    /// A missing directory is the one fatal input error; an existing but
    /// empty one yields a runner that reports no data.
    pub fn new(input_dir: &Path, config: RunConfig) -> anyhow::Result<Self> {
        if !input_dir.exists() {
            anyhow::bail!("input directory does not exist: {}", input_dir.display());
        }
        let files = Self::discover_files(input_dir)?;
        Ok(Self { config, files })
    }

    /// Spreadsheet files eligible for ingestion, in name order.
    fn discover_files(input_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(input_dir)? {
            let entry = entry?;
            let path = entry.path();
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            if !has_spreadsheet_extension(&path) {
                continue;
            }
            if SKIPPED_NAME_PREFIXES.iter().any(|p| name.starts_with(p))
                || name.starts_with(SKIPPED_REPORT_PREFIX)
            {
                continue;
            }
            files.push(path);
        }
        files.sort();
        Ok(files)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Runs the full pipeline over the bundle.
    pub fn run(&self) -> RunOutcome {
        let per_file: Vec<(FileOutcome, Vec<DailyRecord>)> = self
            .files
            .par_iter()
            .map(|path| self.process_file(path))
            .collect();

        let mut report = BatchReport::default();
        let mut all_records = Vec::new();
        for (outcome, records) in per_file {
            report.outcomes.push(outcome);
            all_records.extend(records);
        }

        let exclusions = self.config.normalized_exclusions();
        if !exclusions.is_empty() {
            all_records.retain(|r| !exclusions.contains(&r.employee_name));
        }

        let Some((kept, period)) = period::resolve(all_records) else {
            return RunOutcome::NoData(report);
        };

        let records = kept
            .into_iter()
            .map(|record| AnnotatedRecord {
                metrics: rules::annotate(&record),
                record,
            })
            .collect();

        RunOutcome::Complete(Box::new(RunOutput {
            period,
            records,
            report,
        }))
    }

    /// Reads and segments one file. Failures become a skip outcome, never a
    /// run abort.
    fn process_file(&self, path: &Path) -> (FileOutcome, Vec<DailyRecord>) {
        let file = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

        match excel::read_first_sheet(path) {
            Err(e) => (
                FileOutcome::Skipped {
                    file,
                    reason: e.to_string(),
                },
                Vec::new(),
            ),
            Ok(rows) => {
                let (month, year) = extract::month_year_from_filename(
                    &file,
                    &self.config.default_month,
                    &self.config.default_year,
                );
                let source = SourceContext {
                    file: file.clone(),
                    month,
                    year,
                };
                let records = extract::extract_sheet(&rows, source, &self.config.worker_codes);
                (
                    FileOutcome::Parsed {
                        file,
                        records: records.len(),
                    },
                    records,
                )
            }
        }
    }
}

fn has_spreadsheet_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        ext.eq_ignore_ascii_case("xls")
            || ext.eq_ignore_ascii_case("xlsx")
            || ext.eq_ignore_ascii_case("xlsm")
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excel::fixtures;

    fn runner_over(dir: &Path) -> BatchRunner {
        BatchRunner::new(dir, RunConfig::default()).unwrap()
    }

    #[test]
    fn missing_input_dir_is_fatal() {
        let result = BatchRunner::new(Path::new("/nonexistent/data"), RunConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn discovery_skips_temp_and_report_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path();
        for name in [
            "~$POINTAGE AOUT 2025.xlsx",
            "Monthly_Global_Analysis.xlsx",
            "Daily_Analysis_Report.xlsx",
            "Master_List.xls",
            "POINTAGE ANALYSE DU 01-08-2025 A 05-08-2025.xlsx",
        ] {
            fs::write(dir.join(name), b"ignored").unwrap();
        }
        fs::write(dir.join("notes.txt"), b"ignored").unwrap();
        fixtures::write_rows(&dir.join("POINTAGE AOUT 2025.xlsx"), &fixtures::dupont_week("DUPONT JEAN"))
            .unwrap();

        let runner = runner_over(dir);
        assert_eq!(runner.file_count(), 1);
    }

    #[test]
    fn empty_dir_yields_no_data() {
        let temp_dir = tempfile::tempdir().unwrap();
        let runner = runner_over(temp_dir.path());
        assert_eq!(runner.file_count(), 0);
        assert!(matches!(runner.run(), RunOutcome::NoData(_)));
    }

    #[test]
    fn unreadable_file_is_skipped_not_fatal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("broken.xlsx"), b"not a workbook").unwrap();
        fixtures::write_rows(&dir.join("POINTAGE AOUT 2025.xlsx"), &fixtures::dupont_week("DUPONT JEAN"))
            .unwrap();

        let RunOutcome::Complete(output) = runner_over(dir).run() else {
            panic!("expected records from the readable file");
        };
        assert_eq!(output.report.skipped_files(), 1);
        assert_eq!(output.report.parsed_files(), 1);
        assert_eq!(output.records.len(), 5);
    }

    #[test]
    fn full_week_pipeline_end_to_end() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path();
        let mut rows = fixtures::dupont_week("DUPONT JEAN");
        // A following block-start marker must flush the five day rows.
        rows.push(fixtures::row(&["NOM : MARTIN LUC"]));
        fixtures::write_rows(&dir.join("POINTAGE AOUT 2025.xlsx"), &rows).unwrap();

        let RunOutcome::Complete(output) = runner_over(dir).run() else {
            panic!("expected a complete run");
        };

        assert_eq!(output.records.len(), 5);
        assert_eq!(output.employee_count(), 1);
        assert_eq!(output.period.month, "08");
        assert_eq!(output.period.year, "2025");
        assert_eq!(output.period.days_in_order, vec![1, 2, 3, 4, 5]);
        assert_eq!(output.period.target_day, 5);
        assert_eq!(output.period.dropped_day, None);

        for annotated in &output.records {
            assert_eq!(annotated.record.employee_name, "DUPONT JEAN");
            let m = annotated.metrics;
            assert_eq!(m.hours_worked, 8.0);
            assert!(!m.late_930 && !m.late_1000 && !m.late_1400);
            assert!(!m.no_lunch && !m.under_hours && !m.half_day);
        }
    }

    #[test]
    fn excluded_employee_is_filtered_out() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path();
        fixtures::write_rows(&dir.join("POINTAGE AOUT 2025.xlsx"), &fixtures::dupont_week("DUPONT JEAN"))
            .unwrap();

        let config = RunConfig {
            excluded_employees: vec!["dupont\u{a0}jean".to_string()],
            ..RunConfig::default()
        };
        let runner = BatchRunner::new(dir, config).unwrap();
        assert!(matches!(runner.run(), RunOutcome::NoData(_)));
    }

    #[test]
    fn multiple_files_merge_in_name_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path();
        fixtures::write_rows(&dir.join("A POINTAGE AOUT 2025.xlsx"), &fixtures::dupont_week("DUPONT JEAN"))
            .unwrap();
        fixtures::write_rows(&dir.join("B POINTAGE AOUT 2025.xlsx"), &fixtures::dupont_week("MARTIN LUC"))
            .unwrap();

        let RunOutcome::Complete(output) = runner_over(dir).run() else {
            panic!("expected a complete run");
        };
        assert_eq!(output.records.len(), 10);
        assert_eq!(output.employee_count(), 2);
        assert_eq!(output.records[0].record.employee_name, "DUPONT JEAN");
        assert_eq!(output.records[5].record.employee_name, "MARTIN LUC");
    }
}
