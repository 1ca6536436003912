//! pointage: batch analysis of biometric time-clock exports.
//!
//! Reads a directory of monthly export spreadsheets, extracts per-day
//! attendance records, classifies out shift workers, resolves the reporting
//! period, annotates every record with the business rules, and emits the
//! annotated stream as JSON or CSV for the reporting tools.

mod classify;
mod config;
mod excel;
mod export;
mod extract;
mod period;
mod rules;
mod runner;
mod scan;
mod types;

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use colored::Colorize;

use crate::config::RunConfig;
use crate::runner::{BatchRunner, RunOutcome, RunOutput};
use crate::types::FileOutcome;

// ─────────────────────────────────────────────────────────────────────────────
// CLI
// ─────────────────────────────────────────────────────────────────────────────

/// CLI arguments for pointage.
#[derive(Parser)]
#[command(name = "pointage")]
#[command(about = "Attendance analysis engine for biometric time-clock exports")]
#[command(version)]
struct Cli {
    /// Directory containing the export spreadsheets.
    #[arg(default_value = "Data")]
    input: PathBuf,

    /// Optional YAML run configuration.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the record stream to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Record-stream format.
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Suppress the console summary.
    #[arg(short, long)]
    quiet: bool,
}

/// Output format for the annotated record stream.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match RunConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{} {e:#}", "ERROR:".red().bold());
            return ExitCode::FAILURE;
        }
    };

    let runner = match BatchRunner::new(&cli.input, config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{} {e:#}", "ERROR:".red().bold());
            return ExitCode::FAILURE;
        }
    };

    if !cli.quiet {
        println!(
            "{} {} file(s) in {}",
            "Bundle:".cyan().bold(),
            runner.file_count(),
            cli.input.display()
        );
    }

    match runner.run() {
        RunOutcome::NoData(report) => {
            if !cli.quiet {
                print_outcomes(&report.outcomes);
            }
            // Expected state for an empty bundle, not a failure.
            eprintln!(
                "{} no attendance data found in {}",
                "Warning:".yellow().bold(),
                cli.input.display()
            );
            ExitCode::SUCCESS
        }
        RunOutcome::Complete(output) => {
            if !cli.quiet {
                print_summary(&output);
            }
            if let Err(e) = write_stream(&cli, &output) {
                eprintln!("{} {e:#}", "ERROR:".red().bold());
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Console Summary
// ─────────────────────────────────────────────────────────────────────────────

fn print_outcomes(outcomes: &[FileOutcome]) {
    for outcome in outcomes {
        match outcome {
            FileOutcome::Parsed { file, records } => {
                println!(
                    "  {} {} ({} record(s))",
                    "✓".green().bold(),
                    file.white(),
                    records
                );
            }
            FileOutcome::Skipped { file, reason } => {
                println!("  {} {} ({})", "⊘".yellow().bold(), file.white(), reason.yellow());
            }
        }
    }
}

fn print_summary(output: &RunOutput) {
    println!();
    println!("{}", "═".repeat(70).cyan());
    println!("{}", "  pointage: attendance batch summary".cyan().bold());
    println!("{}", "═".repeat(70).cyan());

    print_outcomes(&output.report.outcomes);

    let p = &output.period;
    println!();
    println!(
        "{} {} {} — days {:?}",
        "Period:".cyan().bold(),
        p.month_name,
        p.year,
        p.days_in_order
    );
    if let Some(pivot) = p.month_pivot {
        println!(
            "  {} sequence crosses a month boundary after day {}",
            "Note:".cyan(),
            p.days_in_order[pivot]
        );
    }
    if let Some(day) = p.dropped_day {
        println!(
            "  {} day {} is still in progress — dropped; target day is now {}",
            "Decision:".yellow().bold(),
            day,
            p.target_day
        );
    } else {
        println!(
            "  {} day {} is complete",
            "Decision:".green().bold(),
            p.target_day
        );
    }

    println!(
        "  {} {} annotated record(s) across {} employee(s) ({} extracted before filters)",
        "Total:".cyan().bold(),
        output.records.len(),
        output.employee_count(),
        output.report.extracted_records()
    );
    println!("{}", "═".repeat(70).cyan());
}

// ─────────────────────────────────────────────────────────────────────────────
// Record-Stream Output
// ─────────────────────────────────────────────────────────────────────────────

fn write_stream(cli: &Cli, output: &RunOutput) -> anyhow::Result<()> {
    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_formatted(cli.format, file, output)?;
            if !cli.quiet {
                println!(
                    "  {} wrote {} record(s) to {}",
                    "Stream:".cyan().bold(),
                    output.records.len(),
                    path.display()
                );
            }
            Ok(())
        }
        None => write_formatted(cli.format, io::stdout().lock(), output),
    }
}

fn write_formatted<W: Write>(format: Format, writer: W, output: &RunOutput) -> anyhow::Result<()> {
    match format {
        Format::Json => export::write_json(writer, output),
        Format::Csv => export::write_csv(writer, &output.records),
    }
}
