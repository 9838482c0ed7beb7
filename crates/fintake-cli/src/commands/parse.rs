use fintake_core::error::FintakeError;
use fintake_core::model::{FinancialReport, ParsingResult};
use std::path::{Path, PathBuf};

use super::InputArgs;
use crate::output;

pub fn run(
    input: &InputArgs,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), FintakeError> {
    let loaded = input.load_report();

    if output_file.is_none() && output_format != "json" {
        println!("{}", output::table::format_report(&loaded?));
        return Ok(());
    }

    // JSON output reports a failed parse as `success: false` before exiting
    let (result, failure) = match loaded {
        Ok(report) => (ParsingResult::from(Ok::<_, FintakeError>(report)), None),
        Err(e) => (
            ParsingResult {
                success: false,
                report: None,
                errors: vec![e.to_string()],
            },
            Some(e),
        ),
    };

    match output_file {
        Some(path) => write_result(&result, &path)?,
        None => output::json::print(&result)?,
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Always JSON when saving to a file; the summary goes to stderr.
fn write_result(result: &ParsingResult, path: &Path) -> Result<(), FintakeError> {
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(path, json)?;

    match &result.report {
        Some(report) => print_summary(report, path),
        None => eprintln!("Parse failed, result written to {}", path.display()),
    }
    Ok(())
}

fn print_summary(report: &FinancialReport, path: &Path) {
    eprintln!(
        "Parsed {} period(s), {} row(s), written to {}",
        report.statements.len(),
        report.raw_rows.len(),
        path.display()
    );
    for w in &report.warnings {
        eprintln!("  warning: {w}");
    }
}
