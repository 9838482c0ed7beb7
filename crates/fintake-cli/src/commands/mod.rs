pub mod mapping;
pub mod parse;
pub mod ratios;

use clap::Args;
use fintake_core::classify::Classifier;
use fintake_core::error::FintakeError;
use fintake_core::mapping::{builtin, load_mapping};
use fintake_core::model::FinancialReport;
use fintake_core::parsing::DateOrder;
use fintake_core::ParseOptions;
use std::path::PathBuf;
use tracing::debug;

/// Input selection shared by `parse` and `ratios`.
#[derive(Args)]
pub struct InputArgs {
    /// Path to the spreadsheet or CSV file
    pub input_file: PathBuf,

    /// Custom JSON mapping file (overrides --preset)
    #[arg(short, long, value_name = "FILE")]
    pub mapping: Option<PathBuf>,

    /// Built-in mapping to classify lines with
    #[arg(short, long, value_name = "NAME", default_value = "default")]
    pub preset: String,

    /// Workbook sheet to read, 0-based
    #[arg(long, default_value_t = 0)]
    pub sheet: usize,

    /// Currency code (default: detected from headers, else CLP)
    #[arg(long)]
    pub currency: Option<String>,

    /// Company name (default: detected from a "Razón social:" style line)
    #[arg(long)]
    pub company: Option<String>,

    /// Date format for serial-date headers: dmy, mdy or ymd
    #[arg(long, value_parser = parse_date_order, default_value = "dmy")]
    pub date_order: DateOrder,

    /// Skip ratio computation
    #[arg(long)]
    pub no_ratios: bool,
}

fn parse_date_order(s: &str) -> Result<DateOrder, String> {
    DateOrder::from_str_loose(s)
        .ok_or_else(|| format!("unknown date order '{s}' (use dmy, mdy or ymd)"))
}

impl InputArgs {
    fn classifier(&self) -> Result<Classifier, FintakeError> {
        let mapping = match &self.mapping {
            Some(path) => load_mapping(path)?,
            None => builtin::load_preset(&self.preset)?,
        };
        Ok(Classifier::from_mapping(&mapping))
    }

    fn options(&self) -> ParseOptions {
        ParseOptions {
            date_order: self.date_order,
            currency: self.currency.clone(),
            company_name: self.company.clone(),
            sheet_index: self.sheet,
            compute_ratios: !self.no_ratios,
            ..Default::default()
        }
    }

    /// Run the full pipeline on the input file.
    pub fn load_report(&self) -> Result<FinancialReport, FintakeError> {
        let classifier = self.classifier()?;
        debug!(
            file = %self.input_file.display(),
            mapping = classifier.name(),
            "parsing input"
        );
        fintake_core::parse_file(&self.input_file, &classifier, &self.options())
    }
}
