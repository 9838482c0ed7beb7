use fintake_core::error::FintakeError;
use fintake_core::ratios::{variance, Variance};
use serde::Serialize;

use super::InputArgs;
use crate::output;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PeriodRatios<'a> {
    period: &'a str,
    ratios: Option<&'a fintake_core::model::Ratios>,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_period: Option<&'a str>,
    variance: Vec<Variance>,
}

pub fn run(input: &InputArgs, output_format: &str) -> Result<(), FintakeError> {
    let report = input.load_report()?;

    let periods: Vec<PeriodRatios> = report
        .chronological()
        .into_iter()
        .map(|s| {
            let previous = report.previous_of(&s.period);
            PeriodRatios {
                period: &s.period,
                ratios: s.ratios.as_ref(),
                previous_period: previous.map(|p| p.period.as_str()),
                variance: previous.map(|p| variance(s, p)).unwrap_or_default(),
            }
        })
        .collect();

    match output_format {
        "json" => output::json::print(&periods)?,
        _ => {
            for p in &periods {
                println!(
                    "{}",
                    output::table::format_ratios(p.period, p.ratios, p.previous_period, &p.variance)
                );
            }
            for insight in &report.insights {
                println!("  * {insight}");
            }
        }
    }

    Ok(())
}
