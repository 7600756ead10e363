//! `caseload processing` subcommand: mean and median case processing days

use std::path::PathBuf;

use clap::Args;

use caseload::services::{Interval, ProcessingStats, ProcessingView};
use caseload::types::{CaseloadError, Dataset, Granularity, Result};

use super::build::load_records;

/// Summarize days-to-file or days-to-sentence per time bucket
#[derive(Args, Debug)]
pub struct ProcessingArgs {
    /// JSON array of case rows (`-` reads stdin)
    #[arg(long, short, value_name = "FILE")]
    pub input: PathBuf,

    /// Time bucketing
    #[arg(long, value_enum, default_value = "monthly")]
    pub range: Granularity,

    /// Interval to measure
    #[arg(long, value_enum, default_value = "to-file")]
    pub interval: Interval,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ProcessingArgs {
    pub fn run(self) -> Result<()> {
        let records = load_records(&self.input, Dataset::Cases)?;
        let view = ProcessingStats::compute(&records, self.range, self.interval)?;

        if self.json {
            let json = serde_json::to_string_pretty(&view)
                .map_err(|e| CaseloadError::Parse(e.to_string()))?;
            println!("{}", json);
        } else {
            print!("{}", render_text(&view));
        }
        Ok(())
    }
}

fn days(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.1} days", v))
}

pub fn render_text(view: &ProcessingView) -> String {
    let mut out = format!(
        "{}\nlatest mean {}, median {}\n\n",
        view.title,
        days(view.latest_mean()),
        days(view.latest_median())
    );
    for (i, label) in view.labels.iter().enumerate() {
        out.push_str(&format!(
            "{:<8} mean {:>12}  median {:>12}  ({})\n",
            label,
            days(view.mean[i]),
            days(view.median[i]),
            view.samples[i]
        ));
    }
    out
}
