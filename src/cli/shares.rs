//! `caseload shares` subcommand: declined vs. all defendants vs. population

use std::path::PathBuf;

use clap::Args;

use caseload::services::{rejected_case_ids, DashboardConfig, ShareAnalyzer, ShareCategory, ShareComparison};
use caseload::types::{CaseloadError, Dataset, Result};

use super::build::load_records;

/// Compare demographic shares of declined defendants, all defendants and the
/// county population
#[derive(Args, Debug)]
pub struct SharesArgs {
    /// JSON array of case rows, used to find declined cases
    #[arg(long, value_name = "FILE")]
    pub cases: PathBuf,

    /// JSON array of defendant rows
    #[arg(long, value_name = "FILE")]
    pub defendants: PathBuf,

    /// Demographic axis
    #[arg(long, value_enum, default_value = "ethnicity")]
    pub category: ShareCategory,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SharesArgs {
    pub fn run(self, config: DashboardConfig) -> Result<()> {
        let cases = load_records(&self.cases, Dataset::Cases)?;
        let defendants = load_records(&self.defendants, Dataset::Defendants)?;

        let declined = rejected_case_ids(&cases, &config);
        let comparison = ShareAnalyzer::compare(self.category, &defendants, &declined, &config);

        if self.json {
            let json = serde_json::to_string_pretty(&comparison)
                .map_err(|e| CaseloadError::Parse(e.to_string()))?;
            println!("{}", json);
        } else {
            print!("{}", render_text(&comparison));
        }
        Ok(())
    }
}

pub fn render_text(comparison: &ShareComparison) -> String {
    let width = comparison
        .labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = format!("{:<width$}", "", width = width);
    for series in &comparison.series {
        out.push_str(&format!("  {:>14}", series.label));
    }
    out.push('\n');

    for (i, label) in comparison.labels.iter().enumerate() {
        out.push_str(&format!("{:<width$}", label, width = width));
        for series in &comparison.series {
            out.push_str(&format!("  {:>13.2}%", series.shares[i]));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_run_with_rows_files() {
        let tmp = TempDir::new().unwrap();
        let cases = tmp.path().join("cases.json");
        let defendants = tmp.path().join("defendants.json");
        fs::write(&cases, r#"[{"Case ID": "1", "Status": "Rejected"}]"#).unwrap();
        fs::write(
            &defendants,
            r#"[{"Case ID": "1", "Ethnicity": "Hispanic"}, {"Case ID": "2", "Ethnicity": "Asian"}]"#,
        )
        .unwrap();

        let args = SharesArgs {
            cases,
            defendants,
            category: ShareCategory::Ethnicity,
            json: true,
        };

        assert!(args.run(DashboardConfig::default()).is_ok());
    }

    #[test]
    fn test_render_text() {
        let comparison = ShareAnalyzer::compare(
            ShareCategory::Gender,
            &[],
            &Default::default(),
            &DashboardConfig::default(),
        );

        let text = render_text(&comparison);

        assert!(text.lines().next().unwrap().contains("All Defendants"));
        assert!(text.contains("Other / Unknown"));
        assert!(text.contains("0.00%"));
        assert_eq!(text.lines().count(), 4);
    }
}
