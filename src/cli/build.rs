//! `caseload build` subcommand: rows file → dashboard view

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;

use caseload::services::{
    attach_defendants, normalize_rows, Dashboard, DashboardConfig, DashboardView, RawRow,
    ViewRequest,
};
use caseload::types::{CaseloadError, Dataset, Granularity, Record, Result};

/// Build a dashboard view from an exported rows file
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// JSON array of sheet rows (`-` reads stdin)
    #[arg(long, short, value_name = "FILE")]
    pub input: PathBuf,

    /// Record universe the rows belong to
    #[arg(long, value_enum, default_value = "cases")]
    pub dataset: Dataset,

    /// Defendant rows to join onto cases by case id, so cases can be split
    /// by ethnicity, gender, county_res or age_group
    #[arg(long, value_name = "FILE")]
    pub defendants: Option<PathBuf>,

    /// Time bucketing
    #[arg(long, value_enum, default_value = "monthly")]
    pub range: Granularity,

    /// Field to split series by (defaults to the dataset's first dimension)
    #[arg(long)]
    pub dimension: Option<String>,

    /// Metric id (all, accepted, rejected, or a status literal)
    #[arg(long, default_value = "all_cases")]
    pub metric: String,

    /// Bucket key for the breakdown slice (defaults to the latest bucket)
    #[arg(long)]
    pub slice: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl BuildArgs {
    pub fn request(&self) -> ViewRequest {
        let dimension = self
            .dimension
            .clone()
            .unwrap_or_else(|| self.dataset.dimensions()[0].to_string());
        ViewRequest {
            dataset: self.dataset,
            granularity: self.range,
            dimension,
            metric: self.metric.clone(),
            slice_bucket: self.slice.clone(),
        }
    }

    pub fn run(self, config: DashboardConfig) -> Result<()> {
        let mut records = load_records(&self.input, self.dataset)?;

        if let Some(path) = &self.defendants {
            if self.dataset == Dataset::Cases {
                let defendants = load_records(path, Dataset::Defendants)?;
                let matched = attach_defendants(&mut records, &defendants);
                tracing::debug!(matched, cases = records.len(), "joined defendants onto cases");
            } else {
                tracing::warn!("--defendants only applies to the cases dataset");
            }
        }

        let request = self.request();
        let joined = self.defendants.is_some() && self.dataset == Dataset::Cases;
        let known = self
            .dataset
            .dimensions()
            .iter()
            .chain(Dataset::Defendants.dimensions().iter().filter(|_| joined))
            .any(|d| *d == request.dimension);
        if !known {
            tracing::warn!(
                dimension = %request.dimension,
                dataset = ?self.dataset,
                "dimension is not one of the dataset's standard fields"
            );
        }

        let view = Dashboard::new(config).build(&records, &request)?;

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

/// Read a JSON array of row objects from a file, or stdin for `-`
pub fn load_rows(path: &Path) -> Result<Vec<RawRow>> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(path)?
    };
    serde_json::from_str(&content)
        .map_err(|e| CaseloadError::Parse(format!("{}: {}", path.display(), e)))
}

/// Load and normalize rows of one dataset, logging rows that were dropped
pub fn load_records(path: &Path, dataset: Dataset) -> Result<Vec<Record>> {
    let rows = load_rows(path)?;
    let outcome = normalize_rows(&rows, dataset);
    if outcome.skipped > 0 {
        tracing::warn!(
            skipped = outcome.skipped,
            path = %path.display(),
            "rows without a numeric case id were skipped"
        );
    }
    Ok(outcome.records)
}

/// Plain-text report: one line per series, latest value first
pub fn render_text(view: &DashboardView) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", view.title));

    if let (Some(first), Some(last)) = (view.labels.first(), view.labels.last()) {
        out.push_str(&format!("{} – {} ({} buckets)\n", first, last, view.labels.len()));
    }

    let width = view
        .series
        .iter()
        .map(|s| s.label.chars().count())
        .max()
        .unwrap_or(0);

    for series in &view.series {
        let values: Vec<String> = series.values.iter().map(u64::to_string).collect();
        out.push_str(&format!(
            "{:<width$}  {:>6} {}  [{}]\n",
            series.label,
            series.latest().unwrap_or(0),
            view.unit,
            values.join(" "),
            width = width
        ));
    }

    if let Some(slice) = &view.slice {
        out.push_str(&format!("\nBreakdown {}\n", slice.bucket_label));
        for entry in &slice.entries {
            out.push_str(&format!("  {}: {} {}\n", entry.label, entry.count, view.unit));
        }
    }

    if view.excluded > 0 {
        out.push_str(&format!("\n{} {} without a usable date\n", view.excluded, view.unit));
    }

    out
}
