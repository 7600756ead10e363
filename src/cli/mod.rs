mod build;
mod processing;
mod shares;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use build::BuildArgs;
use processing::ProcessingArgs;
use shares::SharesArgs;
use caseload::services::{DashboardConfig, MetricCatalog};
use caseload::types::Dataset;

/// Case and defendant dashboard aggregates
#[derive(Parser)]
#[command(name = "caseload")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to ~/.caseload/config.json)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build series for one view
    Build(BuildArgs),

    /// Mean and median processing days per bucket
    Processing(ProcessingArgs),

    /// Demographic shares of declined defendants
    Shares(SharesArgs),

    /// List the fields a dataset can be split by
    Dimensions {
        #[arg(long, value_enum, default_value = "cases")]
        dataset: Dataset,
    },

    /// List known metric ids and their display names
    Metrics,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let config = DashboardConfig::load(self.config.as_deref())?;

        match self.command {
            Commands::Build(args) => {
                args.run(config)?;
                Ok(())
            }
            Commands::Processing(args) => {
                args.run()?;
                Ok(())
            }
            Commands::Shares(args) => {
                args.run(config)?;
                Ok(())
            }
            Commands::Dimensions { dataset } => {
                for dim in dataset.dimensions() {
                    println!("{}", dim);
                }
                Ok(())
            }
            Commands::Metrics => {
                let catalog = MetricCatalog::new(&config);
                for id in catalog.ids() {
                    println!("{:<12} {}", id, config.metric_label(id));
                }
                Ok(())
            }
        }
    }
}
