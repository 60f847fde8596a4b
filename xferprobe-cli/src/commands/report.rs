use crate::display;
use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;
use xferprobe::CheckReport;

#[derive(Debug, Subcommand)]
pub enum ReportCommands {
    /// Show a previously written JSON report
    Show {
        /// Report file
        path: PathBuf,
    },
}

impl ReportCommands {
    pub fn execute(&self) -> Result<bool> {
        match self {
            ReportCommands::Show { path } => {
                let report = CheckReport::read_json(path)
                    .with_context(|| format!("Failed to read report {}", path.display()))?;
                println!("  Generated at {}", report.timestamp);
                display::print_summary(&report);
                Ok(report.all_passed())
            }
        }
    }
}
