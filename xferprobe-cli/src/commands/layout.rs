use crate::display;
use crate::GlobalArgs;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::debug;
use xferprobe::{check_layout, CheckReport, LayoutManifest};

#[derive(Debug, Args)]
pub struct LayoutCommand {
    /// YAML manifest replacing the built-in PortMaster layout
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Write a per-path JSON report here
    #[arg(long)]
    report: Option<PathBuf>,
}

impl LayoutCommand {
    pub fn execute(&self, global: &GlobalArgs) -> Result<bool> {
        let manifest = match &self.manifest {
            Some(path) => LayoutManifest::from_yaml_file(path)
                .with_context(|| format!("Failed to load manifest {}", path.display()))?,
            None => LayoutManifest::portmaster(),
        };
        debug!("Using layout manifest '{}'", manifest.name);

        display::print_header(&format!("📁 Layout check: {}", manifest.name));
        let layout = check_layout(&global.project_root, &manifest);
        display::print_outcome(&layout.to_outcome());

        let report = CheckReport::from_checks(layout.checks());
        if let Some(path) = &self.report {
            report.write_json(path)?;
            println!("  Report written to {}", path.display());
        }
        display::print_summary(&report);

        Ok(layout.passed())
    }
}
