use crate::display;
use crate::GlobalArgs;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use xferprobe::{default_probes, run_all, ProbeSettings};

#[derive(Debug, Args)]
pub struct AllCommand {
    /// Where to write the JSON report
    #[arg(long, env = "XFERPROBE_REPORT")]
    report: Option<PathBuf>,

    /// Skip running the AutoTest harness
    #[arg(long)]
    skip_harness: bool,

    /// Log file or directory
    #[arg(long, env = "XFERPROBE_LOG_FILE")]
    log: Option<PathBuf>,

    /// Sample file to digest
    #[arg(long, env = "XFERPROBE_SAMPLE_FILE")]
    sample: Option<PathBuf>,

    /// Harness executable
    #[arg(long, env = "XFERPROBE_HARNESS")]
    exe: Option<PathBuf>,

    /// Kill the harness after this many seconds
    #[arg(long, env = "XFERPROBE_HARNESS_TIMEOUT_SECS", default_value_t = 300)]
    timeout_secs: u64,
}

impl AllCommand {
    fn settings(&self, global: &GlobalArgs) -> ProbeSettings {
        let mut settings = ProbeSettings::for_root(&global.project_root);
        if let Some(log) = &self.log {
            settings.log_path = log.clone();
        }
        if let Some(sample) = &self.sample {
            settings.sample_file = sample.clone();
        }
        if let Some(exe) = &self.exe {
            settings.harness = exe.clone();
        }
        if let Some(report) = &self.report {
            settings.report_path = report.clone();
        }
        settings.harness_timeout = Duration::from_secs(self.timeout_secs);
        settings
    }

    pub async fn execute(&self, global: &GlobalArgs) -> Result<bool> {
        let settings = self.settings(global);
        info!(
            "Running all probes against {}",
            settings.project_root.display()
        );

        display::print_header("🔍 PortMaster probe run");
        let probes = default_probes(!self.skip_harness);
        let (outcomes, report) = run_all(&probes, &settings).await;
        for outcome in &outcomes {
            display::print_outcome(outcome);
        }

        report.write_json(&settings.report_path)?;
        println!();
        println!("  Report written to {}", settings.report_path.display());
        display::print_summary(&report);

        Ok(report.all_passed())
    }
}
