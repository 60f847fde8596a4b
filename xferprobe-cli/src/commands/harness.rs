use crate::display;
use crate::GlobalArgs;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use xferprobe::{run_harness, CheckOutcome, HarnessSpec, ProbeSettings};

const TAIL_LINES: usize = 20;

#[derive(Debug, Args)]
pub struct HarnessCommand {
    /// Harness executable
    #[arg(long, env = "XFERPROBE_HARNESS")]
    exe: Option<PathBuf>,

    /// Kill the harness after this many seconds
    #[arg(long, env = "XFERPROBE_HARNESS_TIMEOUT_SECS", default_value_t = 300)]
    timeout_secs: u64,

    /// Arguments passed through to the harness
    #[arg(last = true)]
    args: Vec<String>,
}

impl HarnessCommand {
    pub fn spec(&self, global: &GlobalArgs) -> HarnessSpec {
        let program = self
            .exe
            .clone()
            .unwrap_or_else(|| ProbeSettings::for_root(&global.project_root).harness);
        HarnessSpec::new(program)
            .args(self.args.iter().cloned())
            .timeout(Duration::from_secs(self.timeout_secs))
    }

    pub async fn execute(&self, global: &GlobalArgs) -> Result<bool> {
        let spec = self.spec(global);

        display::print_header("🧪 AutoTest harness");
        println!(
            "  Running {} (timeout {}s)...",
            spec.program.display(),
            self.timeout_secs
        );

        let outcome = match run_harness(&spec).await {
            Ok(result) => result.to_outcome(TAIL_LINES),
            Err(e) => CheckOutcome::fail("harness", e.to_string()),
        };
        display::print_outcome(&outcome);

        Ok(outcome.passed)
    }
}
