//! Uniform interface over the individual probes so a full run can treat
//! them as a list.

use crate::checksum::digest_file;
use crate::config::ProbeSettings;
use crate::harness::{run_harness, HarnessSpec};
use crate::layout::{check_layout, LayoutManifest};
use crate::logscan::{resolve_log_path, scan_file, PatternSet};
use crate::report::{CheckOutcome, CheckReport};
use async_trait::async_trait;
use tracing::info;

/// Lines of harness output kept in the outcome
const HARNESS_TAIL_LINES: usize = 20;

#[async_trait]
pub trait Probe: Send + Sync {
    /// Stable name used as the report key
    fn name(&self) -> &'static str;

    /// Run the probe. Failures are folded into the outcome, never returned.
    async fn run(&self, settings: &ProbeSettings) -> CheckOutcome;
}

pub struct LayoutProbe {
    pub manifest: LayoutManifest,
}

#[async_trait]
impl Probe for LayoutProbe {
    fn name(&self) -> &'static str {
        "layout"
    }

    async fn run(&self, settings: &ProbeSettings) -> CheckOutcome {
        check_layout(settings.project_root(), &self.manifest).to_outcome()
    }
}

pub struct LogProbe {
    pub patterns: PatternSet,
}

#[async_trait]
impl Probe for LogProbe {
    fn name(&self) -> &'static str {
        "log_retry"
    }

    async fn run(&self, settings: &ProbeSettings) -> CheckOutcome {
        let scanned = resolve_log_path(&settings.log_path)
            .and_then(|path| scan_file(&path, &self.patterns));
        match scanned {
            Ok(scan) => scan.to_outcome(),
            Err(e) => CheckOutcome::fail(self.name(), e.to_string()),
        }
    }
}

#[derive(Default)]
pub struct ChecksumProbe {
    pub expected_md5: Option<String>,
    pub expected_size: Option<u64>,
}

#[async_trait]
impl Probe for ChecksumProbe {
    fn name(&self) -> &'static str {
        "checksum"
    }

    async fn run(&self, settings: &ProbeSettings) -> CheckOutcome {
        match digest_file(&settings.sample_file) {
            Ok(digest) => digest.verify(self.expected_md5.as_deref(), self.expected_size),
            Err(e) => CheckOutcome::fail(self.name(), e.to_string()),
        }
    }
}

pub struct HarnessProbe;

#[async_trait]
impl Probe for HarnessProbe {
    fn name(&self) -> &'static str {
        "harness"
    }

    async fn run(&self, settings: &ProbeSettings) -> CheckOutcome {
        let spec = HarnessSpec::new(&settings.harness)
            .args(settings.harness_args.iter().cloned())
            .timeout(settings.harness_timeout);
        match run_harness(&spec).await {
            Ok(outcome) => outcome.to_outcome(HARNESS_TAIL_LINES),
            Err(e) => CheckOutcome::fail(self.name(), e.to_string()),
        }
    }
}

/// The standard probe list, in run order
pub fn default_probes(include_harness: bool) -> Vec<Box<dyn Probe>> {
    let mut probes: Vec<Box<dyn Probe>> = vec![
        Box::new(LayoutProbe {
            manifest: LayoutManifest::portmaster(),
        }),
        Box::new(LogProbe {
            patterns: PatternSet::busy_retry(),
        }),
        Box::new(ChecksumProbe::default()),
    ];
    if include_harness {
        probes.push(Box::new(HarnessProbe));
    }
    probes
}

/// Run probes one after another and tally the results.
pub async fn run_all(
    probes: &[Box<dyn Probe>],
    settings: &ProbeSettings,
) -> (Vec<CheckOutcome>, CheckReport) {
    let mut outcomes = Vec::with_capacity(probes.len());
    for probe in probes {
        info!("Running probe '{}'", probe.name());
        outcomes.push(probe.run(settings).await);
    }
    let report = CheckReport::from_outcomes(&outcomes);
    (outcomes, report)
}
