//! Pass/fail tally written as the machine-readable probe report.
//!
//! The report shape is fixed: `{ timestamp, total_tests, passed_tests,
//! success_rate, details }` where `details` maps each check name to whether it
//! passed. Nothing downstream consumes it programmatically; it exists so a
//! run can be archived next to the build output.

use crate::errors::ProbeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Outcome of one probe, as rendered by the CLI and folded into a report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckOutcome {
    /// Stable check name, used as the key in [`CheckReport::details`]
    pub name: String,
    /// Whether the check passed
    pub passed: bool,
    /// One-line human-readable summary
    pub summary: String,
    /// Additional lines shown under the summary
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl CheckOutcome {
    pub fn pass(name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            summary: summary.into(),
            details: Vec::new(),
        }
    }

    pub fn fail(name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            summary: summary.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

/// Aggregated report of N independent checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckReport {
    pub timestamp: String,
    pub total_tests: usize,
    pub passed_tests: usize,
    /// Percentage in `0.0..=100.0`, rounded to one decimal place
    pub success_rate: f64,
    pub details: BTreeMap<String, bool>,
}

impl CheckReport {
    /// Build a report from `(name, passed)` pairs. A repeated name keeps the
    /// last value.
    pub fn from_checks<I, S>(checks: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        let details: BTreeMap<String, bool> = checks
            .into_iter()
            .map(|(name, passed)| (name.into(), passed))
            .collect();

        let total_tests = details.len();
        let passed_tests = details.values().filter(|passed| **passed).count();

        Self {
            timestamp: chrono::Local::now().to_rfc3339(),
            total_tests,
            passed_tests,
            success_rate: success_rate(passed_tests, total_tests),
            details,
        }
    }

    pub fn from_outcomes(outcomes: &[CheckOutcome]) -> Self {
        Self::from_checks(outcomes.iter().map(|o| (o.name.clone(), o.passed)))
    }

    /// True when every recorded check passed. An empty report passes.
    pub fn all_passed(&self) -> bool {
        self.passed_tests == self.total_tests
    }

    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }

    pub fn failed(&self) -> impl Iterator<Item = &str> {
        self.details
            .iter()
            .filter(|(_, passed)| !**passed)
            .map(|(name, _)| name.as_str())
    }

    pub fn write_json(&self, path: &Path) -> Result<(), ProbeError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ProbeError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| ProbeError::io(path, e))?;
        tracing::info!("Wrote probe report to {}", path.display());
        Ok(())
    }

    pub fn read_json(path: &Path) -> Result<Self, ProbeError> {
        let content = std::fs::read_to_string(path).map_err(|e| ProbeError::io(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }
}

fn success_rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = passed as f64 / total as f64 * 100.0;
    (rate * 10.0).round() / 10.0
}
