//! Runtime log scanning.
//!
//! Counts literal occurrences of known strings in a PortMaster log to
//! confirm that the busy-retry path of the reliable channel actually ran.

use crate::errors::ProbeError;
use crate::report::CheckOutcome;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPattern {
    pub name: String,
    pub needle: String,
}

impl LogPattern {
    pub fn new(name: impl Into<String>, needle: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            needle: needle.into(),
        }
    }

    /// Parse a `NAME=TEXT` pair
    pub fn parse(spec: &str) -> Result<Self, ProbeError> {
        match spec.split_once('=') {
            Some((name, needle)) if !name.trim().is_empty() && !needle.is_empty() => {
                Ok(Self::new(name.trim(), needle))
            }
            _ => Err(ProbeError::InvalidArgument(format!(
                "pattern '{spec}' must have the form NAME=TEXT"
            ))),
        }
    }
}

/// Ordered patterns plus the names whose count must be non-zero
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSet {
    pub patterns: Vec<LogPattern>,
    pub required: Vec<String>,
}

impl PatternSet {
    /// Busy-retry evidence. Only `busy_retry` is required; the others give context.
    pub fn busy_retry() -> Self {
        Self {
            patterns: vec![
                LogPattern::new("busy_retry", "busy, retrying"),
                LogPattern::new("retry_attempt", "retry attempt"),
                LogPattern::new("transport_busy", "transport busy"),
                LogPattern::new("transfer_complete", "transfer complete"),
            ],
            required: vec!["busy_retry".to_string()],
        }
    }

    /// Add a pattern, replacing any existing one with the same name
    pub fn push(&mut self, pattern: LogPattern) {
        if let Some(existing) = self.patterns.iter_mut().find(|p| p.name == pattern.name) {
            *existing = pattern;
        } else {
            self.patterns.push(pattern);
        }
    }

    pub fn require(&mut self, name: &str) -> Result<(), ProbeError> {
        if !self.patterns.iter().any(|p| p.name == name) {
            return Err(ProbeError::InvalidArgument(format!(
                "cannot require unknown pattern '{name}'"
            )));
        }
        if !self.required.iter().any(|r| r == name) {
            self.required.push(name.to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternCount {
    pub name: String,
    pub needle: String,
    pub count: usize,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogScan {
    pub source: Option<PathBuf>,
    pub lines: usize,
    pub counts: Vec<PatternCount>,
}

impl LogScan {
    pub fn passed(&self) -> bool {
        self.counts.iter().all(|c| !c.required || c.count > 0)
    }

    pub fn count(&self, name: &str) -> Option<usize> {
        self.counts.iter().find(|c| c.name == name).map(|c| c.count)
    }

    pub fn to_outcome(&self) -> CheckOutcome {
        let source = self
            .source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<text>".to_string());

        let details = self
            .counts
            .iter()
            .map(|c| {
                let marker = if c.required { " (required)" } else { "" };
                format!("{}: {} x \"{}\"{}", c.name, c.count, c.needle, marker)
            })
            .collect();

        let outcome = if self.passed() {
            CheckOutcome::pass(
                "log_retry",
                format!("busy-retry evidence found in {source} ({} lines)", self.lines),
            )
        } else {
            let missing: Vec<&str> = self
                .counts
                .iter()
                .filter(|c| c.required && c.count == 0)
                .map(|c| c.name.as_str())
                .collect();
            CheckOutcome::fail(
                "log_retry",
                format!("required patterns absent in {source}: {}", missing.join(", ")),
            )
        };
        outcome.with_details(details)
    }
}

/// Non-overlapping, case-sensitive literal count. An empty needle counts 0.
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

pub fn scan_text(text: &str, set: &PatternSet) -> LogScan {
    let counts = set
        .patterns
        .iter()
        .map(|p| {
            let count = count_occurrences(text, &p.needle);
            debug!("pattern {} matched {} time(s)", p.name, count);
            PatternCount {
                name: p.name.clone(),
                needle: p.needle.clone(),
                count,
                required: set.required.iter().any(|r| r == &p.name),
            }
        })
        .collect();

    LogScan {
        source: None,
        lines: text.lines().count(),
        counts,
    }
}

/// Scan one log file. Non-UTF-8 bytes are replaced rather than rejected.
pub fn scan_file(path: &Path, set: &PatternSet) -> Result<LogScan, ProbeError> {
    info!("Scanning log {}", path.display());
    let bytes = std::fs::read(path).map_err(|e| ProbeError::io(path, e))?;
    let text = String::from_utf8_lossy(&bytes);
    let mut scan = scan_text(&text, set);
    scan.source = Some(path.to_path_buf());
    Ok(scan)
}

/// Most recently modified file in `dir` with the given extension
pub fn latest_log(dir: &Path, extension: &str) -> Result<Option<PathBuf>, ProbeError> {
    let read_dir = std::fs::read_dir(dir).map_err(|e| ProbeError::io(dir, e))?;

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in read_dir {
        let entry = entry.map_err(|e| ProbeError::io(dir, e))?;
        let path = entry.path();
        let matches_ext = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case(extension))
            .unwrap_or(false);
        if !matches_ext {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        if newest.as_ref().map(|(t, _)| modified > *t).unwrap_or(true) {
            newest = Some((modified, path));
        }
    }

    Ok(newest.map(|(_, path)| path))
}

/// Resolve a configured log location: a file is used as-is, a directory
/// resolves to its newest `.log` file.
pub fn resolve_log_path(path: &Path) -> Result<PathBuf, ProbeError> {
    if path.is_dir() {
        latest_log(path, "log")?.ok_or_else(|| {
            ProbeError::InvalidArgument(format!("no .log files in {}", path.display()))
        })
    } else {
        Ok(path.to_path_buf())
    }
}
