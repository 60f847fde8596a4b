use crate::display;
use crate::GlobalArgs;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use xferprobe::logscan::resolve_log_path;
use xferprobe::{scan_file, LogPattern, PatternSet, ProbeSettings};

#[derive(Debug, Args)]
pub struct LogsCommand {
    /// Log file, or a directory whose newest .log file is scanned
    #[arg(long, env = "XFERPROBE_LOG_FILE")]
    log: Option<PathBuf>,

    /// Extra pattern as NAME=TEXT (repeatable)
    #[arg(long = "pattern", value_name = "NAME=TEXT")]
    patterns: Vec<String>,

    /// Mark a pattern as required (repeatable)
    #[arg(long = "require", value_name = "NAME")]
    required: Vec<String>,
}

impl LogsCommand {
    fn pattern_set(&self) -> Result<PatternSet> {
        let mut set = PatternSet::busy_retry();
        for spec in &self.patterns {
            set.push(LogPattern::parse(spec)?);
        }
        for name in &self.required {
            set.require(name)?;
        }
        Ok(set)
    }

    pub fn execute(&self, global: &GlobalArgs) -> Result<bool> {
        let set = self.pattern_set()?;
        let configured = self
            .log
            .clone()
            .unwrap_or_else(|| ProbeSettings::for_root(&global.project_root).log_path);

        display::print_header("📜 Busy-retry log scan");

        // A missing or unreadable log is a failed check, not a usage error.
        let outcome = match resolve_log_path(&configured).and_then(|path| scan_file(&path, &set)) {
            Ok(scan) => scan.to_outcome(),
            Err(e) => xferprobe::CheckOutcome::fail("log_retry", e.to_string()),
        };
        display::print_outcome(&outcome);

        Ok(outcome.passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(patterns: &[&str], required: &[&str]) -> LogsCommand {
        LogsCommand {
            log: None,
            patterns: patterns.iter().map(|s| s.to_string()).collect(),
            required: required.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_extra_patterns_and_requirements() {
        let set = command(&["nak=NAK received"], &["nak"]).pattern_set().unwrap();
        assert!(set.patterns.iter().any(|p| p.name == "nak"));
        assert!(set.required.contains(&"nak".to_string()));
        assert!(set.required.contains(&"busy_retry".to_string()));
    }

    #[test]
    fn test_bad_pattern_rejected() {
        assert!(command(&["broken"], &[]).pattern_set().is_err());
        assert!(command(&[], &["missing"]).pattern_set().is_err());
    }
}
