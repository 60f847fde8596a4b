use crate::harness::DEFAULT_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolved locations the probes work against.
///
/// Every path defaults to a location under `project_root`; callers override
/// individual fields from the command line or environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeSettings {
    pub project_root: PathBuf,
    /// A log file, or a directory whose newest `.log` file is scanned
    pub log_path: PathBuf,
    pub sample_file: PathBuf,
    pub harness: PathBuf,
    pub harness_args: Vec<String>,
    pub harness_timeout: Duration,
    pub report_path: PathBuf,
}

impl ProbeSettings {
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        let project_root = root.into();
        Self {
            log_path: project_root.join("logs"),
            sample_file: project_root.join("testdata").join("sample.bin"),
            harness: project_root
                .join("build")
                .join("Release")
                .join("AutoTest.exe"),
            harness_args: Vec::new(),
            harness_timeout: DEFAULT_TIMEOUT,
            report_path: project_root.join("probe_report.json"),
            project_root,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self::for_root(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_hang_off_root() {
        let settings = ProbeSettings::for_root("/srv/portmaster");
        assert_eq!(settings.log_path, Path::new("/srv/portmaster/logs"));
        assert_eq!(
            settings.harness,
            Path::new("/srv/portmaster/build/Release/AutoTest.exe")
        );
        assert_eq!(
            settings.sample_file,
            Path::new("/srv/portmaster/testdata/sample.bin")
        );
        assert_eq!(settings.harness_timeout.as_secs(), 300);
    }
}
