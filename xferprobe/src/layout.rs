//! File-existence checks against the PortMaster project layout.
//!
//! A [`LayoutManifest`] lists paths relative to the project root. The built-in
//! manifest covers the sources the transfer protocol lives in and the build
//! outputs the other probes need; a YAML manifest can replace it.

use crate::errors::ProbeError;
use crate::report::CheckOutcome;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What kind of filesystem entry a manifest path must be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    #[default]
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    /// Path relative to the project root
    pub path: PathBuf,
    #[serde(default)]
    pub kind: EntryKind,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl LayoutEntry {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            required: true,
        }
    }

    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Dir,
            required: true,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutManifest {
    pub name: String,
    pub entries: Vec<LayoutEntry>,
}

impl LayoutManifest {
    /// Layout of the PortMaster source tree and its Release build output.
    pub fn portmaster() -> Self {
        Self {
            name: "portmaster".to_string(),
            entries: vec![
                LayoutEntry::file("PortMaster.sln"),
                LayoutEntry::file("PortMaster.vcxproj"),
                LayoutEntry::dir("Transport"),
                LayoutEntry::file("Transport/ITransport.h"),
                LayoutEntry::file("Transport/SerialTransport.cpp"),
                LayoutEntry::file("Transport/ParallelTransport.cpp"),
                LayoutEntry::file("Transport/UsbPrintTransport.cpp"),
                LayoutEntry::file("Transport/LoopbackTransport.cpp").optional(),
                LayoutEntry::dir("Protocol"),
                LayoutEntry::file("Protocol/ReliableChannel.h"),
                LayoutEntry::file("Protocol/ReliableChannel.cpp"),
                LayoutEntry::file("Protocol/FrameCodec.cpp"),
                LayoutEntry::file("build/Release/PortMaster.exe"),
                LayoutEntry::file("build/Release/AutoTest.exe"),
                LayoutEntry::dir("logs").optional(),
            ],
        }
    }

    pub fn from_yaml_str(content: &str, origin: &Path) -> Result<Self, ProbeError> {
        let manifest: LayoutManifest =
            serde_yaml::from_str(content).map_err(|e| ProbeError::Manifest {
                path: origin.to_path_buf(),
                message: e.to_string(),
            })?;

        if let Some(bad) = manifest.entries.iter().find(|e| e.path.is_absolute()) {
            return Err(ProbeError::Manifest {
                path: origin.to_path_buf(),
                message: format!(
                    "entry '{}' must be relative to the project root",
                    bad.path.display()
                ),
            });
        }

        Ok(manifest)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ProbeError> {
        let content = std::fs::read_to_string(path).map_err(|e| ProbeError::io(path, e))?;
        Self::from_yaml_str(&content, path)
    }
}

/// Result of checking one manifest entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryStatus {
    pub entry: LayoutEntry,
    pub present: bool,
    /// Set when the path exists but has the wrong kind
    pub kind_mismatch: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutReport {
    pub root: PathBuf,
    pub manifest: String,
    pub entries: Vec<EntryStatus>,
}

impl LayoutReport {
    /// True when every required entry is present
    pub fn passed(&self) -> bool {
        self.entries
            .iter()
            .all(|status| status.present || !status.entry.required)
    }

    pub fn missing_required(&self) -> impl Iterator<Item = &EntryStatus> {
        self.entries
            .iter()
            .filter(|status| status.entry.required && !status.present)
    }

    pub fn present_count(&self) -> usize {
        self.entries.iter().filter(|status| status.present).count()
    }

    /// Per-path pass/fail pairs, keyed by the manifest path
    pub fn checks(&self) -> Vec<(String, bool)> {
        self.entries
            .iter()
            .map(|status| {
                (
                    status.entry.path.to_string_lossy().replace('\\', "/"),
                    status.present || !status.entry.required,
                )
            })
            .collect()
    }

    pub fn to_outcome(&self) -> CheckOutcome {
        let summary = format!(
            "{}/{} paths present under {}",
            self.present_count(),
            self.entries.len(),
            self.root.display()
        );
        let details = self
            .entries
            .iter()
            .filter(|status| !status.present)
            .map(|status| {
                let label = if status.entry.required {
                    "missing"
                } else {
                    "missing (optional)"
                };
                if status.kind_mismatch {
                    format!("{label}: {} (wrong kind)", status.entry.path.display())
                } else {
                    format!("{label}: {}", status.entry.path.display())
                }
            })
            .collect();

        let outcome = if self.passed() {
            CheckOutcome::pass("layout", summary)
        } else {
            CheckOutcome::fail("layout", summary)
        };
        outcome.with_details(details)
    }
}

pub fn check_layout(root: &Path, manifest: &LayoutManifest) -> LayoutReport {
    info!(
        "Checking layout '{}' under {}",
        manifest.name,
        root.display()
    );

    let entries = manifest
        .entries
        .iter()
        .map(|entry| {
            let full = root.join(&entry.path);
            let (exists, kind_ok) = match std::fs::metadata(&full) {
                Ok(meta) => {
                    let kind_ok = match entry.kind {
                        EntryKind::File => meta.is_file(),
                        EntryKind::Dir => meta.is_dir(),
                        EntryKind::Any => true,
                    };
                    (true, kind_ok)
                }
                Err(_) => (false, false),
            };

            let present = exists && kind_ok;
            if present {
                debug!("found {}", full.display());
            } else if entry.required {
                warn!("missing required path {}", full.display());
            } else {
                debug!("optional path absent {}", full.display());
            }

            EntryStatus {
                entry: entry.clone(),
                present,
                kind_mismatch: exists && !kind_ok,
            }
        })
        .collect();

    LayoutReport {
        root: root.to_path_buf(),
        manifest: manifest.name.clone(),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn manifest(entries: Vec<LayoutEntry>) -> LayoutManifest {
        LayoutManifest {
            name: "test".into(),
            entries,
        }
    }

    #[test]
    fn test_all_present_passes() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Protocol")).unwrap();
        fs::write(dir.path().join("Protocol/ReliableChannel.cpp"), "").unwrap();

        let report = check_layout(
            dir.path(),
            &manifest(vec![
                LayoutEntry::dir("Protocol"),
                LayoutEntry::file("Protocol/ReliableChannel.cpp"),
            ]),
        );
        assert!(report.passed());
        assert_eq!(report.present_count(), 2);
        assert!(report.to_outcome().passed);
    }

    #[test]
    fn test_missing_required_fails() {
        let dir = tempfile::tempdir().unwrap();
        let report = check_layout(dir.path(), &manifest(vec![LayoutEntry::file("AutoTest.exe")]));
        assert!(!report.passed());
        assert_eq!(report.missing_required().count(), 1);
        let outcome = report.to_outcome();
        assert!(!outcome.passed);
        assert_eq!(outcome.details, vec!["missing: AutoTest.exe".to_string()]);
    }

    #[test]
    fn test_missing_optional_does_not_fail() {
        let dir = tempfile::tempdir().unwrap();
        let report = check_layout(
            dir.path(),
            &manifest(vec![LayoutEntry::dir("logs").optional()]),
        );
        assert!(report.passed());
        assert_eq!(report.checks(), vec![("logs".to_string(), true)]);
    }

    #[test]
    fn test_kind_mismatch_is_not_present() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Transport")).unwrap();
        let report = check_layout(dir.path(), &manifest(vec![LayoutEntry::file("Transport")]));
        assert!(!report.passed());
        assert!(report.entries[0].kind_mismatch);
    }

    #[test]
    fn test_yaml_manifest_defaults() {
        let yaml = "name: custom\nentries:\n  - path: a.txt\n    kind: file\n  - path: b\n    required: false\n";
        let m = LayoutManifest::from_yaml_str(yaml, Path::new("m.yaml")).unwrap();
        assert_eq!(m.name, "custom");
        assert_eq!(m.entries[0].kind, EntryKind::File);
        assert!(m.entries[0].required);
        assert_eq!(m.entries[1].kind, EntryKind::Any);
        assert!(!m.entries[1].required);
    }

    #[test]
    fn test_yaml_manifest_rejects_absolute_paths() {
        let yaml = "name: bad\nentries:\n  - path: /etc/passwd\n";
        let err = LayoutManifest::from_yaml_str(yaml, Path::new("m.yaml")).unwrap_err();
        assert!(matches!(err, ProbeError::Manifest { .. }));
    }

    #[test]
    fn test_portmaster_manifest_covers_reliable_channel() {
        let m = LayoutManifest::portmaster();
        assert!(m
            .entries
            .iter()
            .any(|e| e.path == Path::new("Protocol/ReliableChannel.cpp") && e.required));
        assert!(m
            .entries
            .iter()
            .any(|e| e.path == Path::new("build/Release/AutoTest.exe")));
    }
}
