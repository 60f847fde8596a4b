//! Out-of-process probes for the PortMaster file-transfer tool.
//!
//! Each probe inspects the external application from the outside: its
//! directory layout, its runtime logs, a sample transfer file, its black-box
//! test harness, and the text of error dialogs it raises. Probes report
//! pass/fail; nothing here retries or recovers.

pub mod checksum;
pub mod config;
pub mod diagnosis;
pub mod errors;
pub mod harness;
pub mod layout;
pub mod logscan;
pub mod probes;
pub mod report;

pub use checksum::{digest_bytes, digest_file, FileDigest};
pub use config::ProbeSettings;
pub use diagnosis::{diagnose, lookup, Confidence, Diagnosis, ErrorKind, Remedy};
pub use errors::ProbeError;
pub use harness::{run_harness, HarnessOutcome, HarnessSpec};
pub use layout::{check_layout, EntryKind, LayoutEntry, LayoutManifest, LayoutReport};
pub use logscan::{count_occurrences, scan_file, scan_text, LogPattern, LogScan, PatternSet};
pub use probes::{default_probes, run_all, Probe};
pub use report::{CheckOutcome, CheckReport};
