//! Diagnosis of captured error-window text.
//!
//! Maps the text of an error dialog raised by PortMaster (or by the CRT on
//! its behalf) onto a fixed taxonomy of five failure kinds, each carrying a
//! canned description, likely causes and a fix strategy. Matching is plain
//! case-insensitive containment of trigger phrases.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PortBusy,
    DeviceNotFound,
    TransferTimeout,
    DebugAssertion,
    AccessViolation,
    Unknown,
}

impl ErrorKind {
    /// Known kinds in taxonomy order. Ties in [`diagnose`] go to the earlier one.
    pub const KNOWN: [ErrorKind; 5] = [
        ErrorKind::PortBusy,
        ErrorKind::DeviceNotFound,
        ErrorKind::TransferTimeout,
        ErrorKind::DebugAssertion,
        ErrorKind::AccessViolation,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ErrorKind::PortBusy => "port_busy",
            ErrorKind::DeviceNotFound => "device_not_found",
            ErrorKind::TransferTimeout => "transfer_timeout",
            ErrorKind::DebugAssertion => "debug_assertion",
            ErrorKind::AccessViolation => "access_violation",
            ErrorKind::Unknown => "unknown",
        }
    }

    fn triggers(&self) -> &'static [&'static str] {
        match self {
            ErrorKind::PortBusy => &[
                "access is denied",
                "error_access_denied",
                "port is busy",
                "port is already open",
                "device is in use",
                "resource busy",
            ],
            ErrorKind::DeviceNotFound => &[
                "cannot find the file specified",
                "error_file_not_found",
                "device not found",
                "no such port",
                "device is not connected",
                "createfile failed",
            ],
            ErrorKind::TransferTimeout => &[
                "timed out",
                "timeout",
                "error_sem_timeout",
                "no ack",
                "retry limit exceeded",
                "no response from peer",
            ],
            ErrorKind::DebugAssertion => &[
                "debug assertion failed",
                "assertion failed",
                "afxwin",
                "afx.inl",
                "press retry to debug",
            ],
            ErrorKind::AccessViolation => &[
                "access violation",
                "0xc0000005",
                "unhandled exception",
                "has stopped working",
                "reading location",
                "writing location",
            ],
            ErrorKind::Unknown => &[],
        }
    }

    pub fn remedy(&self) -> Remedy {
        match self {
            ErrorKind::PortBusy => Remedy {
                description: "The transport port could not be opened because another handle owns it",
                causes: &[
                    "A previous PortMaster instance still holds the COM/LPT handle",
                    "Another tool (terminal emulator, printer spooler) opened the port",
                    "The reliable channel gave up after exhausting busy retries",
                ],
                fix_strategy: "Close other programs using the port, confirm no stale PortMaster process is running, then reopen the port; raise the busy-retry budget if the contention is transient",
            },
            ErrorKind::DeviceNotFound => Remedy {
                description: "The configured port or USB device does not exist on this machine",
                causes: &[
                    "Wrong port name in the transfer settings",
                    "USB adapter unplugged or its driver not installed",
                    "Device enumerated under a different COM number after reconnect",
                ],
                fix_strategy: "Check Device Manager for the current port name, reinstall the adapter driver if missing, and update the port selection before retrying the transfer",
            },
            ErrorKind::TransferTimeout => Remedy {
                description: "The peer stopped acknowledging frames before the transfer finished",
                causes: &[
                    "Baud rate or flow control mismatch between the two ends",
                    "Cable fault or loose connector",
                    "Receiver busy for longer than the retry window",
                ],
                fix_strategy: "Verify both ends use identical line settings, swap the cable, and inspect the runtime log for busy-retry entries before increasing the ACK timeout",
            },
            ErrorKind::DebugAssertion => Remedy {
                description: "A debug build hit an MFC or CRT assertion",
                causes: &[
                    "Debug build deployed instead of Release",
                    "Invalid window or handle state reached an ASSERT in MFC",
                    "Buffer bounds check failed in the CRT",
                ],
                fix_strategy: "Reproduce under the debugger using the file and line shown in the dialog, fix the violated precondition, and ship the Release configuration",
            },
            ErrorKind::AccessViolation => Remedy {
                description: "The process crashed on an invalid memory access",
                causes: &[
                    "Use of a freed transport or channel object",
                    "Null pointer dereference after a failed open",
                    "Buffer overrun in frame handling",
                ],
                fix_strategy: "Collect a crash dump, resolve the faulting address against the PDB, and audit object lifetimes around port open and close",
            },
            ErrorKind::Unknown => Remedy {
                description: "The error text did not match any known failure pattern",
                causes: &["Unrecognised error message"],
                fix_strategy: "Capture the full dialog text and the runtime log, then inspect them manually",
            },
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ErrorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        ErrorKind::KNOWN
            .iter()
            .chain(std::iter::once(&ErrorKind::Unknown))
            .find(|kind| kind.key() == key)
            .copied()
            .ok_or_else(|| format!("unknown error kind '{s}'"))
    }
}

/// Canned description, likely causes and fix strategy for one error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Remedy {
    pub description: &'static str,
    pub causes: &'static [&'static str],
    pub fix_strategy: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    pub kind: ErrorKind,
    pub confidence: Confidence,
    #[serde(flatten)]
    pub remedy: Remedy,
    /// Trigger phrases found in the text
    pub matched: Vec<&'static str>,
}

impl Diagnosis {
    pub fn is_known(&self) -> bool {
        self.kind != ErrorKind::Unknown
    }

    fn unknown() -> Self {
        Diagnosis {
            kind: ErrorKind::Unknown,
            confidence: Confidence::Low,
            remedy: ErrorKind::Unknown.remedy(),
            matched: Vec::new(),
        }
    }
}

/// Fixed diagnosis for an error-type key. Anything but the five known keys
/// yields the low-confidence `unknown` entry.
pub fn lookup(key: &str) -> Diagnosis {
    match key.parse::<ErrorKind>() {
        Ok(kind) if kind != ErrorKind::Unknown => Diagnosis {
            kind,
            confidence: Confidence::High,
            remedy: kind.remedy(),
            matched: Vec::new(),
        },
        _ => Diagnosis::unknown(),
    }
}

/// Classify captured error text by counting trigger phrases per kind.
pub fn diagnose(text: &str) -> Diagnosis {
    let haystack = text.to_lowercase();

    let mut best: Option<(ErrorKind, Vec<&'static str>)> = None;
    for kind in ErrorKind::KNOWN {
        let matched: Vec<&'static str> = kind
            .triggers()
            .iter()
            .copied()
            .filter(|trigger| haystack.contains(trigger))
            .collect();
        if matched.is_empty() {
            continue;
        }
        let better = best
            .as_ref()
            .map(|(_, current)| matched.len() > current.len())
            .unwrap_or(true);
        if better {
            best = Some((kind, matched));
        }
    }

    match best {
        Some((kind, matched)) => {
            let confidence = if matched.len() >= 2 {
                Confidence::High
            } else {
                Confidence::Medium
            };
            tracing::debug!("diagnosed {} from {:?}", kind, matched);
            Diagnosis {
                kind,
                confidence,
                remedy: kind.remedy(),
                matched,
            }
        }
        None => Diagnosis::unknown(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_keys() {
        for kind in ErrorKind::KNOWN {
            let d = lookup(kind.key());
            assert_eq!(d.kind, kind);
            assert_eq!(d.confidence, Confidence::High);
            assert_eq!(d.remedy, kind.remedy());
            assert!(!d.remedy.causes.is_empty());
        }
    }

    #[test]
    fn test_lookup_unknown_key_is_low_confidence() {
        for key in ["", "disk_full", "unknown", "PORT BUSY"] {
            let d = lookup(key);
            assert_eq!(d.kind, ErrorKind::Unknown, "key {key:?}");
            assert_eq!(d.confidence, Confidence::Low);
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(lookup("Port_Busy").kind, ErrorKind::PortBusy);
    }

    #[test]
    fn test_diagnose_port_busy_dialog() {
        let d = diagnose("Failed to open COM3: Access is denied. (ERROR_ACCESS_DENIED)");
        assert_eq!(d.kind, ErrorKind::PortBusy);
        assert_eq!(d.confidence, Confidence::High);
        assert_eq!(d.matched, vec!["access is denied", "error_access_denied"]);
    }

    #[test]
    fn test_diagnose_single_hit_is_medium() {
        let d = diagnose("Transfer aborted: no ACK");
        assert_eq!(d.kind, ErrorKind::TransferTimeout);
        assert_eq!(d.confidence, Confidence::Medium);
    }

    #[test]
    fn test_diagnose_crash_dialog() {
        let text = "Unhandled exception at 0x00401A2B in PortMaster.exe: 0xC0000005: Access violation reading location 0x00000000.";
        let d = diagnose(text);
        assert_eq!(d.kind, ErrorKind::AccessViolation);
        assert!(d.matched.len() >= 3);
    }

    #[test]
    fn test_diagnose_debug_assertion() {
        let text = "Debug Assertion Failed!\nProgram: PortMaster.exe\nFile: f:\\dd\\vctools\\vc7libs\\ship\\atlmfc\\include\\afxwin1.inl\nLine: 21\n(Press Retry to debug the application)";
        assert_eq!(diagnose(text).kind, ErrorKind::DebugAssertion);
    }

    #[test]
    fn test_diagnose_tie_goes_to_earlier_kind() {
        // one hit each for device_not_found and transfer_timeout
        let d = diagnose("device not found; timed out");
        assert_eq!(d.kind, ErrorKind::DeviceNotFound);
    }

    #[test]
    fn test_diagnose_no_match() {
        let d = diagnose("Everything is fine");
        assert!(!d.is_known());
        assert_eq!(d.confidence, Confidence::Low);
        assert!(d.matched.is_empty());
    }

    #[test]
    fn test_diagnosis_json_flattens_remedy() {
        let value = serde_json::to_value(lookup("device_not_found")).unwrap();
        assert_eq!(value["kind"], "device_not_found");
        assert_eq!(value["confidence"], "high");
        assert!(value["description"].is_string());
        assert!(value["causes"].is_array());
        assert!(value["fix_strategy"].is_string());
    }
}
