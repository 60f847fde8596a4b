//! Black-box invocation of the prebuilt `AutoTest.exe` harness.

use crate::errors::ProbeError;
use crate::report::CheckOutcome;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{info, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct HarnessSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Defaults to the program's parent directory
    pub working_dir: Option<PathBuf>,
    pub timeout: Duration,
}

impl HarnessSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Relative paths with a directory part are anchored to the current
    /// directory, since the child runs from a different one. Bare names are
    /// left for `PATH` lookup.
    fn resolved_program(&self) -> Result<PathBuf, ProbeError> {
        let has_dir = self
            .program
            .parent()
            .is_some_and(|p| !p.as_os_str().is_empty());
        if self.program.is_relative() && has_dir {
            let cwd = std::env::current_dir().map_err(|e| ProbeError::io(".", e))?;
            Ok(cwd.join(&self.program))
        } else {
            Ok(self.program.clone())
        }
    }

    fn effective_working_dir<'a>(&'a self, program: &'a Path) -> Option<&'a Path> {
        self.working_dir.as_deref().or_else(|| {
            program
                .parent()
                .filter(|p| !p.as_os_str().is_empty() && p.is_dir())
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HarnessOutcome {
    pub program: PathBuf,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub duration_ms: u64,
    pub stdout: String,
    pub stderr: String,
}

impl HarnessOutcome {
    pub fn passed(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// Last `n` lines of stdout followed by stderr
    pub fn tail(&self, n: usize) -> Vec<String> {
        let lines: Vec<&str> = self.stdout.lines().chain(self.stderr.lines()).collect();
        let start = lines.len().saturating_sub(n);
        lines[start..].iter().map(|l| l.to_string()).collect()
    }

    pub fn to_outcome(&self, tail_lines: usize) -> CheckOutcome {
        let seconds = self.duration_ms as f64 / 1000.0;
        let summary = if self.timed_out {
            format!(
                "{} timed out after {seconds:.2}s",
                self.program.display()
            )
        } else {
            match self.exit_code {
                Some(code) => format!(
                    "{} exited with code {code} in {seconds:.2}s",
                    self.program.display()
                ),
                None => format!(
                    "{} terminated by signal after {seconds:.2}s",
                    self.program.display()
                ),
            }
        };

        let outcome = if self.passed() {
            CheckOutcome::pass("harness", summary)
        } else {
            CheckOutcome::fail("harness", summary)
        };
        outcome.with_details(self.tail(tail_lines))
    }
}

/// Run the harness to completion or until the timeout, killing it on expiry.
pub async fn run_harness(spec: &HarnessSpec) -> Result<HarnessOutcome, ProbeError> {
    info!(
        "Running {} {:?} (timeout {}s)",
        spec.program.display(),
        spec.args,
        spec.timeout.as_secs()
    );

    let program = spec.resolved_program()?;
    let mut command = Command::new(&program);
    command
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = spec.effective_working_dir(&program) {
        command.current_dir(dir);
    }

    let start = Instant::now();
    let child = command.spawn().map_err(|source| ProbeError::Spawn {
        program: spec.program.clone(),
        source,
    })?;

    // Dropping the wait future on timeout drops the child, which kills it.
    match tokio::time::timeout(spec.timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            let outcome = HarnessOutcome {
                program: spec.program.clone(),
                exit_code: output.status.code(),
                timed_out: false,
                duration_ms: start.elapsed().as_millis() as u64,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            };
            if outcome.passed() {
                info!("Harness passed in {}ms", outcome.duration_ms);
            } else {
                warn!("Harness failed with exit code {:?}", outcome.exit_code);
            }
            Ok(outcome)
        }
        Ok(Err(e)) => Err(ProbeError::io(&spec.program, e)),
        Err(_) => {
            warn!(
                "Harness {} exceeded {}s timeout",
                spec.program.display(),
                spec.timeout.as_secs()
            );
            Ok(HarnessOutcome {
                program: spec.program.clone(),
                exit_code: None,
                timed_out: true,
                duration_ms: start.elapsed().as_millis() as u64,
                stdout: String::new(),
                stderr: String::new(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(stdout: &str, stderr: &str) -> HarnessOutcome {
        HarnessOutcome {
            program: PathBuf::from("AutoTest.exe"),
            exit_code: Some(0),
            timed_out: false,
            duration_ms: 1500,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_tail_spans_stdout_and_stderr() {
        let o = outcome("a\nb\nc\n", "d\n");
        assert_eq!(o.tail(2), vec!["c".to_string(), "d".to_string()]);
        assert_eq!(o.tail(10).len(), 4);
        assert!(o.tail(0).is_empty());
    }

    #[test]
    fn test_passed_requires_zero_exit_and_no_timeout() {
        let mut o = outcome("", "");
        assert!(o.passed());
        o.exit_code = Some(2);
        assert!(!o.passed());
        o.exit_code = None;
        o.timed_out = true;
        assert!(!o.passed());
        assert!(o.to_outcome(5).summary.contains("timed out"));
    }

    #[test]
    fn test_relative_program_is_anchored_to_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let spec = HarnessSpec::new("./build/Release/AutoTest.exe");
        assert_eq!(
            spec.resolved_program().unwrap(),
            cwd.join("./build/Release/AutoTest.exe")
        );

        let bare = HarnessSpec::new("sh");
        assert_eq!(bare.resolved_program().unwrap(), PathBuf::from("sh"));
    }

    #[test]
    fn test_builder_defaults() {
        let spec = HarnessSpec::new("build/Release/AutoTest.exe");
        assert_eq!(spec.timeout, DEFAULT_TIMEOUT);
        assert!(spec.args.is_empty());
        let spec = spec.args(["--quick"]).timeout(Duration::from_secs(5));
        assert_eq!(spec.args, vec!["--quick".to_string()]);
        assert_eq!(spec.timeout.as_secs(), 5);
    }
}
