use crate::display;
use anyhow::{Context, Result};
use clap::Args;
use std::io::Read;
use std::path::PathBuf;
use xferprobe::{diagnose, lookup, Diagnosis};

#[derive(Debug, Args)]
pub struct DiagnoseCommand {
    /// Error text to classify
    #[arg(long, conflicts_with_all = ["file", "key"])]
    text: Option<String>,

    /// Read error text from a file
    #[arg(long, conflicts_with = "key")]
    file: Option<PathBuf>,

    /// Look up a known error kind directly (e.g. port_busy)
    #[arg(long)]
    key: Option<String>,

    /// Print the diagnosis as JSON
    #[arg(long)]
    json: bool,
}

impl DiagnoseCommand {
    fn diagnosis(&self) -> Result<Diagnosis> {
        if let Some(key) = &self.key {
            return Ok(lookup(key));
        }
        let text = if let Some(text) = &self.text {
            text.clone()
        } else if let Some(path) = &self.file {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?
        } else {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read error text from stdin")?;
            buf
        };
        Ok(diagnose(&text))
    }

    pub fn execute(&self) -> Result<bool> {
        let diagnosis = self.diagnosis()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&diagnosis)?);
        } else {
            display::print_diagnosis(&diagnosis);
        }

        Ok(diagnosis.is_known())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xferprobe::ErrorKind;

    #[test]
    fn test_key_takes_precedence() {
        let cmd = DiagnoseCommand {
            text: None,
            file: None,
            key: Some("access_violation".into()),
            json: false,
        };
        assert_eq!(cmd.diagnosis().unwrap().kind, ErrorKind::AccessViolation);
    }

    fn from_text(text: &str) -> DiagnoseCommand {
        DiagnoseCommand {
            text: Some(text.into()),
            file: None,
            key: None,
            json: false,
        }
    }

    fn from_key(key: &str) -> DiagnoseCommand {
        DiagnoseCommand {
            text: None,
            file: None,
            key: Some(key.into()),
            json: true,
        }
    }

    #[test]
    fn test_exit_status_follows_known_kind() {
        assert!(from_text("Failed to open COM3: Access is denied.").execute().unwrap());
        assert!(!from_text("The operation completed successfully.").execute().unwrap());
        assert!(from_key("debug_assertion").execute().unwrap());
        assert!(!from_key("disk_full").execute().unwrap());
        assert!(!from_key("unknown").execute().unwrap());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = DiagnoseCommand {
            text: None,
            file: Some(dir.path().join("absent.txt")),
            key: None,
            json: false,
        };
        assert!(cmd.execute().is_err());
    }

    #[test]
    fn test_text_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dialog.txt");
        std::fs::write(&path, "The semaphore timeout period has expired. ERROR_SEM_TIMEOUT").unwrap();
        let cmd = DiagnoseCommand {
            text: None,
            file: Some(path),
            key: None,
            json: true,
        };
        let d = cmd.diagnosis().unwrap();
        assert_eq!(d.kind, ErrorKind::TransferTimeout);
    }
}
