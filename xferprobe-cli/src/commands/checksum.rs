use crate::display;
use crate::GlobalArgs;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use xferprobe::{digest_file, CheckOutcome, ProbeSettings};

#[derive(Debug, Args)]
pub struct ChecksumCommand {
    /// Sample file to digest
    #[arg(long, env = "XFERPROBE_SAMPLE_FILE")]
    file: Option<PathBuf>,

    /// Expected MD5 (hex, case-insensitive)
    #[arg(long)]
    expect_md5: Option<String>,

    /// Expected size in bytes
    #[arg(long)]
    expect_size: Option<u64>,
}

impl ChecksumCommand {
    pub fn execute(&self, global: &GlobalArgs) -> Result<bool> {
        let path = self
            .file
            .clone()
            .unwrap_or_else(|| ProbeSettings::for_root(&global.project_root).sample_file);

        display::print_header("🔢 Sample file checksum");

        let outcome = match digest_file(&path) {
            Ok(digest) => digest.verify(self.expect_md5.as_deref(), self.expect_size),
            Err(e) => CheckOutcome::fail("checksum", e.to_string()),
        };
        display::print_outcome(&outcome);

        Ok(outcome.passed)
    }
}
