use crate::errors::ProbeError;
use crate::report::CheckOutcome;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

const CHUNK_SIZE: usize = 64 * 1024;

/// Size and MD5 of a sample transfer file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDigest {
    pub path: Option<PathBuf>,
    pub size_bytes: u64,
    /// Lowercase hex
    pub md5: String,
}

impl FileDigest {
    /// Case-insensitive compare against an expected hex digest
    pub fn matches(&self, expected_md5: &str) -> bool {
        self.md5.eq_ignore_ascii_case(expected_md5.trim())
    }

    /// Compare against optional expectations. Passes when none are given.
    pub fn verify(&self, expected_md5: Option<&str>, expected_size: Option<u64>) -> CheckOutcome {
        let mut problems = Vec::new();
        if let Some(expected) = expected_md5 {
            if !self.matches(expected) {
                problems.push(format!("md5 {} != expected {}", self.md5, expected.trim()));
            }
        }
        if let Some(expected) = expected_size {
            if self.size_bytes != expected {
                problems.push(format!(
                    "size {} != expected {}",
                    self.size_bytes, expected
                ));
            }
        }

        let name = self
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<bytes>".to_string());
        let summary = format!("{name}: {} bytes, md5 {}", self.size_bytes, self.md5);

        if problems.is_empty() {
            CheckOutcome::pass("checksum", summary)
        } else {
            CheckOutcome::fail("checksum", summary).with_details(problems)
        }
    }
}

pub fn digest_bytes(bytes: &[u8]) -> FileDigest {
    FileDigest {
        path: None,
        size_bytes: bytes.len() as u64,
        md5: hex::encode(Md5::digest(bytes)),
    }
}

/// Stream a file through MD5 without loading it whole.
pub fn digest_file(path: &Path) -> Result<FileDigest, ProbeError> {
    info!("Computing MD5 of {}", path.display());
    let mut file = File::open(path).map_err(|e| ProbeError::io(path, e))?;
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut size_bytes = 0u64;

    loop {
        let read = file.read(&mut buf).map_err(|e| ProbeError::io(path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
        size_bytes += read as u64;
    }

    Ok(FileDigest {
        path: Some(path.to_path_buf()),
        size_bytes,
        md5: hex::encode(hasher.finalize()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(digest_bytes(b"").md5, "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(digest_bytes(b"abc").md5, "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_file_matches_in_memory_digest_across_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.bin");
        let data: Vec<u8> = (0..(CHUNK_SIZE * 2 + 17)).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &data).unwrap();

        let from_file = digest_file(&path).unwrap();
        let from_bytes = digest_bytes(&data);
        assert_eq!(from_file.size_bytes, data.len() as u64);
        assert_eq!(from_file.md5, from_bytes.md5);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = digest_file(&dir.path().join("absent.bin")).unwrap_err();
        assert!(matches!(err, ProbeError::Io { .. }));
    }

    #[test]
    fn test_verify_expectations() {
        let digest = digest_bytes(b"abc");
        assert!(digest.verify(None, None).passed);
        assert!(digest
            .verify(Some("900150983CD24FB0D6963F7D28E17F72"), Some(3))
            .passed);

        let outcome = digest.verify(Some("00"), Some(4));
        assert!(!outcome.passed);
        assert_eq!(outcome.details.len(), 2);
    }
}
