// src/core/cache.rs

//! Inspection of stored artifacts.
//!
//! The runner treats an existing file as a valid cache entry and never hashes
//! it. These helpers only report on what is stored, so a user can tell whether
//! two runs produced the same bytes.

use anyhow::{Context, Result};
use log::debug;
use std::{fs::File, path::Path, time::SystemTime};

/// Bytes of the blake3 digest kept for display.
const FINGERPRINT_BYTES: usize = 8;

/// What `info` shows for a stored expansion.
#[derive(Debug, PartialEq, Eq)]
pub struct ArtifactInfo {
    /// When the artifact was last written.
    pub modified: SystemTime,
    /// Size on disk, in bytes.
    pub file_size: u64,
    /// Leading bytes of the blake3 digest, hex encoded.
    pub fingerprint: String,
}

/// Describes the artifact stored at `path`.
///
/// The file is streamed through the hasher, so large figures and tables are
/// never loaded whole.
pub fn artifact_info(path: &Path) -> Result<ArtifactInfo> {
    debug!("Fingerprinting '{}'", path.display());

    let file = File::open(path)
        .with_context(|| format!("No stored artifact at '{}'", path.display()))?;
    let metadata = file.metadata()?;

    let mut hasher = blake3::Hasher::new();
    hasher
        .update_reader(file)
        .with_context(|| format!("Could not hash artifact '{}'", path.display()))?;
    let digest = hasher.finalize();

    Ok(ArtifactInfo {
        modified: metadata.modified()?,
        file_size: metadata.len(),
        fingerprint: hex::encode(digest.as_bytes().get(..FINGERPRINT_BYTES).unwrap_or_default()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_artifact_info_reports_size_and_fingerprint() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"hello world").unwrap();
        temp_file.flush().unwrap();

        let info = artifact_info(temp_file.path()).unwrap();

        assert_eq!(info.file_size, 11);
        // blake3("hello world"), first 8 bytes.
        assert_eq!(info.fingerprint, "d74981efa70a0c88");
        let age = SystemTime::now().duration_since(info.modified).unwrap();
        assert!(age.as_secs() < 5);
    }

    #[test]
    fn test_artifact_info_missing_file() {
        assert!(artifact_info(Path::new("no_such_artifact_for_test.tmp")).is_err());
    }
}
