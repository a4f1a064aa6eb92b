use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{HarnessError, Result};

/// How the output of a compression trial is sized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeProbe {
    /// A single compressed file.
    File(PathBuf),
    /// An output directory; every regular file below it is counted.
    Directory(PathBuf),
}

impl SizeProbe {
    pub fn measure(&self) -> Result<u64> {
        match self {
            SizeProbe::File(path) => file_size(path),
            SizeProbe::Directory(path) => directory_size(path),
        }
    }
}

pub fn file_size(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|meta| meta.len())
        .map_err(|e| HarnessError::io(path, e))
}

pub fn directory_size(path: &Path) -> Result<u64> {
    let mut total = 0u64;
    for entry in WalkDir::new(path) {
        let entry = entry.map_err(|e| {
            let at = e.path().unwrap_or(path).to_path_buf();
            HarnessError::io(at, e.into())
        })?;
        if entry.file_type().is_file() {
            let meta = entry.metadata().map_err(|e| HarnessError::io(entry.path(), e.into()))?;
            total += meta.len();
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_probe() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Q1.Public.gzip.txt.gz");
        fs::write(&path, vec![0u8; 1234]).unwrap();

        assert_eq!(SizeProbe::File(path).measure().unwrap(), 1234);
    }

    #[test]
    fn test_directory_probe_sums_nested_files() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("Archiver");
        fs::create_dir_all(archive.join("chunks/0")).unwrap();
        fs::write(archive.join("index"), vec![1u8; 100]).unwrap();
        fs::write(archive.join("chunks/a"), vec![2u8; 20]).unwrap();
        fs::write(archive.join("chunks/0/b"), vec![3u8; 3]).unwrap();

        assert_eq!(SizeProbe::Directory(archive).measure().unwrap(), 123);
    }

    #[test]
    fn test_empty_directory_is_zero() {
        let dir = tempdir().unwrap();
        assert_eq!(directory_size(dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.gz");
        match SizeProbe::File(missing.clone()).measure() {
            Err(HarnessError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
