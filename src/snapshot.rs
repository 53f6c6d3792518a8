//! On-disk snapshot of a local store.
//!
//! File layout:
//!
//! ```text
//! {"version":1,"crc32":...,"len":...,"key_digest":"..."}\n
//! <len bytes of JSON state>
//! ```
//!
//! The header is one line of JSON; the body follows and is covered by the
//! CRC-32. Updates are atomic via write-to-temp + fsync + rename.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{Error, Result};

/// Snapshot file name inside the store directory.
pub const SNAPSHOT_FILE_NAME: &str = "STORE";

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotHeader {
    version: u32,
    crc32: u32,
    len: u64,
    key_digest: String,
}

/// Persisted store state plus the digest of the key it is bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    /// blake3 hex digest of the access key.
    pub key_digest: String,
    /// Store contents.
    pub state: T,
}

impl<T> Snapshot<T> {
    /// Current snapshot format version
    pub const CURRENT_VERSION: u32 = 1;

    /// Wrap state for persisting.
    pub fn new(key_digest: impl Into<String>, state: T) -> Self {
        Self {
            key_digest: key_digest.into(),
            state,
        }
    }
}

impl<T: DeserializeOwned> Snapshot<T> {
    /// Load a snapshot; `Ok(None)` if the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(None);
        }

        let mut file = File::open(path).map_err(Error::io_err(path, "failed to open snapshot"))?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(Error::io_err(path, "failed to read snapshot"))?;

        let newline = contents
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| Error::corruption(path, "missing snapshot header"))?;
        let (header, body) = contents.split_at(newline);
        let body = &body[1..];

        let header: SnapshotHeader = serde_json::from_slice(header)
            .map_err(|e| Error::corruption(path, format!("invalid snapshot header: {}", e)))?;

        if header.version != Self::CURRENT_VERSION {
            return Err(Error::corruption(
                path,
                format!(
                    "unsupported snapshot version: expected {}, got {}",
                    Self::CURRENT_VERSION,
                    header.version
                ),
            ));
        }

        if body.len() as u64 != header.len {
            return Err(Error::corruption(
                path,
                format!("truncated snapshot: expected {} bytes, got {}", header.len, body.len()),
            ));
        }

        let crc = crc32fast::hash(body);
        if crc != header.crc32 {
            return Err(Error::ChecksumMismatch {
                file: path.to_path_buf(),
                expected: header.crc32,
                got: crc,
            });
        }

        let state = serde_json::from_slice(body)
            .map_err(|e| Error::corruption(path, format!("invalid snapshot body: {}", e)))?;

        Ok(Some(Self {
            key_digest: header.key_digest,
            state,
        }))
    }
}

impl<T: Serialize> Snapshot<T> {
    /// Save atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let temp_path = path.with_extension("tmp");

        let body = serde_json::to_vec(&self.state)
            .map_err(|e| Error::Serialization(format!("failed to serialize store state: {}", e)))?;
        let header = SnapshotHeader {
            version: Self::CURRENT_VERSION,
            crc32: crc32fast::hash(&body),
            len: body.len() as u64,
            key_digest: self.key_digest.clone(),
        };
        let mut bytes = serde_json::to_vec(&header)
            .map_err(|e| Error::Serialization(format!("failed to serialize snapshot header: {}", e)))?;
        bytes.push(b'\n');
        bytes.extend_from_slice(&body);

        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(Error::io_err(&temp_path, "failed to create temp snapshot"))?;

        temp_file
            .write_all(&bytes)
            .map_err(Error::io_err(&temp_path, "failed to write temp snapshot"))?;

        temp_file
            .sync_all()
            .map_err(Error::io_err(&temp_path, "failed to sync temp snapshot"))?;

        drop(temp_file);

        std::fs::rename(&temp_path, path).map_err(Error::io_err(path, "failed to rename snapshot"))?;

        sync_parent_dir(path)
    }
}

/// Make the rename durable.
fn sync_parent_dir(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;

        let Some(parent) = path.parent() else {
            return Ok(());
        };
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };

        let dir = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_DIRECTORY)
            .open(parent)
            .map_err(Error::io_err(parent, "failed to open parent directory"))?;

        dir.sync_all()
            .map_err(Error::io_err(parent, "failed to sync parent directory"))?;
    }

    #[cfg(windows)]
    {
        let _ = path;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    #[test]
    fn test_snapshot_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SNAPSHOT_FILE_NAME);

        let snapshot = Snapshot::new("abc", json!({"databases": {"FamilyDB": {}}}));
        snapshot.save(&path).unwrap();

        let loaded: Snapshot<Value> = Snapshot::load(&path).unwrap().unwrap();
        assert_eq!(loaded, snapshot);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_missing_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let loaded: Option<Snapshot<Value>> =
            Snapshot::load(temp_dir.path().join("NONEXISTENT")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_checksum_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SNAPSHOT_FILE_NAME);
        Snapshot::new("abc", json!({"n": 1})).save(&path).unwrap();

        // Same length, different body.
        let mut bytes = std::fs::read(&path).unwrap();
        let last = bytes.len() - 2;
        bytes[last] = b'2';
        std::fs::write(&path, bytes).unwrap();

        let err = Snapshot::<Value>::load(&path).unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_truncated_and_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SNAPSHOT_FILE_NAME);
        Snapshot::new("abc", json!({"n": 1})).save(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 1]).unwrap();
        assert!(matches!(
            Snapshot::<Value>::load(&path).unwrap_err(),
            Error::Corruption { .. }
        ));

        std::fs::write(&path, b"not a snapshot").unwrap();
        assert!(matches!(
            Snapshot::<Value>::load(&path).unwrap_err(),
            Error::Corruption { .. }
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SNAPSHOT_FILE_NAME);
        std::fs::write(
            &path,
            b"{\"version\":9,\"crc32\":0,\"len\":2,\"key_digest\":\"x\"}\n{}",
        )
        .unwrap();

        let err = Snapshot::<Value>::load(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported snapshot version"));
    }
}
