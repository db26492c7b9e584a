//! File records and content hashes.

use std::fmt;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// 32-byte content digest used for chunk and full hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Metadata for one discovered file, plus the hashes attached as it moves
/// through the pipeline.
///
/// Records are immutable. Attaching a hash consumes the record and returns a
/// copy with that one field set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    filename: CompactString,
    path: PathBuf,
    size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chunk_hash: Option<ContentHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    full_hash: Option<ContentHash>,
}

impl FileRecord {
    /// Create a record from metadata that is already known to be valid.
    pub fn new(filename: impl Into<CompactString>, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            filename: filename.into(),
            path: path.into(),
            size,
            chunk_hash: None,
            full_hash: None,
        }
    }

    /// Create a record from raw metadata, rejecting negative sizes and
    /// missing names.
    pub fn try_new(
        filename: impl Into<CompactString>,
        path: impl Into<PathBuf>,
        size: i64,
    ) -> Result<Self, RecordError> {
        let filename = filename.into();
        let path = path.into();

        if path.as_os_str().is_empty() {
            return Err(RecordError::invalid(path, "path is empty"));
        }
        if filename.is_empty() {
            return Err(RecordError::invalid(path, "filename is empty"));
        }
        let size = u64::try_from(size)
            .map_err(|_| RecordError::invalid(&path, format!("negative size {size}")))?;

        Ok(Self::new(filename, path, size))
    }

    /// File name without directory components.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Absolute path; unique per record.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes as reported at discovery.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Hash of the leading sample, if computed.
    pub fn chunk_hash(&self) -> Option<ContentHash> {
        self.chunk_hash
    }

    /// Hash of the whole content, if computed.
    pub fn full_hash(&self) -> Option<ContentHash> {
        self.full_hash
    }

    /// Check if the file has no content.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Copy of this record with the chunk hash set.
    #[must_use]
    pub fn with_chunk_hash(self, hash: ContentHash) -> Self {
        Self {
            chunk_hash: Some(hash),
            ..self
        }
    }

    /// Copy of this record with the full hash set.
    #[must_use]
    pub fn with_full_hash(self, hash: ContentHash) -> Self {
        Self {
            full_hash: Some(hash),
            ..self
        }
    }
}
