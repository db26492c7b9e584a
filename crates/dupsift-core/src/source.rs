//! The enumeration seam between file discovery and classification.

use serde::{Deserialize, Serialize};

use crate::config::ScanConfig;
use crate::error::{ScanError, ScanWarning};
use crate::record::FileRecord;

/// Files found by a [`FileSource`], in discovery order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Discovery {
    /// One record per matching regular file.
    pub records: Vec<FileRecord>,
    /// Entries that were skipped because of a non-fatal problem.
    pub warnings: Vec<ScanWarning>,
}

impl Discovery {
    /// Wrap records that were produced without any warnings.
    pub fn from_records(records: Vec<FileRecord>) -> Self {
        Self {
            records,
            warnings: Vec::new(),
        }
    }

    /// Total bytes across all discovered files.
    pub fn total_size(&self) -> u64 {
        self.records.iter().map(FileRecord::size).sum()
    }
}

/// Something that can list the files under a root.
///
/// Only a failure to enumerate at all should be returned as an error;
/// problems with individual entries belong in [`Discovery::warnings`].
pub trait FileSource {
    fn discover(&self, config: &ScanConfig) -> Result<Discovery, ScanError>;
}
