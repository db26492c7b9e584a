//! Classification results.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, IntoEnumIterator};

use dupsift_core::{Action, ActionKind, FileRecord, HashError, ScanWarning};

/// Hashing stage in which a file could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HashStage {
    Chunk,
    Full,
}

/// A file whose content could not be hashed.
///
/// It is kept, and never compared with any other file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unresolved {
    pub record: FileRecord,
    pub stage: HashStage,
    pub reason: String,
}

impl Unresolved {
    pub(crate) fn new(record: FileRecord, stage: HashStage, error: &HashError) -> Self {
        Self {
            record,
            stage,
            reason: error.to_string(),
        }
    }
}

/// Per-stage counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStats {
    pub files_total: usize,
    /// Removed for having no content.
    pub zero_length: usize,
    /// Kept because no other file had the same size.
    pub unique_size: usize,
    /// Kept because their leading sample was unique.
    pub unique_chunk: usize,
    /// Kept because their full content was unique.
    pub unique_content: usize,
    /// Groups of byte-identical files.
    pub duplicate_groups: usize,
    pub duplicates_removed: usize,
    pub unresolved: usize,
    pub renamed: usize,
    pub chunk_bytes_read: u64,
    pub full_bytes_read: u64,
    pub full_hashes_computed: usize,
}

/// Outcome of classifying a set of files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifyReport {
    /// Exactly one action per input file.
    pub actions: Vec<Action>,
    /// Files that were kept because they could not be hashed.
    pub unresolved: Vec<Unresolved>,
    /// Non-fatal problems met while enumerating files.
    pub scan_warnings: Vec<ScanWarning>,
    pub stats: StageStats,
    pub duration: Duration,
}

impl ClassifyReport {
    /// Number of actions of the given kind.
    pub fn count(&self, kind: ActionKind) -> usize {
        self.actions.iter().filter(|a| a.kind() == kind).count()
    }

    /// Actions of the given kind, in report order.
    pub fn actions_of(&self, kind: ActionKind) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(move |a| a.kind() == kind)
    }

    /// Count of every action kind, including kinds with no actions.
    pub fn counts(&self) -> BTreeMap<ActionKind, usize> {
        ActionKind::iter()
            .map(|kind| (kind, self.count(kind)))
            .collect()
    }

    /// Bytes that would be freed by carrying out every removal.
    pub fn reclaimable_bytes(&self) -> u64 {
        self.actions_of(ActionKind::Remove)
            .map(|a| a.record().size())
            .sum()
    }

    /// Drop every action not of `kind`; unresolved files and scan warnings
    /// are left in place.
    pub fn retain_kind(&mut self, kind: ActionKind) {
        self.actions.retain(|a| a.kind() == kind);
    }

    /// Check if there is nothing to remove or rename.
    pub fn is_clean(&self) -> bool {
        self.actions.iter().all(Action::is_keep)
    }
}
