//! Terminal per-file dispositions.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::record::FileRecord;

/// What the caller should do with a discovered file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "file", rename_all = "snake_case")]
pub enum Action {
    /// Retain the file as is.
    Keep(FileRecord),
    /// Delete the file; its content is empty or retained elsewhere.
    Remove(FileRecord),
    /// Retain the file, but under a new name because another kept file
    /// already uses this one.
    KeepWithRename(FileRecord),
}

impl Action {
    /// The file this action applies to.
    pub fn record(&self) -> &FileRecord {
        match self {
            Action::Keep(record) | Action::Remove(record) | Action::KeepWithRename(record) => {
                record
            }
        }
    }

    /// Consume the action, returning its file.
    pub fn into_record(self) -> FileRecord {
        match self {
            Action::Keep(record) | Action::Remove(record) | Action::KeepWithRename(record) => {
                record
            }
        }
    }

    /// The disposition without its payload.
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Keep(_) => ActionKind::Keep,
            Action::Remove(_) => ActionKind::Remove,
            Action::KeepWithRename(_) => ActionKind::KeepWithRename,
        }
    }

    /// Check if this is a plain `Keep`.
    pub fn is_keep(&self) -> bool {
        matches!(self, Action::Keep(_))
    }
}

/// Fieldless mirror of [`Action`], for counting and filtering.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "kebab-case")]
pub enum ActionKind {
    Keep,
    Remove,
    KeepWithRename,
}
