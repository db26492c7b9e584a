//! Classifier configuration.

use std::path::Path;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Block size assumed when the filesystem cannot be queried.
pub const DEFAULT_BLOCK_SIZE: u64 = 4096;

/// How the surviving member of a group is chosen.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TieBreak {
    /// First member in discovery order.
    #[default]
    Discovery,
    /// Member with the lexicographically smallest path.
    Path,
}

impl TieBreak {
    /// Reorder `group` so that its first member is the survivor.
    pub(crate) fn arrange<T>(self, group: &mut [T], path: impl Fn(&T) -> &Path) {
        match self {
            TieBreak::Discovery => {}
            TieBreak::Path => group.sort_by(|a, b| path(a).cmp(path(b))),
        }
    }
}

/// Configuration for the classification pipeline.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct SiftConfig {
    /// Fraction of the largest file in a size group to sample for the
    /// chunk hash.
    #[builder(default = "0.2")]
    pub chunk_ratio: f64,

    /// Block size used when the storage block size is unavailable.
    #[builder(default = "DEFAULT_BLOCK_SIZE")]
    pub fallback_block_size: u64,

    /// Worker threads for hashing (0 = rayon's global pool).
    #[builder(default = "0")]
    pub threads: usize,

    /// Survivor selection for duplicate groups and name collisions.
    #[builder(default)]
    pub tie_break: TieBreak,

    /// Buffer size for streamed full-content reads.
    #[builder(default = "64 * 1024")]
    pub read_buffer_size: usize,

    /// Files larger than this are memory-mapped for full hashing.
    #[builder(default = "128 * 1024")]
    pub mmap_threshold: u64,
}

impl Default for SiftConfig {
    fn default() -> Self {
        Self {
            chunk_ratio: 0.2,
            fallback_block_size: DEFAULT_BLOCK_SIZE,
            threads: 0,
            tie_break: TieBreak::Discovery,
            read_buffer_size: 64 * 1024,
            mmap_threshold: 128 * 1024,
        }
    }
}

impl SiftConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ratio) = self.chunk_ratio {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(format!("chunk_ratio must be in (0, 1], got {ratio}"));
            }
        }
        if self.fallback_block_size == Some(0) {
            return Err("fallback_block_size must be positive".to_string());
        }
        if self.read_buffer_size == Some(0) {
            return Err("read_buffer_size must be positive".to_string());
        }
        Ok(())
    }
}

impl SiftConfig {
    /// Create a new config builder.
    pub fn builder() -> SiftConfigBuilder {
        SiftConfigBuilder::default()
    }

    /// Check a config that was not produced by the builder, e.g. one
    /// deserialized from a settings file.
    pub fn validate(&self) -> Result<(), String> {
        SiftConfigBuilder::default()
            .chunk_ratio(self.chunk_ratio)
            .fallback_block_size(self.fallback_block_size)
            .read_buffer_size(self.read_buffer_size)
            .validate()
    }
}
