//! Duplicate classification for dupsift.
//!
//! Every discovered file receives exactly one action: keep, remove or
//! keep-with-rename. Files are narrowed down in stages so that as little
//! content as possible is read:
//!
//! 1. Remove empty files, keep files with a unique size (no I/O)
//! 2. Hash a leading sample, about a fifth of the file rounded up to the
//!    storage block size, and keep files whose sample is unique
//! 3. Hash the full content with BLAKE3 and keep files whose content is unique
//! 4. Keep one member of each identical group and remove the rest
//! 5. Mark kept files that share a filename for renaming, all but one
//!
//! Files that cannot be read are kept and listed as unresolved.
//!
//! ```rust,ignore
//! use dupsift_analyze::{ActionKind, Classifier};
//! use dupsift_scan::{JwalkScanner, ScanConfig};
//!
//! let report = Classifier::new()
//!     .classify_source(&JwalkScanner::new(), &ScanConfig::new("/path/to/photos"))
//!     .unwrap();
//!
//! for action in report.actions_of(ActionKind::Remove) {
//!     println!("remove {}", action.record().path().display());
//! }
//! println!("Reclaimable: {} bytes", report.reclaimable_bytes());
//! ```

mod classifier;
mod config;
mod hasher;
mod report;
mod resolve;
mod stages;

pub use classifier::Classifier;
pub use config::{DEFAULT_BLOCK_SIZE, SiftConfig, SiftConfigBuilder, TieBreak};
pub use hasher::{Blake3Hasher, BlockSizeProbe, ContentHasher, FsBlockSize, Sample, chunk_size};
pub use report::{ClassifyReport, HashStage, StageStats, Unresolved};
pub use resolve::{disambiguate_names, resolve_duplicates};

// Re-export core types
pub use dupsift_core::{Action, ActionKind, ContentHash, FileRecord, HashError};
