//! File discovery for dupsift.
//!
//! This crate walks a directory tree in parallel using jwalk and turns
//! every matching regular file into a [`FileRecord`].
//!
//! - **Filename filter** - a regular expression searched in each file name
//! - **Ignore patterns** - glob patterns that prune files and whole directories
//! - **Stable order** - directory listings are sorted, so repeated scans of an
//!   unchanged tree produce records in the same order
//! - **Progress updates** via broadcast channels
//!
//! # Example
//!
//! ```rust,no_run
//! use dupsift_scan::{JwalkScanner, ScanConfig};
//!
//! let config = ScanConfig::builder()
//!     .root("/path/to/photos")
//!     .filename_filter(Some("[Jj][Pp][Gg]$".to_string()))
//!     .build()
//!     .unwrap();
//!
//! let discovery = JwalkScanner::new().scan(&config).unwrap();
//! println!("Found {} files", discovery.records.len());
//! ```

mod filter;
mod progress;
mod scanner;

pub use filter::EntryFilter;
pub use progress::ScanProgress;
pub use scanner::JwalkScanner;

// Re-export core types for convenience
pub use dupsift_core::{
    Discovery, FileRecord, FileSource, ScanConfig, ScanError, ScanWarning, WarningKind,
};
