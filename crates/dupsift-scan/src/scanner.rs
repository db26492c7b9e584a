//! JWalk-based parallel file discovery.

use std::sync::Arc;
use std::time::Instant;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use jwalk::{Parallelism, WalkDir};
use tokio::sync::broadcast;

use dupsift_core::{
    Discovery, FileRecord, FileSource, ScanConfig, ScanError, ScanWarning, WarningKind,
};

use crate::filter::EntryFilter;
use crate::progress::ScanProgress;

/// How many files to find between progress broadcasts.
const PROGRESS_INTERVAL: u64 = 1000;

/// Discovers candidate files using jwalk for parallel traversal.
///
/// Directory listings are sorted by name, so the same tree always yields
/// records in the same order.
pub struct JwalkScanner {
    progress_tx: broadcast::Sender<ScanProgress>,
}

impl JwalkScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self { progress_tx }
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Find every regular file under `config.root` that passes the filters.
    pub fn scan(&self, config: &ScanConfig) -> Result<Discovery, ScanError> {
        let start = Instant::now();

        if config.root.as_os_str().is_empty() {
            return Err(ScanError::InvalidConfig {
                message: "Root path cannot be empty".to_string(),
            });
        }

        let root_path = config
            .root
            .canonicalize()
            .map_err(|e| ScanError::io(&config.root, e))?;

        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory { path: root_path });
        }

        let root_metadata =
            std::fs::metadata(&root_path).map_err(|e| ScanError::io(&root_path, e))?;
        let root_device = get_dev(&root_metadata);

        let filter = Arc::new(EntryFilter::from_config(config)?);

        let parallelism = match config.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: std::time::Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };

        // Ignored entries are pruned while reading each directory so that
        // an ignored directory is never descended into.
        let prune = Arc::clone(&filter);
        let walker = WalkDir::new(&root_path)
            .parallelism(parallelism)
            .sort(true)
            .skip_hidden(!config.include_hidden)
            .follow_links(config.follow_symlinks)
            .min_depth(1)
            .max_depth(config.max_depth.map(|d| d as usize).unwrap_or(usize::MAX))
            .process_read_dir(move |_depth, _path, _state, children| {
                children.retain(|entry| match entry {
                    Ok(e) => !prune.is_ignored(&e.file_name().to_string_lossy()),
                    Err(_) => true,
                });
            });

        let mut records = Vec::new();
        let mut warnings = Vec::new();
        let mut progress = ScanProgress::new();

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    let denied = err
                        .io_error()
                        .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied);
                    warnings.push(if denied {
                        ScanWarning::permission_denied(path)
                    } else {
                        ScanWarning::new(path, err.to_string(), WarningKind::ReadError)
                    });
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                progress.dirs_scanned += 1;
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().to_string();
            if !filter.matches_filename(&file_name) {
                continue;
            }

            let path = entry.path();
            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(err) => {
                    warnings.push(ScanWarning::new(
                        &path,
                        err.to_string(),
                        WarningKind::MetadataError,
                    ));
                    continue;
                }
            };

            if !config.cross_filesystems && get_dev(&metadata) != root_device {
                continue;
            }

            let size = metadata.len();
            progress.files_found += 1;
            progress.bytes_found += size;
            records.push(FileRecord::new(file_name, path.clone(), size));

            if progress.files_found % PROGRESS_INTERVAL == 0 {
                progress.current_path = path;
                progress.warnings_count = warnings.len() as u64;
                progress.elapsed = start.elapsed();
                let _ = self.progress_tx.send(progress.clone());
            }
        }

        progress.warnings_count = warnings.len() as u64;
        progress.elapsed = start.elapsed();
        progress.finished = true;
        let _ = self.progress_tx.send(progress.clone());

        tracing::debug!(
            root = %root_path.display(),
            files = records.len(),
            warnings = warnings.len(),
            elapsed_ms = progress.elapsed.as_millis() as u64,
            "scan complete"
        );

        Ok(Discovery { records, warnings })
    }
}

impl Default for JwalkScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSource for JwalkScanner {
    fn discover(&self, config: &ScanConfig) -> Result<Discovery, ScanError> {
        self.scan(config)
    }
}

/// Get the device ID from metadata.
#[cfg(unix)]
fn get_dev(metadata: &std::fs::Metadata) -> u64 {
    metadata.dev()
}

#[cfg(not(unix))]
fn get_dev(_metadata: &std::fs::Metadata) -> u64 {
    0 // Windows doesn't have device IDs in the same way
}
