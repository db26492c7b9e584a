//! The classification pipeline.

use std::sync::Arc;
use std::time::Instant;

use rayon::{ThreadPool, ThreadPoolBuilder};

use dupsift_core::{ActionKind, FileRecord, FileSource, ScanConfig, ScanError};

use crate::config::SiftConfig;
use crate::hasher::{Blake3Hasher, BlockSizeProbe, ContentHasher, FsBlockSize};
use crate::report::ClassifyReport;
use crate::resolve::{disambiguate_names, resolve_duplicates};
use crate::stages::{Ledger, Sampler, size_stage};

/// Assigns every file exactly one of keep, remove or keep-with-rename.
///
/// Files are narrowed down in stages: empty files are removed, files with a
/// unique size are kept, then a leading sample and finally the full content
/// are hashed for whatever is still ambiguous. Each group of byte-identical
/// files keeps one member. Kept files that share a filename are then marked
/// for renaming, all but one.
pub struct Classifier {
    config: SiftConfig,
    hasher: Arc<dyn ContentHasher>,
    probe: Arc<dyn BlockSizeProbe>,
    pool: Option<Arc<ThreadPool>>,
}

impl Classifier {
    /// Create a classifier with default settings.
    pub fn new() -> Self {
        Self::with_config(SiftConfig::default())
    }

    /// Create a classifier with custom settings.
    pub fn with_config(config: SiftConfig) -> Self {
        let hasher = Blake3Hasher::with_limits(config.read_buffer_size, config.mmap_threshold);
        let pool = build_pool(config.threads);
        Self {
            config,
            hasher: Arc::new(hasher),
            probe: Arc::new(FsBlockSize),
            pool,
        }
    }

    /// Replace the content hasher.
    pub fn with_hasher(mut self, hasher: impl ContentHasher + 'static) -> Self {
        self.hasher = Arc::new(hasher);
        self
    }

    /// Replace the block-size probe.
    pub fn with_block_probe(mut self, probe: impl BlockSizeProbe + 'static) -> Self {
        self.probe = Arc::new(probe);
        self
    }

    /// Get the active configuration.
    pub fn config(&self) -> &SiftConfig {
        &self.config
    }

    /// Enumerate files with `source` and classify them.
    ///
    /// Enumeration failure is the only error; unreadable files end up in
    /// [`ClassifyReport::unresolved`].
    pub fn classify_source<S: FileSource + ?Sized>(
        &self,
        source: &S,
        config: &ScanConfig,
    ) -> Result<ClassifyReport, ScanError> {
        let discovery = source.discover(config)?;
        let mut report = self.classify(discovery.records);
        report.scan_warnings = discovery.warnings;
        Ok(report)
    }

    /// Classify `records`, which are expected in discovery order.
    pub fn classify(&self, records: Vec<FileRecord>) -> ClassifyReport {
        match &self.pool {
            Some(pool) => pool.install(|| self.run(records)),
            None => self.run(records),
        }
    }

    fn run(&self, records: Vec<FileRecord>) -> ClassifyReport {
        let start = Instant::now();
        let mut ledger = Ledger::default();
        ledger.stats.files_total = records.len();

        let sampler = Sampler {
            config: &self.config,
            hasher: self.hasher.as_ref(),
            probe: self.probe.as_ref(),
        };

        let stage_start = Instant::now();
        let size_groups = size_stage(records, &mut ledger);
        tracing::debug!(
            zero_length = ledger.stats.zero_length,
            unique = ledger.stats.unique_size,
            groups = size_groups.len(),
            elapsed_ms = stage_start.elapsed().as_millis() as u64,
            "size stage"
        );

        let stage_start = Instant::now();
        let chunk_groups = sampler.chunk_stage(size_groups, &mut ledger);
        tracing::debug!(
            unique = ledger.stats.unique_chunk,
            groups = chunk_groups.len(),
            bytes_read = ledger.stats.chunk_bytes_read,
            elapsed_ms = stage_start.elapsed().as_millis() as u64,
            "chunk stage"
        );

        let stage_start = Instant::now();
        let duplicate_groups = sampler.full_stage(chunk_groups, &mut ledger);
        tracing::debug!(
            unique = ledger.stats.unique_content,
            groups = duplicate_groups.len(),
            hashed = ledger.stats.full_hashes_computed,
            bytes_read = ledger.stats.full_bytes_read,
            elapsed_ms = stage_start.elapsed().as_millis() as u64,
            "full stage"
        );

        let stage_start = Instant::now();
        ledger.stats.duplicate_groups = duplicate_groups.len();
        ledger.stats.duplicates_removed = duplicate_groups
            .iter()
            .map(|group| group.len().saturating_sub(1))
            .sum();
        ledger
            .actions
            .extend(resolve_duplicates(duplicate_groups, self.config.tie_break));

        let actions = disambiguate_names(ledger.actions, self.config.tie_break);
        ledger.stats.renamed = actions
            .iter()
            .filter(|a| a.kind() == ActionKind::KeepWithRename)
            .count();
        tracing::debug!(
            removed = ledger.stats.duplicates_removed,
            renamed = ledger.stats.renamed,
            elapsed_ms = stage_start.elapsed().as_millis() as u64,
            "resolve stage"
        );

        ClassifyReport {
            actions,
            unresolved: ledger.unresolved,
            scan_warnings: Vec::new(),
            stats: ledger.stats,
            duration: start.elapsed(),
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

fn build_pool(threads: usize) -> Option<Arc<ThreadPool>> {
    if threads == 0 {
        return None;
    }
    match ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("dupsift-hash-{i}"))
        .build()
    {
        Ok(pool) => Some(Arc::new(pool)),
        Err(err) => {
            tracing::warn!(threads, error = %err, "could not build hashing pool, using the global pool");
            None
        }
    }
}
