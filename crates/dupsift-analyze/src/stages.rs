//! The size, chunk and full-content stages.
//!
//! Each stage takes groups of records that are still ambiguous, settles the
//! ones it can, and hands the remaining groups to the next stage. Hashing
//! inside a stage runs on rayon; collecting the results in order is the
//! barrier between stages.

use rayon::prelude::*;

use dupsift_core::{Action, FileRecord, HashError, partition_by};

use crate::config::SiftConfig;
use crate::hasher::{BlockSizeProbe, ContentHasher, chunk_size};
use crate::report::{HashStage, StageStats, Unresolved};

/// Groups of records that share every key seen so far.
pub(crate) type Groups = Vec<Vec<FileRecord>>;

/// Actions and bookkeeping accumulated across stages.
#[derive(Debug, Default)]
pub(crate) struct Ledger {
    pub actions: Vec<Action>,
    pub unresolved: Vec<Unresolved>,
    pub stats: StageStats,
}

impl Ledger {
    fn keep_all(&mut self, records: Vec<FileRecord>) -> usize {
        let count = records.len();
        self.actions.extend(records.into_iter().map(Action::Keep));
        count
    }

    fn unresolve(&mut self, record: FileRecord, stage: HashStage, error: HashError) {
        tracing::warn!(
            path = %record.path().display(),
            stage = %stage,
            error = %error,
            "could not hash file, keeping it"
        );
        self.actions.push(Action::Keep(record.clone()));
        self.unresolved.push(Unresolved::new(record, stage, &error));
        self.stats.unresolved += 1;
    }
}

/// Remove empty files and group the rest by size.
pub(crate) fn size_stage(records: Vec<FileRecord>, ledger: &mut Ledger) -> Groups {
    let (empty, sized): (Vec<_>, Vec<_>) = records.into_iter().partition(FileRecord::is_empty);

    ledger.stats.zero_length = empty.len();
    ledger.actions.extend(empty.into_iter().map(Action::Remove));

    let by_size = partition_by(sized, FileRecord::size);
    ledger.stats.unique_size = ledger.keep_all(by_size.resolved);

    by_size.deferred.into_values().collect()
}

/// Result of hashing one record, with the bytes read (`None` when an
/// earlier hash was reused).
type Hashed = Result<(FileRecord, Option<u64>), (FileRecord, HashError)>;

/// Runs the hashing stages with the given collaborators.
pub(crate) struct Sampler<'a> {
    pub config: &'a SiftConfig,
    pub hasher: &'a dyn ContentHasher,
    pub probe: &'a dyn BlockSizeProbe,
}

impl Sampler<'_> {
    /// Hash a leading sample of every file and regroup each size group by
    /// sample hash.
    pub(crate) fn chunk_stage(&self, groups: Groups, ledger: &mut Ledger) -> Groups {
        let sampled: Vec<Vec<Hashed>> = groups
            .into_par_iter()
            .map(|group| self.sample_group(group))
            .collect();

        let mut next = Vec::new();
        for group in sampled {
            let hashed = settle(group, HashStage::Chunk, ledger, |stats, bytes| {
                stats.chunk_bytes_read += bytes.unwrap_or(0);
            });

            let by_chunk = partition_by(hashed, FileRecord::chunk_hash);
            ledger.stats.unique_chunk += ledger.keep_all(by_chunk.resolved);
            next.extend(by_chunk.deferred.into_values());
        }
        next
    }

    /// Hash full content and regroup each chunk group by full hash.
    ///
    /// Records whose sample already covered the whole file are not re-read.
    pub(crate) fn full_stage(&self, groups: Groups, ledger: &mut Ledger) -> Groups {
        let hashed: Vec<Vec<Hashed>> = groups
            .into_par_iter()
            .map(|group| {
                group
                    .into_par_iter()
                    .map(|record| self.hash_full(record))
                    .collect()
            })
            .collect();

        let mut duplicates = Vec::new();
        for group in hashed {
            let hashed = settle(group, HashStage::Full, ledger, |stats, bytes| {
                if let Some(bytes) = bytes {
                    stats.full_bytes_read += bytes;
                    stats.full_hashes_computed += 1;
                }
            });

            let by_content = partition_by(hashed, FileRecord::full_hash);
            ledger.stats.unique_content += ledger.keep_all(by_content.resolved);
            duplicates.extend(by_content.deferred.into_values());
        }
        duplicates
    }

    fn sample_group(&self, group: Vec<FileRecord>) -> Vec<Hashed> {
        let max_size = group.iter().map(FileRecord::size).max().unwrap_or(0);
        let block = group
            .first()
            .and_then(|record| self.probe.block_size(record.path()))
            .filter(|&size| size > 0)
            .unwrap_or(self.config.fallback_block_size);
        let chunk = chunk_size(max_size, self.config.chunk_ratio, block);

        tracing::trace!(max_size, block, chunk, members = group.len(), "sampling size group");

        group
            .into_par_iter()
            .map(|record| match self.hasher.hash_prefix(record.path(), chunk) {
                Ok(sample) => {
                    let record = record.with_chunk_hash(sample.hash);
                    // A short read means the sample is the whole file.
                    let record = if sample.bytes_read < chunk {
                        record.with_full_hash(sample.hash)
                    } else {
                        record
                    };
                    Ok((record, Some(sample.bytes_read)))
                }
                Err(err) => Err((record, err)),
            })
            .collect()
    }

    fn hash_full(&self, record: FileRecord) -> Hashed {
        if record.full_hash().is_some() {
            return Ok((record, None));
        }
        match self.hasher.hash_full(record.path()) {
            Ok(full) => Ok((record.with_full_hash(full.hash), Some(full.bytes_read))),
            Err(err) => Err((record, err)),
        }
    }
}

/// Record failures in the ledger and return the records that were hashed.
fn settle(
    group: Vec<Hashed>,
    stage: HashStage,
    ledger: &mut Ledger,
    tally: impl Fn(&mut StageStats, Option<u64>),
) -> Vec<FileRecord> {
    let mut hashed = Vec::with_capacity(group.len());
    for result in group {
        match result {
            Ok((record, bytes)) => {
                tally(&mut ledger.stats, bytes);
                hashed.push(record);
            }
            Err((record, err)) => ledger.unresolve(record, stage, err),
        }
    }
    hashed
}
