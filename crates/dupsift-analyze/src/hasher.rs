//! Content hashing and block-size discovery.
//!
//! Both are traits so the classifier can be driven by something other than
//! the real filesystem. The defaults hash with BLAKE3 and read the block
//! size from file metadata.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use blake3::Hasher;

use dupsift_core::{ContentHash, HashError};

/// Digest of a file or of its leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Hash over exactly the bytes that were read.
    pub hash: ContentHash,
    /// How many bytes were read; less than the limit means end of file.
    pub bytes_read: u64,
}

/// Hashes file content.
///
/// `hash_prefix` and `hash_full` must use the same digest, so that a prefix
/// sample which reached end of file equals the full hash of that file.
pub trait ContentHasher: Send + Sync {
    /// Hash up to `limit` bytes from the start of the file.
    fn hash_prefix(&self, path: &Path, limit: u64) -> Result<Sample, HashError>;

    /// Hash the entire file; `bytes_read` is the length actually hashed.
    fn hash_full(&self, path: &Path) -> Result<Sample, HashError>;
}

/// BLAKE3 hasher with streaming reads and memory-mapped large files.
#[derive(Debug, Clone)]
pub struct Blake3Hasher {
    buffer_size: usize,
    mmap_threshold: u64,
}

impl Blake3Hasher {
    /// Create a hasher with a 64 KiB read buffer that maps files over 128 KiB.
    pub fn new() -> Self {
        Self {
            buffer_size: 64 * 1024,
            mmap_threshold: 128 * 1024,
        }
    }

    /// Create a hasher with explicit buffer size and mmap threshold.
    pub fn with_limits(buffer_size: usize, mmap_threshold: u64) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
            mmap_threshold,
        }
    }
}

impl Default for Blake3Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentHasher for Blake3Hasher {
    fn hash_prefix(&self, path: &Path, limit: u64) -> Result<Sample, HashError> {
        let file = File::open(path).map_err(|e| HashError::read(path, e))?;

        let mut hasher = Hasher::new();
        let bytes_read = std::io::copy(&mut file.take(limit), &mut hasher)
            .map_err(|e| HashError::read(path, e))?;

        Ok(Sample {
            hash: ContentHash::new(*hasher.finalize().as_bytes()),
            bytes_read,
        })
    }

    fn hash_full(&self, path: &Path) -> Result<Sample, HashError> {
        let file = File::open(path).map_err(|e| HashError::read(path, e))?;
        let file_size = file
            .metadata()
            .map_err(|e| HashError::read(path, e))?
            .len();

        let mut hasher = Hasher::new();

        if file_size > self.mmap_threshold {
            hasher
                .update_mmap_rayon(path)
                .map_err(|e| HashError::read(path, e))?;
        } else {
            let mut reader = BufReader::with_capacity(self.buffer_size, file);
            std::io::copy(&mut reader, &mut hasher).map_err(|e| HashError::read(path, e))?;
        }

        Ok(Sample {
            hash: ContentHash::new(*hasher.finalize().as_bytes()),
            bytes_read: hasher.count(),
        })
    }
}

/// Reports the storage block size of the filesystem holding a path.
pub trait BlockSizeProbe: Send + Sync {
    /// `None` when the size cannot be determined.
    fn block_size(&self, path: &Path) -> Option<u64>;
}

/// Reads the preferred I/O block size from file metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsBlockSize;

impl BlockSizeProbe for FsBlockSize {
    fn block_size(&self, path: &Path) -> Option<u64> {
        let metadata = std::fs::metadata(path).ok()?;
        get_blksize(&metadata).filter(|&size| size > 0)
    }
}

#[cfg(unix)]
fn get_blksize(metadata: &std::fs::Metadata) -> Option<u64> {
    Some(metadata.blksize())
}

#[cfg(not(unix))]
fn get_blksize(_metadata: &std::fs::Metadata) -> Option<u64> {
    None
}

/// Sample length for a group whose largest file is `max_size` bytes.
///
/// `ceil(max_size * ratio)`, at least 1, rounded up to a whole number of
/// blocks.
pub fn chunk_size(max_size: u64, ratio: f64, block_size: u64) -> u64 {
    let block = block_size.max(1);
    let ideal = ((max_size as f64) * ratio).ceil().max(1.0) as u64;
    ideal.div_ceil(block).saturating_mul(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_chunk_size_rounds_to_block() {
        assert_eq!(chunk_size(20_000, 0.2, 4096), 4096);
        assert_eq!(chunk_size(100_000, 0.2, 4096), 20_480);
        assert_eq!(chunk_size(10, 0.2, 1), 2);
    }

    #[test]
    fn test_chunk_size_is_at_least_one_block() {
        assert_eq!(chunk_size(0, 0.2, 4096), 4096);
        assert_eq!(chunk_size(1, 0.2, 512), 512);
        assert_eq!(chunk_size(3, 0.2, 0), 1);
    }

    #[test]
    fn test_prefix_of_short_file_is_whole_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("short.txt");
        fs::write(&path, "tiny").unwrap();

        let hasher = Blake3Hasher::new();
        let sample = hasher.hash_prefix(&path, 4096).unwrap();

        assert_eq!(sample.bytes_read, 4);
        assert_eq!(sample.hash, hasher.hash_full(&path).unwrap().hash);
    }

    #[test]
    fn test_prefix_ignores_bytes_past_limit() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.bin");
        let b = temp.path().join("b.bin");
        fs::write(&a, b"same-prefix-AAAA").unwrap();
        fs::write(&b, b"same-prefix-BBBB").unwrap();

        let hasher = Blake3Hasher::new();
        let sa = hasher.hash_prefix(&a, 12).unwrap();
        let sb = hasher.hash_prefix(&b, 12).unwrap();

        assert_eq!(sa.bytes_read, 12);
        assert_eq!(sa.hash, sb.hash);
        assert_ne!(
            hasher.hash_full(&a).unwrap().hash,
            hasher.hash_full(&b).unwrap().hash
        );
    }

    #[test]
    fn test_mmap_and_streamed_hashes_agree() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("large.bin");
        let content: Vec<u8> = (0..300_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &content).unwrap();

        let mapped = Blake3Hasher::with_limits(4096, 1024).hash_full(&path).unwrap();
        let streamed = Blake3Hasher::with_limits(4096, u64::MAX)
            .hash_full(&path)
            .unwrap();

        assert_eq!(mapped, streamed);
        assert_eq!(mapped.bytes_read, 300_000);
        assert_eq!(mapped.hash, ContentHash::new(*blake3::hash(&content).as_bytes()));
    }

    #[test]
    fn test_full_hash_counts_bytes_actually_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("grown.bin");
        fs::write(&path, vec![1u8; 10_000]).unwrap();

        // Buffer smaller than the file, so the stream spans many reads.
        let full = Blake3Hasher::with_limits(512, u64::MAX).hash_full(&path).unwrap();

        assert_eq!(full.bytes_read, 10_000);
        assert_eq!(full.hash, ContentHash::new(*blake3::hash(&[1u8; 10_000]).as_bytes()));
    }

    #[test]
    fn test_missing_file_is_read_failure() {
        let temp = TempDir::new().unwrap();
        let err = Blake3Hasher::new()
            .hash_full(&temp.path().join("gone.bin"))
            .unwrap_err();
        assert!(matches!(err, HashError::ReadFailure { .. }));
    }

    #[test]
    fn test_block_size_probe() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f");
        fs::write(&path, "x").unwrap();

        if cfg!(unix) {
            assert!(FsBlockSize.block_size(&path).is_some_and(|b| b > 0));
        }
        assert!(FsBlockSize.block_size(&temp.path().join("missing")).is_none());
    }
}
