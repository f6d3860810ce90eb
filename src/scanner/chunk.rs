//! Streaming BLAKE3 digests over bounded byte ranges.
//!
//! # Overview
//!
//! [`ChunkHasher`] computes a digest over one bounded range of a file,
//! streaming through a fixed-size buffer. Media files are routinely tens of
//! gigabytes; nothing here ever materializes a whole file, and the read
//! buffer lives only for the duration of a single call.
//!
//! Each invocation opens and closes its own file handle, so a hasher can be
//! shared freely across rayon workers.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use super::HashError;

/// A 32-byte BLAKE3 digest.
pub type Digest = [u8; 32];

/// Default size of the transient read buffer (1 MiB).
///
/// Large enough to keep sequential throughput on spinning disks, small
/// enough that one buffer per in-flight hash is negligible.
pub const READ_BUF_SIZE: usize = 1024 * 1024;

/// Render a digest as a lowercase hex string.
#[must_use]
pub fn digest_to_hex(digest: &Digest) -> String {
    let mut out = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Computes BLAKE3 digests over bounded byte ranges of files.
///
/// Stateless apart from its buffer-size setting; safe to invoke from
/// multiple worker threads concurrently on different files.
#[derive(Debug, Clone)]
pub struct ChunkHasher {
    buf_size: usize,
}

impl Default for ChunkHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkHasher {
    /// Create a hasher with the default read buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf_size: READ_BUF_SIZE,
        }
    }

    /// Create a hasher with a custom read buffer size.
    ///
    /// Sizes below 4 KiB are clamped up; tiny buffers only add syscalls.
    #[must_use]
    pub fn with_buffer_size(buf_size: usize) -> Self {
        Self {
            buf_size: buf_size.max(4096),
        }
    }

    /// Digest of zero bytes of input.
    ///
    /// Used as the signature of empty files, which are byte-identical by
    /// definition.
    #[must_use]
    pub fn empty_digest() -> Digest {
        *blake3::hash(&[]).as_bytes()
    }

    /// Compute the digest of the byte range `[offset, offset + len)`.
    ///
    /// Reads at most `min(len, file_len - offset)` bytes; a range that
    /// starts at or beyond the end of the file yields `Ok(None)`, signaling
    /// "no more data".
    ///
    /// # Arguments
    ///
    /// * `path` - File to read
    /// * `offset` - Byte offset the range starts at
    /// * `len` - Maximum number of bytes to hash
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] for missing files, permission failures, or
    /// I/O errors mid-read. Callers exclude the file from comparison and
    /// carry on; a bad file never aborts a run.
    pub fn digest(&self, path: &Path, offset: u64, len: u64) -> Result<Option<Digest>, HashError> {
        if len == 0 {
            return Ok(None);
        }

        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let file_len = file
            .metadata()
            .map_err(|e| HashError::from_io(path, e))?
            .len();

        if offset >= file_len {
            return Ok(None);
        }
        let to_read = len.min(file_len - offset);

        if offset > 0 {
            file.seek(SeekFrom::Start(offset))
                .map_err(|e| HashError::from_io(path, e))?;
        }

        let mut hasher = blake3::Hasher::new();
        let mut buf = vec![0u8; self.buf_size.min(usize::try_from(to_read).unwrap_or(usize::MAX))];
        let mut remaining = to_read;

        while remaining > 0 {
            let want = usize::try_from(remaining.min(buf.len() as u64)).unwrap_or(buf.len());
            let n = file
                .read(&mut buf[..want])
                .map_err(|e| HashError::from_io(path, e))?;
            if n == 0 {
                // File shrank under us; hash what was actually there.
                log::warn!(
                    "Short read hashing {} at offset {}: expected {} more bytes",
                    path.display(),
                    offset,
                    remaining
                );
                break;
            }
            hasher.update(&buf[..n]);
            remaining -= n as u64;
        }

        Ok(Some(*hasher.finalize().as_bytes()))
    }
}
