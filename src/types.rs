//! Common type definitions for linevault.
//!
//! # Overview
//!
//! - [`Chunk`]: A group of consecutive input lines, the unit of encryption
//! - [`SealedChunk`]: The authenticated ciphertext of one chunk
//! - [`ChunkResult`]: What a worker reports back for one chunk
//! - [`Processing`]: Distinguishes the encrypt and decrypt directions

use strum::Display;

use crate::config::LINE_SEPARATOR;
use crate::error::Error;

/// Zero-based position of a chunk in the input stream.
///
/// Stored on disk as a big-endian `int32`, so valid ids stop at `i32::MAX`.
pub type ChunkId = u32;

/// The direction a pipeline runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum Processing {
    #[strum(serialize = "encryption")]
    Encryption,

    #[strum(serialize = "decryption")]
    Decryption,
}

/// A contiguous group of input lines.
///
/// Created by the chunker in strictly increasing `id` order and consumed
/// exactly once by a worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub id: ChunkId,

    /// Lines without their terminators.
    pub lines: Vec<String>,
}

impl Chunk {
    #[inline]
    pub fn new(id: ChunkId, lines: Vec<String>) -> Self {
        Self { id, lines }
    }

    /// The bytes that get sealed: lines joined by a single `\n`, no trailing separator.
    ///
    /// This join is the only place line boundaries are encoded.
    #[must_use]
    pub fn plaintext(&self) -> Vec<u8> {
        self.lines.join(LINE_SEPARATOR).into_bytes()
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// One encrypted record: chunk id, nonce and ciphertext (tag included).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedChunk {
    pub id: ChunkId,

    pub nonce: Vec<u8>,

    pub ciphertext: Vec<u8>,
}

/// Result of sealing a [`Chunk`].
///
/// Workers never decide what a failure means; the collector applies the
/// configured policy.
pub struct ChunkResult {
    /// The chunk this result belongs to, known even when sealing failed.
    pub id: ChunkId,

    pub sealed: Result<SealedChunk, Error>,
}

impl ChunkResult {
    #[inline]
    pub fn ok(sealed: SealedChunk) -> Self {
        Self { id: sealed.id, sealed: Ok(sealed) }
    }

    #[inline]
    pub fn err(id: ChunkId, error: Error) -> Self {
        Self { id, sealed: Err(error) }
    }
}
