//! Error taxonomy for the chunk pipeline.
//!
//! Every fallible library operation returns [`Result`]. Only
//! [`Error::Seal`] is ever recovered locally (and only under
//! [`SealFailurePolicy::Drop`](crate::worker::SealFailurePolicy::Drop));
//! every other variant aborts the run.

use std::io;
use std::path::PathBuf;

use crate::types::ChunkId;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The key handed to the codec is not exactly [`KEY_SIZE`](crate::config::KEY_SIZE) bytes.
    #[error("invalid key length: {actual} bytes, expected {expected} bytes")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// A pipeline option is out of range.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    /// Opening or creating one of the pipeline's files failed.
    #[error("failed to {action} {}: {source}", path.display())]
    File {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The container ended in the middle of a record.
    #[error("truncated record at offset {offset}: stream ended inside {field}")]
    TruncatedRecord { offset: u64, field: &'static str },

    /// A record header holds a value no writer would produce.
    #[error("malformed record at offset {offset}: {reason}")]
    MalformedRecord { offset: u64, reason: String },

    /// A value does not fit its container field.
    #[error("{field} does not fit the container field: {value}")]
    FieldOverflow { field: &'static str, value: usize },

    /// Two records carry the same chunk id.
    #[error("duplicate chunk id {0}")]
    DuplicateChunk(ChunkId),

    /// Tag verification failed, or the nonce/ciphertext are malformed.
    #[error("authentication failed")]
    Authentication,

    /// The cipher or its random source failed while sealing.
    #[error("cipher failure: {0}")]
    Cipher(String),

    /// Sealing one chunk failed (random source or cipher failure).
    #[error("failed to seal chunk {id}: {reason}")]
    Seal { id: ChunkId, reason: String },

    /// The other end of a pipeline queue went away early.
    #[error("pipeline channel closed")]
    ChannelClosed,

    /// The sealing pool could not start its threads.
    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("pipeline task panicked: {0}")]
    TaskPanicked(&'static str),
}

impl Error {
    pub(crate) fn file(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::File { action, path: path.into(), source }
    }

    /// Returns true for the failures reported by the codec on open.
    #[inline]
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication)
    }
}
