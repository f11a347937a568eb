//! Chunk pipeline orchestration.
//!
//! # Encryption
//!
//! ```text
//! input -> Reader -> work queue -> N workers (seal) -> result queue -> Buffer -> sort -> Serializer -> output
//! ```
//!
//! The reader, the worker pool and the collector run concurrently. The pool
//! is a dedicated rayon pool of exactly `workers` threads. Both
//! queues are bounded to `workers` entries, which is the only backpressure.
//!
//! # Decryption
//!
//! ```text
//! input -> Deserializer -> Buffer -> sort -> open (sequential) -> Writer -> output
//! ```
//!
//! Decryption is sequential on purpose, so replay stays deterministic.

use std::sync::Arc;

use flume::Receiver;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::cipher::ChunkCipher;
use crate::config::{DEFAULT_LINES_PER_CHUNK, DEFAULT_WORKERS};
use crate::container::{Deserializer, Serializer};
use crate::error::{Error, Result};
use crate::observer::Observer;
use crate::types::{ChunkId, ChunkResult};
use crate::worker::buffer::Buffer;
use crate::worker::executor::Executor;
use crate::worker::reader::Reader;
use crate::worker::writer::Writer;

pub mod buffer;
pub mod executor;
pub mod pipeline;
pub mod reader;
pub mod writer;

/// What happens when a single chunk fails to seal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SealFailurePolicy {
    /// Fail the whole run with [`Error::Seal`].
    #[default]
    Abort,

    /// Leave the chunk out of the container and keep going. The gap is
    /// reported to the observer and listed in [`Summary::dropped`].
    Drop,
}

/// Encryption settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncryptOptions {
    /// Lines per chunk, at least 1.
    pub chunk_size: usize,

    /// Concurrent sealing workers, at least 1.
    pub workers: usize,

    pub on_seal_failure: SealFailurePolicy,
}

impl EncryptOptions {
    /// Validated options with the default seal failure policy.
    pub fn new(chunk_size: usize, workers: usize) -> Result<Self> {
        let options = Self { chunk_size, workers, on_seal_failure: SealFailurePolicy::default() };
        options.validate()?;
        Ok(options)
    }

    #[must_use]
    pub fn with_seal_failure_policy(mut self, policy: SealFailurePolicy) -> Self {
        self.on_seal_failure = policy;
        self
    }

    /// Checks ranges; fields are public, so callers may have bypassed [`new`](Self::new).
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidOption("chunk size must be at least 1 line".into()));
        }
        if self.workers == 0 {
            return Err(Error::InvalidOption("worker count must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for EncryptOptions {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_LINES_PER_CHUNK, workers: DEFAULT_WORKERS, on_seal_failure: SealFailurePolicy::default() }
    }
}

/// Outcome of a completed run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Records written (encryption) or opened (decryption).
    pub records: usize,

    /// Chunks left out under [`SealFailurePolicy::Drop`], ascending.
    pub dropped: Vec<ChunkId>,

    /// Bytes written to the output.
    pub bytes: u64,
}

/// Runs the chunk pipeline in either direction with one shared codec.
pub struct Worker<C> {
    cipher: Arc<C>,

    observer: Arc<dyn Observer>,
}

impl<C: ChunkCipher + 'static> Worker<C> {
    pub fn new(cipher: C, observer: Arc<dyn Observer>) -> Self {
        Self { cipher: Arc::new(cipher), observer }
    }

    /// Encrypts a line stream into a container.
    ///
    /// Must be called from within a tokio runtime: the reader runs as a task
    /// and the workers on the blocking pool.
    ///
    /// # Errors
    ///
    /// Any error is fatal and may leave a partially written output. Seal
    /// failures are fatal only under [`SealFailurePolicy::Abort`].
    pub async fn encrypt<R, W>(&self, input: R, output: W, options: &EncryptOptions) -> Result<Summary>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin,
    {
        options.validate()?;

        let (chunk_sender, chunk_receiver) = flume::bounded(options.workers);
        let (result_sender, result_receiver) = flume::bounded(options.workers);

        let reader = Reader::new(options.chunk_size, Arc::clone(&self.observer))?;
        let reader_handle = tokio::spawn(async move { reader.read_all(input, &chunk_sender).await });

        let executor = Executor::new(Arc::clone(&self.cipher), options.workers, Arc::clone(&self.observer));
        let executor_handle = tokio::task::spawn_blocking(move || executor.process(&chunk_receiver, result_sender));

        // Returning early drops the result receiver, which winds down the
        // workers and then the reader.
        let collected = self.collect(result_receiver, options.on_seal_failure).await;

        let read = reader_handle.await.map_err(|_| Error::TaskPanicked("reader"))?;
        let pooled = executor_handle.await.map_err(|_| Error::TaskPanicked("executor"))?;

        let buffer = collected?;
        pooled?;
        let dispatched = read?;
        let dropped = buffer.dropped();

        tracing::debug!(dispatched, sealed = buffer.len(), dropped = dropped.len(), "collected sealed chunks");

        let records = buffer.into_sorted();
        let bytes = Serializer::new(self.observer.as_ref()).write_all(output, &records).await?;

        Ok(Summary { records: records.len(), dropped, bytes })
    }

    /// Decrypts a container back into lines.
    ///
    /// The whole container is loaded and sorted by id before anything is
    /// opened. Every chunk is followed by one newline in the output.
    ///
    /// # Errors
    ///
    /// [`Error::TruncatedRecord`], [`Error::MalformedRecord`],
    /// [`Error::DuplicateChunk`] and [`Error::Authentication`] abort the run.
    pub async fn decrypt<R, W>(&self, input: R, output: W) -> Result<Summary>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let parsed = Deserializer::new(self.observer.as_ref()).read_all(input).await?;

        let mut buffer = Buffer::with_capacity(parsed.len());
        for record in parsed {
            buffer.insert(record)?;
        }
        let records = buffer.into_sorted();

        let mut writer = Writer::new(output);
        for record in &records {
            let plaintext = pipeline::open_record(self.cipher.as_ref(), record)?;
            self.observer.chunk_opened(record.id, plaintext.len());
            writer.write_chunk(&plaintext).await?;
        }
        let bytes = writer.finish().await?;

        Ok(Summary { records: records.len(), dropped: Vec::new(), bytes })
    }

    /// Drains the result queue into a [`Buffer`], applying the failure policy.
    async fn collect(&self, results: Receiver<ChunkResult>, policy: SealFailurePolicy) -> Result<Buffer> {
        let mut buffer = Buffer::new();

        while let Ok(result) = results.recv_async().await {
            match result.sealed {
                Ok(sealed) => buffer.insert(sealed)?,
                Err(error) => match policy {
                    SealFailurePolicy::Abort => return Err(error),
                    SealFailurePolicy::Drop => {
                        self.observer.chunk_dropped(result.id, &error);
                        buffer.mark_dropped(result.id);
                    }
                },
            }
        }

        Ok(buffer)
    }
}
