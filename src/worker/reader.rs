//! Line chunking and dispatch
//!
//! This module implements the input stage of the encryption pipeline. The
//! [`Chunker`] groups input lines into fixed-size chunks, and the [`Reader`]
//! drives it and hands each chunk to the worker pool.
//!
//! ## Chunking Rules
//!
//! - Every chunk except possibly the last holds exactly `chunk_size` lines
//! - The last chunk holds `1..=chunk_size` lines; empty input yields no chunk
//! - Ids are 0-based stream positions, assigned when a chunk closes
//!
//! ## Concurrency Design
//!
//! The reader runs as its own task and talks to the workers only through a
//! bounded channel. A full channel suspends the reader, which keeps at most
//! `workers` chunks queued ahead of the pool. Dropping the sender at the end
//! of input is what tells the workers to finish.

use std::sync::Arc;

use flume::Sender;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};

use crate::error::{Error, Result};
use crate::observer::Observer;
use crate::types::{Chunk, ChunkId};

/// Groups lines from a buffered input into [`Chunk`]s.
///
/// A line ends at `\n`, which is dropped together with one `\r` right before
/// it. A final line without `\n` still counts and loses one trailing `\r`.
///
/// Input must be UTF-8. Arbitrary bytes are not passed through: a line that
/// is not valid UTF-8 fails the read, so binary files cannot be chunked.
///
/// The sequence is lazy, finite and cannot be restarted: once
/// [`next_chunk`](Self::next_chunk) returns `None` it keeps returning `None`.
pub struct Chunker<R> {
    /// Buffered source of lines
    input: R,
    /// Lines per full chunk, always at least 1
    chunk_size: usize,
    /// Id the next closed chunk receives
    next_id: ChunkId,
    /// Set once the underlying stream reported end of input
    exhausted: bool,
}

impl<R: AsyncBufRead + Unpin> Chunker<R> {
    /// Creates a chunker over `input`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] if `chunk_size` is zero.
    pub fn new(input: R, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidOption("chunk size must be at least 1 line".into()));
        }

        Ok(Self { input, chunk_size, next_id: 0, exhausted: false })
    }

    /// Reads lines until a chunk is full or input ends.
    ///
    /// # Returns
    ///
    /// The next chunk, or `None` once input is exhausted.
    ///
    /// # Errors
    ///
    /// Any read failure (including invalid UTF-8) is returned as
    /// [`Error::Io`]; it is fatal for the whole run.
    pub async fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        if self.exhausted {
            return Ok(None);
        }

        // Cap the pre-allocation; chunk_size comes from the user.
        let mut lines = Vec::with_capacity(self.chunk_size.min(1024));

        while lines.len() < self.chunk_size {
            match self.next_line().await? {
                Some(line) => lines.push(line),
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }

        if lines.is_empty() {
            return Ok(None);
        }

        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(Error::FieldOverflow { field: "chunk id", value: id as usize })?;

        Ok(Some(Chunk::new(id, lines)))
    }

    /// Reads one line without its terminator, or `None` at end of input.
    async fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }

        if line.ends_with('\n') {
            line.pop();
        }
        if line.ends_with('\r') {
            line.pop();
        }

        Ok(Some(line))
    }
}

/// Feeds chunks from an input stream into the work queue.
pub struct Reader {
    /// Lines per chunk
    chunk_size: usize,
    /// Receives one `chunk_closed` event per chunk
    observer: Arc<dyn Observer>,
}

impl Reader {
    /// Creates a reader; fails with [`Error::InvalidOption`] for a zero chunk size.
    pub fn new(chunk_size: usize, observer: Arc<dyn Observer>) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidOption("chunk size must be at least 1 line".into()));
        }

        Ok(Self { chunk_size, observer })
    }

    /// Chunks all of `input` and sends the chunks in ascending id order.
    ///
    /// The sender is only borrowed; the caller closes the queue by dropping it.
    ///
    /// # Returns
    ///
    /// The number of chunks dispatched.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if reading the input fails
    /// - [`Error::ChannelClosed`] if every worker has already gone away
    pub async fn read_all<R: AsyncRead + Unpin>(&self, input: R, sender: &Sender<Chunk>) -> Result<usize> {
        let mut chunker = Chunker::new(BufReader::new(input), self.chunk_size)?;
        let mut dispatched = 0;

        while let Some(chunk) = chunker.next_chunk().await? {
            self.observer.chunk_closed(chunk.id, chunk.line_count());
            sender.send_async(chunk).await.map_err(|_| Error::ChannelClosed)?;
            dispatched += 1;
        }

        Ok(dispatched)
    }
}
