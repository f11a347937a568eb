//! Plaintext output for decryption.
//!
//! Recovered chunks are written in the order they are handed over, each
//! followed by one chunk separator, the last one included.

use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use crate::config::CHUNK_SEPARATOR;
use crate::error::Result;

/// Buffered writer for recovered chunks.
pub struct Writer<W: AsyncWrite + Unpin> {
    inner: BufWriter<W>,

    /// Bytes written so far, separators included.
    written: u64,
}

impl<W: AsyncWrite + Unpin> Writer<W> {
    #[inline]
    pub fn new(output: W) -> Self {
        Self { inner: BufWriter::new(output), written: 0 }
    }

    /// Writes one chunk's plaintext and its trailing separator.
    pub async fn write_chunk(&mut self, plaintext: &[u8]) -> Result<()> {
        self.inner.write_all(plaintext).await?;
        self.inner.write_all(CHUNK_SEPARATOR).await?;
        self.written += (plaintext.len() + CHUNK_SEPARATOR.len()) as u64;
        Ok(())
    }

    /// Flushes everything and returns the total byte count.
    pub async fn finish(mut self) -> Result<u64> {
        self.inner.flush().await?;
        Ok(self.written)
    }
}
