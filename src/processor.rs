//! File-level encryption and decryption.
//!
//! These are the entry points the command line uses. They validate the key
//! and options before touching the filesystem and return every failure as a
//! [`Result`]; deciding to exit the process is left to the caller.

use std::path::Path;
use std::sync::Arc;

use bytesize::ByteSize;
use tokio::fs::File;

use crate::cipher::AesGcm;
use crate::error::{Error, Result};
use crate::observer::{Observer, TracingObserver};
use crate::secret::SecretBytes;
use crate::types::Processing;
use crate::worker::{EncryptOptions, Summary, Worker};

/// Encrypts and decrypts files with one AES-256-GCM key.
pub struct Processor {
    worker: Worker<AesGcm>,
}

impl Processor {
    /// Builds a processor that reports to `tracing`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidKeyLength`] unless the key is exactly 32 bytes.
    pub fn new(key: &SecretBytes) -> Result<Self> {
        Self::with_observer(key, Arc::new(TracingObserver))
    }

    pub fn with_observer(key: &SecretBytes, observer: Arc<dyn Observer>) -> Result<Self> {
        let cipher = AesGcm::new(key)?;
        Ok(Self { worker: Worker::new(cipher, observer) })
    }

    /// Encrypts the text file at `input` into a container at `output`.
    #[tracing::instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
    pub async fn encrypt(&self, input: &Path, output: &Path, options: &EncryptOptions) -> Result<Summary> {
        options.validate()?;

        tracing::info!(chunk_size = options.chunk_size, workers = options.workers, policy = ?options.on_seal_failure, "starting {}", Processing::Encryption);

        let source = File::open(input).await.map_err(|e| Error::file("open", input, e))?;
        let destination = File::create(output).await.map_err(|e| Error::file("create", output, e))?;

        let summary = self.worker.encrypt(source, destination, options).await?;

        if !summary.dropped.is_empty() {
            tracing::warn!(dropped = ?summary.dropped, "container is missing chunks that failed to seal");
        }
        tracing::info!(records = summary.records, size = %ByteSize(summary.bytes), "{} complete", Processing::Encryption);

        Ok(summary)
    }

    /// Decrypts the container at `input` into a text file at `output`.
    #[tracing::instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
    pub async fn decrypt(&self, input: &Path, output: &Path) -> Result<Summary> {
        tracing::info!("starting {}", Processing::Decryption);

        let source = File::open(input).await.map_err(|e| Error::file("open", input, e))?;
        let destination = File::create(output).await.map_err(|e| Error::file("create", output, e))?;

        let summary = self.worker.decrypt(source, destination).await?;

        tracing::info!(records = summary.records, size = %ByteSize(summary.bytes), "{} complete", Processing::Decryption);

        Ok(summary)
    }
}

/// Encrypts `input_path` into `output_path` with the default seal failure policy.
pub async fn run_encrypt(input_path: &Path, output_path: &Path, key: &SecretBytes, chunk_size: usize, workers: usize) -> Result<Summary> {
    let options = EncryptOptions::new(chunk_size, workers)?;
    Processor::new(key)?.encrypt(input_path, output_path, &options).await
}

/// Decrypts the container at `input_path` into `output_path`.
pub async fn run_decrypt(input_path: &Path, output_path: &Path, key: &SecretBytes) -> Result<Summary> {
    Processor::new(key)?.decrypt(input_path, output_path).await
}
