use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;

use crate::config::{APP_NAME, DEFAULT_LINES_PER_CHUNK, DEFAULT_WORKERS};
use crate::processor::Processor;
use crate::secret::SecretBytes;
use crate::types::Processing;
use crate::worker::{EncryptOptions, SealFailurePolicy};

#[derive(Subcommand)]
pub enum Commands {
    /// Encrypt a text file into a chunk container.
    Encrypt {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long)]
        out: PathBuf,

        /// 32-byte key, used verbatim.
        #[arg(short, long)]
        key: String,

        /// Lines per chunk.
        #[arg(short, long = "chunk-size", visible_alias = "chunkSize", default_value_t = DEFAULT_LINES_PER_CHUNK)]
        chunk_size: usize,

        /// Number of concurrent sealing workers.
        #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
        workers: usize,

        /// Leave chunks that fail to seal out of the container instead of aborting.
        #[arg(long)]
        drop_failed_chunks: bool,
    },

    /// Decrypt a chunk container back into a text file.
    Decrypt {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long)]
        out: PathBuf,

        /// 32-byte key, used verbatim.
        #[arg(short, long)]
        key: String,
    },
}

#[derive(Parser)]
#[command(name = APP_NAME, version, about = "Encrypt text files in line chunks with AES-256-GCM, sealing chunks concurrently.")]
pub struct App {
    #[command(subcommand)]
    command: Commands,

    /// Log every chunk as it moves through the pipeline.
    #[arg(short, long, global = true)]
    verbose: bool,
}

impl App {
    pub fn init() -> Result<Self> {
        let app = Self::parse();

        let level = if app.verbose { Level::DEBUG } else { Level::INFO };
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .with_file(true)
            .with_line_number(true)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;

        Ok(app)
    }

    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Encrypt { file, out, key, chunk_size, workers, drop_failed_chunks } => {
                let policy = if drop_failed_chunks { SealFailurePolicy::Drop } else { SealFailurePolicy::Abort };
                let options = EncryptOptions::new(chunk_size, workers).context("invalid encryption options")?.with_seal_failure_policy(policy);
                let processor = Processor::new(&SecretBytes::from_string(key)).context("invalid key")?;

                processor.encrypt(&file, &out, &options).await.with_context(|| format!("{} failed: {}", Processing::Encryption, file.display()))?;
            }
            Commands::Decrypt { file, out, key } => {
                let processor = Processor::new(&SecretBytes::from_string(key)).context("invalid key")?;

                processor.decrypt(&file, &out).await.with_context(|| format!("{} failed: {}", Processing::Decryption, file.display()))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        App::command().debug_assert();
    }

    #[test]
    fn test_encrypt_defaults() {
        let app = App::try_parse_from(["linevault", "encrypt", "--file", "in.txt", "--out", "out.enc", "--key", "k"]).unwrap();

        match app.command {
            Commands::Encrypt { chunk_size, workers, drop_failed_chunks, .. } => {
                assert_eq!(chunk_size, DEFAULT_LINES_PER_CHUNK);
                assert_eq!(workers, DEFAULT_WORKERS);
                assert!(!drop_failed_chunks);
            }
            Commands::Decrypt { .. } => panic!("parsed the wrong subcommand"),
        }
    }

    #[test]
    fn test_original_flag_spelling() {
        let app = App::try_parse_from(["linevault", "encrypt", "-f", "in.txt", "-o", "out.enc", "-k", "k", "--chunkSize", "25", "--workers", "8", "-v"]).unwrap();

        assert!(app.verbose);
        assert!(matches!(app.command, Commands::Encrypt { chunk_size: 25, workers: 8, .. }));
    }

    #[tokio::test]
    async fn test_bad_key_error_has_context() {
        for command in ["encrypt", "decrypt"] {
            let app = App::try_parse_from(["linevault", command, "--file", "missing.txt", "--out", "never.out", "--key", "short"]).unwrap();

            let message = format!("{:#}", app.execute().await.unwrap_err());

            assert!(message.starts_with("invalid key: invalid key length"), "{command}: {message}");
        }
    }

    #[test]
    fn test_missing_key_rejected() {
        assert!(App::try_parse_from(["linevault", "decrypt", "--file", "a", "--out", "b"]).is_err());
    }
}
