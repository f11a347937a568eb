//! linevault - Concurrent line-chunked file encryption.
//!
//! Splits a text file into fixed-size groups of lines, seals every group
//! independently with AES-256-GCM on a pool of worker threads, and stores
//! the results in a length-prefixed binary container in ascending chunk
//! order. Decryption reverses the process sequentially.
//!
//! - [`worker`]: chunker, worker pool and pipeline orchestration
//! - [`cipher`]: the per-chunk AEAD codec
//! - [`container`]: the on-disk record format
//! - [`processor`]: file-level `run_encrypt` / `run_decrypt`

pub mod app;
pub mod cipher;
pub mod config;
pub mod container;
pub mod error;
pub mod observer;
pub mod processor;
pub mod secret;
pub mod types;
pub mod worker;

pub use error::{Error, Result};
pub use processor::{Processor, run_decrypt, run_encrypt};
