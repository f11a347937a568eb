//! Global Configuration Constants
//!
//! This module contains the parameters shared by the chunk pipeline, the
//! AEAD codec and the container format. The wire-level values here are fixed:
//! changing any of them breaks compatibility with existing containers.
//!
//! ## Security Considerations
//!
//! - The key is used verbatim, so its length is the only thing checked
//! - Nonces are 96-bit random values drawn fresh for every sealed chunk
//! - No associated data is bound to a record; the chunk id is not authenticated

/// Application name used in command-line help and log output
pub const APP_NAME: &str = "linevault";

// === Pipeline Defaults ===

/// Default number of input lines grouped into one chunk
///
/// Every chunk except possibly the last holds exactly this many lines.
/// Larger chunks mean fewer records and less per-record overhead
/// (nonce + tag + 9 bytes of framing), smaller chunks mean more parallelism.
pub const DEFAULT_LINES_PER_CHUNK: usize = 1000;

/// Default number of concurrent sealing workers
pub const DEFAULT_WORKERS: usize = 4;

// === AEAD Parameters ===

/// Size of the AES-256-GCM key in bytes
///
/// The key is supplied by the caller as raw bytes; there is no derivation.
pub const KEY_SIZE: usize = 32;

/// Size of the AES-GCM nonce in bytes
///
/// 12 bytes (96 bits) is the native nonce size for AES-GCM.
pub const NONCE_SIZE: usize = 12;

/// Size of the GCM authentication tag appended to every ciphertext
pub const TAG_SIZE: usize = 16;

// === Container Format ===
// record := chunkID(int32 BE) nonceLen(uint8) nonce cipherLen(int32 BE) ciphertext

/// Width of the chunk id field
pub const ID_FIELD_SIZE: usize = 4;

/// Width of the nonce length field
pub const NONCE_LEN_FIELD_SIZE: usize = 1;

/// Width of the ciphertext length field
pub const CIPHER_LEN_FIELD_SIZE: usize = 4;

/// Separator placed between lines of one chunk before sealing
pub const LINE_SEPARATOR: &str = "\n";

/// Marker written after every recovered chunk on decryption
pub const CHUNK_SEPARATOR: &[u8] = b"\n";
