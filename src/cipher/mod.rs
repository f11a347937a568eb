//! # AEAD Codec
//!
//! Authenticated encryption for individual chunks. Every seal draws a fresh
//! random nonce and returns it next to the ciphertext; nothing is prepended,
//! because the container stores the nonce in its own length-prefixed field.
//!
//! ## Wire compatibility
//!
//! - AES-256-GCM, 12-byte nonce, 16-byte tag appended to the ciphertext
//! - Empty associated data: the chunk id is *not* authenticated, so a record's
//!   position is only as trustworthy as the container it came from

mod aes;

pub use aes::AesGcm;

use crate::error::Result;

/// Per-chunk authenticated encryption.
///
/// Implementations are shared read-only by every worker, so they must be
/// `Send + Sync` and must not need `&mut self`.
pub trait ChunkCipher: Send + Sync {
    /// Encrypts `plaintext` under a freshly generated nonce.
    ///
    /// # Returns
    /// `(nonce, ciphertext)`, where the ciphertext carries the authentication tag.
    ///
    /// # Errors
    /// [`Error::Cipher`](crate::error::Error::Cipher) if the random source or the cipher fails.
    fn seal(&self, plaintext: &[u8]) -> Result<(Vec<u8>, Vec<u8>)>;

    /// Verifies and decrypts one record.
    ///
    /// # Errors
    /// [`Error::Authentication`](crate::error::Error::Authentication) if the tag does not
    /// verify or the nonce has the wrong length.
    fn open(&self, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>>;
}
