use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};

use crate::cipher::ChunkCipher;
use crate::config::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use crate::error::{Error, Result};
use crate::secret::SecretBytes;

/// AES-256-GCM with random 96-bit nonces and no associated data.
pub struct AesGcm {
    inner: Aes256Gcm,
}

impl AesGcm {
    /// Builds the codec from a raw key.
    ///
    /// The key length is checked here, once, so sealing never has to.
    pub fn new(key: &SecretBytes) -> Result<Self> {
        let invalid = || Error::InvalidKeyLength { expected: KEY_SIZE, actual: key.len() };

        if key.len() != KEY_SIZE {
            return Err(invalid());
        }

        let inner = Aes256Gcm::new_from_slice(key.expose_secret()).map_err(|_| invalid())?;
        Ok(Self { inner })
    }
}

impl ChunkCipher for AesGcm {
    fn seal(&self, plaintext: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.try_fill_bytes(&mut nonce).map_err(|e| Error::Cipher(format!("random source failed: {e}")))?;

        let ciphertext = self.inner.encrypt(Nonce::from_slice(&nonce), plaintext).map_err(|e| Error::Cipher(format!("aes-gcm encryption failed: {e}")))?;

        Ok((nonce.to_vec(), ciphertext))
    }

    fn open(&self, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        if nonce.len() != NONCE_SIZE || ciphertext.len() < TAG_SIZE {
            return Err(Error::Authentication);
        }

        self.inner.decrypt(Nonce::from_slice(nonce), ciphertext).map_err(|_| Error::Authentication)
    }
}

#[cfg(test)]
mod tests {
    use hashbrown::HashSet;

    use super::*;

    fn key() -> SecretBytes {
        SecretBytes::new(&[7u8; KEY_SIZE])
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let codec = AesGcm::new(&key()).unwrap();

        let (nonce, ciphertext) = codec.seal(b"alpha\nbeta").unwrap();

        assert_eq!(nonce.len(), NONCE_SIZE);
        assert_eq!(ciphertext.len(), b"alpha\nbeta".len() + TAG_SIZE);
        assert_eq!(codec.open(&nonce, &ciphertext).unwrap(), b"alpha\nbeta");
    }

    #[test]
    fn test_empty_plaintext_is_sealed() {
        let codec = AesGcm::new(&key()).unwrap();

        let (nonce, ciphertext) = codec.seal(b"").unwrap();

        assert_eq!(ciphertext.len(), TAG_SIZE);
        assert!(codec.open(&nonce, &ciphertext).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_wrong_key_lengths() {
        for len in [0, 16, 31, 33, 64] {
            let err = AesGcm::new(&SecretBytes::new(&vec![1u8; len])).err().unwrap();
            assert!(matches!(err, Error::InvalidKeyLength { expected: KEY_SIZE, actual } if actual == len));
        }
    }

    #[test]
    fn test_nonces_are_fresh() {
        let codec = AesGcm::new(&key()).unwrap();
        let mut seen = HashSet::new();

        for _ in 0..2_000 {
            let (nonce, _) = codec.seal(b"same plaintext").unwrap();
            assert!(seen.insert(nonce), "nonce reused");
        }
    }

    #[test]
    fn test_open_detects_tampering() {
        let codec = AesGcm::new(&key()).unwrap();
        let (nonce, ciphertext) = codec.seal(b"integrity matters").unwrap();

        for i in 0..ciphertext.len() {
            let mut tampered = ciphertext.clone();
            tampered[i] ^= 0x01;
            assert!(codec.open(&nonce, &tampered).unwrap_err().is_authentication());
        }

        for i in 0..nonce.len() {
            let mut tampered = nonce.clone();
            tampered[i] ^= 0x80;
            assert!(codec.open(&tampered, &ciphertext).unwrap_err().is_authentication());
        }
    }

    #[test]
    fn test_open_rejects_malformed_input() {
        let codec = AesGcm::new(&key()).unwrap();
        let (nonce, ciphertext) = codec.seal(b"x").unwrap();

        assert!(codec.open(&nonce[..8], &ciphertext).unwrap_err().is_authentication());
        assert!(codec.open(&nonce, &ciphertext[..TAG_SIZE - 1]).unwrap_err().is_authentication());
    }

    #[test]
    fn test_open_with_other_key_fails() {
        let sealer = AesGcm::new(&key()).unwrap();
        let opener = AesGcm::new(&SecretBytes::new(&[8u8; KEY_SIZE])).unwrap();
        let (nonce, ciphertext) = sealer.seal(b"secret").unwrap();

        assert!(opener.open(&nonce, &ciphertext).unwrap_err().is_authentication());
    }
}
