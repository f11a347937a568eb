use secrecy::{ExposeSecret, SecretBox};

/// Raw key material, zeroized on drop and redacted from `Debug` output.
///
/// The length is not checked here; the codec validates it once at construction.
pub struct SecretBytes {
    inner: SecretBox<Vec<u8>>,
}

impl SecretBytes {
    pub fn new(data: &[u8]) -> Self {
        Self { inner: SecretBox::new(Box::new(data.to_vec())) }
    }

    /// Takes the UTF-8 bytes of a key given on the command line, verbatim.
    pub fn from_string(key: String) -> Self {
        Self { inner: SecretBox::new(Box::new(key.into_bytes())) }
    }

    #[inline]
    pub fn expose_secret(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.expose_secret().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretBytes([... {} bytes ...])", self.len())
    }
}
