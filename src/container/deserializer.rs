//! Container deserialization.
//!
//! Records are parsed one after another until the stream ends exactly on a
//! record boundary. Ending anywhere else is a [`Error::TruncatedRecord`], not
//! a clean end of container.

use tokio::io::{AsyncRead, AsyncReadExt, BufReader};

use crate::config::{CIPHER_LEN_FIELD_SIZE, ID_FIELD_SIZE, NONCE_LEN_FIELD_SIZE};
use crate::error::{Error, Result};
use crate::observer::Observer;
use crate::types::{ChunkId, SealedChunk};

/// Reads every record of a container into memory.
pub struct Deserializer<'a> {
    observer: &'a dyn Observer,
}

impl<'a> Deserializer<'a> {
    #[inline]
    #[must_use]
    pub fn new(observer: &'a dyn Observer) -> Self {
        Self { observer }
    }

    /// Parses the whole container.
    ///
    /// # Returns
    ///
    /// Records in disk order. Ids are not checked for order or uniqueness here.
    ///
    /// # Errors
    ///
    /// - [`Error::TruncatedRecord`] if the stream ends mid-record
    /// - [`Error::MalformedRecord`] for negative ids or ciphertext lengths
    /// - [`Error::Io`] if reading fails
    pub async fn read_all<R: AsyncRead + Unpin>(&self, input: R) -> Result<Vec<SealedChunk>> {
        let mut reader = BufReader::new(input);
        let mut records = Vec::new();
        let mut offset = 0u64;

        while let Some((record, consumed)) = Self::read_record(&mut reader, offset).await? {
            self.observer.record_read(record.id);
            records.push(record);
            offset += consumed;
        }

        Ok(records)
    }

    /// Reads one record starting at `offset`, or `None` at a clean end of stream.
    async fn read_record<R: AsyncRead + Unpin>(reader: &mut R, offset: u64) -> Result<Option<(SealedChunk, u64)>> {
        let mut id_bytes = [0u8; ID_FIELD_SIZE];
        match fill(reader, &mut id_bytes).await? {
            0 => return Ok(None),
            ID_FIELD_SIZE => {}
            _ => return Err(Error::TruncatedRecord { offset, field: "chunk id" }),
        }

        let raw_id = i32::from_be_bytes(id_bytes);
        let id = ChunkId::try_from(raw_id).map_err(|_| Error::MalformedRecord { offset, reason: format!("negative chunk id {raw_id}") })?;

        let mut nonce_len = [0u8; NONCE_LEN_FIELD_SIZE];
        if fill(reader, &mut nonce_len).await? != NONCE_LEN_FIELD_SIZE {
            return Err(Error::TruncatedRecord { offset, field: "nonce length" });
        }

        let mut nonce = vec![0u8; usize::from(nonce_len[0])];
        if fill(reader, &mut nonce).await? != nonce.len() {
            return Err(Error::TruncatedRecord { offset, field: "nonce" });
        }

        let mut cipher_len_bytes = [0u8; CIPHER_LEN_FIELD_SIZE];
        if fill(reader, &mut cipher_len_bytes).await? != CIPHER_LEN_FIELD_SIZE {
            return Err(Error::TruncatedRecord { offset, field: "ciphertext length" });
        }

        let raw_len = i32::from_be_bytes(cipher_len_bytes);
        let cipher_len = u64::try_from(raw_len).map_err(|_| Error::MalformedRecord { offset, reason: format!("negative ciphertext length {raw_len}") })?;

        // Grow with the data actually present instead of trusting the length field.
        let mut ciphertext = Vec::new();
        (&mut *reader).take(cipher_len).read_to_end(&mut ciphertext).await?;
        if ciphertext.len() as u64 != cipher_len {
            return Err(Error::TruncatedRecord { offset, field: "ciphertext" });
        }

        let consumed = (ID_FIELD_SIZE + NONCE_LEN_FIELD_SIZE + nonce.len() + CIPHER_LEN_FIELD_SIZE) as u64 + cipher_len;

        Ok(Some((SealedChunk { id, nonce, ciphertext }, consumed)))
    }
}

/// Reads until `buf` is full or the stream ends; returns the bytes read.
async fn fill<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::encode_record;
    use crate::observer::NoopObserver;
    use crate::observer::testing::RecordingObserver;

    fn record(id: u32, nonce: &[u8], ciphertext: &[u8]) -> SealedChunk {
        SealedChunk { id, nonce: nonce.to_vec(), ciphertext: ciphertext.to_vec() }
    }

    fn container(records: &[SealedChunk]) -> Vec<u8> {
        records.iter().flat_map(|r| encode_record(r).unwrap()).collect()
    }

    async fn read(bytes: &[u8]) -> Result<Vec<SealedChunk>> {
        Deserializer::new(&NoopObserver).read_all(bytes).await
    }

    #[tokio::test]
    async fn test_empty_container() {
        assert!(read(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reads_records_in_disk_order() {
        let records = vec![record(2, &[9; 12], b"two"), record(0, &[8; 12], b"zero"), record(1, &[7; 12], b"")];

        let parsed = read(&container(&records)).await.unwrap();

        assert_eq!(parsed, records);
    }

    #[tokio::test]
    async fn test_reads_variable_nonce_lengths() {
        let records = vec![record(0, &[], b"a"), record(1, &[1; 255], b"b")];

        assert_eq!(read(&container(&records)).await.unwrap(), records);
    }

    #[tokio::test]
    async fn test_truncation_at_every_position() {
        let bytes = container(&[record(0, &[1; 12], b"ciphertext"), record(1, &[2; 12], b"more")]);
        let first_len = encode_record(&record(0, &[1; 12], b"ciphertext")).unwrap().len();

        for cut in 1..bytes.len() {
            let result = read(&bytes[..cut]).await;
            if cut == first_len {
                assert_eq!(result.unwrap().len(), 1);
            } else {
                assert!(matches!(result, Err(Error::TruncatedRecord { .. })), "cut at {cut} was not reported as truncated");
            }
        }
    }

    #[tokio::test]
    async fn test_truncation_reports_field_and_offset() {
        let mut bytes = container(&[record(0, &[1; 12], b"abc")]);
        let second = encode_record(&record(1, &[2; 12], b"defgh")).unwrap();
        let offset = bytes.len() as u64;
        bytes.extend_from_slice(&second[..second.len() - 2]);

        let err = read(&bytes).await.unwrap_err();

        assert!(matches!(err, Error::TruncatedRecord { offset: o, field: "ciphertext" } if o == offset));
    }

    #[tokio::test]
    async fn test_huge_length_field_is_truncation_not_allocation() {
        let mut bytes = vec![0, 0, 0, 0, 0];
        bytes.extend_from_slice(&i32::MAX.to_be_bytes());
        bytes.extend_from_slice(b"short");

        assert!(matches!(read(&bytes).await.unwrap_err(), Error::TruncatedRecord { field: "ciphertext", .. }));
    }

    #[tokio::test]
    async fn test_negative_fields_are_malformed() {
        let mut negative_id = (-1i32).to_be_bytes().to_vec();
        negative_id.extend_from_slice(&[0, 0, 0, 0, 0]);
        assert!(matches!(read(&negative_id).await.unwrap_err(), Error::MalformedRecord { offset: 0, .. }));

        let mut negative_len = vec![0, 0, 0, 1, 0];
        negative_len.extend_from_slice(&(-5i32).to_be_bytes());
        assert!(matches!(read(&negative_len).await.unwrap_err(), Error::MalformedRecord { offset: 0, .. }));
    }

    #[tokio::test]
    async fn test_reports_each_record_read() {
        let observer = RecordingObserver::default();
        let bytes = container(&[record(4, &[0; 12], b"x"), record(3, &[0; 12], b"y")]);

        Deserializer::new(&observer).read_all(&bytes[..]).await.unwrap();

        assert_eq!(observer.snapshot(), ["read 4", "read 3"]);
    }
}
