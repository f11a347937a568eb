use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use crate::container::RECORD_OVERHEAD;
use crate::error::{Error, Result};
use crate::observer::Observer;
use crate::types::SealedChunk;

/// Encodes one record in wire layout.
///
/// # Errors
///
/// Returns [`Error::FieldOverflow`] if the id or ciphertext length exceeds
/// `i32::MAX`, or the nonce is longer than 255 bytes.
pub fn encode_record(record: &SealedChunk) -> Result<Vec<u8>> {
    let id = i32::try_from(record.id).map_err(|_| Error::FieldOverflow { field: "chunk id", value: record.id as usize })?;
    let nonce_len = u8::try_from(record.nonce.len()).map_err(|_| Error::FieldOverflow { field: "nonce length", value: record.nonce.len() })?;
    let cipher_len = i32::try_from(record.ciphertext.len()).map_err(|_| Error::FieldOverflow { field: "ciphertext length", value: record.ciphertext.len() })?;

    let mut encoded = Vec::with_capacity(RECORD_OVERHEAD + record.nonce.len() + record.ciphertext.len());
    encoded.extend_from_slice(&id.to_be_bytes());
    encoded.push(nonce_len);
    encoded.extend_from_slice(&record.nonce);
    encoded.extend_from_slice(&cipher_len.to_be_bytes());
    encoded.extend_from_slice(&record.ciphertext);

    Ok(encoded)
}

/// Writes sealed chunks as a container.
pub struct Serializer<'a> {
    observer: &'a dyn Observer,
}

impl<'a> Serializer<'a> {
    #[inline]
    #[must_use]
    pub fn new(observer: &'a dyn Observer) -> Self {
        Self { observer }
    }

    /// Serializes `records` in the order given and flushes the output.
    ///
    /// The caller guarantees ascending ids. A failure part-way leaves the
    /// records written so far in the output.
    ///
    /// # Returns
    ///
    /// The number of bytes written.
    pub async fn write_all<W: AsyncWrite + Unpin>(&self, output: W, records: &[SealedChunk]) -> Result<u64> {
        let mut writer = BufWriter::new(output);
        let mut written = 0u64;

        for record in records {
            let encoded = encode_record(record)?;
            writer.write_all(&encoded).await?;
            written += encoded.len() as u64;
            self.observer.record_written(record.id);
        }

        writer.flush().await?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use crate::observer::testing::RecordingObserver;

    fn record(id: u32, nonce: &[u8], ciphertext: &[u8]) -> SealedChunk {
        SealedChunk { id, nonce: nonce.to_vec(), ciphertext: ciphertext.to_vec() }
    }

    #[test]
    fn test_encode_record_layout() {
        let encoded = encode_record(&record(0x0102_0304, &[0xAA, 0xBB], b"xyz")).unwrap();

        assert_eq!(encoded, [0x01, 0x02, 0x03, 0x04, 0x02, 0xAA, 0xBB, 0x00, 0x00, 0x00, 0x03, b'x', b'y', b'z']);
    }

    #[test]
    fn test_encode_record_empty_fields() {
        let encoded = encode_record(&record(5, &[], &[])).unwrap();

        assert_eq!(encoded, [0, 0, 0, 5, 0, 0, 0, 0, 0]);
        assert_eq!(encoded.len(), RECORD_OVERHEAD);
    }

    #[test]
    fn test_encode_record_overflow() {
        let err = encode_record(&record(u32::MAX, &[0; 12], b"c")).unwrap_err();
        assert!(matches!(err, Error::FieldOverflow { field: "chunk id", .. }));

        let err = encode_record(&record(1, &[0; 256], b"c")).unwrap_err();
        assert!(matches!(err, Error::FieldOverflow { field: "nonce length", value: 256 }));
    }

    #[tokio::test]
    async fn test_write_all_concatenates_records() {
        let records = vec![record(0, &[1; 12], b"first"), record(1, &[2; 12], b"second")];
        let mut output = Vec::new();

        let written = Serializer::new(&NoopObserver).write_all(&mut output, &records).await.unwrap();

        let mut expected = encode_record(&records[0]).unwrap();
        expected.extend(encode_record(&records[1]).unwrap());
        assert_eq!(output, expected);
        assert_eq!(written, expected.len() as u64);
    }

    #[tokio::test]
    async fn test_write_all_reports_each_record() {
        let observer = RecordingObserver::default();
        let records = vec![record(0, &[0; 12], b"a"), record(1, &[0; 12], b"b"), record(2, &[0; 12], b"c")];

        Serializer::new(&observer).write_all(Vec::new(), &records).await.unwrap();

        assert_eq!(observer.snapshot(), ["written 0", "written 1", "written 2"]);
    }

    #[tokio::test]
    async fn test_write_nothing() {
        let mut output = Vec::new();
        let written = Serializer::new(&NoopObserver).write_all(&mut output, &[]).await.unwrap();

        assert_eq!(written, 0);
        assert!(output.is_empty());
    }
}
