use crate::cipher::ChunkCipher;
use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkResult, SealedChunk};

/// Seals one chunk; a failure becomes an [`Error::Seal`] tagged with the chunk id.
pub fn seal_chunk<C: ChunkCipher + ?Sized>(cipher: &C, chunk: &Chunk) -> ChunkResult {
    match cipher.seal(&chunk.plaintext()) {
        Ok((nonce, ciphertext)) => ChunkResult::ok(SealedChunk { id: chunk.id, nonce, ciphertext }),
        Err(e) => ChunkResult::err(chunk.id, Error::Seal { id: chunk.id, reason: e.to_string() }),
    }
}

/// Opens one record independently of every other record in the container.
pub fn open_record<C: ChunkCipher + ?Sized>(cipher: &C, record: &SealedChunk) -> Result<Vec<u8>> {
    cipher.open(&record.nonce, &record.ciphertext)
}
