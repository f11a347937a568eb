use hashbrown::HashMap;

use crate::error::{Error, Result};
use crate::types::{ChunkId, SealedChunk};

/// Collects sealed chunks that arrive in any order.
///
/// Owned by a single task, so concurrent producers never touch the map.
#[derive(Default)]
pub struct Buffer {
    records: HashMap<ChunkId, SealedChunk>,

    dropped: Vec<ChunkId>,
}

impl Buffer {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { records: HashMap::with_capacity(capacity), dropped: Vec::new() }
    }

    /// Stores a record; a second record with the same id is an error.
    pub fn insert(&mut self, record: SealedChunk) -> Result<()> {
        if self.records.contains_key(&record.id) {
            return Err(Error::DuplicateChunk(record.id));
        }

        self.records.insert(record.id, record);
        Ok(())
    }

    /// Remembers an id that will be missing from the output.
    #[inline]
    pub fn mark_dropped(&mut self, id: ChunkId) {
        self.dropped.push(id);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ids of dropped chunks, ascending.
    #[must_use]
    pub fn dropped(&self) -> Vec<ChunkId> {
        let mut dropped = self.dropped.clone();
        dropped.sort_unstable();
        dropped
    }

    /// Drains the buffer into ascending id order.
    #[must_use]
    pub fn into_sorted(self) -> Vec<SealedChunk> {
        let mut records: Vec<SealedChunk> = self.records.into_values().collect();
        records.sort_unstable_by_key(|r| r.id);
        records
    }
}
