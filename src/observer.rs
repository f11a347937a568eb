//! Pipeline observation hooks.
//!
//! The pipeline reports progress through an [`Observer`] instead of logging
//! directly, so callers (and tests) decide where diagnostics go. Observers
//! only see ids and counts; they cannot change what gets sealed or written.

use crate::error::Error;
use crate::types::ChunkId;

/// Receives diagnostic events from the chunk pipeline.
///
/// Every hook defaults to a no-op. Implementations are shared across worker
/// threads and must be cheap.
pub trait Observer: Send + Sync {
    /// The chunker closed a chunk (full, or at end of input).
    fn chunk_closed(&self, _id: ChunkId, _lines: usize) {}

    fn worker_started(&self, _worker: usize) {}

    fn worker_finished(&self, _worker: usize) {}

    fn chunk_sealed(&self, _worker: usize, _id: ChunkId, _nonce: &[u8]) {}

    /// A chunk failed to seal and was left out of the container.
    fn chunk_dropped(&self, _id: ChunkId, _error: &Error) {}

    fn record_written(&self, _id: ChunkId) {}

    fn record_read(&self, _id: ChunkId) {}

    fn chunk_opened(&self, _id: ChunkId, _bytes: usize) {}
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Forwards events to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn chunk_closed(&self, id: ChunkId, lines: usize) {
        tracing::debug!(chunk = id, lines, "dispatching chunk");
    }

    fn worker_started(&self, worker: usize) {
        tracing::debug!(worker, "worker started");
    }

    fn worker_finished(&self, worker: usize) {
        tracing::debug!(worker, "worker finished");
    }

    fn chunk_sealed(&self, worker: usize, id: ChunkId, nonce: &[u8]) {
        tracing::debug!(worker, chunk = id, nonce = %hex::encode(nonce), "sealed chunk");
    }

    fn chunk_dropped(&self, id: ChunkId, error: &Error) {
        tracing::warn!(chunk = id, %error, "dropping chunk from container");
    }

    fn record_written(&self, id: ChunkId) {
        tracing::trace!(chunk = id, "wrote record");
    }

    fn record_read(&self, id: ChunkId) {
        tracing::trace!(chunk = id, "read record");
    }

    fn chunk_opened(&self, id: ChunkId, bytes: usize) {
        tracing::debug!(chunk = id, bytes, "opened chunk");
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records every event as a line of text, in arrival order.
    #[derive(Default)]
    pub struct RecordingObserver {
        pub events: Mutex<Vec<String>>,
    }

    impl RecordingObserver {
        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }

        pub fn snapshot(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        pub fn count(&self, prefix: &str) -> usize {
            self.snapshot().iter().filter(|e| e.starts_with(prefix)).count()
        }
    }

    impl Observer for RecordingObserver {
        fn chunk_closed(&self, id: ChunkId, lines: usize) {
            self.push(format!("closed {id} {lines}"));
        }

        fn worker_started(&self, worker: usize) {
            self.push(format!("started {worker}"));
        }

        fn worker_finished(&self, worker: usize) {
            self.push(format!("finished {worker}"));
        }

        fn chunk_sealed(&self, _worker: usize, id: ChunkId, _nonce: &[u8]) {
            self.push(format!("sealed {id}"));
        }

        fn chunk_dropped(&self, id: ChunkId, _error: &Error) {
            self.push(format!("dropped {id}"));
        }

        fn record_written(&self, id: ChunkId) {
            self.push(format!("written {id}"));
        }

        fn record_read(&self, id: ChunkId) {
            self.push(format!("read {id}"));
        }

        fn chunk_opened(&self, id: ChunkId, _bytes: usize) {
            self.push(format!("opened {id}"));
        }
    }
}
