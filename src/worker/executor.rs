//! Fixed-size sealing worker pool.
//!
//! Each run builds a dedicated rayon pool of exactly `workers` threads and
//! bridges the work queue into it with `par_bridge`. flume delivers every
//! chunk to exactly one receiver, so no chunk is sealed twice. Results go out
//! in completion order; ordering is restored by the collector.
//!
//! # Termination
//!
//! The bridge ends once the work queue is closed and drained, or stops early
//! once the result queue has no receiver left. `process` returns only after
//! every pool thread is idle, and the last result sender is dropped with it,
//! which closes the result queue.

use std::sync::Arc;

use flume::{Receiver, Sender};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::cipher::ChunkCipher;
use crate::error::Result;
use crate::observer::Observer;
use crate::types::{Chunk, ChunkResult};
use crate::worker::pipeline;

/// Runs the sealing workers.
pub struct Executor<C> {
    /// Shared, read-only codec.
    cipher: Arc<C>,

    workers: usize,

    observer: Arc<dyn Observer>,
}

impl<C: ChunkCipher> Executor<C> {
    #[inline]
    pub fn new(cipher: Arc<C>, workers: usize, observer: Arc<dyn Observer>) -> Self {
        Self { cipher, workers, observer }
    }

    /// Seals every chunk from `chunks`, blocking until the pool is idle.
    ///
    /// Takes the result sender by value so the queue closes when the pool is done.
    ///
    /// # Errors
    ///
    /// [`Error::WorkerPool`](crate::error::Error::WorkerPool) if the pool threads
    /// cannot be created. No chunk is taken from the queue in that case.
    pub fn process(&self, chunks: &Receiver<Chunk>, results: Sender<ChunkResult>) -> Result<()> {
        let pool = self.build_pool()?;

        pool.broadcast(|ctx| self.observer.worker_started(ctx.index()));

        // An Err here only means the collector stopped listening.
        let _ = pool.install(|| {
            chunks.iter().par_bridge().try_for_each(|chunk| {
                let worker = rayon::current_thread_index().unwrap_or_default();
                let result = pipeline::seal_chunk(self.cipher.as_ref(), &chunk);

                if let Ok(sealed) = &result.sealed {
                    self.observer.chunk_sealed(worker, sealed.id, &sealed.nonce);
                }

                results.send(result)
            })
        });

        pool.broadcast(|ctx| self.observer.worker_finished(ctx.index()));

        Ok(())
    }

    fn build_pool(&self) -> Result<ThreadPool> {
        let pool = ThreadPoolBuilder::new().num_threads(self.workers).thread_name(|i| format!("seal-worker-{i}")).build()?;
        Ok(pool)
    }
}
