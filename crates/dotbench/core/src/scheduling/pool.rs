// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Fixed-size worker pool behind a bounded admission queue
//!
//! Items are distributed via a single shared bounded channel and workers
//! compete for them. `submit` blocks while the queue is full, which is the
//! only admission gate. Completion is observed by joining every worker.

use crate::error::{BenchError, BenchResult};
use crossbeam_channel::{Sender, bounded};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Per-worker statistics, returned by [`WorkerPool::join`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub worker: usize,
    /// Items taken off the queue
    pub items_processed: u64,
    /// Time spent inside the handler
    pub busy: Duration,
}

pub struct WorkerPool<T: Send + 'static> {
    name: String,
    sender: Option<Sender<T>>,
    handles: Vec<JoinHandle<WorkerStats>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Spawns `workers` threads named `<name>-worker-<n>`, each running
    /// `handler(worker_index, item)` for the items it receives.
    ///
    /// # Errors
    /// `BenchError::Configuration` for a zero worker count or capacity,
    /// `BenchError::WorkerPool` if a thread cannot be spawned.
    pub fn spawn<F>(name: &str, workers: usize, capacity: usize, handler: F) -> BenchResult<Self>
    where
        F: Fn(usize, T) + Send + Sync + 'static,
    {
        if workers == 0 {
            return Err(BenchError::config("worker pool needs at least one worker"));
        }
        if capacity == 0 {
            return Err(BenchError::config("worker pool queue capacity must be positive"));
        }

        let (sender, receiver) = bounded::<T>(capacity);
        let handler = Arc::new(handler);

        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers {
            let rx = receiver.clone();
            let handler = Arc::clone(&handler);

            let handle = thread::Builder::new()
                .name(format!("{name}-worker-{worker}"))
                .spawn(move || {
                    let mut stats = WorkerStats { worker, ..WorkerStats::default() };
                    for item in rx.iter() {
                        let started = Instant::now();
                        handler(worker, item);
                        stats.busy += started.elapsed();
                        stats.items_processed += 1;
                    }
                    stats
                })
                .map_err(|e| BenchError::WorkerPool(format!("failed to spawn {name}-worker-{worker}: {e}")))?;
            handles.push(handle);
        }

        debug!(pool = name, workers, capacity, "Worker pool started");

        Ok(Self {
            name: name.to_string(),
            sender: Some(sender),
            handles,
        })
    }

    /// Enqueues an item, blocking while the queue is full.
    ///
    /// # Errors
    /// `BenchError::WorkerPool` once every worker has exited.
    pub fn submit(&self, item: T) -> BenchResult<()> {
        let sender = self.sender.as_ref().ok_or_else(|| BenchError::WorkerPool(format!("{} pool is closed", self.name)))?;
        sender.send(item).map_err(|_| BenchError::WorkerPool(format!("{} pool has no live workers", self.name)))
    }

    /// Closes the queue, lets the workers drain it, and joins them all.
    ///
    /// Stats are in worker index order.
    ///
    /// # Errors
    /// `BenchError::WorkerPool` if any worker panicked. The remaining workers
    /// are still joined first.
    pub fn join(mut self) -> BenchResult<Vec<WorkerStats>> {
        self.sender.take();

        let mut stats = Vec::with_capacity(self.handles.len());
        let mut panicked = Vec::new();
        for (worker, handle) in std::mem::take(&mut self.handles).into_iter().enumerate() {
            match handle.join() {
                Ok(s) => stats.push(s),
                Err(_) => panicked.push(worker),
            }
        }

        if !panicked.is_empty() {
            error!(pool = %self.name, ?panicked, "Worker threads panicked");
            return Err(BenchError::WorkerPool(format!("{} worker(s) {:?} panicked", self.name, panicked)));
        }

        debug!(pool = %self.name, items = stats.iter().map(|s| s.items_processed).sum::<u64>(), "Worker pool drained");
        Ok(stats)
    }
}

impl<T: Send + 'static> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        self.sender.take();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}
