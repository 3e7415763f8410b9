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

//! Periodic progress sampling
//!
//! The monitor thread reads the shared completion counter on every tick and
//! never writes it, so it cannot hold up the run it observes.

use crate::error::{BenchError, BenchResult};
use crossbeam_channel::{Sender, bounded, select, tick};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::info;

/// Callback invoked with every sample, in addition to the `tracing` event
pub type ProgressSink = Arc<dyn Fn(&ProgressSample) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSample {
    pub processed: usize,
    pub total: usize,
    /// Time since the monitor started
    pub elapsed: Duration,
}

impl ProgressSample {
    pub fn percent(&self) -> f64 {
        if self.total == 0 { 100.0 } else { self.processed as f64 * 100.0 / self.total as f64 }
    }
}

impl fmt::Display for ProgressSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} files ({:.1}%)", self.processed, self.total, self.percent())
    }
}

/// Every sample taken during one monitored run, ending with the final one
#[derive(Debug, Clone, Default)]
pub struct ProgressReport {
    pub samples: Vec<ProgressSample>,
}

impl ProgressReport {
    pub fn final_sample(&self) -> Option<&ProgressSample> {
        self.samples.last()
    }

    pub fn is_monotonic(&self) -> bool {
        self.samples.windows(2).all(|pair| pair[0].processed <= pair[1].processed)
    }
}

/// Samples a processed-counter at a fixed interval until stopped
pub struct ProgressMonitor {
    counter: Arc<AtomicUsize>,
    total: usize,
    started: Instant,
    sink: Option<ProgressSink>,
    done: Option<Sender<()>>,
    handle: Option<JoinHandle<Vec<ProgressSample>>>,
}

impl ProgressMonitor {
    /// Starts the sampling thread.
    ///
    /// # Errors
    /// `BenchError::Configuration` for a zero interval, `BenchError::Monitor`
    /// if the thread cannot be spawned.
    pub fn start(counter: Arc<AtomicUsize>, total: usize, interval: Duration, sink: Option<ProgressSink>) -> BenchResult<Self> {
        if interval.is_zero() {
            return Err(BenchError::config("monitor_interval must be non-zero"));
        }

        let started = Instant::now();
        let (done_tx, done_rx) = bounded::<()>(1);
        let ticker = tick(interval);

        let thread_counter = Arc::clone(&counter);
        let thread_sink = sink.clone();
        let handle = thread::Builder::new()
            .name("dotbench-monitor".to_string())
            .spawn(move || {
                let mut samples = Vec::new();
                loop {
                    select! {
                        recv(ticker) -> _ => {
                            let sample = take_sample(&thread_counter, total, started);
                            emit(&sample, thread_sink.as_ref());
                            samples.push(sample);
                        }
                        recv(done_rx) -> _ => break,
                    }
                }
                samples
            })
            .map_err(|e| BenchError::Monitor(format!("failed to spawn monitor thread: {e}")))?;

        Ok(Self {
            counter,
            total,
            started,
            sink,
            done: Some(done_tx),
            handle: Some(handle),
        })
    }

    /// Signals the thread, joins it, and appends one final sample.
    pub fn stop(mut self) -> BenchResult<ProgressReport> {
        let samples = self.shutdown()?;
        Ok(ProgressReport { samples })
    }

    fn shutdown(&mut self) -> BenchResult<Vec<ProgressSample>> {
        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
        let Some(handle) = self.handle.take() else {
            return Ok(Vec::new());
        };

        let mut samples = handle.join().map_err(|_| BenchError::Monitor("monitor thread panicked".to_string()))?;
        let last = take_sample(&self.counter, self.total, self.started);
        emit(&last, self.sink.as_ref());
        samples.push(last);
        Ok(samples)
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

fn take_sample(counter: &AtomicUsize, total: usize, started: Instant) -> ProgressSample {
    ProgressSample {
        processed: counter.load(Ordering::Acquire),
        total,
        elapsed: started.elapsed(),
    }
}

fn emit(sample: &ProgressSample, sink: Option<&ProgressSink>) {
    info!(processed = sample.processed, total = sample.total, elapsed = ?sample.elapsed, "Progress: {sample}");
    if let Some(sink) = sink {
        sink(sample);
    }
}
