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

//! Execution strategies for the analysis phase
//!
//! All strategies share one [`Project`] and fold per-file reports into the
//! same atomic tally, so their aggregate results are directly comparable.

pub mod cancellation;
pub mod pool;

pub use cancellation::CancellationToken;
pub use pool::{WorkerPool, WorkerStats};

use crate::analysis::{AnalysisContext, FileAnalyzer, FileReport, SyntheticAnalyzer};
use crate::config::WorkloadConfig;
use crate::error::{AnalysisError, BenchError, BenchResult};
use crate::monitor::{ProgressMonitor, ProgressSink};
use crate::project::Project;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const POOL_NAME: &str = "dotbench";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulingStrategy {
    /// Files in project order on the calling thread
    Serial,
    /// Worker pool sized to the hardware parallelism
    BoundedParallel,
    /// Worker pool at a multiple of the hardware parallelism
    HighConcurrency,
}

impl SchedulingStrategy {
    pub const ALL: [SchedulingStrategy; 3] = [SchedulingStrategy::Serial, SchedulingStrategy::BoundedParallel, SchedulingStrategy::HighConcurrency];

    pub fn label(self) -> &'static str {
        match self {
            SchedulingStrategy::Serial => "Serial",
            SchedulingStrategy::BoundedParallel => "Bounded-Parallel",
            SchedulingStrategy::HighConcurrency => "High-Concurrency",
        }
    }
}

impl fmt::Display for SchedulingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregate outcome of one strategy run
#[derive(Debug, Clone)]
pub struct RunMetrics {
    pub strategy: SchedulingStrategy,
    pub workers: usize,
    /// Files analyzed successfully
    pub files_processed: usize,
    pub files_failed: usize,
    pub total_nodes_visited: u64,
    pub symbols_resolved: u64,
    pub symbols_missed: u64,
    pub type_probes: u64,
    pub dependencies_resolved: u64,
    pub elapsed: Duration,
    pub failures: Vec<AnalysisError>,
    /// The run stopped early on its cancellation token
    pub cancelled: bool,
}

impl RunMetrics {
    pub fn files_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 { self.files_processed as f64 / secs } else { 0.0 }
    }

    /// How many times faster this run was than `baseline`
    pub fn speedup_over(&self, baseline: &RunMetrics) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 { baseline.elapsed.as_secs_f64() / secs } else { 0.0 }
    }
}

/// Shared counters updated by every worker
#[derive(Default)]
struct Tally {
    /// Completions including failures; this is what the monitor observes
    completed: Arc<AtomicUsize>,
    processed: AtomicUsize,
    nodes_visited: AtomicU64,
    symbols_resolved: AtomicU64,
    symbols_missed: AtomicU64,
    type_probes: AtomicU64,
    dependencies_resolved: AtomicU64,
    failures: Mutex<Vec<AnalysisError>>,
}

impl Tally {
    fn record(&self, outcome: Result<FileReport, AnalysisError>) {
        match outcome {
            Ok(report) => {
                self.nodes_visited.fetch_add(report.nodes_visited, Ordering::Relaxed);
                self.symbols_resolved.fetch_add(report.symbols_resolved, Ordering::Relaxed);
                self.symbols_missed.fetch_add(report.symbols_missed, Ordering::Relaxed);
                self.type_probes.fetch_add(report.type_probes, Ordering::Relaxed);
                self.dependencies_resolved.fetch_add(report.dependencies_resolved, Ordering::Relaxed);
                self.processed.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                debug!(error = %err, "File analysis failed");
                self.failures.lock().push(err);
            }
        }
        self.completed.fetch_add(1, Ordering::Release);
    }

    fn into_metrics(self, strategy: SchedulingStrategy, workers: usize, elapsed: Duration, cancelled: bool) -> RunMetrics {
        let failures = self.failures.into_inner();
        RunMetrics {
            strategy,
            workers,
            files_processed: self.processed.into_inner(),
            files_failed: failures.len(),
            total_nodes_visited: self.nodes_visited.into_inner(),
            symbols_resolved: self.symbols_resolved.into_inner(),
            symbols_missed: self.symbols_missed.into_inner(),
            type_probes: self.type_probes.into_inner(),
            dependencies_resolved: self.dependencies_resolved.into_inner(),
            elapsed,
            failures,
            cancelled,
        }
    }
}

#[derive(Clone)]
struct MonitorSettings {
    interval: Duration,
    sink: Option<ProgressSink>,
}

/// Runs a [`FileAnalyzer`] over every file of a sealed project
pub struct Scheduler<A: FileAnalyzer = SyntheticAnalyzer> {
    analyzer: Arc<A>,
    parallelism: usize,
    high_concurrency_factor: usize,
    cancellation: Option<CancellationToken>,
    monitor: Option<MonitorSettings>,
}

impl Scheduler<SyntheticAnalyzer> {
    pub fn new() -> Self {
        Self::with_analyzer(SyntheticAnalyzer::default())
    }

    /// Scheduler with the configured parallelism and progress interval
    pub fn from_config(config: &WorkloadConfig) -> Self {
        Self::new()
            .with_parallelism(config.parallelism)
            .with_high_concurrency_factor(config.high_concurrency_factor)
            .with_monitor(config.monitor_interval, None)
    }
}

impl Default for Scheduler<SyntheticAnalyzer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: FileAnalyzer + 'static> Scheduler<A> {
    pub fn with_analyzer(analyzer: A) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            parallelism: num_cpus::get(),
            high_concurrency_factor: 4,
            cancellation: None,
            monitor: None,
        }
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_high_concurrency_factor(mut self, factor: usize) -> Self {
        self.high_concurrency_factor = factor;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Samples progress every `interval` during each run
    pub fn with_monitor(mut self, interval: Duration, sink: Option<ProgressSink>) -> Self {
        self.monitor = Some(MonitorSettings { interval, sink });
        self
    }

    pub fn without_monitor(mut self) -> Self {
        self.monitor = None;
        self
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Worker count (and admission bound) used for `strategy`
    pub fn workers_for(&self, strategy: SchedulingStrategy) -> usize {
        let parallelism = self.parallelism.max(1);
        match strategy {
            SchedulingStrategy::Serial => 1,
            SchedulingStrategy::BoundedParallel => parallelism,
            SchedulingStrategy::HighConcurrency => parallelism.saturating_mul(self.high_concurrency_factor.max(1)),
        }
    }

    /// Analyzes every file of `project` under `strategy`.
    ///
    /// Per-file failures are collected into the metrics, not returned.
    ///
    /// # Errors
    /// - `BenchError::RegistryNotSealed` if the build phase has not finished
    /// - `BenchError::WorkerPool` / `BenchError::Monitor` on thread failures
    pub fn run(&self, project: &Arc<Project>, strategy: SchedulingStrategy) -> BenchResult<RunMetrics> {
        if !project.is_sealed() {
            return Err(BenchError::RegistryNotSealed);
        }

        let workers = self.workers_for(strategy);
        let total = project.file_count();
        let tally = Arc::new(Tally::default());

        let monitor = match &self.monitor {
            Some(settings) => Some(ProgressMonitor::start(Arc::clone(&tally.completed), total, settings.interval, settings.sink.clone())?),
            None => None,
        };

        info!(%strategy, workers, files = total, "Starting analysis run");
        let started = Instant::now();

        match strategy {
            SchedulingStrategy::Serial => self.run_serial(project, &tally),
            SchedulingStrategy::BoundedParallel | SchedulingStrategy::HighConcurrency => self.run_pooled(project, &tally, workers)?,
        }

        let elapsed = started.elapsed();
        if let Some(monitor) = monitor {
            let report = monitor.stop()?;
            debug!(samples = report.samples.len(), "Progress monitor stopped");
        }

        let completed = tally.completed.load(Ordering::Acquire);
        let cancelled = completed < total && self.is_cancelled();
        let tally = Arc::try_unwrap(tally).map_err(|_| BenchError::WorkerPool("run state still shared after join".to_string()))?;
        let metrics = tally.into_metrics(strategy, workers, elapsed, cancelled);

        if metrics.files_failed > 0 {
            warn!(%strategy, failed = metrics.files_failed, "Some files failed analysis");
        }
        if cancelled {
            warn!(%strategy, completed, total, reason = ?self.cancellation.as_ref().and_then(CancellationToken::cancellation_reason), "Analysis run cancelled");
        }
        info!(
            %strategy,
            processed = metrics.files_processed,
            nodes = metrics.total_nodes_visited,
            elapsed = ?metrics.elapsed,
            "Analysis run complete"
        );
        Ok(metrics)
    }

    /// Runs Serial, Bounded-Parallel and High-Concurrency in that order
    pub fn run_all(&self, project: &Arc<Project>) -> BenchResult<Vec<RunMetrics>> {
        SchedulingStrategy::ALL.iter().map(|&strategy| self.run(project, strategy)).collect()
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    fn run_serial(&self, project: &Project, tally: &Tally) {
        for file in project.files() {
            if self.is_cancelled() {
                break;
            }
            let ctx = AnalysisContext::for_file(project, file);
            tally.record(self.analyzer.analyze(file, &ctx));
        }
    }

    fn run_pooled(&self, project: &Arc<Project>, tally: &Arc<Tally>, workers: usize) -> BenchResult<()> {
        let handler = {
            let project = Arc::clone(project);
            let tally = Arc::clone(tally);
            let analyzer = Arc::clone(&self.analyzer);
            let cancellation = self.cancellation.clone();
            move |_worker: usize, index: usize| {
                if cancellation.as_ref().is_some_and(CancellationToken::is_cancelled) {
                    return;
                }
                let file = &project.files()[index];
                let ctx = AnalysisContext::for_file(&project, file);
                tally.record(analyzer.analyze(file, &ctx));
            }
        };

        let pool = WorkerPool::spawn(POOL_NAME, workers, workers, handler)?;
        for index in 0..project.file_count() {
            if self.is_cancelled() {
                break;
            }
            pool.submit(index)?;
        }

        let stats = pool.join()?;
        for s in &stats {
            debug!(worker = s.worker, items = s.items_processed, busy = ?s.busy, "Worker finished");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::WorkProfile;
    use crate::project::{ProjectBuilder, TypeTable};
    use crate::symbols::SymbolRegistry;
    use std::collections::HashMap;

    fn project(files: usize) -> Arc<Project> {
        let config = WorkloadConfig::with_files(files).with_ast_shape(3, 3).with_symbols_per_file(10).with_seed(3);
        Arc::new(ProjectBuilder::new(config).build().unwrap())
    }

    fn scheduler() -> Scheduler {
        Scheduler::with_analyzer(SyntheticAnalyzer::new(WorkProfile::light())).with_parallelism(2)
    }

    #[test]
    fn test_strategies_agree() {
        let project = project(12);
        let runs = scheduler().run_all(&project).unwrap();

        assert_eq!(runs.len(), 3);
        for run in &runs {
            assert_eq!(run.files_processed, 12);
            assert_eq!(run.total_nodes_visited, 12 * 40);
            assert_eq!(run.symbols_resolved, 120);
            assert!(!run.cancelled);
        }
        assert_eq!(runs[0].strategy, SchedulingStrategy::Serial);
        assert_eq!(runs[0].workers, 1);
        assert_eq!(runs[1].workers, 2);
        assert_eq!(runs[2].workers, 8);
    }

    #[test]
    fn test_unsealed_project_rejected() {
        let project = Arc::new(Project::new(Vec::new(), SymbolRegistry::flat(), TypeTable::new(), HashMap::new(), 0));
        let err = scheduler().run(&project, SchedulingStrategy::Serial).unwrap_err();
        assert_eq!(err, BenchError::RegistryNotSealed);
    }

    #[test]
    fn test_workers_for_uses_factor() {
        let scheduler = scheduler().with_high_concurrency_factor(3);
        assert_eq!(scheduler.workers_for(SchedulingStrategy::Serial), 1);
        assert_eq!(scheduler.workers_for(SchedulingStrategy::BoundedParallel), 2);
        assert_eq!(scheduler.workers_for(SchedulingStrategy::HighConcurrency), 6);
    }

    #[test]
    fn test_speedup() {
        let base = RunMetrics {
            strategy: SchedulingStrategy::Serial,
            workers: 1,
            files_processed: 10,
            files_failed: 0,
            total_nodes_visited: 0,
            symbols_resolved: 0,
            symbols_missed: 0,
            type_probes: 0,
            dependencies_resolved: 0,
            elapsed: Duration::from_millis(400),
            failures: Vec::new(),
            cancelled: false,
        };
        let fast = RunMetrics {
            strategy: SchedulingStrategy::BoundedParallel,
            elapsed: Duration::from_millis(100),
            ..base.clone()
        };

        assert_eq!(fast.speedup_over(&base), 4.0);
        assert_eq!(base.files_per_second(), 25.0);
    }

    #[test]
    fn test_strategy_labels() {
        assert_eq!(SchedulingStrategy::BoundedParallel.to_string(), "Bounded-Parallel");
        assert_eq!(SchedulingStrategy::ALL[2].label(), "High-Concurrency");
    }
}
