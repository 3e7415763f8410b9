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

//! End-to-end tests: build a project, analyze it under every strategy

use dotbench_core::*;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

fn light_scheduler() -> Scheduler {
    Scheduler::with_analyzer(SyntheticAnalyzer::new(WorkProfile::light()))
}

fn build(config: WorkloadConfig) -> Arc<Project> {
    Arc::new(ProjectBuilder::new(config).build().expect("project should build"))
}

/// Fails every file whose index is listed, and delegates the rest
struct FlakyAnalyzer {
    inner: SyntheticAnalyzer,
    failing: Vec<String>,
}

impl FileAnalyzer for FlakyAnalyzer {
    fn analyze(&self, file: &SourceFile, ctx: &AnalysisContext<'_>) -> Result<FileReport, AnalysisError> {
        if self.failing.contains(&file.path) {
            return Err(AnalysisError::new(file.path.clone(), AnalysisStep::TypeCheck, "injected failure"));
        }
        self.inner.analyze(file, ctx)
    }
}

#[test]
fn test_all_strategies_process_every_file() {
    let project = build(WorkloadConfig::with_files(50).with_symbols_per_file(10).with_seed(42));
    let expected_nodes = 50 * expected_node_count(6, 3) as u64;

    let runs = light_scheduler().with_parallelism(4).run_all(&project).unwrap();
    assert_eq!(runs.len(), 3);

    for run in &runs {
        assert_eq!(run.files_processed, 50, "{} should process every file", run.strategy);
        assert_eq!(run.files_failed, 0);
        assert_eq!(run.total_nodes_visited, expected_nodes, "{} node total differs", run.strategy);
        assert_eq!(run.symbols_resolved, 500);
        assert_eq!(run.symbols_missed, 0);
        assert_eq!(run.type_probes, 50 * (expected_node_count(6, 3) as u64 / 10));
        assert!(!run.cancelled);
    }

    let strategies: Vec<_> = runs.iter().map(|r| r.strategy).collect();
    assert_eq!(strategies, SchedulingStrategy::ALL);
}

#[test]
fn test_failures_are_isolated() {
    let project = build(WorkloadConfig::with_files(20).with_ast_shape(3, 3).with_symbols_per_file(10).with_seed(1));
    let analyzer = FlakyAnalyzer {
        inner: SyntheticAnalyzer::new(WorkProfile::light()),
        failing: vec!["src/file_3.ts".to_string(), "src/file_11.ts".to_string()],
    };
    let scheduler = Scheduler::with_analyzer(analyzer).with_parallelism(3);

    for strategy in SchedulingStrategy::ALL {
        let run = scheduler.run(&project, strategy).unwrap();
        assert_eq!(run.files_processed, 18);
        assert_eq!(run.files_failed, 2);
        assert_eq!(run.files_processed + run.files_failed, 20);

        let mut paths: Vec<_> = run.failures.iter().map(|f| f.path.as_str()).collect();
        paths.sort_unstable();
        assert_eq!(paths, ["src/file_11.ts", "src/file_3.ts"]);
        assert!(run.failures.iter().all(|f| f.step == AnalysisStep::TypeCheck));
    }
}

#[test]
fn test_pre_cancelled_token_stops_every_strategy() {
    let project = build(WorkloadConfig::with_files(10).with_ast_shape(2, 2).with_symbols_per_file(5).with_seed(9));
    let token = CancellationToken::new();
    token.cancel(Some("aborted before start"));

    let runs = light_scheduler().with_parallelism(2).with_cancellation(token).run_all(&project).unwrap();
    for run in runs {
        assert!(run.cancelled, "{} should report cancellation", run.strategy);
        assert_eq!(run.files_processed, 0);
        assert_eq!(run.total_nodes_visited, 0);
    }
}

#[test]
fn test_progress_is_monotonic_and_complete() {
    let project = build(WorkloadConfig::with_files(40).with_ast_shape(4, 3).with_symbols_per_file(10).with_seed(7));

    for strategy in SchedulingStrategy::ALL {
        let samples = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&samples);
        let sink: ProgressSink = Arc::new(move |sample: &ProgressSample| recorder.lock().push(sample.processed));

        let scheduler = light_scheduler().with_parallelism(2).with_monitor(Duration::from_millis(1), Some(sink));
        let run = scheduler.run(&project, strategy).unwrap();
        assert_eq!(run.files_processed, 40);

        let samples = samples.lock();
        assert!(!samples.is_empty());
        assert!(samples.windows(2).all(|pair| pair[0] <= pair[1]), "{strategy} progress went backwards");
        assert_eq!(samples.last().copied(), Some(40));
    }
}

#[test]
fn test_chained_mode_resolves_through_scope_chain() {
    let config = WorkloadConfig::with_files(8).with_ast_shape(3, 2).with_symbols_per_file(50).with_resolution_mode(ResolutionMode::Chained).with_seed(5);
    let project = build(config);
    assert_eq!(project.registry().scope_count(), 5);

    let runs = light_scheduler().with_parallelism(2).run_all(&project).unwrap();
    for run in runs {
        assert_eq!(run.symbols_resolved, 8 * 50);
        assert_eq!(run.symbols_missed, 0);
    }
}

#[test]
fn test_dependencies_resolve_across_files() {
    let project = build(WorkloadConfig::with_files(6).with_ast_shape(2, 2).with_symbols_per_file(5).with_dependency_fanout(3).with_seed(2));

    let run = light_scheduler().run(&project, SchedulingStrategy::BoundedParallel).unwrap();
    // files 1, 2 and 3..=5 depend on 1, 2 and 3 predecessors
    assert_eq!(run.dependencies_resolved, 1 + 2 + 3 * 3);
}

#[test]
fn test_unsealed_registry_cannot_be_written_after_build() {
    let project = build(WorkloadConfig::with_files(2).with_ast_shape(1, 1).with_symbols_per_file(1).with_seed(0));
    let err = project.registry().insert("late", "function", 0).unwrap_err();
    assert_eq!(err, BenchError::RegistrySealed);
}

#[test]
#[ignore = "timing sensitive, run manually on a multi-core host"]
fn test_bounded_parallel_is_not_slower_than_serial() {
    if num_cpus::get() < 2 {
        return;
    }

    let project = build(WorkloadConfig::with_files(50).with_seed(42));
    let scheduler = Scheduler::new();

    let serial = scheduler.run(&project, SchedulingStrategy::Serial).unwrap();
    let bounded = scheduler.run(&project, SchedulingStrategy::BoundedParallel).unwrap();

    assert!(bounded.elapsed <= serial.elapsed, "bounded {:?} vs serial {:?}", bounded.elapsed, serial.elapsed);
}
