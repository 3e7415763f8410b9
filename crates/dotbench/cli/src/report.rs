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

//! Result formatting for the `compare` and `lookup` commands

use dotbench_core::{Project, ResolutionMode, RunMetrics, SchedulingStrategy, WorkloadConfig};
use serde::Serialize;
use std::fmt::{self, Write};
use std::time::Duration;

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// One strategy's result within a [`ScaleReport`]
#[derive(Debug, Clone, Serialize)]
pub struct StrategyReport {
    pub strategy: String,
    pub workers: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    pub total_nodes_visited: u64,
    pub elapsed_ms: f64,
    pub files_per_second: f64,
    /// Serial elapsed time divided by this run's; absent for the serial run
    pub speedup: Option<f64>,
    pub cancelled: bool,
}

/// All strategy results for one project size
#[derive(Debug, Clone, Serialize)]
pub struct ScaleReport {
    pub files: usize,
    pub nodes: usize,
    pub symbols: usize,
    pub mode: String,
    pub seed: u64,
    /// Logical CPUs on the host
    pub cpus: usize,
    /// Worker count requested for the bounded-parallel strategy
    pub parallelism: usize,
    /// Resident memory change across all runs; absent when the platform does not report it
    pub memory_delta_mb: Option<f64>,
    pub runs: Vec<StrategyReport>,
}

impl ScaleReport {
    pub fn from_runs(project: &Project, config: &WorkloadConfig, runs: &[RunMetrics], memory_delta_mb: Option<f64>) -> Self {
        let serial = runs.iter().find(|run| run.strategy == SchedulingStrategy::Serial);
        let runs = runs
            .iter()
            .map(|run| StrategyReport {
                strategy: run.strategy.label().to_string(),
                workers: run.workers,
                files_processed: run.files_processed,
                files_failed: run.files_failed,
                total_nodes_visited: run.total_nodes_visited,
                elapsed_ms: millis(run.elapsed),
                files_per_second: run.files_per_second(),
                speedup: match serial {
                    Some(baseline) if run.strategy != SchedulingStrategy::Serial => Some(run.speedup_over(baseline)),
                    _ => None,
                },
                cancelled: run.cancelled,
            })
            .collect();

        Self {
            files: project.file_count(),
            nodes: project.total_nodes(),
            symbols: project.registry().len(),
            mode: config.resolution_mode.to_string(),
            seed: project.seed(),
            cpus: num_cpus::get(),
            parallelism: config.parallelism,
            memory_delta_mb,
            runs,
        }
    }
}

/// Renders the human-readable comparison table
pub fn render_table(reports: &[ScaleReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let _ = writeln!(
            out,
            "== {} files, {} nodes, {} symbols ({} registry, seed {}, {} CPUs, parallelism {}) ==",
            report.files, report.nodes, report.symbols, report.mode, report.seed, report.cpus, report.parallelism
        );
        if let Some(delta) = report.memory_delta_mb {
            let _ = writeln!(out, "memory delta: {delta:+.2} MB");
        }
        let _ = writeln!(out, "{:<18} {:>8} {:>10} {:>12} {:>12} {:>9}", "strategy", "workers", "files", "nodes", "elapsed ms", "speedup");
        for run in &report.runs {
            let speedup = run.speedup.map_or_else(|| "-".to_string(), |s| format!("{s:.2}x"));
            let files = if run.files_failed > 0 { format!("{}+{}!", run.files_processed, run.files_failed) } else { run.files_processed.to_string() };
            let _ = writeln!(
                out,
                "{:<18} {:>8} {:>10} {:>12} {:>12.2} {:>9}{}",
                run.strategy,
                run.workers,
                files,
                run.total_nodes_visited,
                run.elapsed_ms,
                speedup,
                if run.cancelled { " (cancelled)" } else { "" }
            );
        }
        out.push('\n');
    }
    out
}

/// Outcome of the symbol lookup micro-benchmark
#[derive(Debug, Clone, Serialize)]
pub struct LookupReport {
    pub mode: String,
    pub symbols: usize,
    pub scopes: usize,
    pub lookups: usize,
    pub found: usize,
    pub insert_ms: f64,
    pub lookup_ms: f64,
}

impl LookupReport {
    pub fn new(mode: ResolutionMode, symbols: usize, scopes: usize, lookups: usize, found: usize, insert: Duration, lookup: Duration) -> Self {
        Self {
            mode: mode.to_string(),
            symbols,
            scopes,
            lookups,
            found,
            insert_ms: millis(insert),
            lookup_ms: millis(lookup),
        }
    }

    pub fn lookups_per_second(&self) -> f64 {
        if self.lookup_ms > 0.0 { self.lookups as f64 / (self.lookup_ms / 1000.0) } else { 0.0 }
    }
}

impl fmt::Display for LookupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Symbol lookup ({} registry, {} scopes)", self.mode, self.scopes)?;
        writeln!(f, "  symbols inserted: {} in {:.2} ms", self.symbols, self.insert_ms)?;
        writeln!(f, "  lookups:          {}", self.lookups)?;
        writeln!(f, "  found:            {}", self.found)?;
        write!(f, "  lookup time:      {:.2} ms ({:.0} lookups/s)", self.lookup_ms, self.lookups_per_second())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotbench_core::ProjectBuilder;

    fn metrics(strategy: SchedulingStrategy, workers: usize, elapsed_ms: u64) -> RunMetrics {
        RunMetrics {
            strategy,
            workers,
            files_processed: 4,
            files_failed: 0,
            total_nodes_visited: 28,
            symbols_resolved: 8,
            symbols_missed: 0,
            type_probes: 0,
            dependencies_resolved: 0,
            elapsed: Duration::from_millis(elapsed_ms),
            failures: Vec::new(),
            cancelled: false,
        }
    }

    fn report() -> ScaleReport {
        let mut config = WorkloadConfig::with_files(4).with_ast_shape(2, 2).with_symbols_per_file(2).with_seed(8);
        config.resolution_mode = ResolutionMode::Flat;
        config.parallelism = 2;
        let project = ProjectBuilder::new(config.clone()).build().unwrap();
        let runs = [
            metrics(SchedulingStrategy::Serial, 1, 300),
            metrics(SchedulingStrategy::BoundedParallel, 2, 150),
            metrics(SchedulingStrategy::HighConcurrency, 8, 100),
        ];
        ScaleReport::from_runs(&project, &config, &runs, Some(12.5))
    }

    #[test]
    fn test_speedups_are_relative_to_serial() {
        let report = report();

        assert_eq!(report.files, 4);
        assert_eq!(report.nodes, 28);
        assert_eq!(report.symbols, 8);
        assert_eq!(report.runs[0].speedup, None);
        assert!((report.runs[1].speedup.unwrap() - 2.0).abs() < 1e-9);
        assert!((report.runs[2].speedup.unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_table_lists_every_strategy() {
        let table = render_table(&[report()]);

        let header = format!("== 4 files, 28 nodes, 8 symbols (flat registry, seed 8, {} CPUs, parallelism 2) ==", num_cpus::get());
        assert!(table.starts_with(&header));
        assert!(table.contains("memory delta: +12.50 MB"));
        for label in ["Serial", "Bounded-Parallel", "High-Concurrency"] {
            assert!(table.contains(label), "missing {label}");
        }
        assert!(table.contains("2.00x"));
        assert!(table.contains("3.00x"));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(report()).unwrap();

        assert_eq!(json["files"], 4);
        assert_eq!(json["mode"], "flat");
        assert_eq!(json["runs"][1]["strategy"], "Bounded-Parallel");
        assert!(json["runs"][0]["speedup"].is_null());
        assert_eq!(json["memory_delta_mb"], 12.5);
    }

    #[test]
    fn test_cpus_come_from_host_not_parallelism() {
        let report = report();

        assert_eq!(report.cpus, num_cpus::get());
        assert_eq!(report.parallelism, 2);
        assert_eq!(report.memory_delta_mb, Some(12.5));
    }

    #[test]
    fn test_lookup_report_display() {
        let report = LookupReport::new(ResolutionMode::Chained, 100, 1, 500, 500, Duration::from_millis(1), Duration::from_millis(5));

        assert_eq!(report.lookups_per_second(), 100_000.0);
        let text = report.to_string();
        assert!(text.contains("found:            500"));
        assert!(text.contains("chained registry"));
    }
}
