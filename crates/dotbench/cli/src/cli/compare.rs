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

//! Compare command: run every scheduling strategy at several project sizes

use crate::memory::{ProcessMemory, delta_mb};
use crate::report::{ScaleReport, render_table};
use anyhow::Context;
use clap::Args;
use dotbench_core::{ProjectBuilder, ResolutionMode, Scheduler, SizeOverrides, WorkloadConfig};
use std::sync::Arc;
use tracing::info;

/// Project sizes used when neither `--files` nor `DOTBENCH_FILE_COUNT` is given
pub const DEFAULT_FILE_COUNTS: [usize; 3] = [50, 200, 500];

/// Arguments for the compare command
#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Project sizes to benchmark, comma separated (defaults to DOTBENCH_FILE_COUNT, else 50,200,500)
    #[arg(long, value_delimiter = ',')]
    pub files: Option<Vec<usize>>,

    /// AST depth per file
    #[arg(long)]
    pub depth: Option<usize>,

    /// Children per AST node
    #[arg(long)]
    pub breadth: Option<usize>,

    /// Symbols declared per file
    #[arg(long)]
    pub symbols: Option<usize>,

    /// Type table entries (defaults to DOTBENCH_TYPE_COUNT, else the file count)
    #[arg(long)]
    pub types: Option<usize>,

    /// Cross-file dependencies per file
    #[arg(long)]
    pub fanout: Option<usize>,

    /// Symbol registry mode (flat or chained)
    #[arg(long)]
    pub mode: Option<ResolutionMode>,

    /// Seed for tree generation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker count for the bounded-parallel strategy
    #[arg(long)]
    pub parallelism: Option<usize>,

    /// Disable the periodic progress monitor
    #[arg(long)]
    pub no_progress: bool,

    /// Print the results as JSON
    #[arg(long)]
    pub json: bool,
}

impl CompareArgs {
    /// Sizes to run: the flag, then the environment, then [`DEFAULT_FILE_COUNTS`]
    pub fn file_counts(&self, env: SizeOverrides) -> Vec<usize> {
        match (&self.files, env.file_count) {
            (Some(files), _) => files.clone(),
            (None, Some(files)) => vec![files],
            (None, None) => DEFAULT_FILE_COUNTS.to_vec(),
        }
    }

    /// Workload for one project size: environment first, then flags
    pub fn workload(&self, base: &WorkloadConfig, env: SizeOverrides, files: usize) -> WorkloadConfig {
        let mut config = base.clone();
        config.file_count = files;
        config.type_count = self.types.or(env.type_count).unwrap_or(files);
        if let Some(depth) = self.depth {
            config.ast_depth = depth;
        }
        if let Some(breadth) = self.breadth {
            config.ast_breadth = breadth;
        }
        if let Some(symbols) = self.symbols {
            config.symbols_per_file = symbols;
        }
        if let Some(fanout) = self.fanout {
            config.dependency_fanout = fanout;
        }
        if let Some(mode) = self.mode {
            config.resolution_mode = mode;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(parallelism) = self.parallelism {
            config.parallelism = parallelism;
        }
        config
    }
}

/// Builds and benchmarks one project per requested size
pub fn compare(args: &CompareArgs) -> anyhow::Result<Vec<ScaleReport>> {
    let env = SizeOverrides::from_env();
    let file_counts = args.file_counts(env);
    anyhow::ensure!(!file_counts.is_empty(), "at least one file count is required");

    let base = WorkloadConfig::from_env();
    let mut memory = ProcessMemory::new();
    let mut reports = Vec::with_capacity(file_counts.len());

    for files in file_counts {
        let config = args.workload(&base, env, files);
        let project = Arc::new(ProjectBuilder::new(config.clone()).build().with_context(|| format!("failed to build a {files}-file project"))?);

        let mut scheduler = Scheduler::from_config(&config);
        if args.no_progress {
            scheduler = scheduler.without_monitor();
        }

        let before = memory.resident_bytes();
        let runs = scheduler.run_all(&project).with_context(|| format!("analysis of the {files}-file project failed"))?;
        let memory_delta_mb = delta_mb(before, memory.resident_bytes());

        let report = ScaleReport::from_runs(&project, &config, &runs, memory_delta_mb);
        info!(files, nodes = report.nodes, memory_delta_mb, "Comparison finished");
        reports.push(report);
    }

    Ok(reports)
}

/// Execute the compare command
pub fn run_compare(args: CompareArgs) -> anyhow::Result<()> {
    let reports = compare(&args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print!("{}", render_table(&reports));
    }
    Ok(())
}
