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

//! dotbench core library
//!
//! Builds a synthetic multi-file project (syntax trees, a shared symbol
//! registry and a type table) and measures how fast its per-file analysis
//! runs under serial, bounded-parallel and high-concurrency scheduling.

pub mod analysis;
pub mod ast;
pub mod config;
pub mod error;
pub mod monitor;
pub mod project;
pub mod scheduling;
pub mod symbols;

// Re-export the pipeline entry points
pub use analysis::{AnalysisContext, FileAnalyzer, FileReport, SyntheticAnalyzer, WorkProfile};
pub use ast::{Ast, NodeId, NodeKind, TreeGenerator, TreeNode, expected_node_count};
pub use config::{SizeOverrides, WorkloadConfig};
pub use error::{AnalysisError, AnalysisStep, BenchError, BenchResult};
pub use monitor::{ProgressMonitor, ProgressReport, ProgressSample, ProgressSink};
pub use project::{Project, ProjectBuilder, SourceFile, TypeInfo, TypeTable};
pub use scheduling::{CancellationToken, RunMetrics, Scheduler, SchedulingStrategy, WorkerPool, WorkerStats};
pub use symbols::{RegistryPhase, ResolutionMode, ScopeId, Symbol, SymbolRegistry};
