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

//! Error types for the benchmark pipeline

use std::fmt;

/// Errors that abort a build or a run
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BenchError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Symbol registry is sealed, writes are only accepted during the build phase")]
    RegistrySealed,

    #[error("Symbol registry is still in the build phase, seal it before analysis")]
    RegistryNotSealed,

    #[error("Worker pool failure: {0}")]
    WorkerPool(String),

    #[error("Progress monitor failure: {0}")]
    Monitor(String),
}

impl BenchError {
    /// Shorthand for a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

/// Result type for build and scheduling operations
pub type BenchResult<T> = Result<T, BenchError>;

/// The analysis step that produced a per-file failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisStep {
    Traversal,
    SymbolResolution,
    TypeCheck,
    DependencyResolution,
    IncrementalCheck,
}

impl fmt::Display for AnalysisStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Traversal => "traversal",
            Self::SymbolResolution => "symbol resolution",
            Self::TypeCheck => "type check",
            Self::DependencyResolution => "dependency resolution",
            Self::IncrementalCheck => "incremental check",
        };
        f.write_str(name)
    }
}

/// A non-fatal failure while analyzing a single file.
///
/// The scheduler collects these next to the successful counts; a failing
/// file never cancels its siblings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{step} failed for {path}: {message}")]
pub struct AnalysisError {
    pub path: String,
    pub step: AnalysisStep,
    pub message: String,
}

impl AnalysisError {
    pub fn new(path: impl Into<String>, step: AnalysisStep, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            step,
            message: message.into(),
        }
    }
}
