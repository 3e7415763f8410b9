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

//! Workload configuration
//!
//! Defaults mirror the reference workload: 50 files, depth-6 / breadth-3
//! trees, 50 symbols per file, one type per file with 10 properties and
//! 10 methods, and 10KB of content per file.

use crate::error::{BenchError, BenchResult};
use crate::symbols::ResolutionMode;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const FILE_COUNT_VAR: &str = "DOTBENCH_FILE_COUNT";
pub const TYPE_COUNT_VAR: &str = "DOTBENCH_TYPE_COUNT";

/// Parameters for building and running a synthetic project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadConfig {
    /// Number of source files in the project
    pub file_count: usize,
    /// Depth of each file's AST
    pub ast_depth: usize,
    /// Children per AST node
    pub ast_breadth: usize,
    /// Symbols declared by each file
    pub symbols_per_file: usize,
    /// Entries in the shared type table
    pub type_count: usize,
    pub properties_per_type: usize,
    pub methods_per_type: usize,
    /// Raw content bytes per file
    pub content_size: usize,
    /// Number of preceding files each file depends on
    pub dependency_fanout: usize,
    /// Registry lookup mode
    pub resolution_mode: ResolutionMode,
    /// Seed for AST generation, random when absent
    pub seed: Option<u64>,
    /// Worker count for the bounded-parallel strategy
    pub parallelism: usize,
    /// Multiplier applied to `parallelism` for the high-concurrency strategy
    pub high_concurrency_factor: usize,
    /// Progress monitor sampling interval
    pub monitor_interval: Duration,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            file_count: 50,
            ast_depth: 6,
            ast_breadth: 3,
            symbols_per_file: 50,
            type_count: 50,
            properties_per_type: 10,
            methods_per_type: 10,
            content_size: 10_000,
            dependency_fanout: 0,
            resolution_mode: ResolutionMode::Flat,
            seed: None,
            parallelism: num_cpus::get(),
            high_concurrency_factor: 4,
            monitor_interval: Duration::from_millis(100),
        }
    }
}

impl WorkloadConfig {
    /// Default configuration for `file_count` files, with one type per file
    pub fn with_files(file_count: usize) -> Self {
        Self {
            file_count,
            type_count: file_count,
            ..Self::default()
        }
    }

    /// Default configuration with environment overrides applied.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// [`WorkloadConfig::from_env`] reading variables through `lookup`
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let sizes = SizeOverrides::from_vars(&lookup);

        if let Some(files) = sizes.file_count {
            config.file_count = files;
            config.type_count = files;
        }
        if let Some(types) = sizes.type_count {
            config.type_count = types;
        }
        if let Some(depth) = parse_var(&lookup, "DOTBENCH_AST_DEPTH") {
            config.ast_depth = depth;
        }
        if let Some(breadth) = parse_var(&lookup, "DOTBENCH_AST_BREADTH") {
            config.ast_breadth = breadth;
        }
        if let Some(symbols) = parse_var(&lookup, "DOTBENCH_SYMBOLS_PER_FILE") {
            config.symbols_per_file = symbols;
        }
        if let Some(mode) = parse_var(&lookup, "DOTBENCH_RESOLUTION_MODE") {
            config.resolution_mode = mode;
        }
        if let Some(seed) = parse_var(&lookup, "DOTBENCH_SEED") {
            config.seed = Some(seed);
        }
        if let Some(parallelism) = parse_var(&lookup, "DOTBENCH_PARALLELISM") {
            config.parallelism = parallelism;
        }

        config
    }

    pub fn with_ast_shape(mut self, depth: usize, breadth: usize) -> Self {
        self.ast_depth = depth;
        self.ast_breadth = breadth;
        self
    }

    pub fn with_symbols_per_file(mut self, symbols: usize) -> Self {
        self.symbols_per_file = symbols;
        self
    }

    pub fn with_content_size(mut self, bytes: usize) -> Self {
        self.content_size = bytes;
        self
    }

    pub fn with_dependency_fanout(mut self, fanout: usize) -> Self {
        self.dependency_fanout = fanout;
        self
    }

    pub fn with_resolution_mode(mut self, mode: ResolutionMode) -> Self {
        self.resolution_mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_high_concurrency_factor(mut self, factor: usize) -> Self {
        self.high_concurrency_factor = factor;
        self
    }

    pub fn with_monitor_interval(mut self, interval: Duration) -> Self {
        self.monitor_interval = interval;
        self
    }

    /// Rejects non-positive counts before any work begins
    pub fn validate(&self) -> BenchResult<()> {
        let required = [
            ("file_count", self.file_count),
            ("ast_depth", self.ast_depth),
            ("ast_breadth", self.ast_breadth),
            ("symbols_per_file", self.symbols_per_file),
            ("type_count", self.type_count),
            ("properties_per_type", self.properties_per_type),
            ("methods_per_type", self.methods_per_type),
            ("parallelism", self.parallelism),
            ("high_concurrency_factor", self.high_concurrency_factor),
        ];

        if let Some((name, _)) = required.iter().find(|(_, value)| *value == 0) {
            return Err(BenchError::config(format!("{name} must be a positive integer")));
        }

        if self.monitor_interval.is_zero() {
            return Err(BenchError::config("monitor_interval must be non-zero"));
        }

        Ok(())
    }
}

/// Project sizes pinned by `DOTBENCH_FILE_COUNT` / `DOTBENCH_TYPE_COUNT`.
///
/// A field is `None` when its variable is unset or invalid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeOverrides {
    pub file_count: Option<usize>,
    pub type_count: Option<usize>,
}

impl SizeOverrides {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            file_count: parse_var(&lookup, FILE_COUNT_VAR),
            type_count: parse_var(&lookup, TYPE_COUNT_VAR),
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid {key}='{raw}', using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = WorkloadConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.file_count, 50);
        assert_eq!(config.high_concurrency_factor, 4);
    }

    #[test]
    fn test_zero_counts_are_rejected() {
        let config = WorkloadConfig::with_files(0);
        assert_eq!(config.validate(), Err(BenchError::config("file_count must be a positive integer")));

        let config = WorkloadConfig::with_files(10).with_symbols_per_file(0);
        assert!(matches!(config.validate(), Err(BenchError::Configuration(msg)) if msg.contains("symbols_per_file")));

        let config = WorkloadConfig::with_files(10).with_parallelism(0);
        assert!(config.validate().is_err());

        let config = WorkloadConfig::with_files(10).with_monitor_interval(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_optional_counts_may_be_zero() {
        let config = WorkloadConfig::with_files(3).with_dependency_fanout(0).with_content_size(0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_files_scales_type_count() {
        let config = WorkloadConfig::with_files(200);
        assert_eq!(config.type_count, 200);
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: std::collections::HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_apply_in_order() {
        let config = WorkloadConfig::from_vars(vars(&[(FILE_COUNT_VAR, "120"), (TYPE_COUNT_VAR, "7"), ("DOTBENCH_RESOLUTION_MODE", "chained")]));
        assert_eq!(config.file_count, 120);
        assert_eq!(config.type_count, 7);
        assert_eq!(config.resolution_mode, ResolutionMode::Chained);

        let config = WorkloadConfig::from_vars(vars(&[(FILE_COUNT_VAR, "120")]));
        assert_eq!(config.type_count, 120);
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let config = WorkloadConfig::from_vars(vars(&[(FILE_COUNT_VAR, "many"), ("DOTBENCH_SEED", " 9 ")]));
        assert_eq!(config.file_count, 50);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_size_overrides_track_set_variables() {
        assert_eq!(SizeOverrides::from_vars(vars(&[])), SizeOverrides::default());

        let sizes = SizeOverrides::from_vars(vars(&[(TYPE_COUNT_VAR, "7")]));
        assert_eq!(sizes.file_count, None);
        assert_eq!(sizes.type_count, Some(7));
    }
}
