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

//! Project construction (the build phase)
//!
//! Trees are generated in parallel, one seeded RNG per file, so the result
//! does not depend on thread count. Registry and type-table writes then
//! happen on the calling thread in file order, and both tables are sealed
//! before the project is handed out.

use super::{Project, SourceFile, TypeInfo, TypeTable};
use crate::ast::{Ast, TreeGenerator};
use crate::config::WorkloadConfig;
use crate::error::BenchResult;
use crate::symbols::{ResolutionMode, ScopeId, Symbol, SymbolRegistry};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Symbols per scope level (`scope = index / SYMBOLS_PER_SCOPE`)
pub const SYMBOLS_PER_SCOPE: usize = 10;

const PROGRESS_EVERY: usize = 50;

/// Builds a [`Project`] from a validated [`WorkloadConfig`]
#[derive(Debug, Clone)]
pub struct ProjectBuilder {
    config: WorkloadConfig,
}

impl ProjectBuilder {
    pub fn new(config: WorkloadConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkloadConfig {
        &self.config
    }

    /// Runs the build phase.
    ///
    /// # Errors
    /// `BenchError::Configuration` when any required count is zero.
    pub fn build(&self) -> BenchResult<Project> {
        self.config.validate()?;
        let config = &self.config;
        let seed = config.seed.unwrap_or_else(rand::random);
        let started = Instant::now();

        info!(
            files = config.file_count,
            depth = config.ast_depth,
            breadth = config.ast_breadth,
            mode = %config.resolution_mode,
            seed,
            "Building synthetic project"
        );

        let asts = self.generate_trees(seed);
        debug!(elapsed = ?started.elapsed(), "Syntax trees generated");

        let registry = SymbolRegistry::new(config.resolution_mode);
        let scopes = self.open_scopes(&registry)?;

        let mut files = Vec::with_capacity(config.file_count);
        for (index, ast) in asts.into_iter().enumerate() {
            files.push(self.build_file(index, ast, &registry, &scopes)?);

            if (index + 1) % PROGRESS_EVERY == 0 && index + 1 < config.file_count {
                info!(built = index + 1, total = config.file_count, "Project build progress");
            }
        }

        let types = TypeTable::new();
        for index in 0..config.type_count {
            types.register(TypeInfo::synthetic(index, config.properties_per_type, config.methods_per_type))?;
        }

        let dependencies = self.wire_dependencies();

        registry.seal();
        types.seal();

        let project = Project::new(files, registry, types, dependencies, seed);
        info!(
            files = project.file_count(),
            nodes = project.total_nodes(),
            symbols = project.registry().len(),
            types = project.types().len(),
            elapsed = ?started.elapsed(),
            "Project build complete"
        );
        Ok(project)
    }

    fn generate_trees(&self, seed: u64) -> Vec<Ast> {
        let (depth, breadth) = (self.config.ast_depth, self.config.ast_breadth);
        (0..self.config.file_count)
            .into_par_iter()
            .map(|index| TreeGenerator::new(StdRng::seed_from_u64(seed.wrapping_add(index as u64))).generate(depth, breadth))
            .collect()
    }

    /// One scope per symbol scope level. Level 0 is the root; in chained mode
    /// each deeper level nests inside the previous one, leaving the innermost
    /// scope current for analysis-phase lookups.
    fn open_scopes(&self, registry: &SymbolRegistry) -> BenchResult<Vec<ScopeId>> {
        let levels = self.config.symbols_per_file.div_ceil(SYMBOLS_PER_SCOPE);
        let mut scopes = vec![ScopeId::ROOT];
        if registry.mode() == ResolutionMode::Chained {
            for _ in 1..levels {
                scopes.push(registry.enter_scope()?);
            }
        }
        Ok(scopes)
    }

    fn build_file(&self, index: usize, ast: Ast, registry: &SymbolRegistry, scopes: &[ScopeId]) -> BenchResult<SourceFile> {
        let mut symbols = Vec::with_capacity(self.config.symbols_per_file);
        for j in 0..self.config.symbols_per_file {
            let level = j / SYMBOLS_PER_SCOPE;
            let type_tag = if j % 2 == 0 { "function" } else { "variable" };
            let symbol = Arc::new(Symbol::new(format!("symbol_{index}_{j}"), type_tag, level as u32));

            let scope = scopes.get(level).copied().unwrap_or(ScopeId::ROOT);
            registry.insert_in(scope, Arc::clone(&symbol))?;
            symbols.push(symbol);
        }

        Ok(SourceFile {
            path: file_path(index),
            content: vec![0u8; self.config.content_size],
            ast,
            symbols,
        })
    }

    /// File `i` depends on the first symbol of each of the previous
    /// `dependency_fanout` files
    fn wire_dependencies(&self) -> HashMap<String, Vec<String>> {
        let fanout = self.config.dependency_fanout;
        if fanout == 0 {
            return HashMap::new();
        }

        (1..self.config.file_count)
            .map(|index| {
                let deps = (1..=fanout).filter_map(|distance| index.checked_sub(distance)).map(|upstream| format!("symbol_{upstream}_0")).collect();
                (file_path(index), deps)
            })
            .collect()
    }
}

/// Path of the `index`-th synthetic file
pub fn file_path(index: usize) -> String {
    format!("src/file_{index}.ts")
}
