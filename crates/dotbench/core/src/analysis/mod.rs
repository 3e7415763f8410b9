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

//! Per-file analysis work unit
//!
//! [`SyntheticAnalyzer`] reproduces the cost shape of a compiler front end:
//! 1. full AST traversal with per-kind handler work
//! 2. resolution of the file's own declarations
//! 3. capped type-check probes into the shared type table
//! 4. resolution of cross-file dependencies, when the file has any
//! 5. a fixed number of incremental-change probes
//!
//! Every shared-state access is a read; analysis never writes.

use crate::ast::{NodeKind, TreeNode};
use crate::error::AnalysisError;
use crate::project::{Project, SourceFile, TypeTable};
use crate::symbols::SymbolRegistry;
use std::hint::black_box;
use std::ops::AddAssign;

/// Read-only view of the shared state a file is analyzed against
#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub registry: &'a SymbolRegistry,
    pub types: &'a TypeTable,
    pub dependencies: Option<&'a [String]>,
}

impl<'a> AnalysisContext<'a> {
    /// Context for `file` within `project`
    pub fn for_file(project: &'a Project, file: &SourceFile) -> Self {
        Self {
            registry: project.registry(),
            types: project.types(),
            dependencies: project.dependencies_for(&file.path),
        }
    }
}

/// Counters produced by analyzing one file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileReport {
    pub nodes_visited: u64,
    pub symbols_resolved: u64,
    pub symbols_missed: u64,
    pub type_probes: u64,
    pub dependencies_resolved: u64,
    pub incremental_hits: u64,
}

impl AddAssign for FileReport {
    fn add_assign(&mut self, other: Self) {
        self.nodes_visited += other.nodes_visited;
        self.symbols_resolved += other.symbols_resolved;
        self.symbols_missed += other.symbols_missed;
        self.type_probes += other.type_probes;
        self.dependencies_resolved += other.dependencies_resolved;
        self.incremental_hits += other.incremental_hits;
    }
}

/// A unit of per-file analysis work run by the scheduler
pub trait FileAnalyzer: Send + Sync {
    fn analyze(&self, file: &SourceFile, ctx: &AnalysisContext<'_>) -> Result<FileReport, AnalysisError>;
}

/// Tunable cost of the synthetic analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkProfile {
    pub function_decl_ops: usize,
    pub var_decl_ops: usize,
    pub call_expr_ops: usize,
    /// Ops for `BinaryExpr` and `Identifier`
    pub base_ops: usize,
    /// One type-check probe per this many visited nodes
    pub nodes_per_type_probe: usize,
    /// Property visits before a probe stops
    pub type_probe_limit: usize,
    pub incremental_probes: usize,
}

impl Default for WorkProfile {
    fn default() -> Self {
        Self {
            function_decl_ops: 100,
            var_decl_ops: 50,
            call_expr_ops: 75,
            base_ops: 25,
            nodes_per_type_probe: 10,
            type_probe_limit: 5,
            incremental_probes: 10,
        }
    }
}

impl WorkProfile {
    /// Same shape with a fraction of the handler work, for tests
    pub fn light() -> Self {
        Self {
            function_decl_ops: 4,
            var_decl_ops: 2,
            call_expr_ops: 3,
            base_ops: 1,
            ..Self::default()
        }
    }

    pub fn ops_for(&self, kind: NodeKind) -> usize {
        match kind {
            NodeKind::FunctionDecl => self.function_decl_ops,
            NodeKind::VarDecl => self.var_decl_ops,
            NodeKind::CallExpr => self.call_expr_ops,
            NodeKind::BinaryExpr | NodeKind::Identifier => self.base_ops,
        }
    }
}

/// The default analyzer
#[derive(Debug, Clone, Default)]
pub struct SyntheticAnalyzer {
    profile: WorkProfile,
}

impl SyntheticAnalyzer {
    pub fn new(profile: WorkProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &WorkProfile {
        &self.profile
    }

    fn visit(&self, node: &TreeNode) {
        for i in 0..self.profile.ops_for(node.kind) {
            black_box(format!("{}{}", node.name, i));
        }
    }
}

impl FileAnalyzer for SyntheticAnalyzer {
    fn analyze(&self, file: &SourceFile, ctx: &AnalysisContext<'_>) -> Result<FileReport, AnalysisError> {
        let mut report = FileReport::default();

        for (_, node) in file.ast.preorder() {
            self.visit(node);
            report.nodes_visited += 1;
        }

        for symbol in &file.symbols {
            match ctx.registry.resolve(&symbol.name) {
                Some(found) => {
                    black_box(found);
                    report.symbols_resolved += 1;
                }
                None => report.symbols_missed += 1,
            }
        }

        let probes = report.nodes_visited / self.profile.nodes_per_type_probe.max(1) as u64;
        for _ in 0..probes {
            black_box(ctx.types.probe_properties(self.profile.type_probe_limit));
        }
        report.type_probes = probes;

        if let Some(dependencies) = ctx.dependencies {
            report.dependencies_resolved = dependencies.iter().filter(|name| ctx.registry.resolve(name).is_some()).count() as u64;
        }

        for i in 0..self.profile.incremental_probes {
            if ctx.registry.resolve(&format!("inc_{i}")).is_some() {
                report.incremental_hits += 1;
            }
        }

        Ok(report)
    }
}
