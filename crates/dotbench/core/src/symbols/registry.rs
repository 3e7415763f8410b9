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

//! Shared symbol registry with a build/analysis phase contract
//!
//! # Phases
//! - **Build**: inserts and scope changes take the exclusive lock, one
//!   writer at a time.
//! - **Analysis**: entered by [`SymbolRegistry::seal`]. Lookups take the
//!   shared lock and run concurrently; every write is rejected with
//!   [`BenchError::RegistrySealed`].
//!
//! Both lookup modes share one scope arena. Flat mode keeps everything in
//! the root scope, chained mode walks parent handles outward from the
//! starting scope.

use super::{ResolutionMode, Symbol};
use crate::error::{BenchError, BenchResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// Handle to a scope inside a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    /// The outermost scope, present in every registry
    pub const ROOT: ScopeId = ScopeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Lifecycle phase of a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryPhase {
    Build,
    Analysis,
}

#[derive(Debug, Default)]
struct Scope {
    parent: Option<ScopeId>,
    symbols: HashMap<String, Arc<Symbol>>,
}

#[derive(Debug)]
struct RegistryState {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl RegistryState {
    fn lookup(&self, start: ScopeId, name: &str) -> Option<Arc<Symbol>> {
        let mut next = Some(start);
        while let Some(id) = next {
            let scope = self.scopes.get(id.index())?;
            if let Some(symbol) = scope.symbols.get(name) {
                return Some(Arc::clone(symbol));
            }
            next = scope.parent;
        }
        None
    }
}

/// Name-to-symbol service shared by every analysis worker
#[derive(Debug)]
pub struct SymbolRegistry {
    mode: ResolutionMode,
    state: RwLock<RegistryState>,
    sealed: AtomicBool,
}

impl SymbolRegistry {
    pub fn new(mode: ResolutionMode) -> Self {
        Self {
            mode,
            state: RwLock::new(RegistryState {
                scopes: vec![Scope::default()],
                current: ScopeId::ROOT,
            }),
            sealed: AtomicBool::new(false),
        }
    }

    pub fn flat() -> Self {
        Self::new(ResolutionMode::Flat)
    }

    pub fn chained() -> Self {
        Self::new(ResolutionMode::Chained)
    }

    pub fn mode(&self) -> ResolutionMode {
        self.mode
    }

    pub fn phase(&self) -> RegistryPhase {
        if self.sealed.load(Ordering::Acquire) { RegistryPhase::Analysis } else { RegistryPhase::Build }
    }

    pub fn is_sealed(&self) -> bool {
        self.phase() == RegistryPhase::Analysis
    }

    /// Ends the build phase. Idempotent.
    pub fn seal(&self) {
        // Taking the write lock orders the seal after every in-flight insert
        let state = self.state.write();
        if !self.sealed.swap(true, Ordering::AcqRel) {
            let symbols: usize = state.scopes.iter().map(|scope| scope.symbols.len()).sum();
            debug!(mode = %self.mode, symbols, scopes = state.scopes.len(), "Symbol registry sealed");
        }
    }

    /// Inserts into the current scope. Last writer wins: a symbol already
    /// bound to `name` in that scope is replaced and returned.
    pub fn insert(&self, name: impl Into<String>, type_tag: impl Into<String>, scope: u32) -> BenchResult<Option<Arc<Symbol>>> {
        self.insert_symbol(Symbol::new(name, type_tag, scope))
    }

    pub fn insert_symbol(&self, symbol: impl Into<Arc<Symbol>>) -> BenchResult<Option<Arc<Symbol>>> {
        let mut state = self.state.write();
        self.ensure_build_phase()?;
        let target = state.current;
        Ok(Self::bind(&mut state, target, symbol.into()))
    }

    /// Inserts into an explicit scope. Flat registries always use the root.
    pub fn insert_in(&self, scope_id: ScopeId, symbol: impl Into<Arc<Symbol>>) -> BenchResult<Option<Arc<Symbol>>> {
        let mut state = self.state.write();
        self.ensure_build_phase()?;
        let target = self.normalize(scope_id);
        if target.index() >= state.scopes.len() {
            return Err(BenchError::config(format!("unknown scope {}", target.0)));
        }
        Ok(Self::bind(&mut state, target, symbol.into()))
    }

    /// Opens a child of the current scope and makes it current.
    ///
    /// Flat registries have a single scope, so this returns the root.
    pub fn enter_scope(&self) -> BenchResult<ScopeId> {
        let mut state = self.state.write();
        self.ensure_build_phase()?;
        if self.mode == ResolutionMode::Flat {
            return Ok(ScopeId::ROOT);
        }

        let id = ScopeId(state.scopes.len() as u32);
        let parent = state.current;
        state.scopes.push(Scope {
            parent: Some(parent),
            symbols: HashMap::new(),
        });
        state.current = id;
        Ok(id)
    }

    /// Returns to the parent of the current scope; the root stays current.
    pub fn exit_scope(&self) -> BenchResult<ScopeId> {
        let mut state = self.state.write();
        self.ensure_build_phase()?;
        let current = state.current;
        if let Some(parent) = state.scopes[current.index()].parent {
            state.current = parent;
        }
        Ok(state.current)
    }

    pub fn current_scope(&self) -> ScopeId {
        self.state.read().current
    }

    /// Resolves `name` starting at the current scope
    pub fn resolve(&self, name: &str) -> Option<Arc<Symbol>> {
        let state = self.state.read();
        let start = state.current;
        state.lookup(start, name)
    }

    /// Resolves `name` starting at `scope_id`, walking parents in chained mode
    pub fn resolve_from(&self, scope_id: ScopeId, name: &str) -> Option<Arc<Symbol>> {
        self.state.read().lookup(self.normalize(scope_id), name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Number of bindings across all scopes
    pub fn len(&self) -> usize {
        self.state.read().scopes.iter().map(|scope| scope.symbols.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn scope_count(&self) -> usize {
        self.state.read().scopes.len()
    }

    fn ensure_build_phase(&self) -> BenchResult<()> {
        if self.sealed.load(Ordering::Acquire) { Err(BenchError::RegistrySealed) } else { Ok(()) }
    }

    fn normalize(&self, scope_id: ScopeId) -> ScopeId {
        match self.mode {
            ResolutionMode::Flat => ScopeId::ROOT,
            ResolutionMode::Chained => scope_id,
        }
    }

    fn bind(state: &mut RegistryState, target: ScopeId, symbol: Arc<Symbol>) -> Option<Arc<Symbol>> {
        let name = symbol.name.clone();
        let previous = state.scopes[target.index()].symbols.insert(name, symbol);
        if let Some(replaced) = &previous {
            trace!(name = %replaced.name, scope = target.0, "Symbol overwritten by later insert");
        }
        previous
    }
}

impl Default for SymbolRegistry {
    fn default() -> Self {
        Self::flat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_insert_then_resolve() {
        let registry = SymbolRegistry::flat();
        registry.insert("symbol_0_0", "function", 0).unwrap();

        let symbol = registry.resolve("symbol_0_0").unwrap();
        assert_eq!(symbol.name, "symbol_0_0");
        assert_eq!(symbol.type_tag, "function");
        assert_eq!(symbol.scope, 0);
        assert!(registry.resolve("never_inserted").is_none());
    }

    #[test]
    fn test_last_writer_wins() {
        let registry = SymbolRegistry::flat();
        assert!(registry.insert("dup", "function", 0).unwrap().is_none());

        let previous = registry.insert("dup", "variable", 3).unwrap().unwrap();
        assert_eq!(previous.type_tag, "function");

        let current = registry.resolve("dup").unwrap();
        assert_eq!(current.type_tag, "variable");
        assert_eq!(current.scope, 3);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_sealed_registry_rejects_writes() {
        let registry = SymbolRegistry::chained();
        registry.insert("before", "function", 0).unwrap();
        registry.seal();

        assert_eq!(registry.phase(), RegistryPhase::Analysis);
        assert_eq!(registry.insert("after", "function", 0), Err(BenchError::RegistrySealed));
        assert_eq!(registry.enter_scope(), Err(BenchError::RegistrySealed));
        assert!(registry.resolve("before").is_some());
    }

    #[test]
    fn test_chained_resolution_walks_three_levels() {
        let registry = SymbolRegistry::chained();
        registry.insert("outer_only", "variable", 0).unwrap();
        let middle = registry.enter_scope().unwrap();
        registry.insert("middle_only", "variable", 1).unwrap();
        let inner = registry.enter_scope().unwrap();
        registry.insert("inner_only", "variable", 2).unwrap();

        assert_eq!(registry.current_scope(), inner);
        assert_eq!(registry.scope_count(), 3);
        assert_eq!(registry.resolve("outer_only").unwrap().scope, 0);
        assert_eq!(registry.resolve("middle_only").unwrap().scope, 1);
        assert!(registry.resolve("absent_everywhere").is_none());

        // Lookups never descend into child scopes
        assert!(registry.resolve_from(middle, "inner_only").is_none());
        assert!(registry.resolve_from(ScopeId::ROOT, "middle_only").is_none());
    }

    #[test]
    fn test_inner_scope_shadows_outer() {
        let registry = SymbolRegistry::chained();
        registry.insert("x", "function", 0).unwrap();
        registry.enter_scope().unwrap();
        registry.insert("x", "variable", 1).unwrap();

        assert_eq!(registry.resolve("x").unwrap().type_tag, "variable");
        assert_eq!(registry.exit_scope().unwrap(), ScopeId::ROOT);
        assert_eq!(registry.resolve("x").unwrap().type_tag, "function");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_flat_mode_ignores_scopes() {
        let registry = SymbolRegistry::flat();
        assert_eq!(registry.enter_scope().unwrap(), ScopeId::ROOT);
        registry.insert_in(ScopeId(9), Symbol::new("a", "function", 4)).unwrap();
        assert_eq!(registry.scope_count(), 1);
        assert!(registry.resolve_from(ScopeId(9), "a").is_some());
    }

    #[test]
    fn test_concurrent_inserts_lose_nothing() {
        let registry = SymbolRegistry::flat();
        let count = 5_000;

        (0..count).into_par_iter().for_each(|i| {
            registry.insert(format!("concurrent_{i}"), "function", (i / 100) as u32).unwrap();
        });
        registry.seal();

        assert_eq!(registry.len(), count);
        let resolved = (0..count).into_par_iter().filter(|i| registry.contains(&format!("concurrent_{i}"))).count();
        assert_eq!(resolved, count);
    }
}
