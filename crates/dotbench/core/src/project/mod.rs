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

//! Synthetic project model: source files, the shared type table and the
//! cross-file dependency map

pub mod builder;

pub use builder::ProjectBuilder;

use crate::ast::Ast;
use crate::error::{BenchError, BenchResult};
use crate::symbols::{Symbol, SymbolRegistry};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Structural description of a named type. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub name: String,
    pub properties: BTreeMap<String, String>,
    pub methods: Vec<String>,
}

impl TypeInfo {
    /// `Type_<index>` with `prop_<k>: string` properties and `method_<k>` methods
    pub fn synthetic(index: usize, property_count: usize, method_count: usize) -> Self {
        Self {
            name: format!("Type_{index}"),
            properties: (0..property_count).map(|k| (format!("prop_{k}"), "string".to_string())).collect(),
            methods: (0..method_count).map(|k| format!("method_{k}")).collect(),
        }
    }
}

/// Shared type table, written during the build phase and read-only after
/// [`TypeTable::seal`]
#[derive(Debug, Default)]
pub struct TypeTable {
    types: RwLock<HashMap<String, Arc<TypeInfo>>>,
    sealed: AtomicBool,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, info: TypeInfo) -> BenchResult<()> {
        let mut types = self.types.write();
        if self.sealed.load(Ordering::Acquire) {
            return Err(BenchError::RegistrySealed);
        }
        types.insert(info.name.clone(), Arc::new(info));
        Ok(())
    }

    pub fn seal(&self) {
        let _types = self.types.write();
        self.sealed.store(true, Ordering::Release);
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    pub fn get(&self, name: &str) -> Option<Arc<TypeInfo>> {
        self.types.read().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Simulated type-check probe: visits property entries under the shared
    /// lock and stops after `limit` of them. Returns the number visited.
    pub fn probe_properties(&self, limit: usize) -> usize {
        let types = self.types.read();
        let mut visited = 0;
        for info in types.values() {
            for (name, type_name) in &info.properties {
                std::hint::black_box((name, type_name));
                visited += 1;
                if visited >= limit {
                    return visited;
                }
            }
        }
        visited
    }
}

/// A synthetic source file
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub content: Vec<u8>,
    pub ast: Ast,
    /// Declarations of this file, shared with the project registry
    pub symbols: Vec<Arc<Symbol>>,
}

impl SourceFile {
    /// Raw content size in bytes
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Files plus the shared resolution state they are analyzed against
#[derive(Debug)]
pub struct Project {
    files: Vec<SourceFile>,
    registry: SymbolRegistry,
    types: TypeTable,
    dependencies: HashMap<String, Vec<String>>,
    seed: u64,
}

impl Project {
    pub fn new(files: Vec<SourceFile>, registry: SymbolRegistry, types: TypeTable, dependencies: HashMap<String, Vec<String>>, seed: u64) -> Self {
        Self {
            files,
            registry,
            types,
            dependencies,
            seed,
        }
    }

    /// Files in serial processing order
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn registry(&self) -> &SymbolRegistry {
        &self.registry
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn dependencies_for(&self, path: &str) -> Option<&[String]> {
        self.dependencies.get(path).map(Vec::as_slice)
    }

    pub fn dependency_count(&self) -> usize {
        self.dependencies.values().map(Vec::len).sum()
    }

    /// Seed the file trees were generated from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Sum of AST sizes over all files
    pub fn total_nodes(&self) -> usize {
        self.files.iter().map(|file| file.ast.len()).sum()
    }

    pub fn total_content_bytes(&self) -> usize {
        self.files.iter().map(SourceFile::size).sum()
    }

    /// True once both shared tables have left the build phase
    pub fn is_sealed(&self) -> bool {
        self.registry.is_sealed() && self.types.is_sealed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_type_info() {
        let info = TypeInfo::synthetic(7, 3, 2);
        assert_eq!(info.name, "Type_7");
        assert_eq!(info.properties.get("prop_2").map(String::as_str), Some("string"));
        assert_eq!(info.methods, vec!["method_0", "method_1"]);
    }

    #[test]
    fn test_type_probe_is_capped() {
        let table = TypeTable::new();
        for i in 0..20 {
            table.register(TypeInfo::synthetic(i, 10, 10)).unwrap();
        }
        assert_eq!(table.probe_properties(5), 5);

        let small = TypeTable::new();
        small.register(TypeInfo::synthetic(0, 3, 0)).unwrap();
        assert_eq!(small.probe_properties(5), 3);
    }

    #[test]
    fn test_sealed_type_table_rejects_registration() {
        let table = TypeTable::new();
        table.register(TypeInfo::synthetic(0, 1, 1)).unwrap();
        table.seal();
        assert_eq!(table.register(TypeInfo::synthetic(1, 1, 1)), Err(BenchError::RegistrySealed));
        assert!(table.get("Type_0").is_some());
        assert_eq!(table.len(), 1);
    }
}
