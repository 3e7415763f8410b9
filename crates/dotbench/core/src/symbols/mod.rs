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

//! Symbol resolution service
//!
//! One registry type with two lookup variants: a flat global table and a
//! parent-chained scope arena.

pub mod registry;

pub use registry::{RegistryPhase, ScopeId, SymbolRegistry};

use std::fmt;
use std::str::FromStr;

/// A named, typed, scoped declaration. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub name: String,
    pub type_tag: String,
    pub scope: u32,
}

impl Symbol {
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>, scope: u32) -> Self {
        Self {
            name: name.into(),
            type_tag: type_tag.into(),
            scope,
        }
    }
}

/// Lookup strategy of a [`SymbolRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResolutionMode {
    /// Single name table shared by every file
    #[default]
    Flat,
    /// Nested scopes queried innermost-first with parent fallback
    Chained,
}

impl fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => f.write_str("flat"),
            Self::Chained => f.write_str("chained"),
        }
    }
}

impl FromStr for ResolutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flat" => Ok(Self::Flat),
            "chained" | "scoped" => Ok(Self::Chained),
            other => Err(format!("unknown resolution mode '{other}', expected 'flat' or 'chained'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_mode_parsing() {
        assert_eq!("flat".parse::<ResolutionMode>(), Ok(ResolutionMode::Flat));
        assert_eq!("Chained".parse::<ResolutionMode>(), Ok(ResolutionMode::Chained));
        assert!("global".parse::<ResolutionMode>().is_err());
        assert_eq!(ResolutionMode::Chained.to_string(), "chained");
    }
}
