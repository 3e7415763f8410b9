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

//! Lookup command: symbol registry micro-benchmark

use crate::report::LookupReport;
use anyhow::Context;
use clap::Args;
use dotbench_core::{ResolutionMode, Symbol, SymbolRegistry};
use std::hint::black_box;
use std::time::Instant;

/// Arguments for the lookup command
#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    /// Symbols to insert
    #[arg(long, default_value = "10000")]
    pub symbols: usize,

    /// Lookups to perform, cycling over the inserted names
    #[arg(long, default_value = "50000")]
    pub lookups: usize,

    /// Symbols per scope level; chained registries nest one scope per level
    #[arg(long, default_value = "100")]
    pub per_scope: usize,

    /// Symbol registry mode (flat or chained)
    #[arg(long, default_value = "flat")]
    pub mode: ResolutionMode,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Inserts the symbols, seals, and times the lookups
pub fn lookup(args: &LookupArgs) -> anyhow::Result<LookupReport> {
    anyhow::ensure!(args.symbols > 0, "--symbols must be positive");
    anyhow::ensure!(args.per_scope > 0, "--per-scope must be positive");

    let registry = SymbolRegistry::new(args.mode);
    let insert_started = Instant::now();

    let levels = args.symbols.div_ceil(args.per_scope);
    let mut scopes = vec![registry.current_scope()];
    for _ in 1..levels {
        scopes.push(registry.enter_scope()?);
    }

    for i in 0..args.symbols {
        let level = i / args.per_scope;
        let type_tag = if i % 2 == 0 { "function" } else { "variable" };
        let scope = scopes.get(level).copied().context("scope level out of range")?;
        registry.insert_in(scope, Symbol::new(format!("symbol_{i}"), type_tag, level as u32))?;
    }
    registry.seal();
    let insert_elapsed = insert_started.elapsed();

    let lookup_started = Instant::now();
    let mut found = 0;
    for i in 0..args.lookups {
        if black_box(registry.resolve(&format!("symbol_{}", i % args.symbols))).is_some() {
            found += 1;
        }
    }
    let lookup_elapsed = lookup_started.elapsed();

    Ok(LookupReport::new(args.mode, registry.len(), registry.scope_count(), args.lookups, found, insert_elapsed, lookup_elapsed))
}

/// Execute the lookup command
pub fn run_lookup(args: LookupArgs) -> anyhow::Result<()> {
    let report = lookup(&args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
