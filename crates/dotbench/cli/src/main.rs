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

//! dotbench CLI Tool
//!
//! Main entry point for the dotbench command-line interface.

use clap::{ArgAction, Parser, Subcommand};
use dotbench_cli::{CompareArgs, LookupArgs, run_compare, run_lookup};
use tracing::Level;

#[derive(Parser)]
#[command(name = "dotbench")]
#[command(about = "dotbench - Synthetic compiler-analysis scheduling benchmark")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare serial, bounded-parallel and high-concurrency analysis
    Compare(CompareArgs),
    /// Symbol registry insert/lookup micro-benchmark
    Lookup(LookupArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    match cli.command {
        Commands::Compare(args) => run_compare(args)?,
        Commands::Lookup(args) => run_lookup(args)?,
    }

    Ok(())
}
