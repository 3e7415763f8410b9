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

//! dotbench Tools Library
//!
//! Command implementations and report formatting for the `dotbench` binary.

pub mod cli;
pub mod memory;
pub mod report;

// Re-export the command entry points
pub use cli::compare::{CompareArgs, run_compare};
pub use cli::lookup::{LookupArgs, run_lookup};
