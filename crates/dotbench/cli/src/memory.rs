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

//! Resident memory of the benchmark process

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Samples the resident set size of the current process
pub struct ProcessMemory {
    system: System,
    pid: Pid,
}

impl ProcessMemory {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            pid: Pid::from_u32(std::process::id()),
        }
    }

    /// Current resident memory in bytes, or `None` when the platform does not report it
    pub fn resident_bytes(&mut self) -> Option<u64> {
        self.system
            .refresh_processes_specifics(ProcessesToUpdate::Some(&[self.pid]), true, ProcessRefreshKind::nothing().with_memory());
        match self.system.process(self.pid) {
            Some(process) => Some(process.memory()),
            None => {
                tracing::warn!(pid = self.pid.as_u32(), "Process not found in sysinfo");
                None
            }
        }
    }
}

impl Default for ProcessMemory {
    fn default() -> Self {
        Self::new()
    }
}

/// Signed change between two samples in MB
pub fn delta_mb(before: Option<u64>, after: Option<u64>) -> Option<f64> {
    Some((after? as f64 - before? as f64) / BYTES_PER_MB)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resident_memory_is_reported() {
        let mut memory = ProcessMemory::new();
        let before = memory.resident_bytes().unwrap();
        assert!(before > 0);

        let ballast = vec![1u8; 32 * 1024 * 1024];
        let after = memory.resident_bytes().unwrap();
        assert!(ballast.iter().all(|&b| b == 1));
        assert!(delta_mb(Some(before), Some(after)).unwrap() > 16.0);
    }

    #[test]
    fn test_delta_is_signed_and_optional() {
        assert_eq!(delta_mb(Some(3 * 1_048_576), Some(1_048_576)), Some(-2.0));
        assert_eq!(delta_mb(None, Some(1)), None);
        assert_eq!(delta_mb(Some(1), None), None);
    }
}
