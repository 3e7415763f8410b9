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

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// Atomic cancellation signal with optional deadline
///
/// # Thread Safety
/// - `AtomicBool` carries the cancellation status
/// - `Mutex<Option<String>>` protects the cancellation reason
///
/// Clones share the same signal.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    created_at: Instant,
    timeout: Option<Duration>,
    cancellation_reason: Arc<Mutex<Option<String>>>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    /// Token that only fires when cancelled explicitly
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            created_at: Instant::now(),
            timeout: None,
            cancellation_reason: Arc::new(Mutex::new(None)),
        }
    }

    /// Token that also fires once `timeout` has elapsed since creation
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout: Some(timeout), ..Self::new() }
    }

    /// Checks cancellation status, enforcing the deadline if one is set
    pub fn is_cancelled(&self) -> bool {
        self.check_timeout();
        self.cancelled.load(Ordering::Acquire)
    }

    /// Cancel with an optional reason. The first reason recorded wins.
    pub fn cancel(&self, reason: Option<&str>) {
        if let Some(reason) = reason {
            let mut slot = self.cancellation_reason.lock();
            if slot.is_none() {
                *slot = Some(reason.to_string());
            }
        }
        self.cancelled.store(true, Ordering::Release);
    }

    /// Time since token creation
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    fn check_timeout(&self) -> bool {
        match self.timeout {
            Some(timeout) if self.age() > timeout => {
                self.cancel(Some("Timeout"));
                true
            }
            _ => false,
        }
    }

    pub fn cancellation_reason(&self) -> Option<String> {
        self.cancellation_reason.lock().clone()
    }
}
