/*!
 * Blocked Set
 * Processes waiting on simulated I/O, keyed by wakeup deadline
 */

use crate::core::types::{Pid, TimeMs};
use crate::process::PcbHandle;
use std::sync::Arc;

struct BlockedEntry {
    handle: PcbHandle,
    wakeup_deadline_ms: TimeMs,
}

/// Unordered set of WAITING processes with their wakeup deadlines
///
/// Not internally locked: the engine lock guards every access.
pub struct BlockedSet {
    entries: Vec<BlockedEntry>,
}

impl BlockedSet {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Track a WAITING process until `wakeup_deadline_ms`
    pub fn insert(&mut self, handle: PcbHandle, wakeup_deadline_ms: TimeMs) {
        self.entries.push(BlockedEntry {
            handle,
            wakeup_deadline_ms,
        });
    }

    /// Drain every entry whose deadline has passed
    ///
    /// Wakeup order among simultaneously expired entries is unspecified.
    pub fn poll(&mut self, now_ms: TimeMs) -> Vec<PcbHandle> {
        let mut woken = Vec::new();
        self.entries.retain(|entry| {
            if now_ms >= entry.wakeup_deadline_ms {
                woken.push(Arc::clone(&entry.handle));
                false
            } else {
                true
            }
        });
        woken
    }

    /// Targeted removal; idempotent when the pid is absent
    pub fn remove(&mut self, pid: Pid) -> Option<PcbHandle> {
        let pos = self
            .entries
            .iter()
            .position(|entry| entry.handle.read().pid == pid)?;
        Some(self.entries.remove(pos).handle)
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.handle.read().pid == pid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BlockedSet {
    fn default() -> Self {
        Self::new()
    }
}
