/*!
 * Statistics Snapshot
 * Consistent point-in-time aggregates over the all-processes list
 */

use super::{Engine, EngineCore};
use crate::core::types::TimeMs;
use crate::process::ProcessState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Callback invoked with every published snapshot
pub type StatsCallback = Arc<dyn Fn(StatsSnapshot) + Send + Sync>;

/// Aggregate scheduler statistics
///
/// CPU utilisation is the running ratio of busy to total simulated time;
/// averages are taken over the total process count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StatsSnapshot {
    pub total_processes: usize,
    pub running_processes: usize,
    pub ready_processes: usize,
    pub waiting_processes: usize,
    pub terminated_processes: usize,
    pub context_switches: u64,
    pub cpu_busy_ms: TimeMs,
    pub idle_ms: TimeMs,
    pub cpu_utilization: f64,
    pub avg_wait_ms: f64,
    pub avg_turnaround_ms: f64,
}

impl Engine {
    /// Latest published snapshot
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.latest_stats.read().clone()
    }

    /// Register the snapshot consumer, replacing any previous one
    ///
    /// The callback runs on the publishing thread after the engine lock
    /// is released; it should return promptly.
    pub fn set_stats_callback(&self, callback: impl Fn(StatsSnapshot) + Send + Sync + 'static) {
        *self.stats_callback.write() = Some(Arc::new(callback));
    }

    /// Drop the registered snapshot consumer
    pub fn clear_stats_callback(&self) {
        *self.stats_callback.write() = None;
    }

    /// Recompute, store, and deliver a fresh snapshot
    pub(super) fn publish_stats(&self) {
        let snapshot = {
            let core = self.core.lock();
            compute(&core)
        };
        *self.latest_stats.write() = snapshot.clone();

        let callback = self.stats_callback.read().clone();
        if let Some(callback) = callback {
            callback(snapshot);
        }
    }
}

/// Single pass over the all-processes list under the engine lock
fn compute(core: &EngineCore) -> StatsSnapshot {
    let mut snapshot = StatsSnapshot {
        total_processes: core.processes.len(),
        context_switches: core.context_switches,
        cpu_busy_ms: core.cpu_busy_ms,
        idle_ms: core.idle_ms,
        ..Default::default()
    };

    let mut total_wait: u64 = 0;
    let mut total_turnaround: u64 = 0;

    for handle in &core.processes {
        let pcb = handle.read();
        match pcb.state {
            ProcessState::Running => snapshot.running_processes += 1,
            ProcessState::Ready => snapshot.ready_processes += 1,
            ProcessState::Waiting => snapshot.waiting_processes += 1,
            ProcessState::Terminated => snapshot.terminated_processes += 1,
            ProcessState::New => {}
        }
        total_wait += pcb.wait_ms;
        total_turnaround += pcb.turnaround_ms;
    }

    if snapshot.total_processes > 0 {
        snapshot.avg_wait_ms = total_wait as f64 / snapshot.total_processes as f64;
        snapshot.avg_turnaround_ms = total_turnaround as f64 / snapshot.total_processes as f64;
    }

    let span = core.cpu_busy_ms + core.idle_ms;
    if span > 0 {
        snapshot.cpu_utilization = 100.0 * core.cpu_busy_ms as f64 / span as f64;
    }

    snapshot
}
