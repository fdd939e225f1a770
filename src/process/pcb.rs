/*!
 * Process Control Block
 * Per-process identity, timing counters, and state transitions
 */

use super::types::{ProcessSnapshot, ProcessState};
use crate::core::types::{Pid, Priority, TimeMs, NAME_MAX};
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared handle to a PCB
///
/// The all-processes list is the strong owner; the ready queue, the
/// blocked set, and the running slot hold additional handles only while
/// the PCB participates in them.
pub type PcbHandle = Arc<RwLock<Pcb>>;

/// Process control block
///
/// Timing fields are on the engine's simulated clock. `wakeup_deadline_ms`
/// is meaningful only while `state` is `Waiting`.
#[derive(Debug, Clone)]
pub struct Pcb {
    pub pid: Pid,
    pub name: String,
    pub base_priority: Priority,
    pub effective_priority: Priority,
    pub burst_time_ms: TimeMs,
    pub remaining_time_ms: TimeMs,
    pub state: ProcessState,
    pub arrival_ms: TimeMs,
    pub wait_ms: TimeMs,
    pub turnaround_ms: TimeMs,
    pub wakeup_deadline_ms: TimeMs,
    pub last_ready_ms: TimeMs,
}

impl Pcb {
    /// Create a PCB in state NEW
    ///
    /// Names longer than 31 characters are truncated.
    #[must_use]
    pub fn new(
        pid: Pid,
        name: &str,
        priority: Priority,
        burst_time_ms: TimeMs,
        arrival_ms: TimeMs,
    ) -> Self {
        Self {
            pid,
            name: name.chars().take(NAME_MAX).collect(),
            base_priority: priority,
            effective_priority: priority,
            burst_time_ms,
            remaining_time_ms: burst_time_ms,
            state: ProcessState::New,
            arrival_ms,
            wait_ms: 0,
            turnaround_ms: 0,
            wakeup_deadline_ms: 0,
            last_ready_ms: arrival_ms,
        }
    }

    /// Create a shared handle to a new PCB
    #[must_use]
    pub fn handle(
        pid: Pid,
        name: &str,
        priority: Priority,
        burst_time_ms: TimeMs,
        arrival_ms: TimeMs,
    ) -> PcbHandle {
        Arc::new(RwLock::new(Self::new(
            pid,
            name,
            priority,
            burst_time_ms,
            arrival_ms,
        )))
    }

    /// Consume up to `slice_ms` of the remaining burst
    ///
    /// Legal only while RUNNING; a no-op otherwise. Transitions to
    /// TERMINATED when the burst is exhausted. Returns the slice actually
    /// consumed; queue membership is untouched.
    pub fn advance(&mut self, slice_ms: TimeMs) -> TimeMs {
        if !self.state.is_running() {
            return 0;
        }
        let consumed = slice_ms.min(self.remaining_time_ms);
        self.remaining_time_ms -= consumed;
        if self.remaining_time_ms == 0 {
            self.state = ProcessState::Terminated;
        }
        consumed
    }

    /// Accumulate time spent in READY; a no-op in any other state
    pub fn accrue_wait(&mut self, delta_ms: TimeMs) {
        if self.state.is_ready() {
            self.wait_ms += delta_ms;
        }
    }

    /// Refresh turnaround time; frozen once TERMINATED
    pub fn update_turnaround(&mut self, now_ms: TimeMs) {
        if !self.state.is_terminated() {
            self.turnaround_ms = now_ms.saturating_sub(self.arrival_ms);
        }
    }

    /// Transition to TERMINATED and freeze turnaround at `now_ms`
    pub fn terminate(&mut self, now_ms: TimeMs) {
        self.turnaround_ms = now_ms.saturating_sub(self.arrival_ms);
        self.state = ProcessState::Terminated;
    }

    /// Recompute effective priority from accumulated waiting time
    ///
    /// `effective = base - waited_sec / aging_factor_sec`, clamped to 0.
    /// Aging never lowers a process below its base priority and a zero
    /// factor disables it.
    pub fn recompute_effective_priority(&mut self, aging_factor_sec: u64, waited_sec: u64) {
        if aging_factor_sec == 0 {
            return;
        }
        let boost = (waited_sec / aging_factor_sec).min(self.base_priority as u64) as Priority;
        self.effective_priority = self.base_priority - boost;
    }

    /// Copy out the observer-facing view
    #[must_use]
    pub fn snapshot(&self) -> ProcessSnapshot {
        ProcessSnapshot {
            pid: self.pid,
            name: self.name.clone(),
            state: self.state,
            base_priority: self.base_priority,
            effective_priority: self.effective_priority,
            burst_time_ms: self.burst_time_ms,
            remaining_time_ms: self.remaining_time_ms,
            arrival_ms: self.arrival_ms,
            wait_ms: self.wait_ms,
            turnaround_ms: self.turnaround_ms,
        }
    }
}
