/*!
 * Process Types
 * Process state machine and the observer-facing snapshot view
 */

use crate::core::types::{Pid, Priority, TimeMs};
use serde::{Deserialize, Serialize};

/// Process state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Process structure has been created but not yet admitted
    New,
    /// Process is in the ready queue, eligible for dispatch
    Ready,
    /// Process is occupying the CPU
    Running,
    /// Process is blocked on simulated I/O
    Waiting,
    /// Process has finished or was killed
    Terminated,
}

impl ProcessState {
    /// Check if process is ready
    #[inline(always)]
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, ProcessState::Ready)
    }

    /// Check if process is running
    #[inline(always)]
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, ProcessState::Running)
    }

    /// Check if process is waiting on simulated I/O
    #[inline(always)]
    #[must_use]
    pub const fn is_waiting(&self) -> bool {
        matches!(self, ProcessState::Waiting)
    }

    /// Check if process is terminated
    #[inline(always)]
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        matches!(self, ProcessState::Terminated)
    }
}

/// Point-in-time copy of one PCB, handed to observers
///
/// All timing fields are on the engine's simulated clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessSnapshot {
    pub pid: Pid,
    pub name: String,
    pub state: ProcessState,
    pub base_priority: Priority,
    pub effective_priority: Priority,
    pub burst_time_ms: TimeMs,
    pub remaining_time_ms: TimeMs,
    pub arrival_ms: TimeMs,
    pub wait_ms: TimeMs,
    pub turnaround_ms: TimeMs,
}
