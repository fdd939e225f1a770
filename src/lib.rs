/*!
 * schedsim
 * Simulated preemptive CPU scheduler: priority scheduling with aging,
 * synthetic I/O blocking, and consistent statistics snapshots
 */

pub mod control;
pub mod core;
pub mod process;
pub mod sched;

pub use crate::core::errors::SchedError;
pub use crate::core::types::{Pid, Priority, SimResult, TimeMs};
pub use process::{Pcb, PcbHandle, ProcessSnapshot, ProcessState};
pub use sched::{
    Engine, EngineConfig, EngineState, StatsCallback, StatsSnapshot, TickOutcome,
};
