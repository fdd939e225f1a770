/*!
 * Control and Admission API
 * Synchronous process operations; none of these suspend
 *
 * Not-found and illegal-state outcomes are logged and leave core state
 * untouched; invalid arguments are surfaced to the caller.
 */

use super::{Engine, EngineConfig};
use crate::core::errors::SchedError;
use crate::core::types::{Pid, Priority, SimResult, TimeMs, PRIORITY_MIN};
use crate::process::{Pcb, PcbHandle, ProcessSnapshot, ProcessState};
use log::{info, warn};
use std::sync::atomic::Ordering;
use std::sync::Arc;

impl Engine {
    /// Reconfigure the time quantum and aging factor
    ///
    /// Takes effect on the next iteration; both values must be strictly
    /// positive.
    pub fn configure(&self, time_quantum_ms: TimeMs, aging_factor_sec: u64) -> SimResult<()> {
        if time_quantum_ms == 0 {
            return Err(SchedError::InvalidArgument(
                "time quantum must be positive".into(),
            ));
        }
        if aging_factor_sec == 0 {
            return Err(SchedError::InvalidArgument(
                "aging factor must be positive".into(),
            ));
        }
        *self.config.write() = EngineConfig {
            time_quantum_ms,
            aging_factor_sec,
        };
        info!(
            "reconfigured: quantum {} ms, aging factor {} s",
            time_quantum_ms, aging_factor_sec
        );
        Ok(())
    }

    /// Admit a new process and enqueue it as READY
    ///
    /// Names longer than 31 characters are truncated. Rejects a priority
    /// outside [0, 10] or a non-positive burst.
    pub fn create(
        &self,
        name: &str,
        priority: Priority,
        burst_time_ms: TimeMs,
    ) -> SimResult<ProcessSnapshot> {
        if priority > PRIORITY_MIN {
            return Err(SchedError::InvalidArgument(format!(
                "priority {} out of range 0-{}",
                priority, PRIORITY_MIN
            )));
        }
        if burst_time_ms == 0 {
            return Err(SchedError::InvalidArgument(
                "burst time must be positive".into(),
            ));
        }

        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);

        let snapshot = {
            let mut core = self.core.lock();
            let handle = Pcb::handle(pid, name, priority, burst_time_ms, core.sim_now_ms);
            handle.write().state = ProcessState::Ready;
            core.processes.push(Arc::clone(&handle));
            self.index.insert(pid, Arc::clone(&handle));
            self.ready.enqueue(Arc::clone(&handle));
            let snapshot = handle.read().snapshot();
            snapshot
        };

        info!(
            "created process {} ({}): burst {} ms, priority {}",
            pid, snapshot.name, burst_time_ms, priority
        );
        self.publish_stats();
        Ok(snapshot)
    }

    /// Terminate a process regardless of its current state
    ///
    /// A RUNNING target keeps the slot until the engine's next
    /// post-execute decision; its burst no longer advances.
    pub fn kill(&self, pid: Pid) {
        let Some(handle) = self.lookup(pid) else {
            warn!("kill: process {} not found", pid);
            return;
        };

        {
            let mut core = self.core.lock();
            let state = handle.read().state;
            match state {
                ProcessState::Terminated => {
                    warn!("kill: process {} already terminated", pid);
                    return;
                }
                ProcessState::Ready => {
                    self.ready.remove(pid);
                }
                ProcessState::Waiting => {
                    core.blocked.remove(pid);
                }
                ProcessState::Running | ProcessState::New => {}
            }
            let now = core.sim_now_ms;
            handle.write().terminate(now);
        }

        info!("killed process {}", pid);
        self.publish_stats();
    }

    /// Move a RUNNING or READY process to WAITING for `duration_ms`
    ///
    /// A RUNNING target releases the CPU at the engine's next
    /// post-execute decision. Other states are left untouched.
    pub fn block(&self, pid: Pid, duration_ms: TimeMs) {
        let Some(handle) = self.lookup(pid) else {
            warn!("block: process {} not found", pid);
            return;
        };

        {
            let mut core = self.core.lock();
            let state = handle.read().state;
            match state {
                ProcessState::Running => {}
                ProcessState::Ready => {
                    self.ready.remove(pid);
                }
                _ => {
                    warn!("block: process {} is not RUNNING or READY", pid);
                    return;
                }
            }
            let deadline = core.sim_now_ms + duration_ms;
            {
                let mut pcb = handle.write();
                pcb.state = ProcessState::Waiting;
                pcb.wakeup_deadline_ms = deadline;
            }
            core.blocked.insert(Arc::clone(&handle), deadline);
        }

        info!("blocked process {} for {} ms", pid, duration_ms);
        self.publish_stats();
    }

    /// Return a WAITING process to READY ahead of its deadline
    pub fn unblock(&self, pid: Pid) {
        let Some(handle) = self.lookup(pid) else {
            warn!("unblock: process {} not found", pid);
            return;
        };

        {
            let mut core = self.core.lock();
            if !handle.read().state.is_waiting() {
                warn!("unblock: process {} is not WAITING", pid);
                return;
            }
            core.blocked.remove(pid);
            let now = core.sim_now_ms;
            {
                let mut pcb = handle.write();
                pcb.state = ProcessState::Ready;
                pcb.last_ready_ms = now;
                pcb.wakeup_deadline_ms = 0;
            }
            self.ready.enqueue(Arc::clone(&handle));
        }

        info!("unblocked process {}", pid);
        self.publish_stats();
    }

    /// Stable copy of one process's current state
    #[must_use]
    pub fn process(&self, pid: Pid) -> Option<ProcessSnapshot> {
        self.lookup(pid).map(|handle| handle.read().snapshot())
    }

    /// Stable copies of every process, in creation order
    #[must_use]
    pub fn processes(&self) -> Vec<ProcessSnapshot> {
        self.core
            .lock()
            .processes
            .iter()
            .map(|handle| handle.read().snapshot())
            .collect()
    }

    fn lookup(&self, pid: Pid) -> Option<PcbHandle> {
        self.index.get(&pid).map(|entry| Arc::clone(entry.value()))
    }
}
