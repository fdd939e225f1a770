/*!
 * Engine Lifecycle and Iteration
 * The per-quantum scheduling step and the worker thread that paces it
 *
 * One iteration: wake expired I/O waiters, age the ready queue, dispatch,
 * execute a slice, decide the running process's fate, account, publish.
 * The worker holds no lock during the simulated execution window, so
 * control commands can land on a RUNNING process mid-slice; the engine
 * observes them at its post-execute decision.
 */

use super::Engine;
use crate::core::errors::SchedError;
use crate::core::types::{Pid, SimResult, TimeMs};
use crate::process::{PcbHandle, ProcessState};
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Every tenth post-execute evaluation fires a synthetic I/O event
const IO_EVENT_PERIOD: u64 = 10;

/// Processes this close to completion are not blocked for I/O
const IO_REMAINING_FLOOR: TimeMs = 500;

/// Synthetic I/O duration bounds, drawn uniformly from [min, max)
const IO_DURATION_MIN_MS: TimeMs = 100;
const IO_DURATION_MAX_MS: TimeMs = 300;

/// Poll interval of a paused worker
const PAUSE_POLL_MS: u64 = 10;

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Stopped,
    Running,
    Paused,
}

impl EngineState {
    pub(super) const fn as_u8(self) -> u8 {
        match self {
            EngineState::Stopped => 0,
            EngineState::Running => 1,
            EngineState::Paused => 2,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            1 => EngineState::Running,
            2 => EngineState::Paused,
            _ => EngineState::Stopped,
        }
    }
}

/// Result of one engine iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// Pid that occupied the CPU for the slice, if any was dispatchable
    pub executed: Option<Pid>,
    /// Simulated milliseconds this iteration advanced the clock
    pub advanced_ms: TimeMs,
}

/// Dispatch decision carried across the execution window
struct IterationPlan {
    occupant: Option<PcbHandle>,
    /// Planned slice while occupied, otherwise one idle quantum
    window_ms: TimeMs,
}

impl Engine {
    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> EngineState {
        EngineState::from_u8(self.lifecycle.load(Ordering::Acquire))
    }

    fn set_state(&self, state: EngineState) {
        self.lifecycle.store(state.as_u8(), Ordering::Release);
    }

    /// Launch the worker, or resume a paused one
    ///
    /// Idempotent while RUNNING. Restarting after `stop` resumes with
    /// all process state intact. The worker keeps running until `stop`;
    /// callers own that shutdown.
    pub fn start(&self) -> SimResult<()> {
        let mut slot = self.worker.lock();
        match self.state() {
            EngineState::Running if slot.is_some() => return Ok(()),
            EngineState::Paused => {
                self.set_state(EngineState::Running);
                info!("engine resumed");
                return Ok(());
            }
            _ => {}
        }

        // Reap the worker left over from a previous stop
        if let Some(handle) = slot.take() {
            let _ = handle.join();
        }

        self.set_state(EngineState::Running);
        let engine = self.clone();
        let handle = thread::Builder::new()
            .name("schedsim-worker".into())
            .spawn(move || worker_loop(engine))
            .map_err(|e| {
                self.set_state(EngineState::Stopped);
                SchedError::ResourceExhausted(format!("failed to spawn worker: {}", e))
            })?;
        *slot = Some(handle);

        info!("engine started");
        Ok(())
    }

    /// Suspend scheduling work, keeping the worker and all PCB state
    pub fn pause(&self) {
        if self
            .lifecycle
            .compare_exchange(
                EngineState::Running.as_u8(),
                EngineState::Paused.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
        {
            info!("engine paused");
        }
    }

    /// Stop the worker; at most one further iteration completes
    ///
    /// Process state is retained and a later `start` resumes with it.
    pub fn stop(&self) {
        self.set_state(EngineState::Stopped);
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            // A callback running on the worker may itself call stop;
            // the worker exits on its own right after.
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
        info!("engine stopped");
    }

    /// Perform one full scheduling iteration with a zero-length
    /// execution window
    ///
    /// Advances the simulated clock by the dispatched slice, or by a
    /// full quantum when no process was dispatchable. The worker drives
    /// the same iteration with a wall-clock window; tests drive this
    /// directly.
    pub fn tick(&self) -> TickOutcome {
        let plan = self.begin_iteration();
        self.finish_iteration(plan)
    }

    /// Wake, age, and dispatch; leaves the slot occupant RUNNING and
    /// returns the planned execution window
    fn begin_iteration(&self) -> IterationPlan {
        let config = self.config();
        let quantum = config.time_quantum_ms;

        let mut core = self.core.lock();
        let now = core.sim_now_ms;

        // Wake expired I/O waiters
        for handle in core.blocked.poll(now) {
            {
                let mut pcb = handle.write();
                pcb.state = ProcessState::Ready;
                pcb.last_ready_ms = now;
                pcb.wakeup_deadline_ms = 0;
                debug!("process {} ({}) woke up", pcb.pid, pcb.name);
            }
            self.ready.enqueue(handle);
        }

        // Age queued processes to prevent starvation
        self.ready.apply_aging(config.aging_factor_sec, now);

        // Dispatch when the slot is free or its occupant is done
        let slot_free = core
            .running
            .as_ref()
            .map_or(true, |h| h.read().state.is_terminated());
        if slot_free {
            core.running = None;
            while let Some(handle) = self.ready.dequeue() {
                let pid = {
                    let mut pcb = handle.write();
                    if pcb.state.is_terminated() {
                        continue; // killed while queued
                    }
                    pcb.state = ProcessState::Running;
                    pcb.pid
                };
                if core.last_dispatched != Some(pid) {
                    core.context_switches += 1;
                }
                core.last_dispatched = Some(pid);
                debug!("dispatched process {}", pid);
                core.running = Some(handle);
                break;
            }
        }

        let window_ms = match core.running {
            Some(ref handle) => quantum.min(handle.read().remaining_time_ms),
            None => quantum,
        };

        IterationPlan {
            occupant: core.running.clone(),
            window_ms,
        }
    }

    /// Post-execute decision, accounting, and snapshot publication
    fn finish_iteration(&self, plan: IterationPlan) -> TickOutcome {
        let window = plan.window_ms;
        let mut core = self.core.lock();
        core.sim_now_ms += window;
        let now = core.sim_now_ms;

        let executed = if let Some(handle) = plan.occupant {
            // The slot was occupied for the whole window
            core.cpu_busy_ms += window;

            // Burst advances only if the process is still RUNNING; a
            // kill or block that landed mid-window stops it
            handle.write().advance(window);

            // Wait accrues for processes that sat READY through the
            // slice, before the occupant is re-enqueued
            for p in &core.processes {
                p.write().accrue_wait(window);
            }

            core.io_eval_count += 1;
            let io_fires = core.io_eval_count % IO_EVENT_PERIOD == 0;

            let pid = handle.read().pid;
            let state = handle.read().state;
            match state {
                ProcessState::Terminated => {
                    // Burst complete, or killed mid-window
                    handle.write().terminate(now);
                    info!("process {} terminated", pid);
                }
                ProcessState::Running
                    if io_fires && handle.read().remaining_time_ms > IO_REMAINING_FLOOR =>
                {
                    let duration = core.rng.gen_range(IO_DURATION_MIN_MS..IO_DURATION_MAX_MS);
                    let deadline = now + duration;
                    {
                        let mut pcb = handle.write();
                        pcb.state = ProcessState::Waiting;
                        pcb.wakeup_deadline_ms = deadline;
                    }
                    core.blocked.insert(Arc::clone(&handle), deadline);
                    debug!("process {} blocked for {} ms of simulated I/O", pid, duration);
                }
                ProcessState::Running => {
                    // Preempted at quantum expiry
                    {
                        let mut pcb = handle.write();
                        pcb.state = ProcessState::Ready;
                        pcb.last_ready_ms = now;
                    }
                    self.ready.enqueue(Arc::clone(&handle));
                }
                ProcessState::Waiting => {
                    // Moved to WAITING by an external command; already in
                    // the blocked set
                }
                ProcessState::Ready | ProcessState::New => {
                    // Blocked and unblocked again mid-window; already
                    // back in the queue
                }
            }
            core.running = None;

            Some(pid)
        } else {
            core.idle_ms += window;
            None
        };

        // Refresh turnaround for everything still in flight
        for p in &core.processes {
            p.write().update_turnaround(now);
        }
        drop(core);

        self.publish_stats();

        TickOutcome {
            executed,
            advanced_ms: window,
        }
    }
}

fn worker_loop(engine: Engine) {
    debug!("worker thread running");
    loop {
        match engine.state() {
            EngineState::Stopped => break,
            EngineState::Paused => thread::sleep(Duration::from_millis(PAUSE_POLL_MS)),
            EngineState::Running => {
                let plan = engine.begin_iteration();
                // Execution window: the occupant is observably RUNNING
                // and control commands can interleave
                thread::sleep(Duration::from_millis(plan.window_ms.max(1)));
                engine.finish_iteration(plan);
            }
        }
    }
    debug!("worker thread exited");
}
