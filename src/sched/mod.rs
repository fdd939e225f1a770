/*!
 * Scheduler Engine
 * Preemptive priority scheduling with aging and simulated I/O
 *
 * # Organization
 *
 * - **ready**: priority-ordered ready queue with aging support
 * - **blocked**: processes waiting on simulated I/O deadlines
 * - **operations**: control/admission API (create, kill, block, unblock)
 * - **stats**: consistent statistics snapshots and publication
 * - **worker**: engine lifecycle and the per-quantum iteration
 */

use crate::core::types::{Pid, TimeMs};
use crate::process::PcbHandle;
use ahash::RandomState;
use blocked::BlockedSet;
use dashmap::DashMap;
use log::info;
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ready::ReadyQueue;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, AtomicU8};
use std::sync::Arc;
use std::thread::JoinHandle;

mod blocked;
mod operations;
mod ready;
mod stats;
mod worker;

pub use stats::{StatsCallback, StatsSnapshot};
pub use worker::{EngineState, TickOutcome};

/// Engine configuration
///
/// Changes take effect on the next iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    pub time_quantum_ms: TimeMs,
    pub aging_factor_sec: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time_quantum_ms: 100,
            aging_factor_sec: 5,
        }
    }
}

/// State guarded by the engine lock: the all-processes list (strong
/// owner of every PCB), the blocked set, the running slot, and the
/// accumulated counters. The simulated clock advances once per
/// iteration by the consumed or idle slice.
struct EngineCore {
    processes: Vec<PcbHandle>,
    blocked: BlockedSet,
    running: Option<PcbHandle>,
    last_dispatched: Option<Pid>,
    context_switches: u64,
    cpu_busy_ms: TimeMs,
    idle_ms: TimeMs,
    io_eval_count: u64,
    sim_now_ms: TimeMs,
    rng: StdRng,
}

/// Scheduler engine: a single simulated CPU driven by one worker thread
///
/// Clones share the same engine instance; the worker thread runs on a
/// clone. Control API calls never suspend.
pub struct Engine {
    config: Arc<RwLock<EngineConfig>>,
    ready: Arc<ReadyQueue>,
    core: Arc<Mutex<EngineCore>>,
    index: Arc<DashMap<Pid, PcbHandle, RandomState>>,
    next_pid: Arc<AtomicU32>,
    lifecycle: Arc<AtomicU8>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
    latest_stats: Arc<RwLock<StatsSnapshot>>,
    stats_callback: Arc<RwLock<Option<StatsCallback>>>,
}

impl Engine {
    /// Create an engine with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with the given configuration
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self::build(config, StdRng::from_entropy())
    }

    /// Create an engine with a deterministic I/O duration stream
    #[must_use]
    pub fn seeded(config: EngineConfig, seed: u64) -> Self {
        Self::build(config, StdRng::seed_from_u64(seed))
    }

    fn build(config: EngineConfig, rng: StdRng) -> Self {
        info!(
            "engine initialized: quantum {} ms, aging factor {} s",
            config.time_quantum_ms, config.aging_factor_sec
        );

        Self {
            config: Arc::new(RwLock::new(config)),
            ready: Arc::new(ReadyQueue::new()),
            core: Arc::new(Mutex::new(EngineCore {
                processes: Vec::new(),
                blocked: BlockedSet::new(),
                running: None,
                last_dispatched: None,
                context_switches: 0,
                cpu_busy_ms: 0,
                idle_ms: 0,
                io_eval_count: 0,
                sim_now_ms: 0,
                rng,
            })),
            index: Arc::new(DashMap::with_hasher(RandomState::new())),
            next_pid: Arc::new(AtomicU32::new(1)),
            lifecycle: Arc::new(AtomicU8::new(EngineState::Stopped.as_u8())),
            worker: Arc::new(Mutex::new(None)),
            latest_stats: Arc::new(RwLock::new(StatsSnapshot::default())),
            stats_callback: Arc::new(RwLock::new(None)),
        }
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> EngineConfig {
        *self.config.read()
    }

    /// Simulated time elapsed since the engine epoch
    #[must_use]
    pub fn now_ms(&self) -> TimeMs {
        self.core.lock().sim_now_ms
    }

    /// Pid occupying the running slot, if any
    #[must_use]
    pub fn running_pid(&self) -> Option<Pid> {
        self.core.lock().running.as_ref().map(|h| h.read().pid)
    }

    /// Number of processes in the ready queue
    #[must_use]
    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    /// Number of processes blocked on simulated I/O
    #[must_use]
    pub fn blocked_len(&self) -> usize {
        self.core.lock().blocked.len()
    }
}

impl Clone for Engine {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            ready: Arc::clone(&self.ready),
            core: Arc::clone(&self.core),
            index: Arc::clone(&self.index),
            next_pid: Arc::clone(&self.next_pid),
            lifecycle: Arc::clone(&self.lifecycle),
            worker: Arc::clone(&self.worker),
            latest_stats: Arc::clone(&self.latest_stats),
            stats_callback: Arc::clone(&self.stats_callback),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
