/*!
 * Scheduler Report
 * Human-readable readback of configuration, aggregates, and the
 * process table; rendering never mutates core state
 */

use crate::process::ProcessState;
use crate::sched::Engine;
use std::fmt::{self, Write};

const TABLE_RULE: &str =
    "--------------------------------------------------------------------";

/// Render the full scheduler report
#[must_use]
pub fn render(engine: &Engine) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_report(&mut out, engine);
    out
}

fn write_report(out: &mut String, engine: &Engine) -> fmt::Result {
    let config = engine.config();
    let stats = engine.stats();
    let processes = engine.processes();

    writeln!(out, "=== CPU Scheduler Statistics ===")?;
    writeln!(out)?;

    writeln!(out, "Scheduler Parameters:")?;
    writeln!(out, "  Time Quantum: {} ms", config.time_quantum_ms)?;
    writeln!(out, "  Aging Factor: {} seconds", config.aging_factor_sec)?;
    writeln!(out)?;

    writeln!(out, "Process Counts:")?;
    writeln!(out, "  Total Processes: {}", stats.total_processes)?;
    writeln!(out, "  Running: {}", stats.running_processes)?;
    writeln!(out, "  Ready: {}", stats.ready_processes)?;
    writeln!(out, "  Waiting: {}", stats.waiting_processes)?;
    writeln!(out, "  Terminated: {}", stats.terminated_processes)?;
    writeln!(out)?;

    writeln!(out, "Performance Metrics:")?;
    writeln!(out, "  CPU Utilization: {:.1}%", stats.cpu_utilization)?;
    writeln!(out, "  Context Switches: {}", stats.context_switches)?;
    writeln!(out, "  Avg Wait Time: {:.1} ms", stats.avg_wait_ms)?;
    writeln!(out, "  Avg Turnaround Time: {:.1} ms", stats.avg_turnaround_ms)?;
    writeln!(out)?;

    writeln!(out, "Process Table:")?;
    writeln!(
        out,
        "{:<6} {:<20} {:<10} {:<8} {:<8} {:<10} {:<10}",
        "PID", "Name", "State", "BasePri", "EffPri", "Remaining", "WaitTime"
    )?;
    writeln!(out, "{}", TABLE_RULE)?;

    if processes.is_empty() {
        writeln!(out, "No processes in list")?;
    } else {
        for p in &processes {
            writeln!(
                out,
                "{:<6} {:<20} {:<10} {:<8} {:<8} {:<10} {:<10}",
                p.pid,
                p.name,
                state_label(p.state),
                p.base_priority,
                p.effective_priority,
                p.remaining_time_ms,
                p.wait_ms
            )?;
        }
    }

    Ok(())
}

fn state_label(state: ProcessState) -> &'static str {
    match state {
        ProcessState::New => "NEW",
        ProcessState::Ready => "READY",
        ProcessState::Running => "RUNNING",
        ProcessState::Waiting => "WAITING",
        ProcessState::Terminated => "TERM",
    }
}
