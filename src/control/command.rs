/*!
 * Control Commands
 * Line-oriented control protocol: NEW and WAIT
 */

use crate::core::errors::SchedError;
use crate::core::types::{Pid, Priority, SimResult, TimeMs, PRIORITY_MIN};
use crate::sched::Engine;

/// A parsed control command
///
/// Format mirrors the scheduler's textual endpoint:
/// `NEW <name> <burst_time_ms> <priority>` and `WAIT <pid> <duration_ms>`.
/// Any other verb is rejected; trailing tokens are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New {
        name: String,
        burst_time_ms: TimeMs,
        priority: Priority,
    },
    Wait {
        pid: Pid,
        duration_ms: TimeMs,
    },
}

impl Command {
    /// Parse one input line; malformed or out-of-range input is
    /// rejected with invalid-argument
    pub fn parse(line: &str) -> SimResult<Self> {
        let mut tokens = line.split_whitespace();
        let verb = tokens
            .next()
            .ok_or_else(|| SchedError::InvalidArgument("empty command".into()))?;

        match verb {
            "NEW" => {
                let name = tokens
                    .next()
                    .ok_or_else(|| SchedError::InvalidArgument("NEW requires a name".into()))?;
                let burst: i64 = tokens
                    .next()
                    .and_then(|t| t.parse().ok())
                    .ok_or_else(|| {
                        SchedError::InvalidArgument("NEW requires a numeric burst time".into())
                    })?;
                let priority: i64 = tokens
                    .next()
                    .and_then(|t| t.parse().ok())
                    .ok_or_else(|| {
                        SchedError::InvalidArgument("NEW requires a numeric priority".into())
                    })?;

                if burst <= 0 {
                    return Err(SchedError::InvalidArgument(
                        "burst time must be positive".into(),
                    ));
                }
                if !(0..=PRIORITY_MIN as i64).contains(&priority) {
                    return Err(SchedError::InvalidArgument(format!(
                        "priority {} out of range 0-{}",
                        priority, PRIORITY_MIN
                    )));
                }

                Ok(Command::New {
                    name: name.to_string(),
                    burst_time_ms: burst as TimeMs,
                    priority: priority as Priority,
                })
            }
            "WAIT" => {
                let pid: Pid = tokens
                    .next()
                    .and_then(|t| t.parse().ok())
                    .ok_or_else(|| {
                        SchedError::InvalidArgument("WAIT requires a numeric pid".into())
                    })?;
                let duration_ms: TimeMs = tokens
                    .next()
                    .and_then(|t| t.parse().ok())
                    .ok_or_else(|| {
                        SchedError::InvalidArgument("WAIT requires a numeric duration".into())
                    })?;

                Ok(Command::Wait { pid, duration_ms })
            }
            other => Err(SchedError::InvalidArgument(format!(
                "unknown command: {}",
                other
            ))),
        }
    }

    /// Execute against an engine; NEW yields the assigned pid
    pub fn apply(&self, engine: &Engine) -> SimResult<Option<Pid>> {
        match self {
            Command::New {
                name,
                burst_time_ms,
                priority,
            } => engine
                .create(name, *priority, *burst_time_ms)
                .map(|snapshot| Some(snapshot.pid)),
            Command::Wait { pid, duration_ms } => {
                engine.block(*pid, *duration_ms);
                Ok(None)
            }
        }
    }
}
