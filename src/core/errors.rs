/*!
 * Error Types
 * Centralized error handling with thiserror and serde support
 */

use super::types::Pid;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scheduler errors with serialization support
///
/// Invalid-argument and resource-exhausted are surfaced to callers.
/// Not-found and illegal-state are non-fatal: the control API logs them
/// and leaves core state untouched.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SchedError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("process {0} not found")]
    NotFound(Pid),

    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
}
