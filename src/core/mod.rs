/*!
 * Core Module
 * Shared types and error definitions
 */

pub mod errors;
pub mod types;

pub use errors::SchedError;
pub use types::{Pid, Priority, SimResult, TimeMs};
