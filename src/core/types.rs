/*!
 * Core Types
 * Common types used across the simulator
 */

/// Process ID type
pub type Pid = u32;

/// Priority level (0-10, lower is higher priority)
pub type Priority = u8;

/// Simulated time in milliseconds since engine epoch
pub type TimeMs = u64;

/// Lowest (numerically highest) priority
pub const PRIORITY_MIN: Priority = 10;

/// Maximum process name length, in characters
pub const NAME_MAX: usize = 31;

/// Common result type for simulator operations
pub type SimResult<T> = Result<T, super::errors::SchedError>;
