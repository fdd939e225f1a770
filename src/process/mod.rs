/*!
 * Process Module
 * Process control blocks and observer-facing views
 */

pub mod pcb;
pub mod types;

pub use pcb::{Pcb, PcbHandle};
pub use types::{ProcessSnapshot, ProcessState};
