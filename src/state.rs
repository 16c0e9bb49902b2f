//! The debug session's owned state: register file plus memory map.
//!
//! Threaded explicitly through the dispatcher rather than kept as a
//! `static`, so the whole session is one plain value.

use crate::memory::MemoryMap;
use crate::registers::Registers;

/// One loaded crash snapshot: registers plus every known memory region.
#[derive(Debug, Clone, Default)]
pub struct DebugState {
    pub regs: Registers,
    pub memory: MemoryMap,
}
