//! Snapshot loading: crash log text plus an ELF program image.
//!
//! This module owns only the data contract spec.md promises callers —
//! `DebugState` in, nothing else — not a general-purpose crash-log or ELF
//! library.

mod crash_log;
mod elf;

use std::path::Path;

use crate::error::LoadError;
use crate::memory::{MemRegion, RAM_BASE, RAM_SENTINEL, RAM_SIZE};
use crate::state::DebugState;

/// Load a crash log and widen the memory map with an ELF image.
///
/// Mirrors the reference tool's two-step startup: the crash log always
/// establishes the RAM region and register state; the ELF appends further
/// regions for the firmware's other segments. Both are required, matching
/// the reference's `usage()` check.
pub fn load(log_path: &Path, elf_path: &Path) -> Result<DebugState, LoadError> {
    let mut state = DebugState::default();
    state
        .memory
        .add_region(MemRegion::new(RAM_BASE, RAM_SIZE, RAM_SENTINEL));

    crash_log::load_into(log_path, &mut state)?;
    elf::load_into(elf_path, &mut state.memory)?;

    apply_trampoline_fixup(&mut state);
    Ok(state)
}

/// Undo the register-preservation trampoline the crash handler pushes before
/// taking the core dump: the real PC is a saved word in RAM at `a[1] + 28`,
/// and `a[15]` needs the frame it points past added back in.
fn apply_trampoline_fixup(state: &mut DebugState) {
    let addr = state.regs.a[1].wrapping_add(28);
    if let Ok(bytes) = state.memory.read_block(addr, 4) {
        state.regs.pc = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    state.regs.a[15] = state.regs.a[15].wrapping_add(0x20);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::Registers;

    #[test]
    fn trampoline_fixup_reads_pc_from_a1_plus_28() {
        let mut state = DebugState::default();
        state
            .memory
            .add_region(MemRegion::new(RAM_BASE, RAM_SIZE, 0));
        state.regs = Registers {
            a: {
                let mut a = [0u32; 16];
                a[1] = RAM_BASE;
                a[15] = 0x10;
                a
            },
            ..Registers::default()
        };
        state
            .memory
            .write_block(RAM_BASE + 28, &0x4010_0050u32.to_le_bytes())
            .unwrap();

        apply_trampoline_fixup(&mut state);

        assert_eq!(state.regs.pc, 0x4010_0050);
        assert_eq!(state.regs.a[15], 0x30);
    }
}
