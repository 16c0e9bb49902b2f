//! Parser for the crash log text format: a `---- begin regs ----` section of
//! whitespace-separated hex words, followed by a `---- begin core ----`
//! section of packed hex-digit pairs filling SoC RAM.

use std::fs;
use std::path::Path;

use crate::error::LoadError;
use crate::memory::{RAM_BASE, RAM_SIZE};
use crate::state::DebugState;

const REGS_MARKER: &str = "---- begin regs ----";
const CORE_MARKER: &str = "---- begin core ----";

/// Register fields in the order they appear after `REGS_MARKER`. `vpri` and
/// `sr208` are read (to keep later fields aligned) but never surfaced on the
/// wire, matching the reference's `fscanf("%*x")` discards.
const NUM_REG_TOKENS: usize = 1 /* pc */ + 1 /* ps */ + 1 /* sar */ + 1 /* vpri */
    + 16 /* a0..a15 */ + 1 /* litbase */ + 1 /* sr176 */ + 1 /* sr208 */;

fn parse_hex_u32(token: &str) -> Result<u32, LoadError> {
    let token = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")).unwrap_or(token);
    u32::from_str_radix(token, 16)
        .map_err(|e| LoadError::Parse(format!("bad register value {token:?}: {e}")))
}

pub fn load_into(path: &Path, state: &mut DebugState) -> Result<(), LoadError> {
    let content = fs::read_to_string(path)?;

    let regs_start = content
        .find(REGS_MARKER)
        .ok_or_else(|| LoadError::Parse(format!("missing {REGS_MARKER:?} marker")))?
        + REGS_MARKER.len();
    let core_start = content
        .find(CORE_MARKER)
        .ok_or_else(|| LoadError::Parse(format!("missing {CORE_MARKER:?} marker")))?;
    if core_start < regs_start {
        return Err(LoadError::Parse("core section precedes regs section".to_string()));
    }

    parse_registers(&content[regs_start..core_start], state)?;
    parse_core(&content[core_start + CORE_MARKER.len()..], state);
    Ok(())
}

fn parse_registers(section: &str, state: &mut DebugState) -> Result<(), LoadError> {
    let tokens: Vec<&str> = section.split_whitespace().collect();
    if tokens.len() < NUM_REG_TOKENS {
        return Err(LoadError::Parse(format!(
            "expected {NUM_REG_TOKENS} register values, found {}",
            tokens.len()
        )));
    }

    let mut it = tokens.into_iter();
    state.regs.pc = parse_hex_u32(it.next().unwrap())?;
    state.regs.ps = parse_hex_u32(it.next().unwrap())?;
    state.regs.sar = parse_hex_u32(it.next().unwrap())?;
    state.regs.vpri = parse_hex_u32(it.next().unwrap())?;
    for slot in &mut state.regs.a {
        *slot = parse_hex_u32(it.next().unwrap())?;
    }
    state.regs.litbase = parse_hex_u32(it.next().unwrap())?;
    state.regs.sr176 = parse_hex_u32(it.next().unwrap())?;
    state.regs.sr208 = parse_hex_u32(it.next().unwrap())?;
    Ok(())
}

/// Fill RAM from the packed hex-digit stream after the core marker.
///
/// A short dump (fewer than `RAM_SIZE` bytes of hex digits) leaves the
/// remainder of RAM at its sentinel fill rather than failing the whole
/// load — the reference's `fscanf` loop has the same effect when the file
/// runs out early.
fn parse_core(section: &str, state: &mut DebugState) {
    let digits: Vec<u8> = section.bytes().filter(u8::is_ascii_hexdigit).collect();
    let byte_count = (digits.len() / 2).min(RAM_SIZE as usize);
    let mut ram = vec![0u8; byte_count];
    for (i, out) in ram.iter_mut().enumerate() {
        let hi = hex_val(digits[i * 2]);
        let lo = hex_val(digits[i * 2 + 1]);
        *out = (hi << 4) | lo;
    }
    let _ = state.memory.write_block(RAM_BASE, &ram);
}

fn hex_val(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}
