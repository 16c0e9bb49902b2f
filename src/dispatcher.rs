//! Command dispatch: one RSP payload in, one reply out (or none, for the
//! commands that end the session).
//!
//! Every command handler either returns a reply or a [`DispatchError`]; a
//! [`DispatchError`] always collapses to a single `E 00` reply rather than
//! propagating further, per the single top-level error reply this port uses
//! in place of the reference's `goto error`.

use crate::codec::{self, parse_int};
use crate::error::{DispatchError, MemoryFault};
use crate::framing::MAX_PACKET_SIZE;
use crate::registers::{self, NUM_SLOTS};
use crate::state::DebugState;

/// Upper bound on a single `m`/`M`/`X` block: the advertised `PacketSize=FF`
/// once hex-expanded (two ASCII digits per byte), so a client can never make
/// this stub allocate more than one packet's worth of memory at a time.
const MAX_BLOCK_LEN: usize = MAX_PACKET_SIZE / 2;

/// What the dispatch loop should do after handling one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    /// Keep receiving packets.
    Continue,
    /// This was the last packet — `D`, `c`, or `s` ended the session.
    Stop,
}

/// A minimal tokenizer over one packet's bytes, past the leading command
/// letter: `remaining`, `expect_separator`, `expect_integer`.
struct Tokenizer<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    fn expect_separator(&mut self, expected: u8) -> Result<(), DispatchError> {
        if self.buf.get(self.pos) == Some(&expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(DispatchError::Syntax)
        }
    }

    fn expect_integer(&mut self, hex: bool) -> Result<i64, DispatchError> {
        let (value, consumed) =
            parse_int(self.remaining(), hex).map_err(|_| DispatchError::Syntax)?;
        self.pos += consumed;
        Ok(value)
    }
}

/// Dispatch one packet payload against `state`, returning the reply (if any)
/// and whether the session should continue.
pub fn dispatch(state: &mut DebugState, packet: &[u8]) -> (Option<String>, LoopControl) {
    let Some(&cmd) = packet.first() else {
        // An empty packet is silently ignored by the reference loop.
        return (None, LoopControl::Continue);
    };

    let body = &packet[1..];
    match cmd {
        b'q' => (Some(handle_query(body)), LoopControl::Continue),
        b'g' => (Some(registers::serialize_all(&state.regs)), LoopControl::Continue),
        b'G' => (Some(reply_or_error(handle_write_all_registers(state, body))), LoopControl::Continue),
        b'p' => (Some(reply_or_error(handle_read_register(state, body))), LoopControl::Continue),
        b'P' => (Some(reply_or_error(handle_write_register(state, body))), LoopControl::Continue),
        b'm' => (Some(reply_or_error(handle_read_memory(state, body))), LoopControl::Continue),
        b'M' => (Some(reply_or_error(handle_write_memory(state, body))), LoopControl::Continue),
        b'X' => (Some(reply_or_error(handle_write_memory_binary(state, body))), LoopControl::Continue),
        b'D' => (Some("OK".to_string()), LoopControl::Stop),
        b'c' | b's' => (None, LoopControl::Stop),
        b'?' => (Some("S 00".to_string()), LoopControl::Continue),
        _ => (Some(String::new()), LoopControl::Continue),
    }
}

fn reply_or_error(result: Result<String, DispatchError>) -> String {
    result.unwrap_or_else(|_| "E 00".to_string())
}

fn handle_query(body: &[u8]) -> String {
    if body.starts_with(b"Supported") {
        "swbreak+;hwbreak+;PacketSize=FF".to_string()
    } else if body.starts_with(b"Attached") {
        "1".to_string()
    } else {
        String::new()
    }
}

fn handle_write_all_registers(state: &mut DebugState, body: &[u8]) -> Result<String, DispatchError> {
    registers::deserialize_all(&mut state.regs, body)?;
    Ok("OK".to_string())
}

fn handle_read_register(state: &DebugState, body: &[u8]) -> Result<String, DispatchError> {
    let mut tok = Tokenizer::new(body);
    let slot = tok.expect_integer(true)?;
    let slot = usize::try_from(slot).map_err(|_| DispatchError::Syntax)?;
    // An out-of-range or otherwise undefined slot reads back as
    // "unavailable", not an error — the reference does the same.
    Ok(registers::serialize_one(&state.regs, slot))
}

fn handle_write_register(state: &mut DebugState, body: &[u8]) -> Result<String, DispatchError> {
    let mut tok = Tokenizer::new(body);
    let slot = tok.expect_integer(true)?;
    tok.expect_separator(b'=')?;
    let slot = usize::try_from(slot).map_err(|_| DispatchError::Syntax)?;
    if slot >= NUM_SLOTS || !registers::slot_is_defined(slot) {
        return Err(DispatchError::Syntax);
    }
    registers::deserialize_one(&mut state.regs, slot, tok.remaining())?;
    Ok("OK".to_string())
}

fn handle_read_memory(state: &DebugState, body: &[u8]) -> Result<String, DispatchError> {
    let mut tok = Tokenizer::new(body);
    let addr = tok.expect_integer(true)?;
    tok.expect_separator(b',')?;
    let len = tok.expect_integer(true)?;
    let addr = u32::try_from(addr).map_err(|_| DispatchError::Syntax)?;
    let len = usize::try_from(len).map_err(|_| DispatchError::Syntax)?;
    // A client-supplied length past the advertised packet size is a fault,
    // not an allocation request — never `Vec::with_capacity(len)` on raw
    // wire input.
    if len > MAX_BLOCK_LEN {
        return Err(DispatchError::Memory(MemoryFault { address: addr }));
    }
    let bytes = state.memory.read_block(addr, len)?;
    Ok(codec::encode_hex_string(&bytes))
}

fn handle_write_memory(state: &mut DebugState, body: &[u8]) -> Result<String, DispatchError> {
    let mut tok = Tokenizer::new(body);
    let addr = tok.expect_integer(true)?;
    tok.expect_separator(b',')?;
    let len = tok.expect_integer(true)?;
    tok.expect_separator(b':')?;
    let addr = u32::try_from(addr).map_err(|_| DispatchError::Syntax)?;
    let len = usize::try_from(len).map_err(|_| DispatchError::Syntax)?;
    let data = codec::decode_hex_vec(tok.remaining())?;
    if data.len() != len {
        return Err(DispatchError::Memory(MemoryFault { address: addr }));
    }
    state.memory.write_block(addr, &data)?;
    Ok("OK".to_string())
}

fn handle_write_memory_binary(state: &mut DebugState, body: &[u8]) -> Result<String, DispatchError> {
    let mut tok = Tokenizer::new(body);
    let addr = tok.expect_integer(true)?;
    tok.expect_separator(b',')?;
    let len = tok.expect_integer(true)?;
    tok.expect_separator(b':')?;
    let addr = u32::try_from(addr).map_err(|_| DispatchError::Syntax)?;
    let len = usize::try_from(len).map_err(|_| DispatchError::Syntax)?;
    let data = codec::decode_bin(tok.remaining())?;
    if data.len() != len {
        return Err(DispatchError::Memory(MemoryFault { address: addr }));
    }
    state.memory.write_block(addr, &data)?;
    Ok("OK".to_string())
}
