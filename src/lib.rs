//! Post-mortem GDB Remote Serial Protocol server for Xtensa crash snapshots.
//!
//! Replays a captured register state and RAM image — optionally widened by
//! an ELF program image — through the RSP wire protocol, so a connected
//! `gdb` can inspect a crashed target's final state as though still
//! attached. Execution-control commands are accepted but inert: this is a
//! viewer, not a simulator.

pub mod codec;
pub mod dispatcher;
pub mod error;
pub mod framing;
pub mod loader;
pub mod memory;
pub mod registers;
pub mod state;
pub mod transport;

use std::io;

use dispatcher::LoopControl;
use error::FramingError;
use state::DebugState;
use transport::ByteIo;

/// Run the dispatch loop to completion: receive a packet, dispatch it, send
/// the reply, repeat, until the client detaches, issues `c`/`s`, or the
/// transport ends.
///
/// A recoverable framing error (bad checksum) has already been NACKed by
/// [`framing::receive_packet`] by the time it reaches here; this just tries
/// again. An unrecoverable one ends the loop, matching a client that's
/// desynced beyond repair or has hung up. Sent replies are themselves
/// acknowledged by the peer ([`framing::send_packet`]); a missing or
/// negative acknowledgment ends the loop the same way.
pub fn run(state: &mut DebugState, io_channel: &mut impl ByteIo) -> io::Result<()> {
    loop {
        let packet = match framing::receive_packet(io_channel) {
            Ok(packet) => packet,
            Err(FramingError::BadChecksum) => continue,
            Err(FramingError::Overflow | FramingError::UnexpectedEof) => break,
            Err(FramingError::Nacked) => {
                unreachable!("receive_packet never returns a send-side framing error")
            }
        };

        let (reply, control) = dispatcher::dispatch(state, &packet);
        if let Some(reply) = reply {
            match framing::send_packet(io_channel, reply.as_bytes()) {
                Ok(()) => {}
                // The peer never acknowledged our reply (NACK, garbage, or
                // hung up) — nothing to retry onto, so the session ends here,
                // the same way a fatal receive-side framing error does.
                Err(FramingError::Nacked | FramingError::UnexpectedEof) => break,
                Err(FramingError::BadChecksum | FramingError::Overflow) => {
                    unreachable!("send_packet never returns a receive-side framing error")
                }
            }
        }

        if control == LoopControl::Stop {
            break;
        }
    }
    Ok(())
}
