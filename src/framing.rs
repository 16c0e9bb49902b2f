//! Packet framing: the `$payload#cc` layer, with `+`/`-` acknowledgement.

use crate::codec::checksum;
use crate::error::FramingError;
use crate::transport::ByteIo;

/// Maximum payload size accepted from a client before giving up on resync.
///
/// Matches the `PacketSize=FF` this stub advertises in `qSupported`: a
/// well-behaved client never sends more than this in one packet.
pub const MAX_PACKET_SIZE: usize = 0xFF;

/// Read one byte, treating a transport I/O error the same as end-of-stream.
///
/// A dead pipe and a clean EOF both mean "there is nothing more to read from
/// this client"; this stub doesn't distinguish them, since either way the
/// loop has the same one thing to do: stop.
fn next_byte(io: &mut impl ByteIo) -> Option<u8> {
    io.read_byte().unwrap_or(None)
}

/// Receive one packet: resync to `$`, accumulate the payload, verify the
/// trailing checksum, and ack or nack.
///
/// On success, sends `+` and returns the payload (without `$`/`#cc`). On a
/// checksum mismatch, sends `-` and returns `Err(BadChecksum)` — the caller
/// should call `receive_packet` again, since the sender is expected to
/// retransmit. `Overflow` and `UnexpectedEof` are not retried; the caller
/// should end the session.
pub fn receive_packet(io: &mut impl ByteIo) -> Result<Vec<u8>, FramingError> {
    // Resync: discard anything before the start-of-packet marker.
    loop {
        match next_byte(io) {
            Some(b'$') => break,
            Some(_) => continue,
            None => return Err(FramingError::UnexpectedEof),
        }
    }

    let mut payload = Vec::new();
    loop {
        match next_byte(io) {
            Some(b'#') => break,
            Some(b) => {
                if payload.len() >= MAX_PACKET_SIZE {
                    return Err(FramingError::Overflow);
                }
                payload.push(b);
            }
            None => return Err(FramingError::UnexpectedEof),
        }
    }

    let mut checksum_digits = [0u8; 2];
    for slot in &mut checksum_digits {
        *slot = next_byte(io).ok_or(FramingError::UnexpectedEof)?;
    }
    let mut received = [0u8; 1];
    crate::codec::decode_hex(&checksum_digits, &mut received)
        .map_err(|_| FramingError::BadChecksum)?;

    if received[0] != checksum(&payload) {
        let _ = io.write_byte(b'-');
        let _ = io.flush();
        return Err(FramingError::BadChecksum);
    }

    let _ = io.write_byte(b'+');
    let _ = io.flush();
    Ok(payload)
}

/// Send a reply packet: `$<payload>#<2-hex-checksum>`, then read the peer's
/// `+`/`-` acknowledgment the way `dbg_send_packet` → `dbg_recv_ack` does.
///
/// A `-` or anything other than `+` is `FramingError::Nacked`; EOF while
/// waiting for the ack is `FramingError::UnexpectedEof`. Both are fatal —
/// this stub doesn't retransmit on its own, matching `receive_packet`'s
/// caller-retries contract for the receive side.
pub fn send_packet(io: &mut impl ByteIo, payload: &[u8]) -> Result<(), FramingError> {
    let map_io = |_| FramingError::UnexpectedEof;
    io.write_byte(b'$').map_err(map_io)?;
    io.write_all(payload).map_err(map_io)?;
    io.write_byte(b'#').map_err(map_io)?;
    let sum = checksum(payload);
    let hex = crate::codec::encode_hex_string(&[sum]);
    io.write_all(hex.as_bytes()).map_err(map_io)?;
    io.flush().map_err(map_io)?;

    match next_byte(io) {
        Some(b'+') => Ok(()),
        Some(_) => Err(FramingError::Nacked),
        None => Err(FramingError::UnexpectedEof),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;

    fn framed(payload: &[u8]) -> Vec<u8> {
        let sum = checksum(payload);
        let mut out = vec![b'$'];
        out.extend_from_slice(payload);
        out.push(b'#');
        out.extend(crate::codec::encode_hex_string(&[sum]).into_bytes());
        out
    }

    #[test]
    fn receive_valid_packet_acks() {
        let mut io = MemoryTransport::new(&framed(b"qSupported"));
        let payload = receive_packet(&mut io).unwrap();
        assert_eq!(payload, b"qSupported");
        assert_eq!(io.output, b"+");
    }

    #[test]
    fn receive_skips_garbage_before_dollar() {
        let mut input = b"garbage-before".to_vec();
        input.extend(framed(b"g"));
        let mut io = MemoryTransport::new(&input);
        let payload = receive_packet(&mut io).unwrap();
        assert_eq!(payload, b"g");
    }

    #[test]
    fn receive_bad_checksum_nacks() {
        let mut io = MemoryTransport::new(b"$g#00");
        let err = receive_packet(&mut io).unwrap_err();
        assert_eq!(err, FramingError::BadChecksum);
        assert_eq!(io.output, b"-");
    }

    #[test]
    fn receive_overflow_on_oversized_payload() {
        let huge = vec![b'a'; MAX_PACKET_SIZE + 1];
        let mut input = vec![b'$'];
        input.extend_from_slice(&huge);
        let mut io = MemoryTransport::new(&input);
        assert_eq!(receive_packet(&mut io), Err(FramingError::Overflow));
    }

    #[test]
    fn receive_eof_mid_packet() {
        let mut io = MemoryTransport::new(b"$abc");
        assert_eq!(receive_packet(&mut io), Err(FramingError::UnexpectedEof));
    }

    #[test]
    fn send_round_trips_through_receive() {
        let mut io = MemoryTransport::new(b"+");
        send_packet(&mut io, b"OK").unwrap();
        let sent = io.output.clone();
        let mut echo = MemoryTransport::new(&sent);
        let payload = receive_packet(&mut echo).unwrap();
        assert_eq!(payload, b"OK");
    }

    #[test]
    fn send_errors_on_nack() {
        let mut io = MemoryTransport::new(b"-");
        assert_eq!(send_packet(&mut io, b"OK"), Err(FramingError::Nacked));
    }

    #[test]
    fn send_errors_on_eof_waiting_for_ack() {
        let mut io = MemoryTransport::new(&[]);
        assert_eq!(send_packet(&mut io, b"OK"), Err(FramingError::UnexpectedEof));
    }
}
