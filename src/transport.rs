//! Byte-oriented transport abstraction over the debug session's I/O.
//!
//! Framing and dispatch only need one byte at a time in, and a handful of
//! bytes at a time out; fixing that as a trait lets them be unit-tested
//! against an in-memory buffer instead of real stdio.

use std::io::{self, Read, Write};

/// A blocking byte-oriented transport.
pub trait ByteIo {
    /// Read one byte, or `Ok(None)` on a clean end-of-stream.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
    /// Write one byte.
    fn write_byte(&mut self, b: u8) -> io::Result<()>;
    /// Flush any buffered output. Called once per reply packet, not per byte.
    fn flush(&mut self) -> io::Result<()>;

    /// Write a whole slice; the default just loops over `write_byte`.
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        for &b in bytes {
            self.write_byte(b)?;
        }
        Ok(())
    }
}

/// The real transport: locked stdin/stdout.
pub struct StdioTransport {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl StdioTransport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteIo for StdioTransport {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        let mut lock = self.stdin.lock();
        match lock.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) => Err(e),
        }
    }

    fn write_byte(&mut self, b: u8) -> io::Result<()> {
        self.stdout.lock().write_all(&[b])
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.lock().flush()
    }
}

/// An in-memory transport for tests: reads from a fixed input buffer, writes
/// into a growable output buffer.
///
/// Kept outside `#[cfg(test)]` so the crate's `tests/` integration tests
/// (which link against a normal, non-test build of this lib) can use it too.
pub struct MemoryTransport {
    input: std::collections::VecDeque<u8>,
    pub output: Vec<u8>,
}

impl MemoryTransport {
    #[must_use]
    pub fn new(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            output: Vec::new(),
        }
    }
}

impl ByteIo for MemoryTransport {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.input.pop_front())
    }

    fn write_byte(&mut self, b: u8) -> io::Result<()> {
        self.output.push(b);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
