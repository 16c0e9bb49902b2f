//! Error types for each layer of the stub, in the single-enum-plus-manual-impls
//! shape used throughout this crate (no `thiserror`).

use std::fmt;
use std::io;

/// Errors from hex/binary encoding and decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// The output buffer is too small to hold the decoded bytes.
    BufferTooSmall,
    /// A hex string has an odd length or doesn't divide evenly into bytes.
    MalformedHex,
    /// A binary escape byte (`}`) appeared with nothing left to un-escape.
    MalformedEscape,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "output buffer too small"),
            Self::MalformedHex => write!(f, "malformed hex string"),
            Self::MalformedEscape => write!(f, "malformed binary escape sequence"),
        }
    }
}

impl std::error::Error for CodecError {}

/// Errors from packet framing (the `$...#cc` layer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingError {
    /// The two checksum digits didn't match the computed checksum.
    ///
    /// Recoverable: the caller NACKs and the sender is expected to retry.
    BadChecksum,
    /// The payload grew past the maximum packet size before a terminating `#`.
    ///
    /// Fatal: the wire is desynced in a way ack/nack can't fix.
    Overflow,
    /// The transport hit EOF in the middle of a packet.
    UnexpectedEof,
    /// The peer replied to a sent packet with `-` (or garbage) instead of `+`.
    Nacked,
}

impl fmt::Display for FramingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadChecksum => write!(f, "checksum mismatch"),
            Self::Overflow => write!(f, "packet exceeded maximum size"),
            Self::UnexpectedEof => write!(f, "unexpected end of transport"),
            Self::Nacked => write!(f, "peer did not acknowledge the sent packet"),
        }
    }
}

impl std::error::Error for FramingError {}

/// A memory access that fell outside every known region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryFault {
    pub address: u32,
}

impl fmt::Display for MemoryFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unmapped address {:#010x}", self.address)
    }
}

impl std::error::Error for MemoryFault {}

/// Any error encountered while handling one RSP command.
///
/// Never escapes the dispatcher: it always collapses to a single `E 00`
/// reply rather than propagating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    Codec(CodecError),
    Memory(MemoryFault),
    /// A tokenizer primitive (separator, integer argument) didn't match.
    Syntax,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codec(e) => write!(f, "{e}"),
            Self::Memory(e) => write!(f, "{e}"),
            Self::Syntax => write!(f, "malformed command"),
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<CodecError> for DispatchError {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

impl From<MemoryFault> for DispatchError {
    fn from(e: MemoryFault) -> Self {
        Self::Memory(e)
    }
}

/// Errors from loading a crash log and/or ELF image into a `DebugState`.
#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
    /// The crash log's text didn't match the expected shape.
    Parse(String),
    /// The ELF image was malformed or used a layout this loader doesn't support.
    Elf(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Parse(msg) => write!(f, "crash log parse error: {msg}"),
            Self::Elf(msg) => write!(f, "ELF parse error: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(_) | Self::Elf(_) => None,
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
