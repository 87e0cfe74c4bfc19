//! Error types for isrmod-core
//!
//! This module provides a no_std compatible error type shared by the codec,
//! the transports and the command-word manager.

use core::fmt;

/// Link-level failure reported by a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    /// The peripheral did not acknowledge the bus transaction
    Nack,
    /// Fewer payload bytes arrived than were requested
    ShortRead {
        /// Number of payload bytes requested
        expected: usize,
        /// Number of payload bytes actually received
        received: usize,
    },
    /// The underlying port reported an I/O error
    Io,
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The link to the peripheral failed
    Transport(TransportFailure),
    /// The error-status register reads nonzero after a write sequence
    DeviceReported(u8),

    // Argument errors
    /// Command word text is longer than 255 bytes
    TextTooLong(usize),
    /// Id 0 (wake word) and 255 (no match) cannot be assigned
    ReservedId(u8),
    /// Write payload exceeds the 32-byte frame ceiling
    PayloadTooLarge(usize),
    /// Read size outside 1..=31
    ReadSizeOutOfRange(usize),
    /// Wake duration above 120 seconds
    WakeDurationOutOfRange(u8),

    // Bring-up errors
    /// Product id register does not hold the expected value
    IdentityMismatch {
        /// Product id this driver supports
        expected: u16,
        /// Product id read from the peripheral
        found: u16,
    },
}

impl Error {
    /// Whether the error came from the link rather than the peripheral or the caller
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<TransportFailure> for Error {
    fn from(failure: TransportFailure) -> Self {
        Self::Transport(failure)
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nack => write!(f, "peripheral did not acknowledge"),
            Self::ShortRead { expected, received } => {
                write!(f, "short read: expected {} bytes, got {}", expected, received)
            }
            Self::Io => write!(f, "I/O error"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(failure) => write!(f, "transport failure: {}", failure),
            Self::DeviceReported(code) => {
                write!(f, "module reported error 0x{:02X}", code)
            }
            Self::TextTooLong(len) => {
                write!(f, "command word is {} bytes, maximum is 255", len)
            }
            Self::ReservedId(id) => write!(f, "command word id {} is reserved", id),
            Self::PayloadTooLarge(len) => {
                write!(f, "frame payload of {} bytes exceeds 32", len)
            }
            Self::ReadSizeOutOfRange(size) => {
                write!(f, "read size {} outside 1..=31", size)
            }
            Self::WakeDurationOutOfRange(secs) => {
                write!(f, "wake duration {} s exceeds 120 s", secs)
            }
            Self::IdentityMismatch { expected, found } => write!(
                f,
                "unexpected product id 0x{:04X} (expected 0x{:04X})",
                found, expected
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
