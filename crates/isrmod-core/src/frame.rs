//! Register frame codec
//!
//! Wire format, identical on both transports:
//!
//! ```text
//! ┌────────────┬────────────┬────────────┬──────────────────┐
//! │ Opcode (1) │ Reg (1)    │ Length (1) │ Payload (Length) │
//! │ 0xCC/0xBB  │            │            │ writes only      │
//! └────────────┴────────────┴────────────┴──────────────────┘
//! ```
//!
//! A read request carries no payload; its length byte is the number of
//! bytes asked for. Every raw read response starts with one sentinel byte
//! that [`decode_read_response`] throws away.

use crate::error::{Error, Result, TransportFailure};
use crate::register::Opcode;

/// Maximum payload of a single write frame
pub const MAX_WRITE_PAYLOAD: usize = 32;
/// Maximum payload of a single read (the response plus sentinel must fit 32 bytes)
pub const MAX_READ_PAYLOAD: usize = MAX_WRITE_PAYLOAD - SENTINEL_LEN;
/// Opcode, register and length bytes preceding the payload
pub const PROLOGUE_LEN: usize = 3;
/// Leading byte of every raw response that carries no data
pub const SENTINEL_LEN: usize = 1;
/// Largest encoded frame
pub const MAX_FRAME_LEN: usize = PROLOGUE_LEN + MAX_WRITE_PAYLOAD;

/// Frame payload buffer
pub type Payload = heapless::Vec<u8, MAX_WRITE_PAYLOAD>;
/// Encoded frame buffer
pub type WireFrame = heapless::Vec<u8, MAX_FRAME_LEN>;
/// Raw read response: sentinel slot followed by the payload bytes received
pub type RawResponse = heapless::Vec<u8, { MAX_READ_PAYLOAD + SENTINEL_LEN }>;

/// One protocol message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    opcode: Opcode,
    register: u8,
    length: u8,
    payload: Payload,
}

impl Frame {
    /// Build a register write frame
    pub fn write(register: u8, payload: &[u8]) -> Result<Self> {
        let payload =
            Payload::from_slice(payload).map_err(|_| Error::PayloadTooLarge(payload.len()))?;
        Ok(Self {
            opcode: Opcode::Write,
            register,
            length: payload.len() as u8,
            payload,
        })
    }

    /// Build a register read request for `size` bytes
    pub fn read(register: u8, size: usize) -> Result<Self> {
        if size == 0 || size > MAX_READ_PAYLOAD {
            return Err(Error::ReadSizeOutOfRange(size));
        }
        Ok(Self {
            opcode: Opcode::Read,
            register,
            length: size as u8,
            payload: Payload::new(),
        })
    }

    /// Frame opcode
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// Target register
    pub fn register(&self) -> u8 {
        self.register
    }

    /// Declared length: payload size for writes, requested size for reads
    pub fn length(&self) -> u8 {
        self.length
    }

    /// Write payload (empty for read requests)
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Number of bytes the peripheral is expected to return (0 for writes)
    pub fn response_len(&self) -> usize {
        match self.opcode {
            Opcode::Read => self.length as usize,
            Opcode::Write => 0,
        }
    }

    /// Encode the frame for the wire
    pub fn encode(&self) -> WireFrame {
        let mut wire = WireFrame::new();
        // Capacity is prologue + max payload, so none of these can fail
        let _ = wire.push(self.opcode as u8);
        let _ = wire.push(self.register);
        let _ = wire.push(self.length);
        let _ = wire.extend_from_slice(&self.payload);
        wire
    }
}

/// Build a register write frame
pub fn encode_write(register: u8, payload: &[u8]) -> Result<Frame> {
    Frame::write(register, payload)
}

/// Build a register read request frame
pub fn encode_read(register: u8, size: usize) -> Result<Frame> {
    Frame::read(register, size)
}

/// Strip the sentinel from a raw response and return `expected_size` payload bytes
pub fn decode_read_response(raw: &[u8], expected_size: usize) -> Result<&[u8]> {
    let data = raw.get(SENTINEL_LEN..).unwrap_or(&[]);
    if data.len() < expected_size {
        return Err(Error::Transport(TransportFailure::ShortRead {
            expected: expected_size,
            received: data.len(),
        }));
    }
    Ok(&data[..expected_size])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::reg;

    #[test]
    fn test_write_frame_encoding() {
        let frame = Frame::write(reg::WAKEUP_TIME, &[10]).unwrap();
        assert_eq!(frame.length() as usize, frame.payload().len());
        assert_eq!(frame.encode().as_slice(), &[0xCC, 0x01, 0x01, 10]);
    }

    #[test]
    fn test_read_frame_encoding() {
        let frame = Frame::read(reg::PID, 2).unwrap();
        assert!(frame.payload().is_empty());
        assert_eq!(frame.response_len(), 2);
        assert_eq!(frame.encode().as_slice(), &[0xBB, 0xAA, 0x02]);
    }

    #[test]
    fn test_payload_ceiling() {
        assert!(Frame::write(reg::ADD_COMMAND, &[0u8; 32]).is_ok());
        assert_eq!(
            Frame::write(reg::ADD_COMMAND, &[0u8; 33]),
            Err(Error::PayloadTooLarge(33))
        );
    }

    #[test]
    fn test_read_size_bounds() {
        assert_eq!(Frame::read(reg::VOICE_ID, 0), Err(Error::ReadSizeOutOfRange(0)));
        assert!(Frame::read(reg::VOICE_ID, 31).is_ok());
        assert_eq!(Frame::read(reg::VOICE_ID, 32), Err(Error::ReadSizeOutOfRange(32)));
    }

    #[test]
    fn test_decode_strips_one_byte() {
        let raw = [0x5A, 0x42, 0xCB];
        assert_eq!(decode_read_response(&raw, 2).unwrap(), &[0x42, 0xCB]);
        // Extra trailing bytes are ignored
        assert_eq!(decode_read_response(&raw, 1).unwrap(), &[0x42]);
    }

    #[test]
    fn test_decode_short_read() {
        assert_eq!(
            decode_read_response(&[0x00, 0x01], 2),
            Err(Error::Transport(TransportFailure::ShortRead {
                expected: 2,
                received: 1
            }))
        );
        assert_eq!(
            decode_read_response(&[], 1),
            Err(Error::Transport(TransportFailure::ShortRead {
                expected: 1,
                received: 0
            }))
        );
    }
}
