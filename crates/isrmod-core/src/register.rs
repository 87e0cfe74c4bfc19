//! Register map and protocol constants
//!
//! Every exchange with the module is a frame addressed to one of the
//! registers below, carried by one of two opcodes.

use core::fmt;
use core::str::FromStr;

/// Opcode prefixing a register read request
pub const CMD_READ_REGBUF: u8 = 0xBB;
/// Opcode prefixing a register write
pub const CMD_WRITE_REGBUF: u8 = 0xCC;

/// Default 7-bit bus address of the module
pub const MODULE_I2C_ADDRESS: u8 = 0x14;
/// Default UART baud rate of the module
pub const UART_BAUDRATE: u32 = 57600;

/// Register addresses
pub mod reg {
    /// Last recognized command word id (read)
    pub const VOICE_ID: u8 = 0x00;
    /// Wake duration in seconds (write)
    pub const WAKEUP_TIME: u8 = 0x01;
    /// Recognition model type (write)
    pub const MODEL_TYPE: u8 = 0x02;
    /// Add a command word: `[id, total_len, text...]` (write)
    pub const ADD_COMMAND: u8 = 0x03;
    /// Delete a command word by id (write)
    pub const DELETE_BY_ID: u8 = 0x04;
    /// Delete a command word by text: `[total_len, 0, text...]` (write)
    pub const DELETE_BY_TEXT: u8 = 0x05;
    /// Error status of the last add/delete, 0 is success (read).
    ///
    /// Shares its address with [`ADD_COMMAND`]; the opcode tells them apart.
    pub const ERROR_STATUS: u8 = 0x03;

    /// Product id, 2 bytes big-endian (read)
    pub const PID: u8 = 0xAA;
    /// Vendor id, 2 bytes big-endian (read)
    pub const VID: u8 = 0xAC;
    /// Firmware version, 2 bytes big-endian (read)
    pub const VERSION: u8 = 0xAE;
}

/// Product id of the DFR0715 module
pub const MODULE_PID: u16 = 0x42CB;
/// Vendor id of the DFR0715 module
pub const MODULE_VID: u16 = 0x3343;
/// Firmware version this driver was written against
pub const MODULE_VERSION: u16 = 0x0100;

/// Id reported for the wake word
pub const WAKE_WORD_ID: u8 = 0x00;
/// Id reported when nothing was recognized
pub const NO_MATCH_ID: u8 = 0xFF;

/// Frame opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Register read request
    Read = CMD_READ_REGBUF,
    /// Register write
    Write = CMD_WRITE_REGBUF,
}

impl Opcode {
    /// Decode an opcode byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CMD_READ_REGBUF => Some(Self::Read),
            CMD_WRITE_REGBUF => Some(Self::Write),
            _ => None,
        }
    }
}

/// Speech recognition model type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ModelType {
    /// Recognition disabled
    Standby = 0x00,
    /// Mandarin Chinese command words
    #[default]
    Chinese = 0x01,
    /// English command words
    English = 0x02,
}

impl ModelType {
    /// Register value for this model
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Decode a register value
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Standby),
            0x01 => Some(Self::Chinese),
            0x02 => Some(Self::English),
            _ => None,
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standby => write!(f, "standby"),
            Self::Chinese => write!(f, "chinese"),
            Self::English => write!(f, "english"),
        }
    }
}

/// Error returned when a model type name is not recognized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseModelTypeError;

impl fmt::Display for ParseModelTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown model type (expected standby, cn or en)")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseModelTypeError {}

impl FromStr for ModelType {
    type Err = ParseModelTypeError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s {
            "standby" | "stdby" => Ok(Self::Standby),
            "cn" | "chinese" | "zh" => Ok(Self::Chinese),
            "en" | "english" => Ok(Self::English),
            _ => Err(ParseModelTypeError),
        }
    }
}
