//! Error types for Linux I2C operations

use thiserror::Error;

/// Linux I2C specific errors
#[derive(Debug, Error)]
pub enum LinuxI2cError {
    /// Failed to open device
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The kernel refused the slave address
    #[error("Failed to select slave address 0x{address:02X}: {source}")]
    SetAddressFailed {
        address: u8,
        #[source]
        source: std::io::Error,
    },

    /// Bus transaction failed (typically a NACK)
    #[error("I2C transfer failed: {0}")]
    TransferFailed(#[source] std::io::Error),

    /// Fewer bytes moved than the transaction asked for
    #[error("I2C transfer incomplete: {done} of {requested} bytes")]
    Incomplete { requested: usize, done: usize },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Device not specified
    #[error("No device specified. Use dev=/dev/i2c-N")]
    NoDevice,
}

/// Result type for Linux I2C operations
pub type Result<T> = std::result::Result<T, LinuxI2cError>;
