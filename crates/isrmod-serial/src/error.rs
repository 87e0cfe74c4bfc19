//! Error types for serial port operations

use thiserror::Error;

/// Serial transport errors
#[derive(Debug, Error)]
pub enum SerialError {
    /// Failed to open the port
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: serialport::Error,
    },

    /// Port configuration rejected after opening
    #[error("Serial port error: {0}")]
    Port(#[from] serialport::Error),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Device not specified
    #[error("No device specified. Use dev=/dev/ttyUSB0")]
    NoDevice,
}

/// Result type for serial operations
pub type Result<T> = std::result::Result<T, SerialError>;
