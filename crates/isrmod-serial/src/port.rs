//! Serial port stream
//!
//! Adapts a `serialport::SerialPort` to the `embedded-io` traits the core
//! stream transport is written against.

use crate::error::{Result, SerialError};

use isrmod_core::register::UART_BAUDRATE;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{Read, Write};
use std::time::Duration;

/// Per-call timeout of the underlying port; the transport does its own polling
const PORT_TIMEOUT: Duration = Duration::from_millis(10);

/// Configuration for opening a serial port
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Device path (e.g., "/dev/ttyUSB0" or "COM3")
    pub device: String,
    /// Baud rate (default: 57600)
    pub baud: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            baud: UART_BAUDRATE,
        }
    }
}

impl SerialConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Set the baud rate
    pub fn with_baud(mut self, baud: u32) -> Self {
        self.baud = baud;
        self
    }
}

/// Serial port as an `embedded-io` byte stream
pub struct SerialStream {
    port: Box<dyn SerialPort>,
}

impl SerialStream {
    /// Open and configure a serial port (8N1, no flow control)
    pub fn open(config: &SerialConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(SerialError::NoDevice);
        }

        let port = serialport::new(&config.device, config.baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(PORT_TIMEOUT)
            .open()
            .map_err(|e| SerialError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        // Drop whatever the module printed before we attached
        port.clear(ClearBuffer::Input)?;

        log::info!(
            "serial: Opened {} at {} baud",
            config.device,
            config.baud
        );
        Ok(Self { port })
    }

    /// Wrap an already opened port
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

impl embedded_io::ErrorType for SerialStream {
    type Error = std::io::Error;
}

impl embedded_io::Read for SerialStream {
    fn read(&mut self, buf: &mut [u8]) -> std::result::Result<usize, Self::Error> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e),
        }
    }
}

impl embedded_io::Write for SerialStream {
    fn write(&mut self, buf: &[u8]) -> std::result::Result<usize, Self::Error> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> std::result::Result<(), Self::Error> {
        self.port.flush()
    }
}

impl embedded_io::ReadReady for SerialStream {
    fn read_ready(&mut self) -> std::result::Result<bool, Self::Error> {
        let pending = self.port.bytes_to_read()?;
        Ok(pending > 0)
    }
}

/// Parse transport options from a list of key-value pairs
pub fn parse_options(options: &[(&str, &str)]) -> Result<SerialConfig> {
    let mut config = SerialConfig::default();

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "baud" => {
                config.baud = value.parse().map_err(|_| {
                    SerialError::InvalidParameter(format!("Invalid baud value: {}", value))
                })?;
                if config.baud == 0 {
                    return Err(SerialError::InvalidParameter(
                        "Baud rate must be nonzero".to_string(),
                    ));
                }
            }
            _ => {
                log::warn!("serial: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        return Err(SerialError::NoDevice);
    }

    Ok(config)
}
