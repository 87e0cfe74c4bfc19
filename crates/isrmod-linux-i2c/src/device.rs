//! Linux I2C device implementation
//!
//! This module provides the `LinuxI2c` struct that implements the `I2cBus`
//! trait using Linux's i2c-dev interface.

use crate::error::{LinuxI2cError, Result};

use isrmod_core::register::MODULE_I2C_ADDRESS;
use isrmod_core::transport::I2cBus;

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::unix::io::AsRawFd;

/// Linux i2c-dev ioctl constants
mod ioctl {
    use nix::ioctl_write_int_bad;

    /// Select the 7-bit slave address for subsequent read/write calls
    const I2C_SLAVE: u16 = 0x0703;

    ioctl_write_int_bad!(i2c_set_slave, I2C_SLAVE);
}

/// Configuration for opening a Linux I2C adapter
#[derive(Debug, Clone)]
pub struct LinuxI2cConfig {
    /// Device path (e.g., "/dev/i2c-1")
    pub device: String,
    /// 7-bit address of the module (default: 0x14)
    pub address: u8,
}

impl Default for LinuxI2cConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            address: MODULE_I2C_ADDRESS,
        }
    }
}

impl LinuxI2cConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Set the module address
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }
}

/// I2C master backed by a `/dev/i2c-N` character device
///
/// Every `read`/`write` on the file is one complete bus transaction, which
/// is exactly the granularity `I2cBus` asks for.
pub struct LinuxI2c {
    file: File,
    /// Slave address currently selected in the kernel
    selected: Option<u8>,
}

impl LinuxI2c {
    /// Open a Linux I2C adapter
    pub fn open(config: &LinuxI2cConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxI2cError::NoDevice);
        }

        log::debug!("linux_i2c: Opening device {}", config.device);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| LinuxI2cError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        let mut i2c = Self {
            file,
            selected: None,
        };
        i2c.select(config.address)?;

        log::info!(
            "linux_i2c: Opened {} (address 0x{:02X})",
            config.device,
            config.address
        );
        Ok(i2c)
    }

    /// Open a device with the default module address
    pub fn open_device(device: &str) -> Result<Self> {
        Self::open(&LinuxI2cConfig::new(device))
    }

    fn select(&mut self, address: u8) -> Result<()> {
        if self.selected == Some(address) {
            return Ok(());
        }
        let fd = self.file.as_raw_fd();
        unsafe {
            ioctl::i2c_set_slave(fd, address as libc::c_int).map_err(|e| {
                LinuxI2cError::SetAddressFailed {
                    address,
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }
        self.selected = Some(address);
        log::trace!("linux_i2c: Selected address 0x{:02X}", address);
        Ok(())
    }
}

impl I2cBus for LinuxI2c {
    type Error = LinuxI2cError;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<()> {
        self.select(address)?;
        let done = self
            .file
            .write(bytes)
            .map_err(LinuxI2cError::TransferFailed)?;
        if done != bytes.len() {
            return Err(LinuxI2cError::Incomplete {
                requested: bytes.len(),
                done,
            });
        }
        Ok(())
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<()> {
        self.select(address)?;
        let done = self
            .file
            .read(buf)
            .map_err(LinuxI2cError::TransferFailed)?;
        if done != buf.len() {
            return Err(LinuxI2cError::Incomplete {
                requested: buf.len(),
                done,
            });
        }
        Ok(())
    }
}

/// Parse a 7-bit address given as `0x14` or `20`
fn parse_address(value: &str) -> Result<u8> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => value.parse(),
    };
    let address = parsed.map_err(|_| {
        LinuxI2cError::InvalidParameter(format!("Invalid addr value: {}", value))
    })?;
    if !(0x03..=0x77).contains(&address) {
        return Err(LinuxI2cError::InvalidParameter(format!(
            "Invalid I2C address: 0x{:02X} (must be 0x03-0x77)",
            address
        )));
    }
    Ok(address)
}

/// Parse transport options from a list of key-value pairs
pub fn parse_options(options: &[(&str, &str)]) -> Result<LinuxI2cConfig> {
    let mut config = LinuxI2cConfig::default();

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "addr" => {
                config.address = parse_address(value)?;
            }
            _ => {
                log::warn!("linux_i2c: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        return Err(LinuxI2cError::NoDevice);
    }

    Ok(config)
}
