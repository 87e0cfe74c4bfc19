//! isrmod-linux-i2c - Linux i2c-dev support
//!
//! This crate drives a recognition module wired to an I2C adapter exposed
//! through the `/dev/i2c-N` device interface.
//!
//! # Example
//!
//! ```no_run
//! use isrmod_core::device::{IsrModule, ModuleConfig};
//! use isrmod_core::timer::StdTimer;
//! use isrmod_core::transport::BusTransport;
//! use isrmod_linux_i2c::{LinuxI2c, LinuxI2cConfig};
//!
//! let config = LinuxI2cConfig::new("/dev/i2c-1").with_address(0x14);
//! let bus = LinuxI2c::open(&config)?;
//! let mut module = IsrModule::new(BusTransport::new(bus, StdTimer::new()));
//! module.begin(&ModuleConfig::default())?;
//! println!("{}", module.identity()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with isrmod CLI
//!
//! ```bash
//! isrmod probe -t linux_i2c:dev=/dev/i2c-1
//! isrmod listen -t linux_i2c:dev=/dev/i2c-1,addr=0x14
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with `CONFIG_I2C_CHARDEV` (module `i2c-dev`)
//! - Read/write access to `/dev/i2c-N`, usually through the `i2c` group

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, LinuxI2c, LinuxI2cConfig};
pub use error::{LinuxI2cError, Result};

use isrmod_core::timer::StdTimer;
use isrmod_core::transport::{BusTransport, RegisterTransport};

/// Open a Linux I2C adapter and return a boxed register transport
///
/// # Example Options
///
/// - `dev=/dev/i2c-1` - Required: device path
/// - `addr=0x14` - Optional: module address (default: 0x14)
pub fn open_linux_i2c(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn RegisterTransport>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let bus = LinuxI2c::open(&config)?;
    let transport = BusTransport::new(bus, StdTimer::new()).with_address(config.address);
    Ok(Box::new(transport))
}
