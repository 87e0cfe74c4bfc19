//! isrmod-serial - Serial (UART) support
//!
//! This crate drives a recognition module over a serial port. The module
//! talks 8N1 at 57600 baud by default.
//!
//! # Example
//!
//! ```no_run
//! use isrmod_core::device::{IsrModule, ModuleConfig};
//! use isrmod_core::timer::StdTimer;
//! use isrmod_core::transport::StreamTransport;
//! use isrmod_serial::{SerialConfig, SerialStream};
//!
//! let stream = SerialStream::open(&SerialConfig::new("/dev/ttyUSB0"))?;
//! let mut module = IsrModule::new(StreamTransport::new(stream, StdTimer::new()));
//! module.begin(&ModuleConfig::default())?;
//! println!("{}", module.recognition());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with isrmod CLI
//!
//! ```bash
//! isrmod listen -t serial:dev=/dev/ttyUSB0
//! isrmod probe -t serial:dev=/dev/ttyUSB0,baud=57600
//! ```

pub mod error;
pub mod port;

// Re-exports
pub use error::{Result, SerialError};
pub use port::{parse_options, SerialConfig, SerialStream};

use isrmod_core::timer::StdTimer;
use isrmod_core::transport::{RegisterTransport, StreamTransport};

/// Open a serial port and return a boxed register transport
///
/// # Example Options
///
/// - `dev=/dev/ttyUSB0` - Required: port name
/// - `baud=57600` - Optional: baud rate (default: 57600)
pub fn open_serial(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn RegisterTransport>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let stream = SerialStream::open(&config)?;
    Ok(Box::new(StreamTransport::new(stream, StdTimer::new())))
}
