//! isrmod-core - Register protocol for speech recognition modules
//!
//! This crate implements the host side of the register protocol spoken by
//! offline speech/command-word recognition modules (DFR0715 and compatible).
//! The module exposes a handful of 8-bit registers; the host configures the
//! recognition language and wake duration, manages the table of command
//! words, and polls the last recognized id.
//!
//! It is `no_std` compatible: frames live in fixed-capacity `heapless`
//! buffers and the stream transport is written against `embedded-io`.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`), adds
//!   [`timer::StdTimer`]
//! - `alloc` - Allow boxed transports (`Box<dyn RegisterTransport>`)
//!
//! # Example
//!
//! ```ignore
//! use isrmod_core::device::{IsrModule, ModuleConfig};
//!
//! fn provision<T: isrmod_core::transport::RegisterTransport>(transport: T) {
//!     let mut module = IsrModule::new(transport);
//!     module.begin(&ModuleConfig::default()).unwrap();
//!     module.add_command_word(1, b"turn on the light").unwrap();
//!     println!("{}", module.recognition());
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod chunk;
pub mod device;
pub mod error;
pub mod frame;
pub mod manager;
pub mod observer;
pub mod register;
pub mod timer;
pub mod transport;

#[cfg(test)]
mod testutil;

pub use error::{Error, Result, TransportFailure};
