//! Transport abstraction
//!
//! A transport moves encoded frames to the module and brings read
//! responses back. Two physical links are supported and they read in very
//! different ways:
//!
//! - [`BusTransport`]: every read is one atomic request/response bus
//!   transaction; the response carries one junk byte up front.
//! - [`StreamTransport`]: writes are fire-and-forget bytes on a serial
//!   line; reads poll the line until enough bytes arrive or a timeout
//!   expires, and may come back short.
//!
//! Both hand the codec a raw response whose first byte is a sentinel slot,
//! so [`decode_read_response`] strips exactly one byte regardless of link.
//! Neither transport retries on its own; retry policy belongs to the
//! command-word manager.

pub mod bus;
pub mod stream;

pub use bus::{BusState, BusTransport, I2cBus};
pub use stream::StreamTransport;

use crate::error::{Error, Result};
use crate::frame::{decode_read_response, Frame, Payload, RawResponse};
use crate::timer::Timing;

/// Register-level link to a recognition module
pub trait RegisterTransport {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// Delays and timeouts in effect
    fn timing(&self) -> &Timing;

    /// Send one write frame, then wait the write settle delay
    fn write_frame(&mut self, frame: &Frame) -> Result<()>;

    /// Send a read request and collect the raw response.
    ///
    /// The returned buffer starts with the sentinel slot followed by the
    /// payload bytes that arrived, which may be fewer than requested.
    fn read_raw(&mut self, request: &Frame) -> Result<RawResponse>;

    /// Read `size` bytes from `register`
    fn read_frame(&mut self, register: u8, size: usize) -> Result<Payload> {
        let request = Frame::read(register, size)?;
        let raw = self.read_raw(&request)?;
        let data = decode_read_response(&raw, size)?;
        Payload::from_slice(data).map_err(|_| Error::PayloadTooLarge(data.len()))
    }

    /// Check that the module answers at all
    fn probe(&mut self) -> Result<()> {
        Ok(())
    }

    /// Block for `ms` milliseconds using the transport's time source
    fn delay_ms(&mut self, ms: u32);
}

#[cfg(feature = "alloc")]
impl<T: RegisterTransport + ?Sized> RegisterTransport for alloc::boxed::Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn timing(&self) -> &Timing {
        (**self).timing()
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        (**self).write_frame(frame)
    }

    fn read_raw(&mut self, request: &Frame) -> Result<RawResponse> {
        (**self).read_raw(request)
    }

    fn read_frame(&mut self, register: u8, size: usize) -> Result<Payload> {
        (**self).read_frame(register, size)
    }

    fn probe(&mut self) -> Result<()> {
        (**self).probe()
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}
