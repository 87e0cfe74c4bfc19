//! Bus (I2C) transport
//!
//! Writes are one addressed transaction carrying the whole frame. Reads
//! are an addressed write of the request frame, a short settle, then an
//! addressed read of `size + 1` bytes: the module clocks out one
//! indeterminate byte before the register contents.

use super::RegisterTransport;
use crate::error::{Result, TransportFailure};
use crate::frame::{Frame, RawResponse, MAX_READ_PAYLOAD, SENTINEL_LEN};
use crate::register::MODULE_I2C_ADDRESS;
use crate::timer::{Timer, Timing};

/// Addressed byte bus (I2C master)
///
/// Each call is one complete transaction: start, address, data, stop.
pub trait I2cBus {
    /// Bus error type
    type Error: core::fmt::Debug;

    /// Write `bytes` to the device at `address`
    fn write(&mut self, address: u8, bytes: &[u8]) -> core::result::Result<(), Self::Error>;

    /// Fill `buf` from the device at `address`
    fn read(&mut self, address: u8, buf: &mut [u8]) -> core::result::Result<(), Self::Error>;

    /// Address the device with an empty write to check it acknowledges
    fn probe(&mut self, address: u8) -> core::result::Result<(), Self::Error> {
        self.write(address, &[])
    }
}

impl<B: I2cBus + ?Sized> I2cBus for &mut B {
    type Error = B::Error;

    fn write(&mut self, address: u8, bytes: &[u8]) -> core::result::Result<(), Self::Error> {
        (**self).write(address, bytes)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> core::result::Result<(), Self::Error> {
        (**self).read(address, buf)
    }

    fn probe(&mut self, address: u8) -> core::result::Result<(), Self::Error> {
        (**self).probe(address)
    }
}

/// Where a bus exchange currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusState {
    /// No exchange in progress
    Idle,
    /// Request frame is being sent
    Requesting,
    /// Response is being read back
    Responding,
}

/// Register transport over an addressed bus
pub struct BusTransport<B, T> {
    bus: B,
    timer: T,
    address: u8,
    timing: Timing,
    state: BusState,
}

impl<B: I2cBus, T: Timer> BusTransport<B, T> {
    /// Create a transport for the module at the default address
    pub fn new(bus: B, timer: T) -> Self {
        Self {
            bus,
            timer,
            address: MODULE_I2C_ADDRESS,
            timing: Timing::default(),
            state: BusState::Idle,
        }
    }

    /// Talk to the module at another 7-bit address
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Override delays
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Device address in use
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Current exchange state
    pub fn state(&self) -> BusState {
        self.state
    }

    /// Underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Underlying bus, mutably
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Release the bus and timer
    pub fn into_inner(self) -> (B, T) {
        (self.bus, self.timer)
    }

    fn fail(&mut self, what: &str, register: u8, err: B::Error) -> TransportFailure {
        log::warn!(
            "bus: {} for register 0x{:02X} at 0x{:02X} failed: {:?}",
            what,
            register,
            self.address,
            err
        );
        self.state = BusState::Idle;
        TransportFailure::Nack
    }
}

impl<B: I2cBus, T: Timer> RegisterTransport for BusTransport<B, T> {
    fn name(&self) -> &'static str {
        "bus"
    }

    fn timing(&self) -> &Timing {
        &self.timing
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let wire = frame.encode();
        log::trace!("bus: write {:02X?}", wire.as_slice());

        self.state = BusState::Requesting;
        if let Err(e) = self.bus.write(self.address, &wire) {
            return Err(self.fail("write", frame.register(), e).into());
        }
        self.state = BusState::Idle;

        self.timer.delay_ms(self.timing.write_settle_ms);
        Ok(())
    }

    fn read_raw(&mut self, request: &Frame) -> Result<RawResponse> {
        let size = request.response_len().min(MAX_READ_PAYLOAD);
        let wire = request.encode();
        log::trace!("bus: read request {:02X?}", wire.as_slice());

        self.state = BusState::Requesting;
        if let Err(e) = self.bus.write(self.address, &wire) {
            return Err(self.fail("read request", request.register(), e).into());
        }

        self.timer.delay_ms(self.timing.read_settle_ms);

        self.state = BusState::Responding;
        let mut buf = [0u8; MAX_READ_PAYLOAD + SENTINEL_LEN];
        let len = size + SENTINEL_LEN;
        if let Err(e) = self.bus.read(self.address, &mut buf[..len]) {
            return Err(self.fail("read", request.register(), e).into());
        }
        self.state = BusState::Idle;

        log::trace!("bus: response {:02X?}", &buf[..len]);
        let mut raw = RawResponse::new();
        // len never exceeds the response capacity
        let _ = raw.extend_from_slice(&buf[..len]);
        Ok(raw)
    }

    fn probe(&mut self) -> Result<()> {
        match self.bus.probe(self.address) {
            Ok(()) => {
                log::debug!("bus: module acknowledged at 0x{:02X}", self.address);
                Ok(())
            }
            Err(e) => {
                log::error!("bus: no module at 0x{:02X}: {:?}", self.address, e);
                self.state = BusState::Idle;
                Err(TransportFailure::Nack.into())
            }
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        self.timer.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::register::reg;
    use crate::testutil::FakeTimer;

    extern crate std;
    use std::vec::Vec;

    /// Bus that records transactions and answers reads with a counter
    /// pattern behind a 0xEE junk byte
    #[derive(Default)]
    struct RecordingBus {
        writes: Vec<(u8, Vec<u8>)>,
        reads: Vec<(u8, usize)>,
        nack_reads: bool,
        nack_writes: bool,
    }

    impl I2cBus for RecordingBus {
        type Error = &'static str;

        fn write(&mut self, address: u8, bytes: &[u8]) -> core::result::Result<(), Self::Error> {
            if self.nack_writes {
                return Err("nack");
            }
            self.writes.push((address, bytes.to_vec()));
            Ok(())
        }

        fn read(&mut self, address: u8, buf: &mut [u8]) -> core::result::Result<(), Self::Error> {
            if self.nack_reads {
                return Err("nack");
            }
            self.reads.push((address, buf.len()));
            buf[0] = 0xEE;
            for (i, b) in buf.iter_mut().enumerate().skip(1) {
                *b = i as u8;
            }
            Ok(())
        }
    }

    fn transport(bus: RecordingBus) -> (BusTransport<RecordingBus, FakeTimer>, FakeTimer) {
        let timer = FakeTimer::new();
        (BusTransport::new(bus, timer.clone()), timer)
    }

    #[test]
    fn test_write_is_one_transaction_then_settle() {
        let (mut t, timer) = transport(RecordingBus::default());
        let frame = Frame::write(reg::MODEL_TYPE, &[0x02]).unwrap();
        t.write_frame(&frame).unwrap();

        assert_eq!(t.bus().writes, [(0x14, [0xCC, 0x02, 0x01, 0x02].to_vec())]);
        assert_eq!(timer.now_ms(), 500);
        assert_eq!(t.state(), BusState::Idle);
    }

    #[test]
    fn test_read_requests_one_extra_byte() {
        let (mut t, timer) = transport(RecordingBus::default());
        let payload = t.read_frame(reg::PID, 2).unwrap();

        assert_eq!(t.bus().writes, [(0x14, [0xBB, 0xAA, 0x02].to_vec())]);
        assert_eq!(t.bus().reads, [(0x14, 3)]);
        assert_eq!(payload.as_slice(), &[1, 2]);
        assert_eq!(timer.now_ms(), 50);
    }

    #[test]
    fn test_read_discards_exactly_one_byte_for_all_sizes() {
        for size in 1..=31usize {
            let (mut t, _) = transport(RecordingBus::default());
            let payload = t.read_frame(reg::VOICE_ID, size).unwrap();
            let expected: Vec<u8> = (1..=size as u8).collect();
            assert_eq!(payload.as_slice(), expected.as_slice(), "size {}", size);
            assert_eq!(t.bus().reads[0].1, size + 1);
        }
    }

    #[test]
    fn test_nack_returns_to_idle_without_retry() {
        let bus = RecordingBus {
            nack_reads: true,
            ..Default::default()
        };
        let (mut t, _) = transport(bus);
        assert_eq!(
            t.read_frame(reg::VOICE_ID, 1),
            Err(Error::Transport(TransportFailure::Nack))
        );
        assert_eq!(t.state(), BusState::Idle);
        assert_eq!(t.bus().writes.len(), 1);
    }

    #[test]
    fn test_write_nack_skips_settle() {
        let bus = RecordingBus {
            nack_writes: true,
            ..Default::default()
        };
        let (mut t, timer) = transport(bus);
        let frame = Frame::write(reg::DELETE_BY_ID, &[4]).unwrap();
        assert!(t.write_frame(&frame).is_err());
        assert_eq!(timer.now_ms(), 0);
        assert!(t.probe().is_err());
    }

    #[test]
    fn test_custom_address_and_timing() {
        let timer = FakeTimer::new();
        let mut t = BusTransport::new(RecordingBus::default(), timer.clone())
            .with_address(0x20)
            .with_timing(Timing::immediate());
        t.write_frame(&Frame::write(reg::WAKEUP_TIME, &[30]).unwrap())
            .unwrap();
        assert_eq!(t.bus().writes[0].0, 0x20);
        assert_eq!(timer.now_ms(), 0);
    }
}
