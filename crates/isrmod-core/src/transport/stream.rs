//! Stream (UART) transport
//!
//! The serial link has no transactions: a write is the frame bytes pushed
//! out in order, and a read is the request header followed by a polling
//! loop that drains whatever has arrived until enough bytes are collected
//! or the read timeout runs out. A late or silent module therefore shows
//! up as a short response, not an error; the codec decides what a short
//! response means.

use embedded_io::{Read, ReadReady, Write};

use super::RegisterTransport;
use crate::error::{Result, TransportFailure};
use crate::frame::{Frame, RawResponse, MAX_READ_PAYLOAD};
use crate::timer::{Timer, Timing};

/// Filler for the sentinel slot; the serial link has no junk byte of its own
const SENTINEL_FILL: u8 = 0x00;

/// Upper bound on stale bytes dropped before a read request
const MAX_STALE_BYTES: usize = 1024;

/// Register transport over a byte stream
pub struct StreamTransport<S, T> {
    stream: S,
    timer: T,
    timing: Timing,
}

impl<S, T> StreamTransport<S, T>
where
    S: Read + Write + ReadReady,
    T: Timer,
{
    /// Create a transport with default timing
    pub fn new(stream: S, timer: T) -> Self {
        Self {
            stream,
            timer,
            timing: Timing::default(),
        }
    }

    /// Override delays and timeouts
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Underlying stream
    pub fn stream(&self) -> &S {
        &self.stream
    }

    /// Underlying stream, mutably
    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Release the stream and timer
    pub fn into_inner(self) -> (S, T) {
        (self.stream, self.timer)
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes).map_err(io_failure)?;
        self.stream.flush().map_err(io_failure)?;
        Ok(())
    }

    /// Drop bytes left over from an earlier, truncated exchange
    fn discard_stale(&mut self) -> Result<()> {
        let mut scratch = [0u8; 32];
        let mut dropped = 0;
        while dropped < MAX_STALE_BYTES && self.stream.read_ready().map_err(io_failure)? {
            let n = self.stream.read(&mut scratch).map_err(io_failure)?;
            if n == 0 {
                break;
            }
            dropped += n;
        }
        if dropped > 0 {
            log::debug!("stream: discarded {} stale bytes", dropped);
        }
        Ok(())
    }

    /// Collect up to `buf.len()` bytes until full or the read timeout expires
    fn poll_fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let start = self.timer.now_ms();
        let mut received = 0;

        loop {
            while received < buf.len() && self.stream.read_ready().map_err(io_failure)? {
                let n = self
                    .stream
                    .read(&mut buf[received..])
                    .map_err(io_failure)?;
                if n == 0 {
                    break;
                }
                received += n;
            }

            if received == buf.len() {
                break;
            }
            if self.timer.elapsed_ms(start) >= self.timing.read_timeout_ms as u64 {
                log::debug!(
                    "stream: read timed out after {} ms with {}/{} bytes",
                    self.timing.read_timeout_ms,
                    received,
                    buf.len()
                );
                break;
            }
            // A zero interval would never advance a simulated clock
            self.timer.delay_ms(self.timing.poll_interval_ms.max(1));
        }

        Ok(received)
    }
}

fn io_failure<E: embedded_io::Error>(err: E) -> crate::error::Error {
    log::warn!("stream: I/O error: {:?} ({:?})", err, err.kind());
    TransportFailure::Io.into()
}

impl<S, T> RegisterTransport for StreamTransport<S, T>
where
    S: Read + Write + ReadReady,
    T: Timer,
{
    fn name(&self) -> &'static str {
        "stream"
    }

    fn timing(&self) -> &Timing {
        &self.timing
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let wire = frame.encode();
        log::trace!("stream: write {:02X?}", wire.as_slice());
        self.send(&wire)?;
        self.timer.delay_ms(self.timing.write_settle_ms);
        Ok(())
    }

    fn read_raw(&mut self, request: &Frame) -> Result<RawResponse> {
        let size = request.response_len().min(MAX_READ_PAYLOAD);
        self.discard_stale()?;

        let wire = request.encode();
        log::trace!("stream: read request {:02X?}", wire.as_slice());
        self.send(&wire)?;
        self.timer.delay_ms(self.timing.read_settle_ms);

        let mut buf = [0u8; MAX_READ_PAYLOAD];
        let received = self.poll_fill(&mut buf[..size])?;
        log::trace!("stream: response {:02X?}", &buf[..received]);

        let mut raw = RawResponse::new();
        // Capacity is MAX_READ_PAYLOAD plus the sentinel slot
        let _ = raw.push(SENTINEL_FILL);
        let _ = raw.extend_from_slice(&buf[..received]);
        Ok(raw)
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
    use std::collections::VecDeque;
    use std::vec::Vec;

    /// Serial peer that answers each read request with `reply`, releasing
    /// one byte every `byte_interval_ms` of simulated time
    struct PacedPeer {
        timer: FakeTimer,
        reply: Vec<u8>,
        byte_interval_ms: u64,
        written: Vec<u8>,
        pending: VecDeque<(u64, u8)>,
        stale: VecDeque<u8>,
    }

    impl PacedPeer {
        fn new(timer: FakeTimer, reply: &[u8], byte_interval_ms: u64) -> Self {
            Self {
                timer,
                reply: reply.to_vec(),
                byte_interval_ms,
                written: Vec::new(),
                pending: VecDeque::new(),
                stale: VecDeque::new(),
            }
        }

        fn available(&self) -> bool {
            !self.stale.is_empty()
                || self
                    .pending
                    .front()
                    .is_some_and(|(at, _)| *at <= self.timer.now_ms())
        }
    }

    impl embedded_io::ErrorType for PacedPeer {
        type Error = core::convert::Infallible;
    }

    impl Write for PacedPeer {
        fn write(&mut self, buf: &[u8]) -> core::result::Result<usize, Self::Error> {
            self.written.extend_from_slice(buf);
            if buf.first() == Some(&0xBB) {
                let now = self.timer.now_ms();
                for (i, b) in self.reply.iter().enumerate() {
                    let at = now + self.byte_interval_ms * (i as u64 + 1);
                    self.pending.push_back((at, *b));
                }
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> core::result::Result<(), Self::Error> {
            Ok(())
        }
    }

    impl ReadReady for PacedPeer {
        fn read_ready(&mut self) -> core::result::Result<bool, Self::Error> {
            Ok(self.available())
        }
    }

    impl Read for PacedPeer {
        fn read(&mut self, buf: &mut [u8]) -> core::result::Result<usize, Self::Error> {
            let mut n = 0;
            while n < buf.len() {
                if let Some(b) = self.stale.pop_front() {
                    buf[n] = b;
                } else if self.available() {
                    buf[n] = self.pending.pop_front().map(|(_, b)| b).unwrap_or(0);
                } else {
                    break;
                }
                n += 1;
            }
            Ok(n)
        }
    }

    fn transport(reply: &[u8], interval: u64) -> (StreamTransport<PacedPeer, FakeTimer>, FakeTimer) {
        let timer = FakeTimer::new();
        let peer = PacedPeer::new(timer.clone(), reply, interval);
        (StreamTransport::new(peer, timer.clone()), timer)
    }

    #[test]
    fn test_write_emits_frame_bytes_in_order() {
        let (mut t, timer) = transport(&[], 0);
        let frame = Frame::write(reg::ADD_COMMAND, &[5, 3, b'a', b'b', b'c']).unwrap();
        t.write_frame(&frame).unwrap();

        assert_eq!(t.stream().written, [0xCC, 0x03, 0x05, 5, 3, b'a', b'b', b'c']);
        assert_eq!(timer.now_ms(), 500);
    }

    #[test]
    fn test_prompt_reply_is_complete() {
        let (mut t, _) = transport(&[0x42, 0xCB], 1);
        let payload = t.read_frame(reg::PID, 2).unwrap();
        assert_eq!(payload.as_slice(), &[0x42, 0xCB]);
        assert_eq!(t.stream().written, [0xBB, 0xAA, 0x02]);
    }

    #[test]
    fn test_slow_producer_yields_short_buffer() {
        // One byte every 150 ms: only the first arrives inside the 200 ms window
        let (mut t, timer) = transport(&[1, 2, 3, 4], 150);
        let request = Frame::read(reg::PID, 4).unwrap();
        let raw = t.read_raw(&request).unwrap();

        assert_eq!(raw.as_slice(), &[SENTINEL_FILL, 1]);
        // settle + timeout + one poll interval at most
        assert!(timer.now_ms() <= 50 + 200 + 1);
    }

    #[test]
    fn test_short_read_surfaces_through_codec() {
        let (mut t, _) = transport(&[7], 500);
        assert_eq!(
            t.read_frame(reg::VOICE_ID, 1),
            Err(Error::Transport(TransportFailure::ShortRead {
                expected: 1,
                received: 0
            }))
        );
    }

    #[test]
    fn test_silent_peer_with_zero_poll_interval_times_out() {
        let (t, timer) = transport(&[], 0);
        let mut t = t.with_timing(Timing::immediate().with_poll_interval(0));
        let request = Frame::read(reg::VOICE_ID, 1).unwrap();
        let raw = t.read_raw(&request).unwrap();

        assert_eq!(raw.as_slice(), &[SENTINEL_FILL]);
        assert!(timer.now_ms() >= 200);
        assert!(timer.now_ms() <= 201);
    }

    #[test]
    fn test_stale_bytes_dropped_before_request() {
        let (mut t, _) = transport(&[0x09], 1);
        t.stream_mut().stale.extend([0xDE, 0xAD]);
        let payload = t.read_frame(reg::VOICE_ID, 1).unwrap();
        assert_eq!(payload.as_slice(), &[0x09]);
    }
}
