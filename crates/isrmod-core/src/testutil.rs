//! Scripted fakes shared by the unit tests

extern crate std;

use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use core::cell::Cell;

use crate::error::{Result, TransportFailure};
use crate::frame::{Frame, RawResponse};
use crate::timer::{Timer, Timing};
use crate::transport::RegisterTransport;

/// Simulated clock; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct FakeTimer {
    now: Rc<Cell<u64>>,
}

impl FakeTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Timer for FakeTimer {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(ms as u64);
    }
}

/// Transport that records every frame and answers reads from a script
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    pub timing: Timing,
    pub writes: Vec<Frame>,
    pub read_requests: Vec<Frame>,
    /// Payloads returned by successive reads; `Err` simulates a link failure
    pub responses: VecDeque<Result<Vec<u8>>>,
    pub fail_writes: bool,
    pub delays: Vec<u32>,
    pub probed: bool,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            timing: Timing::immediate(),
            ..Default::default()
        }
    }

    pub fn respond(&mut self, payload: &[u8]) -> &mut Self {
        self.responses.push_back(Ok(payload.to_vec()));
        self
    }

    pub fn fail_read(&mut self) -> &mut Self {
        self.responses
            .push_back(Err(TransportFailure::Nack.into()));
        self
    }

    /// Frames written to `register`
    pub fn writes_to(&self, register: u8) -> Vec<&Frame> {
        self.writes
            .iter()
            .filter(|f| f.register() == register)
            .collect()
    }
}

impl RegisterTransport for ScriptedTransport {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn timing(&self) -> &Timing {
        &self.timing
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if self.fail_writes {
            return Err(TransportFailure::Nack.into());
        }
        self.writes.push(frame.clone());
        Ok(())
    }

    fn read_raw(&mut self, request: &Frame) -> Result<RawResponse> {
        self.read_requests.push(request.clone());
        let payload = self
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(TransportFailure::Io.into()))?;
        let mut raw = RawResponse::new();
        raw.push(0xA5).unwrap();
        raw.extend_from_slice(&payload).unwrap();
        Ok(raw)
    }

    fn probe(&mut self) -> Result<()> {
        self.probed = true;
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
    }
}
