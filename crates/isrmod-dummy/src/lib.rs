//! isrmod-dummy - In-memory recognition module emulator for testing
//!
//! This crate provides an emulated recognition module that speaks the
//! register protocol on both links: as an [`I2cBus`] peripheral and as an
//! `embedded-io` byte stream. It keeps a command word table, reassembles
//! chunked commands, reports through the error-status register, and can be
//! told to fail on purpose. It's useful for testing and development without
//! real hardware.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::boxed::Box;
use alloc::collections::{BTreeMap, VecDeque};
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;

use isrmod_core::register::{
    reg, ModelType, CMD_READ_REGBUF, CMD_WRITE_REGBUF, MODULE_I2C_ADDRESS, MODULE_PID,
    MODULE_VERSION, MODULE_VID, NO_MATCH_ID,
};
use isrmod_core::timer::{Timer, Timing};
use isrmod_core::transport::{BusTransport, I2cBus, RegisterTransport, StreamTransport};

/// Error-status codes reported by the emulator
pub mod status {
    /// Command accepted
    pub const OK: u8 = 0x00;
    /// Text already stored under another id
    pub const DUPLICATE: u8 = 0x01;
    /// No free slot in the command word table
    pub const TABLE_FULL: u8 = 0x02;
    /// No command word with that text
    pub const NOT_FOUND: u8 = 0x03;
    /// Empty text or inconsistent chunk headers
    pub const INVALID: u8 = 0x04;
}

/// Byte clocked out ahead of every bus read
const BUS_JUNK_BYTE: u8 = 0x5A;

/// Shortest nonzero wake duration the module keeps
const MIN_WAKE_DURATION: u8 = 6;

/// Configuration for the emulated module
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// 7-bit bus address
    pub address: u8,
    /// Product id register
    pub pid: u16,
    /// Vendor id register
    pub vid: u16,
    /// Firmware version register
    pub version: u16,
    /// Command word table size
    pub capacity: usize,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            address: MODULE_I2C_ADDRESS,
            pid: MODULE_PID,
            vid: MODULE_VID,
            version: MODULE_VERSION,
            capacity: 50,
        }
    }
}

/// Emulator failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DummyError {
    /// Transaction not acknowledged (wrong address or injected fault)
    Nack,
    /// Write transaction that is not a well-formed frame
    Malformed,
}

impl fmt::Display for DummyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nack => write!(f, "not acknowledged"),
            Self::Malformed => write!(f, "malformed frame"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DummyError {}

impl embedded_io::Error for DummyError {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::Other
    }
}

/// Chunked command being reassembled
#[derive(Debug)]
struct Assembly {
    register: u8,
    id: u8,
    total: usize,
    text: Vec<u8>,
}

/// Emulated speech recognition module
#[derive(Debug)]
pub struct EmulatedModule {
    config: DummyConfig,
    words: BTreeMap<u8, Vec<u8>>,
    model: ModelType,
    wake_duration: u8,
    error_status: u8,
    last_result: u8,
    assembly: Option<Assembly>,
    /// Response to the latest bus read request
    pending: Vec<u8>,
    /// Stream bytes received but not yet parsed
    rx: Vec<u8>,
    /// Stream bytes waiting to be read by the host
    tx: VecDeque<u8>,
    scripted_status: VecDeque<u8>,
    drop_transactions: usize,
    frames: usize,
}

impl EmulatedModule {
    /// Create a module with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        Self {
            config,
            words: BTreeMap::new(),
            model: ModelType::Chinese,
            wake_duration: 10,
            error_status: status::OK,
            last_result: NO_MATCH_ID,
            assembly: None,
            pending: Vec::new(),
            rx: Vec::new(),
            tx: VecDeque::new(),
            scripted_status: VecDeque::new(),
            drop_transactions: 0,
            frames: 0,
        }
    }

    /// Create a module with default configuration (DFR0715 identity)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Text stored under `id`
    pub fn word(&self, id: u8) -> Option<&[u8]> {
        self.words.get(&id).map(Vec::as_slice)
    }

    /// Stored command words in id order
    pub fn words(&self) -> impl Iterator<Item = (u8, &[u8])> {
        self.words.iter().map(|(id, text)| (*id, text.as_slice()))
    }

    /// Store a command word directly, bypassing the protocol
    pub fn preload(&mut self, id: u8, text: &[u8]) {
        self.words.insert(id, text.to_vec());
    }

    /// Active recognition model
    pub fn model(&self) -> ModelType {
        self.model
    }

    /// Wake duration in seconds, after clamping
    pub fn wake_duration(&self) -> u8 {
        self.wake_duration
    }

    /// Current value of the error-status register
    pub fn error_status(&self) -> u8 {
        self.error_status
    }

    /// Number of complete frames received so far
    pub fn frames_received(&self) -> usize {
        self.frames
    }

    /// Simulate hearing the utterance with result `id`
    pub fn hear(&mut self, id: u8) {
        self.last_result = id;
    }

    /// Simulate hearing `text`; unknown text leaves nothing recognized
    pub fn hear_text(&mut self, text: &[u8]) {
        self.last_result = self
            .words
            .iter()
            .find(|(_, t)| t.as_slice() == text)
            .map(|(id, _)| *id)
            .unwrap_or(NO_MATCH_ID);
    }

    /// Reject the next chunked commands with these status codes, one per command
    pub fn script_status(&mut self, codes: &[u8]) {
        self.scripted_status.extend(codes.iter().copied());
    }

    /// Lose the next `count` transactions: bus transfers are not
    /// acknowledged and stream frames go unanswered
    pub fn drop_next(&mut self, count: usize) {
        self.drop_transactions += count;
    }

    fn take_drop(&mut self) -> bool {
        if self.drop_transactions > 0 {
            self.drop_transactions -= 1;
            true
        } else {
            false
        }
    }

    /// Handle one complete frame; returns the response of a read request
    fn handle_frame(&mut self, frame: &[u8]) -> Result<Option<Vec<u8>>, DummyError> {
        if frame.len() < 3 {
            return Err(DummyError::Malformed);
        }
        let (opcode, register, len) = (frame[0], frame[1], frame[2] as usize);
        self.frames += 1;

        match opcode {
            CMD_WRITE_REGBUF => {
                let payload = frame.get(3..).ok_or(DummyError::Malformed)?;
                if payload.len() != len {
                    return Err(DummyError::Malformed);
                }
                log::trace!("dummy: write reg 0x{:02X} {:02X?}", register, payload);
                self.write_register(register, payload);
                Ok(None)
            }
            CMD_READ_REGBUF => {
                log::trace!("dummy: read reg 0x{:02X} len {}", register, len);
                Ok(Some(self.read_register(register, len)))
            }
            _ => Err(DummyError::Malformed),
        }
    }

    fn write_register(&mut self, register: u8, payload: &[u8]) {
        match register {
            reg::WAKEUP_TIME => {
                if let Some(&secs) = payload.first() {
                    self.wake_duration = match secs {
                        1..=5 => MIN_WAKE_DURATION,
                        s => s,
                    };
                }
                if let Some(model) = payload.get(1).and_then(|b| ModelType::from_byte(*b)) {
                    self.model = model;
                }
            }
            reg::MODEL_TYPE => {
                if let Some(model) = payload.first().and_then(|b| ModelType::from_byte(*b)) {
                    self.model = model;
                }
            }
            reg::ADD_COMMAND | reg::DELETE_BY_TEXT => self.accept_chunk(register, payload),
            reg::DELETE_BY_ID => {
                if let Some(id) = payload.first() {
                    if self.words.remove(id).is_some() {
                        log::debug!("dummy: deleted command word {}", id);
                    }
                }
            }
            _ => log::debug!("dummy: write to unknown register 0x{:02X}", register),
        }
    }

    fn read_register(&mut self, register: u8, len: usize) -> Vec<u8> {
        let mut data = match register {
            reg::VOICE_ID => {
                let id = self.last_result;
                self.last_result = NO_MATCH_ID;
                alloc::vec![id]
            }
            reg::WAKEUP_TIME => alloc::vec![self.wake_duration],
            reg::MODEL_TYPE => alloc::vec![self.model.as_byte()],
            reg::ERROR_STATUS => alloc::vec![self.error_status],
            reg::PID => self.config.pid.to_be_bytes().to_vec(),
            reg::VID => self.config.vid.to_be_bytes().to_vec(),
            reg::VERSION => self.config.version.to_be_bytes().to_vec(),
            _ => Vec::new(),
        };
        data.resize(len, 0);
        data
    }

    fn accept_chunk(&mut self, register: u8, payload: &[u8]) {
        if payload.len() < 2 {
            self.assembly = None;
            self.error_status = status::INVALID;
            return;
        }
        let (id, total) = match register {
            reg::ADD_COMMAND => (payload[0], payload[1] as usize),
            _ => (0, payload[0] as usize),
        };

        let continues = self
            .assembly
            .as_ref()
            .is_some_and(|a| a.register == register && a.id == id && a.total == total);
        if !continues {
            self.error_status = status::OK;
            self.assembly = Some(Assembly {
                register,
                id,
                total,
                text: Vec::with_capacity(total),
            });
        }

        let Some(assembly) = self.assembly.as_mut() else {
            return;
        };
        assembly.text.extend_from_slice(&payload[2..]);
        if assembly.text.len() >= assembly.total {
            if let Some(done) = self.assembly.take() {
                self.commit(done);
            }
        }
    }

    fn commit(&mut self, done: Assembly) {
        if let Some(code) = self.scripted_status.pop_front() {
            log::debug!("dummy: rejecting command with scripted status 0x{:02X}", code);
            self.error_status = code;
            return;
        }
        if done.text.len() != done.total || done.text.is_empty() {
            self.error_status = status::INVALID;
            return;
        }

        self.error_status = match done.register {
            reg::ADD_COMMAND => self.add_word(done.id, done.text),
            _ => self.delete_word(&done.text),
        };
    }

    fn add_word(&mut self, id: u8, text: Vec<u8>) -> u8 {
        if self.words.iter().any(|(i, t)| *i != id && *t == text) {
            return status::DUPLICATE;
        }
        if !self.words.contains_key(&id) && self.words.len() >= self.config.capacity {
            return status::TABLE_FULL;
        }
        log::debug!("dummy: stored command word {} ({} bytes)", id, text.len());
        self.words.insert(id, text);
        status::OK
    }

    fn delete_word(&mut self, text: &[u8]) -> u8 {
        let found = self
            .words
            .iter()
            .find(|(_, t)| t.as_slice() == text)
            .map(|(id, _)| *id);
        match found {
            Some(id) => {
                self.words.remove(&id);
                log::debug!("dummy: deleted command word {} by text", id);
                status::OK
            }
            None => status::NOT_FOUND,
        }
    }

    /// Parse every complete frame buffered from the stream
    fn drain_rx(&mut self) {
        loop {
            let Some(&opcode) = self.rx.first() else {
                break;
            };
            if opcode != CMD_WRITE_REGBUF && opcode != CMD_READ_REGBUF {
                log::debug!("dummy: skipping stray byte 0x{:02X}", opcode);
                self.rx.remove(0);
                continue;
            }
            if self.rx.len() < 3 {
                break;
            }
            let need = match opcode {
                CMD_WRITE_REGBUF => 3 + self.rx[2] as usize,
                _ => 3,
            };
            if self.rx.len() < need {
                break;
            }

            let frame: Vec<u8> = self.rx.drain(..need).collect();
            if self.take_drop() {
                log::debug!("dummy: dropping stream frame {:02X?}", frame);
                continue;
            }
            match self.handle_frame(&frame) {
                Ok(Some(response)) => self.tx.extend(response),
                Ok(None) => {}
                Err(e) => log::debug!("dummy: {}", e),
            }
        }
    }
}

impl Default for EmulatedModule {
    fn default() -> Self {
        Self::new_default()
    }
}

impl I2cBus for EmulatedModule {
    type Error = DummyError;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), DummyError> {
        if address != self.config.address || self.take_drop() {
            return Err(DummyError::Nack);
        }
        if bytes.is_empty() {
            return Ok(());
        }
        self.pending = self.handle_frame(bytes)?.unwrap_or_default();
        Ok(())
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), DummyError> {
        if address != self.config.address || self.take_drop() {
            return Err(DummyError::Nack);
        }
        let Some((junk, rest)) = buf.split_first_mut() else {
            return Ok(());
        };
        *junk = BUS_JUNK_BYTE;
        for (i, b) in rest.iter_mut().enumerate() {
            *b = self.pending.get(i).copied().unwrap_or(0);
        }
        self.pending.clear();
        Ok(())
    }
}

impl embedded_io::ErrorType for EmulatedModule {
    type Error = DummyError;
}

impl embedded_io::Write for EmulatedModule {
    fn write(&mut self, buf: &[u8]) -> Result<usize, DummyError> {
        self.rx.extend_from_slice(buf);
        self.drain_rx();
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), DummyError> {
        Ok(())
    }
}

impl embedded_io::Read for EmulatedModule {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, DummyError> {
        let mut n = 0;
        while n < buf.len() {
            match self.tx.pop_front() {
                Some(b) => buf[n] = b,
                None => break,
            }
            n += 1;
        }
        Ok(n)
    }
}

impl embedded_io::ReadReady for EmulatedModule {
    fn read_ready(&mut self) -> Result<bool, DummyError> {
        Ok(!self.tx.is_empty())
    }
}

/// Simulated millisecond clock; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct SimTimer {
    now: Rc<Cell<u64>>,
}

impl SimTimer {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Timer for SimTimer {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(ms as u64);
    }
}

/// Which link the emulated module is attached through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkMode {
    /// I2C bus transport
    #[default]
    Bus,
    /// UART stream transport
    Stream,
}

/// Parse transport options from a list of key-value pairs
pub fn parse_options(options: &[(&str, &str)]) -> Result<LinkMode, &'static str> {
    let mut mode = LinkMode::default();
    for (key, value) in options {
        match (*key, *value) {
            ("mode", "bus" | "i2c") => mode = LinkMode::Bus,
            ("mode", "stream" | "uart" | "serial") => mode = LinkMode::Stream,
            ("mode", _) => return Err("Invalid mode value, use mode=bus or mode=stream"),
            _ => log::warn!("dummy: Unknown option: {}={}", key, value),
        }
    }
    Ok(mode)
}

/// Open an emulated module and return a boxed register transport
///
/// The module runs on simulated time with settle delays removed.
///
/// # Example Options
///
/// - `mode=bus` - Optional: `bus` (default) or `stream`
pub fn open_dummy(options: &[(&str, &str)]) -> Result<Box<dyn RegisterTransport>, DummyError> {
    let mode = parse_options(options).map_err(|msg| {
        log::error!("dummy: {}", msg);
        DummyError::Malformed
    })?;
    let module = EmulatedModule::new_default();
    let timer = SimTimer::new();
    log::info!("dummy: Emulated module attached over {:?} link", mode);

    let transport: Box<dyn RegisterTransport> = match mode {
        LinkMode::Bus => {
            Box::new(BusTransport::new(module, timer).with_timing(Timing::immediate()))
        }
        LinkMode::Stream => {
            Box::new(StreamTransport::new(module, timer).with_timing(Timing::immediate()))
        }
    };
    Ok(transport)
}
