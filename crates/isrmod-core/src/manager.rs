//! Command word manager
//!
//! Adds and deletes entries of the module's command word table and reads
//! the recognition result. Multi-frame commands are checked through the
//! error-status register and resent once, as a whole, when the first pass
//! does not come back clean:
//!
//! | operation        | verify          | retry                         |
//! |------------------|-----------------|-------------------------------|
//! | add              | after each pass | once, status re-read          |
//! | delete by text   | first pass only | once, status not re-read      |
//! | delete by id     | none            | none                          |
//!
//! Link failures during a pass count the same as a nonzero status: both
//! trigger the one resend.

use crate::chunk::{self, Chunks, CommandKind};
use crate::error::{Error, Result};
use crate::frame::{Frame, Payload};
use crate::observer::{LogObserver, Observer, Operation};
use crate::register::{reg, NO_MATCH_ID, WAKE_WORD_ID};
use crate::transport::RegisterTransport;

/// Owner of the transport; sequences every register exchange
pub struct CommandWordManager<T, O = LogObserver> {
    transport: T,
    observer: O,
}

impl<T: RegisterTransport> CommandWordManager<T> {
    /// Create a manager that logs trace points
    pub fn new(transport: T) -> Self {
        Self::with_observer(transport, LogObserver)
    }
}

impl<T: RegisterTransport, O: Observer> CommandWordManager<T, O> {
    /// Create a manager reporting to `observer`
    pub fn with_observer(transport: T, observer: O) -> Self {
        Self {
            transport,
            observer,
        }
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Underlying transport, mutably
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Attached observer
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Release the transport
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Write `payload` to `register`
    pub fn write_register(&mut self, register: u8, payload: &[u8]) -> Result<()> {
        let frame = Frame::write(register, payload)?;
        self.send(&frame)
    }

    /// Read `size` bytes from `register`
    pub fn read_register(&mut self, register: u8, size: usize) -> Result<Payload> {
        let request = Frame::read(register, size)?;
        self.observer.on_send(&request);
        let result = self.transport.read_frame(register, size);
        self.observer
            .on_response(register, result.as_ref().map(|p| p.as_slice()).map_err(|e| *e));
        result
    }

    /// Add a command word.
    ///
    /// Ids 0 (wake word) and 255 (no match) are rejected. Returns
    /// `Err(DeviceReported(code))` when the error-status register is still
    /// nonzero after the resend.
    pub fn add_command_word(&mut self, id: u8, text: &[u8]) -> Result<()> {
        if id == WAKE_WORD_ID || id == NO_MATCH_ID {
            return Err(Error::ReservedId(id));
        }
        let chunks = chunk::encode(CommandKind::Add { id }, text)?;
        log::debug!(
            "isr: adding command word {} ({} bytes, {} chunks)",
            id,
            text.len(),
            chunks.len()
        );

        match self.send_checked(&chunks) {
            Ok(()) => return Ok(()),
            Err(cause) => self
                .observer
                .on_retry(Operation::AddCommandWord { id }, cause),
        }

        self.send_checked(&chunks)
    }

    /// Delete the command word with `id`.
    ///
    /// The module has no status for this command; nothing is verified and
    /// link failures are only logged.
    pub fn delete_command_word_by_id(&mut self, id: u8) {
        log::debug!("isr: deleting command word {}", id);
        if let Err(e) = self.write_register(reg::DELETE_BY_ID, &[id]) {
            log::warn!("isr: delete of command word {} not sent: {}", id, e);
        }
    }

    /// Delete the command word whose text matches `text` exactly.
    ///
    /// Only argument errors are returned. The sequence is resent once when
    /// the first pass fails, and the outcome of the resend is not checked.
    pub fn delete_command_word_by_text(&mut self, text: &[u8]) -> Result<()> {
        let chunks = chunk::encode(CommandKind::DeleteByText, text)?;
        log::debug!(
            "isr: deleting command word by text ({} bytes, {} chunks)",
            text.len(),
            chunks.len()
        );

        if let Err(cause) = self.send_checked(&chunks) {
            self.observer.on_retry(Operation::DeleteByText, cause);
            match self.send_chunks(&chunks) {
                Ok(()) => log::debug!("isr: delete by text resent, status not verified"),
                Err(e) => log::warn!("isr: delete by text resend failed: {}", e),
            }
        }
        Ok(())
    }

    /// Id of the last recognized command word.
    ///
    /// `0xFF` means nothing was recognized. A failed read also yields
    /// `0xFF`, so callers cannot tell the two apart.
    pub fn keyword_id(&mut self) -> u8 {
        match self.read_register(reg::VOICE_ID, 1) {
            Ok(data) => data[0],
            Err(_) => NO_MATCH_ID,
        }
    }

    fn send(&mut self, frame: &Frame) -> Result<()> {
        self.observer.on_send(frame);
        self.transport.write_frame(frame)
    }

    fn send_chunks(&mut self, chunks: &Chunks<'_>) -> Result<()> {
        for chunk in chunks.clone() {
            self.send(&chunk.frame())?;
        }
        Ok(())
    }

    /// One pass: every chunk, then the error-status register
    fn send_checked(&mut self, chunks: &Chunks<'_>) -> Result<()> {
        self.send_chunks(chunks)?;
        match self.read_register(reg::ERROR_STATUS, 1)?[0] {
            0 => Ok(()),
            code => Err(Error::DeviceReported(code)),
        }
    }
}
