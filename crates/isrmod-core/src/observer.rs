//! Protocol trace points
//!
//! The manager reports every frame it sends, every response it gets back
//! and every retry it starts to an [`Observer`]. The default
//! [`LogObserver`] forwards them to the `log` facade; tests plug in
//! recorders.

use core::fmt;

use crate::error::{Error, Result};
use crate::frame::Frame;

/// Multi-frame operation that may be retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Adding a command word
    AddCommandWord {
        /// Command word id
        id: u8,
    },
    /// Deleting a command word by its text
    DeleteByText,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddCommandWord { id } => write!(f, "add command word {}", id),
            Self::DeleteByText => write!(f, "delete command word by text"),
        }
    }
}

/// Receiver of protocol trace points
pub trait Observer {
    /// A frame (write or read request) is about to be sent
    fn on_send(&mut self, _frame: &Frame) {}

    /// A read finished, with the payload or the reason it failed
    fn on_response(&mut self, _register: u8, _outcome: Result<&[u8]>) {}

    /// The first pass of `operation` failed and the sequence is being resent
    fn on_retry(&mut self, _operation: Operation, _cause: Error) {}
}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn on_send(&mut self, frame: &Frame) {
        (**self).on_send(frame)
    }

    fn on_response(&mut self, register: u8, outcome: Result<&[u8]>) {
        (**self).on_response(register, outcome)
    }

    fn on_retry(&mut self, operation: Operation, cause: Error) {
        (**self).on_retry(operation, cause)
    }
}

/// Observer that writes trace points to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_send(&mut self, frame: &Frame) {
        log::trace!(
            "isr: -> {:?} reg 0x{:02X} len {} {:02X?}",
            frame.opcode(),
            frame.register(),
            frame.length(),
            frame.payload()
        );
    }

    fn on_response(&mut self, register: u8, outcome: Result<&[u8]>) {
        match outcome {
            Ok(data) => log::trace!("isr: <- reg 0x{:02X} {:02X?}", register, data),
            Err(e) => log::debug!("isr: <- reg 0x{:02X} failed: {}", register, e),
        }
    }

    fn on_retry(&mut self, operation: Operation, cause: Error) {
        log::warn!("isr: {} failed ({}), resending", operation, cause);
    }
}
