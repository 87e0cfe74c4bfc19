//! Chunked command encoder
//!
//! The module accepts at most 32 bytes per write transaction, so command
//! word text is sent in 23-byte windows. Each window travels in its own
//! register write behind a 2-byte control header:
//!
//! - add: `[id, total_len]` on every chunk
//! - delete by text: `[total_len, 0]` on every chunk
//!
//! The module appends the windows of consecutive writes to its receive
//! buffer, so chunk order is transmission order. [`Chunks`] is a cloneable
//! iterator: resending a sequence is a matter of iterating a clone.

use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::register::reg;

/// Text bytes carried per chunk
pub const CHUNK_TEXT_LEN: usize = 23;
/// Control header bytes at the start of every chunk
pub const CHUNK_HEADER_LEN: usize = 2;
/// Size of the outbound chunk buffer; no chunk payload exceeds it
pub const MAX_CHUNK_PAYLOAD: usize = 30;
/// Longest command word the length byte can describe
pub const MAX_TEXT_LEN: usize = u8::MAX as usize;

/// Which multi-frame command a chunk sequence belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Add a command word with the given id
    Add {
        /// Command word id
        id: u8,
    },
    /// Delete the command word whose text matches exactly
    DeleteByText,
}

impl CommandKind {
    /// Register the chunks of this command are written to
    pub fn register(self) -> u8 {
        match self {
            Self::Add { .. } => reg::ADD_COMMAND,
            Self::DeleteByText => reg::DELETE_BY_TEXT,
        }
    }

    fn header(self, total_len: u8) -> [u8; CHUNK_HEADER_LEN] {
        match self {
            Self::Add { id } => [id, total_len],
            Self::DeleteByText => [total_len, 0],
        }
    }
}

/// One window of the command word text with its control header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    register: u8,
    header: [u8; CHUNK_HEADER_LEN],
    window: &'a [u8],
}

impl<'a> Chunk<'a> {
    /// Control header
    pub fn header(&self) -> [u8; CHUNK_HEADER_LEN] {
        self.header
    }

    /// Text carried by this chunk
    pub fn window(&self) -> &'a [u8] {
        self.window
    }

    /// Payload length (header plus window)
    pub fn payload_len(&self) -> usize {
        CHUNK_HEADER_LEN + self.window.len()
    }

    /// Register write frame for this chunk
    pub fn frame(&self) -> Frame {
        let mut buf = [0u8; MAX_CHUNK_PAYLOAD];
        buf[..CHUNK_HEADER_LEN].copy_from_slice(&self.header);
        buf[CHUNK_HEADER_LEN..self.payload_len()].copy_from_slice(self.window);
        match Frame::write(self.register, &buf[..self.payload_len()]) {
            Ok(frame) => frame,
            // payload_len() <= 25, well under the frame ceiling
            Err(_) => unreachable!("chunk payload exceeds frame ceiling"),
        }
    }
}

/// Ordered chunk sequence for one command
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    kind: CommandKind,
    text: &'a [u8],
    offset: usize,
    emitted_empty: bool,
}

impl<'a> Chunks<'a> {
    /// Command this sequence encodes
    pub fn kind(&self) -> CommandKind {
        self.kind
    }
}

/// Number of chunks a text of `text_len` bytes is split into
pub fn chunk_count(text_len: usize) -> usize {
    text_len.div_ceil(CHUNK_TEXT_LEN).max(1)
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let header = self.kind.header(self.text.len() as u8);
        let register = self.kind.register();

        if self.text.is_empty() {
            // An empty entry still produces one header-only frame
            if self.emitted_empty {
                return None;
            }
            self.emitted_empty = true;
            return Some(Chunk {
                register,
                header,
                window: &[],
            });
        }

        if self.offset >= self.text.len() {
            return None;
        }
        let end = (self.offset + CHUNK_TEXT_LEN).min(self.text.len());
        let window = &self.text[self.offset..end];
        self.offset = end;
        Some(Chunk {
            register,
            header,
            window,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.text.is_empty() {
            usize::from(!self.emitted_empty)
        } else {
            (self.text.len() - self.offset).div_ceil(CHUNK_TEXT_LEN)
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Chunks<'_> {}

/// Split `text` into the chunk sequence for `kind`
pub fn encode(kind: CommandKind, text: &[u8]) -> Result<Chunks<'_>> {
    if text.len() > MAX_TEXT_LEN {
        return Err(Error::TextTooLong(text.len()));
    }
    Ok(Chunks {
        kind,
        text,
        offset: 0,
        emitted_empty: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    extern crate std;
    use std::vec::Vec;

    fn text_of_len(len: usize) -> Vec<u8> {
        (0..len).map(|i| b'a' + (i % 26) as u8).collect()
    }

    #[test]
    fn test_chunk_count_and_reassembly() {
        for len in [0usize, 1, 22, 23, 24, 46, 47, 100, 255] {
            let text = text_of_len(len);
            let chunks: Vec<_> = encode(CommandKind::Add { id: 7 }, &text).unwrap().collect();

            assert_eq!(chunks.len(), chunk_count(len), "len {}", len);
            assert_eq!(chunks.len(), len.div_ceil(23).max(1));

            let rebuilt: Vec<u8> = chunks.iter().flat_map(|c| c.window().iter().copied()).collect();
            assert_eq!(rebuilt, text);
        }
    }

    #[test]
    fn test_frame_payload_bounds() {
        let text = text_of_len(255);
        for kind in [CommandKind::Add { id: 1 }, CommandKind::DeleteByText] {
            for chunk in encode(kind, &text).unwrap() {
                let frame = chunk.frame();
                assert!(frame.payload().len() <= MAX_CHUNK_PAYLOAD);
                assert_eq!(frame.length() as usize, frame.payload().len());
                assert!(frame.encode().len() <= 32 + 3);
            }
        }
    }

    #[test]
    fn test_add_header_on_every_chunk() {
        let text = text_of_len(50);
        let frames: Vec<_> = encode(CommandKind::Add { id: 9 }, &text)
            .unwrap()
            .map(|c| c.frame())
            .collect();

        assert_eq!(frames.len(), 3);
        for frame in &frames {
            assert_eq!(frame.register(), reg::ADD_COMMAND);
            assert_eq!(&frame.payload()[..2], &[9, 50]);
        }
        assert_eq!(&frames[0].payload()[2..], &text[..23]);
        assert_eq!(&frames[2].payload()[2..], &text[46..]);
    }

    #[test]
    fn test_delete_by_text_header() {
        let frames: Vec<_> = encode(CommandKind::DeleteByText, b"open the door")
            .unwrap()
            .map(|c| c.frame())
            .collect();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].register(), reg::DELETE_BY_TEXT);
        assert_eq!(&frames[0].payload()[..2], &[13, 0]);
        assert_eq!(&frames[0].payload()[2..], b"open the door");
    }

    #[test]
    fn test_empty_text_emits_header_only() {
        let mut chunks = encode(CommandKind::Add { id: 3 }, b"").unwrap();
        assert_eq!(chunks.len(), 1);
        let frame = chunks.next().unwrap().frame();
        assert_eq!(frame.payload(), &[3, 0]);
        assert!(chunks.next().is_none());
    }

    #[test]
    fn test_replay_is_identical() {
        let text = text_of_len(70);
        let chunks = encode(CommandKind::DeleteByText, &text).unwrap();
        let first: Vec<_> = chunks.clone().map(|c| c.frame()).collect();
        let second: Vec<_> = chunks.map(|c| c.frame()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_text_too_long() {
        let text = text_of_len(256);
        assert!(matches!(
            encode(CommandKind::Add { id: 1 }, &text),
            Err(Error::TextTooLong(256))
        ));
    }
}
