//! Newline framing over an unframed byte stream.
//!
//! The channel to the monkey process delivers arbitrary chunks; protocol
//! messages are newline-terminated. [`LineBuffer`] accumulates chunks and
//! yields exactly the lines that have a terminator, keeping any partial
//! tail for the next read.

// ============================================================================
// Imports
// ============================================================================

use bytes::{BufMut, BytesMut};

// ============================================================================
// Constants
// ============================================================================

/// Initial capacity of the accumulation buffer.
const INITIAL_CAPACITY: usize = 4096;

// ============================================================================
// LineBuffer
// ============================================================================

/// Reassembles newline-terminated lines from arbitrary read chunks.
///
/// Bytes are buffered until a `\n` arrives; [`LineBuffer::next_line`] then
/// yields the completed line without its terminator. Bytes after the last
/// terminator stay buffered, so a message split across reads is never lost
/// and never delivered early.
///
/// Line content is decoded as UTF-8 with invalid sequences replaced, so a
/// garbled message cannot poison the stream.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: BytesMut,
}

impl LineBuffer {
    /// Creates an empty buffer.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Appends a read chunk.
    #[inline]
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.put_slice(chunk);
    }

    /// Removes and returns the next completed line, without its `\n`.
    ///
    /// Returns `None` while no terminator is buffered. Empty lines are
    /// yielded as empty strings.
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let line = self.buf.split_to(pos + 1);
        Some(String::from_utf8_lossy(&line[..pos]).into_owned())
    }

    /// Returns the number of buffered bytes not yet part of a yielded line.
    #[inline]
    #[must_use]
    pub fn pending_bytes(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if no bytes are buffered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
