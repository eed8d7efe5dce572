//! Line buffer for console input
//!
//! Builds one command line from a byte stream. Input past the capacity is
//! dropped, never buffered elsewhere.

use crate::config::MAX_INPUT_LENGTH;

/// Backspace as sent by most serial terminals.
pub const BACKSPACE: u8 = 0x08;

/// DEL, sent for the backspace key by xterm-style terminal emulators.
pub const DELETE: u8 = 0x7F;

/// Outcome of feeding one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    /// Byte consumed, line not finished yet
    Incomplete,
    /// Newline received, the line is ready for dispatch
    Complete,
    /// Byte discarded (buffer full, or a completed line awaits `clear`)
    Dropped,
}

/// Line input buffer
pub struct LineBuffer {
    buf: [u8; MAX_INPUT_LENGTH],
    len: usize,
    complete: bool,
}

impl LineBuffer {
    /// Create empty buffer
    pub const fn new() -> Self {
        Self {
            buf: [0u8; MAX_INPUT_LENGTH],
            len: 0,
            complete: false,
        }
    }

    /// Feed one received byte through the editing rules
    pub fn feed(&mut self, byte: u8) -> LineState {
        if self.complete {
            return LineState::Dropped;
        }

        match byte {
            b'\n' => {
                self.complete = true;
                LineState::Complete
            }
            // Don't care about carriage return
            b'\r' => LineState::Incomplete,
            BACKSPACE | DELETE => {
                self.backspace();
                LineState::Incomplete
            }
            _ => {
                if self.push(byte) {
                    LineState::Incomplete
                } else {
                    LineState::Dropped
                }
            }
        }
    }

    /// Push a character. Returns `false` if the buffer is full.
    pub fn push(&mut self, c: u8) -> bool {
        if self.len < MAX_INPUT_LENGTH {
            self.buf[self.len] = c;
            self.len += 1;
            true
        } else {
            false
        }
    }

    /// Remove last character and zero its slot
    pub fn backspace(&mut self) {
        if self.len > 0 {
            self.len -= 1;
            self.buf[self.len] = 0;
        }
    }

    /// Zero the buffer and accept input again
    pub fn clear(&mut self) {
        self.buf.fill(0);
        self.len = 0;
        self.complete = false;
    }

    /// Get buffer as string slice, empty if not valid UTF-8
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Get buffer length
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Newline seen and not cleared yet
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}
