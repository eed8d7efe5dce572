//! Reply buffer for command output

use core::fmt;

use crate::config::MAX_OUTPUT_LENGTH;
use super::ConsoleError;

/// Bounded output buffer for one reply chunk.
///
/// Storage is always [`MAX_OUTPUT_LENGTH`] bytes; `capacity` may be set lower
/// at construction. Writes through [`fmt::Write`] and [`try_push_str`](Self::try_push_str)
/// are all-or-nothing.
pub struct ReplyBuffer {
    buf: [u8; MAX_OUTPUT_LENGTH],
    len: usize,
    capacity: usize,
}

impl ReplyBuffer {
    /// Create empty buffer with the full capacity
    pub const fn new() -> Self {
        Self::with_capacity(MAX_OUTPUT_LENGTH)
    }

    /// Create empty buffer limited to `capacity` bytes (clamped to the storage size)
    pub const fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: [0u8; MAX_OUTPUT_LENGTH],
            len: 0,
            capacity: if capacity < MAX_OUTPUT_LENGTH {
                capacity
            } else {
                MAX_OUTPUT_LENGTH
            },
        }
    }

    /// Append `s` only if all of it fits
    pub fn try_push_str(&mut self, s: &str) -> Result<(), ConsoleError> {
        let bytes = s.as_bytes();
        if bytes.len() > self.remaining() {
            return Err(ConsoleError::BufferTooSmall);
        }
        self.buf[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        Ok(())
    }

    /// Append as much of `s` as fits, cut on a char boundary.
    ///
    /// Returns the number of bytes written.
    pub fn push_truncated(&mut self, s: &str) -> usize {
        let mut take = s.len().min(self.remaining());
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        take
    }

    /// Zero the buffer
    pub fn clear(&mut self) {
        self.buf.fill(0);
        self.len = 0;
    }

    /// Get buffer as string slice
    pub fn as_str(&self) -> &str {
        // Only whole &str values and char-boundary cuts are ever copied in
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Max bytes one reply chunk may hold
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.len
    }
}

impl Default for ReplyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Write for ReplyBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.try_push_str(s).map_err(|_| fmt::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn test_reply_try_push_is_all_or_nothing() {
        let mut reply = ReplyBuffer::with_capacity(4);

        assert!(reply.try_push_str("abc").is_ok());
        assert_eq!(reply.try_push_str("de"), Err(ConsoleError::BufferTooSmall));
        assert_eq!(reply.as_str(), "abc");
    }

    #[test]
    fn test_reply_push_truncated_respects_char_boundary() {
        let mut reply = ReplyBuffer::with_capacity(3);

        // 'é' is two bytes and would straddle the limit
        assert_eq!(reply.push_truncated("aaé"), 2);
        assert_eq!(reply.as_str(), "aa");
    }

    #[test]
    fn test_reply_write_fmt() {
        let mut reply = ReplyBuffer::new();
        write!(reply, "{}", 4_294_967_295u32).unwrap();
        assert_eq!(reply.as_str(), "4294967295");
    }

    #[test]
    fn test_reply_clear_zeroes() {
        let mut reply = ReplyBuffer::with_capacity(8);
        reply.push_truncated("12345678");
        assert_eq!(reply.remaining(), 0);

        reply.clear();
        assert!(reply.is_empty());
        assert_eq!(reply.remaining(), 8);
    }

    #[test]
    fn test_reply_capacity_clamped_to_storage() {
        let reply = ReplyBuffer::with_capacity(MAX_OUTPUT_LENGTH * 4);
        assert_eq!(reply.capacity(), MAX_OUTPUT_LENGTH);
    }
}
