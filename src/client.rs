//! Host-side client for the console wire protocol.
//!
//! Wraps any byte stream (serial port, socket, in-memory pipe) that speaks to
//! a running console:
//!
//! - `wr <addr> <val>\n` produces no reply on success
//! - `rd <addr>\n` produces one line holding the value in decimal
//! - `help\n` produces one line per registered command
//!
//! Diagnostics come back as `Exx: message` lines.

use std::io::{self, BufRead, BufReader, Read, Write};

/// Client-side failure
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    /// The console answered with a diagnostic
    #[error("console reported {0}")]
    Remote(String),
    #[error("malformed reply {0:?}")]
    Malformed(String),
    #[error("connection closed")]
    Closed,
}

/// Client for a remote register console
pub struct RemoteClient<T: Read + Write> {
    stream: BufReader<T>,
}

impl<T: Read + Write> RemoteClient<T> {
    pub fn new(stream: T) -> Self {
        Self {
            stream: BufReader::new(stream),
        }
    }

    /// Write `value` to `addr`. The console sends nothing back on success.
    pub fn write(&mut self, addr: u32, value: u32) -> Result<(), ClientError> {
        self.send_line(&format!("wr {:#x} {}", addr, value))
    }

    /// Read the word stored at `addr`.
    pub fn read(&mut self, addr: u32) -> Result<u32, ClientError> {
        self.send_line(&format!("rd {:#x}", addr))?;

        let line = self.read_line()?.ok_or(ClientError::Closed)?;
        if is_diagnostic(&line) {
            return Err(ClientError::Remote(line));
        }
        line.parse().map_err(|_| ClientError::Malformed(line))
    }

    /// List the help line of every registered command.
    ///
    /// Reads until the stream stops delivering data (EOF or read timeout).
    pub fn commands(&mut self) -> Result<Vec<String>, ClientError> {
        self.send_line("help")?;

        let mut lines = Vec::new();
        while let Some(line) = self.read_line()? {
            if !line.is_empty() {
                lines.push(line);
            }
        }
        Ok(lines)
    }

    /// Get the underlying stream
    pub fn get_ref(&self) -> &T {
        self.stream.get_ref()
    }

    pub fn into_inner(self) -> T {
        self.stream.into_inner()
    }

    fn send_line(&mut self, line: &str) -> Result<(), ClientError> {
        let stream = self.stream.get_mut();
        stream.write_all(line.as_bytes())?;
        stream.write_all(b"\n")?;
        stream.flush()?;
        Ok(())
    }

    /// Next line without its terminator, `None` once the stream runs dry.
    fn read_line(&mut self) -> Result<Option<String>, ClientError> {
        let mut line = String::new();
        match self.stream.read_line(&mut line) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(line.trim_end_matches(['\r', '\n']).to_string())),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// `E` followed by two digits and a colon
fn is_diagnostic(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.len() >= 4
        && bytes[0] == b'E'
        && bytes[1].is_ascii_digit()
        && bytes[2].is_ascii_digit()
        && bytes[3] == b':'
}
