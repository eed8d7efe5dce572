//! Command line parser
//!
//! Simple split on whitespace, max [`MAX_ARGS`] parameters, plus the numeric
//! literal parser shared by the register commands.

use crate::config::MAX_ARGS;
use super::ConsoleError;

/// Parsed command with up to [`MAX_ARGS`] parameters
#[derive(Debug, Clone)]
pub struct ParsedCommand<'a> {
    /// The command name (first token)
    pub command: &'a str,
    /// Parameters, in order
    pub args: [Option<&'a str>; MAX_ARGS],
}

impl<'a> ParsedCommand<'a> {
    /// Get argument by index (0-based)
    pub fn arg(&self, idx: usize) -> Option<&'a str> {
        self.args.get(idx).copied().flatten()
    }

    /// Number of parameters present
    pub fn arg_count(&self) -> usize {
        self.args.iter().filter(|a| a.is_some()).count()
    }
}

/// Parse a command line into command and arguments
pub fn parse_line(line: &str) -> ParsedCommand<'_> {
    let mut parts = line.split_whitespace();

    let command = parts.next().unwrap_or("");

    let mut args = [None; MAX_ARGS];
    for (i, arg) in parts.take(MAX_ARGS).enumerate() {
        args[i] = Some(arg);
    }

    ParsedCommand { command, args }
}

/// Parse a decimal or `0x`-prefixed hexadecimal literal.
///
/// Failure is reported through the `Err` variant only; `Ok(0)` always means
/// the token really was zero.
pub fn parse_numeric(token: &str) -> Result<u32, ConsoleError> {
    let (digits, radix) = match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (token, 10),
    };

    // from_str_radix would accept a leading '+', we don't
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(ConsoleError::InvalidNumber);
    }

    u32::from_str_radix(digits, radix).map_err(|_| ConsoleError::OutOfRange)
}
