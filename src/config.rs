//! Module: config
//!
//! Purpose: Build-time limits of the console wire contract and the runtime
//! knobs of a console instance.
//!
//! All limits are fixed at build time. A [`ConsoleConfig`] may only narrow
//! them, never widen them.

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

/// Startup line logged by every console entry point
pub const BANNER: &str = concat!(
    env!("VERSION_STRING"),
    ": console initialized. Type \"help\" to see a list of available commands."
);

/// Max allowable length of terminal input for a single command.
pub const MAX_INPUT_LENGTH: usize = 256;

/// Max allowable length of terminal output, per call to a command handler.
pub const MAX_OUTPUT_LENGTH: usize = 256;

/// Depth of the receive queue fed by the transport. Must be a power of 2.
pub const RECV_QUEUE_LEN: usize = 512;

/// Max number of commands the registry holds, `help` included.
pub const MAX_COMMANDS: usize = 16;

/// Max number of parameters the tokenizer keeps per line.
pub const MAX_ARGS: usize = 4;

/// Smallest reply buffer `rd` accepts: 4 bytes for the value, 1 for the terminator.
///
/// Only the capacity is checked before the read. A value whose decimal text
/// is wider than the reply is read from the bus and then discarded, so keep
/// the reply at 10 bytes or more when reads have side effects.
pub const MIN_READ_REPLY: usize = 5;

/// Runtime configuration of a console instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Reply capacity handed to command handlers, clamped to [`MAX_OUTPUT_LENGTH`].
    pub reply_capacity: usize,
    /// Terminator sent after every non-empty reply chunk.
    pub line_ending: &'static [u8],
}

impl ConsoleConfig {
    /// Default configuration, usable in `const` context.
    pub const fn new() -> Self {
        Self {
            reply_capacity: MAX_OUTPUT_LENGTH,
            line_ending: b"\n",
        }
    }

    /// Same configuration with a narrower reply buffer.
    pub const fn with_reply_capacity(mut self, capacity: usize) -> Self {
        self.reply_capacity = if capacity < MAX_OUTPUT_LENGTH {
            capacity
        } else {
            MAX_OUTPUT_LENGTH
        };
        self
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self::new()
    }
}
