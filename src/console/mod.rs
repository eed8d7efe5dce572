//! Serial console for raw register access
//!
//! Byte-at-a-time input, one command per line, replies go back over the
//! same stream. Zero heap allocation - all fixed-size buffers.

pub mod commands;
#[allow(clippy::module_inception)]
pub mod console;
pub mod error;
pub mod line_buffer;
pub mod parser;
pub mod reply;

pub use commands::{
    Command, CommandDescriptor, Dispatcher, Handler, Output, ReadWord, Registry, WriteWord,
    DEFAULT_COMMANDS, HELP_COMMAND, READ_WORD_COMMAND, WRITE_WORD_COMMAND,
};
pub use console::{Console, Transport};
pub use error::ConsoleError;
pub use line_buffer::{LineBuffer, LineState};
pub use parser::{parse_line, parse_numeric, ParsedCommand};
pub use reply::ReplyBuffer;
