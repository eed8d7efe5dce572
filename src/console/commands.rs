//! Command registry, dispatcher and the register access commands

use core::fmt::Write;

use heapless::Vec;

use crate::config::{MAX_COMMANDS, MIN_READ_REPLY};
use crate::mem::MemoryAccess;
use super::parser::{parse_line, parse_numeric, ParsedCommand};
use super::{ConsoleError, ReplyBuffer};

/// Whether a handler finished its reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Reply complete
    Done,
    /// Reply buffer holds a partial reply; call again with the same line
    More,
}

/// A console command implementation.
///
/// Handlers pick their own parameters out of `cmd` by index and must check
/// that they are present: the registered parameter count is not enforced.
pub trait Command: Sync {
    fn execute(
        &self,
        cmd: &ParsedCommand<'_>,
        reply: &mut ReplyBuffer,
        mem: &mut dyn MemoryAccess,
    ) -> Result<Output, ConsoleError>;
}

/// How a registered command is executed
#[derive(Clone, Copy)]
pub enum Handler {
    /// Built-in command listing, served by the dispatcher itself
    Help,
    /// Any other command
    Command(&'static dyn Command),
}

/// Command descriptor
#[derive(Clone, Copy)]
pub struct CommandDescriptor {
    pub name: &'static str,
    /// Expected parameter count (advisory, shown in help only)
    pub param_count: u8,
    pub help: &'static str,
    pub handler: Handler,
}

/// `help`, always the first registry entry
pub const HELP_COMMAND: CommandDescriptor = CommandDescriptor {
    name: "help",
    param_count: 0,
    help: "help: Lists all the registered commands",
    handler: Handler::Help,
};

/// `rd <addr>`
pub const READ_WORD_COMMAND: CommandDescriptor = CommandDescriptor {
    name: "rd",
    param_count: 1,
    help: "rd <addr>: Reads the 32-bit word at <addr> and prints it in decimal",
    handler: Handler::Command(&ReadWord),
};

/// `wr <addr> <val>`
pub const WRITE_WORD_COMMAND: CommandDescriptor = CommandDescriptor {
    name: "wr",
    param_count: 2,
    help: "wr <addr> <val>: Writes the 32-bit value <val> to <addr>",
    handler: Handler::Command(&WriteWord),
};

/// Commands registered by every console besides `help`
pub const DEFAULT_COMMANDS: &[CommandDescriptor] = &[READ_WORD_COMMAND, WRITE_WORD_COMMAND];

/// Append-only, ordered command table
pub struct Registry {
    commands: Vec<CommandDescriptor, MAX_COMMANDS>,
}

impl Registry {
    /// Create a registry holding only `help`
    pub fn new() -> Self {
        let mut commands = Vec::new();
        // MAX_COMMANDS >= 1, cannot fail
        let _ = commands.push(HELP_COMMAND);
        Self { commands }
    }

    /// Add a command; names must be unique
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), ConsoleError> {
        if self.find(descriptor.name).is_some() {
            return Err(ConsoleError::DuplicateCommand);
        }
        self.commands
            .push(descriptor)
            .map_err(|_| ConsoleError::RegistryFull)
    }

    /// Case-sensitive exact lookup
    pub fn find(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// All commands in registration order
    pub fn commands(&self) -> &[CommandDescriptor] {
        &self.commands
    }

    /// Get all command names
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().map(|c| c.name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Tokenizes lines, looks commands up and runs them.
pub struct Dispatcher {
    registry: Registry,
    /// Next registry entry `help` prints when resumed
    help_cursor: usize,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            help_cursor: 0,
        }
    }

    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), ConsoleError> {
        self.registry.register(descriptor)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run one command line, leaving its reply (or a diagnostic) in `reply`.
    ///
    /// Returns `true` while more output is pending: the caller sends the
    /// reply, clears it and calls again with the same unmodified line.
    pub fn process(
        &mut self,
        line: &[u8],
        reply: &mut ReplyBuffer,
        mem: &mut dyn MemoryAccess,
    ) -> bool {
        match self.execute(line, reply, mem) {
            Ok(Output::More) => true,
            Ok(Output::Done) => false,
            Err(err) => {
                self.help_cursor = 0;
                reply.clear();
                if err.is_reported() {
                    let mut text: heapless::String<32> = heapless::String::new();
                    let _ = write!(text, "{}", err);
                    reply.push_truncated(&text);
                } else {
                    log::warn!(
                        "command aborted: {} (reply capacity {}B)",
                        err,
                        reply.capacity()
                    );
                }
                false
            }
        }
    }

    /// Run one command line, returning errors instead of rendering them.
    pub fn execute(
        &mut self,
        line: &[u8],
        reply: &mut ReplyBuffer,
        mem: &mut dyn MemoryAccess,
    ) -> Result<Output, ConsoleError> {
        let line = core::str::from_utf8(line).map_err(|_| ConsoleError::InvalidEncoding)?;
        let cmd = parse_line(line);

        if cmd.command.is_empty() {
            self.help_cursor = 0;
            return Ok(Output::Done); // Empty line, do nothing
        }

        let handler = self
            .registry
            .find(cmd.command)
            .ok_or(ConsoleError::UnknownCommand)?
            .handler;

        log::debug!("dispatch '{}' ({} args)", cmd.command, cmd.arg_count());

        match handler {
            Handler::Help => Ok(self.help(reply)),
            Handler::Command(command) => {
                // Any other line abandons a partial listing
                self.help_cursor = 0;
                command.execute(&cmd, reply, mem)
            }
        }
    }

    /// Pack whole help entries into `reply`, resuming where the last call stopped.
    fn help(&mut self, reply: &mut ReplyBuffer) -> Output {
        let entries = self.registry.commands();

        while let Some(entry) = entries.get(self.help_cursor) {
            let sep = if reply.is_empty() { "" } else { "\n" };

            if sep.len() + entry.help.len() <= reply.remaining() {
                reply.push_truncated(sep);
                reply.push_truncated(entry.help);
            } else if reply.is_empty() {
                // Entry longer than a whole chunk: cut it so we keep moving
                reply.push_truncated(entry.help);
            } else {
                return Output::More;
            }
            self.help_cursor += 1;
        }

        self.help_cursor = 0;
        Output::Done
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

// --- Command Implementations ---

/// `rd <addr>`: read a word, reply with its decimal value
pub struct ReadWord;

impl Command for ReadWord {
    fn execute(
        &self,
        cmd: &ParsedCommand<'_>,
        reply: &mut ReplyBuffer,
        mem: &mut dyn MemoryAccess,
    ) -> Result<Output, ConsoleError> {
        if reply.capacity() < MIN_READ_REPLY {
            return Err(ConsoleError::BufferTooSmall);
        }

        let addr = parse_numeric(cmd.arg(0).ok_or(ConsoleError::MissingArg)?)?;
        let value = mem.read_word(addr);

        // u32::MAX is 10 digits
        let mut text: heapless::String<10> = heapless::String::new();
        write!(text, "{}", value).map_err(|_| ConsoleError::BufferTooSmall)?;
        reply.try_push_str(&text)?;

        Ok(Output::Done)
    }
}

/// `wr <addr> <val>`: write a word, empty reply
pub struct WriteWord;

impl Command for WriteWord {
    fn execute(
        &self,
        cmd: &ParsedCommand<'_>,
        _reply: &mut ReplyBuffer,
        mem: &mut dyn MemoryAccess,
    ) -> Result<Output, ConsoleError> {
        let addr = parse_numeric(cmd.arg(0).ok_or(ConsoleError::MissingArg)?)?;
        let value = parse_numeric(cmd.arg(1).ok_or(ConsoleError::MissingArg)?)?;

        mem.write_word(addr, value);

        Ok(Output::Done)
    }
}
