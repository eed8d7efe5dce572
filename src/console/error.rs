//! Console error types

/// Console error with code and message
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    /// E01: Unknown command
    #[error("E01: unknown command")]
    UnknownCommand,
    /// E02: Parameter is not a decimal or 0x-prefixed hex literal
    #[error("E02: invalid number")]
    InvalidNumber,
    /// E03: Missing required argument
    #[error("E03: missing argument")]
    MissingArg,
    /// E04: Number does not fit in 32 bits
    #[error("E04: out of range")]
    OutOfRange,
    /// E05: Reply buffer too small for the operation
    #[error("E05: reply buffer too small")]
    BufferTooSmall,
    /// E06: Command line is not valid UTF-8
    #[error("E06: invalid encoding")]
    InvalidEncoding,
    /// E07: A command with the same name is already registered
    #[error("E07: duplicate command")]
    DuplicateCommand,
    /// E08: No room left in the command registry
    #[error("E08: registry full")]
    RegistryFull,
}

impl ConsoleError {
    /// Whether the diagnostic belongs in the reply.
    ///
    /// Capacity errors are logged instead, so the reply is never partially
    /// written.
    pub fn is_reported(&self) -> bool {
        !matches!(self, Self::BufferTooSmall)
    }
}
