//! Main console struct integrating all components

use crate::config::{ConsoleConfig, BANNER};
use crate::mem::MemoryAccess;
use crate::queue::ByteQueue;
use super::commands::{CommandDescriptor, Dispatcher, DEFAULT_COMMANDS};
use super::{ConsoleError, LineBuffer, LineState, ReplyBuffer};

/// Outgoing side of the byte stream (UART TX, socket, stdout...).
pub trait Transport {
    /// Transmit `bytes`; may block until the transport takes them.
    fn send(&mut self, bytes: &[u8]);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, bytes: &[u8]) {
        (**self).send(bytes)
    }
}

#[cfg(feature = "std")]
impl Transport for std::vec::Vec<u8> {
    fn send(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Console state machine
///
/// Owns the line and reply buffers, the command registry, the memory
/// accessor and the transport. The receive queue is shared with the producer
/// and only borrowed by [`poll`](Self::poll) and [`run`](Self::run).
pub struct Console<M: MemoryAccess, T: Transport> {
    line: LineBuffer,
    reply: ReplyBuffer,
    dispatcher: Dispatcher,
    mem: M,
    transport: T,
    config: ConsoleConfig,
}

impl<M: MemoryAccess, T: Transport> Console<M, T> {
    /// Create a console with `rd`, `wr` and `help`
    pub fn new(mem: M, transport: T) -> Self {
        Self::with_config(ConsoleConfig::default(), mem, transport)
    }

    pub fn with_config(config: ConsoleConfig, mem: M, transport: T) -> Self {
        let mut console = Self {
            line: LineBuffer::new(),
            reply: ReplyBuffer::with_capacity(config.reply_capacity),
            dispatcher: Dispatcher::new(),
            mem,
            transport,
            config,
        };
        console.register_all(DEFAULT_COMMANDS);
        console
    }

    /// Register one command
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), ConsoleError> {
        self.dispatcher.register(descriptor)
    }

    /// Register a batch, logging and skipping the ones that fail.
    ///
    /// Returns how many were registered.
    pub fn register_all(&mut self, descriptors: &[CommandDescriptor]) -> usize {
        let mut registered = 0;
        for descriptor in descriptors {
            match self.dispatcher.register(*descriptor) {
                Ok(()) => registered += 1,
                Err(err) => log::error!("failed to add the '{}' command: {}", descriptor.name, err),
            }
        }
        registered
    }

    /// Process a single input byte
    ///
    /// A completed line is dispatched, its reply sent, and both buffers reset
    /// before this returns.
    pub fn handle_byte(&mut self, byte: u8) -> LineState {
        let state = self.line.feed(byte);
        if state == LineState::Complete {
            self.dispatch_line();
        }
        state
    }

    /// Handle every byte currently queued without waiting.
    ///
    /// Returns the number of bytes consumed.
    pub fn poll<const N: usize>(&mut self, queue: &ByteQueue<N>) -> usize {
        let mut consumed = 0;
        while let Some(byte) = queue.try_recv() {
            self.handle_byte(byte);
            consumed += 1;
        }
        consumed
    }

    /// Console main loop. Never returns.
    ///
    /// Discards stale input, then blocks on `queue`; `idle` runs whenever it
    /// is empty.
    pub fn run<const N: usize>(&mut self, queue: &ByteQueue<N>, mut idle: impl FnMut()) -> ! {
        queue.clear();
        self.log_banner();

        loop {
            let byte = queue.recv_blocking(&mut idle);
            self.handle_byte(byte);
        }
    }

    /// Log the startup banner
    pub fn log_banner(&self) {
        log::info!("{}", BANNER);
    }

    fn dispatch_line(&mut self) {
        loop {
            self.reply.clear();
            let more = self
                .dispatcher
                .process(self.line.as_bytes(), &mut self.reply, &mut self.mem);

            if !self.reply.is_empty() {
                self.transport.send(self.reply.as_bytes());
                self.transport.send(self.config.line_ending);
            }

            if !more {
                break;
            }
        }

        // Done with command, reset both buffers
        self.line.clear();
        self.reply.clear();
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn mem(&self) -> &M {
        &self.mem
    }

    pub fn mem_mut(&mut self) -> &mut M {
        &mut self.mem
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Bytes of the line being typed
    pub fn pending_line(&self) -> &[u8] {
        self.line.as_bytes()
    }
}
