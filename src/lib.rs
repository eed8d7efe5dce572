//! # mmio-console
//!
//! Line-oriented serial console exposing raw 32-bit memory-mapped I/O.
//!
//! ## Architecture
//!
//! ```text
//! UART RX ──▶ ByteQueue ──▶ LineBuffer ──▶ Dispatcher ──▶ rd / wr ──▶ MemoryAccess
//!                                              │
//!                                              ▼
//!                                         ReplyBuffer ──▶ Transport (UART TX)
//! ```
//!
//! - The queue is the only state shared with the receive side
//! - Everything else is owned by one [`Console`] value
//! - Hardware is reached only through [`MemoryAccess`] and [`Transport`]

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod config;
pub mod console;
pub mod mem;
pub mod queue;

#[cfg(feature = "std")]
pub mod client;

pub use config::ConsoleConfig;
pub use console::{
    Command, CommandDescriptor, Console, ConsoleError, LineState, ReplyBuffer, Transport,
};
pub use mem::{MemoryAccess, RegisterFile, VolatileMemory};
pub use queue::ByteQueue;

#[cfg(feature = "std")]
pub use client::{ClientError, RemoteClient};
