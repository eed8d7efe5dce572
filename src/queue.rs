//! Lock-free SPSC (Single Producer, Single Consumer) receive queue.
//!
//! Every byte the console sees passes through here.
//!
//! # Architecture
//!
//! ```text
//! UART ISR / RX thread        ByteQueue            Console loop
//! ────────────────────        ─────────            ────────────
//!
//! receive(bytes) ──────────▶ [b0][b1][b2] ──────▶ recv_blocking()
//! never blocks                 lock-free            suspends on empty
//! drops newest if full
//! ```
//!
//! # Rules
//!
//! - Exactly one producer calls [`ByteQueue::receive`]
//! - Exactly one consumer calls the `recv`/`clear` family
//! - Only atomic operations for synchronization

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::RECV_QUEUE_LEN;

/// Bounded byte FIFO between the transport and the console loop.
///
/// # Safety
///
/// This type uses `UnsafeCell` internally but is safe to use because:
/// - The producer only writes slots between `write_idx` and `read_idx + N`
/// - The consumer only reads slots between `read_idx` and `write_idx`
/// - Each side publishes its index with `Release` after touching the slots
///
/// # Memory Ordering
///
/// - Producer stores `write_idx` with `Release`, consumer loads it with `Acquire`
/// - Consumer stores `read_idx` with `Release`, producer loads it with `Acquire`
pub struct ByteQueue<const N: usize = RECV_QUEUE_LEN> {
    slots: UnsafeCell<[u8; N]>,
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: One producer, one consumer, disjoint slot ranges, atomic coordination.
unsafe impl<const N: usize> Sync for ByteQueue<N> {}
unsafe impl<const N: usize> Send for ByteQueue<N> {}

impl<const N: usize> ByteQueue<N> {
    /// Mask for wrapping index to buffer size.
    const MASK: usize = N - 1;

    /// Create a new empty queue.
    ///
    /// # Panics
    ///
    /// Panics at compile time if N is not a power of 2.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Queue size must be power of 2");

        Self {
            slots: UnsafeCell::new([0; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Enqueue received bytes (producer side, never blocks).
    ///
    /// Returns the number of bytes accepted. When the queue fills up, the
    /// remaining tail of `bytes` is dropped and counted in [`dropped`](Self::dropped).
    pub fn receive(&self, bytes: &[u8]) -> usize {
        // Only the producer stores write_idx
        let write = self.write_idx.load(Ordering::Relaxed);
        let read = self.read_idx.load(Ordering::Acquire);

        let free = N - write.wrapping_sub(read) as usize;
        let accepted = bytes.len().min(free);

        let base = self.slots.get().cast::<u8>();
        for (offset, &byte) in bytes[..accepted].iter().enumerate() {
            let idx = (write.wrapping_add(offset as u32) as usize) & Self::MASK;
            // SAFETY: idx lies in the free region, which the consumer never reads.
            unsafe { base.add(idx).write(byte) };
        }

        self.write_idx
            .store(write.wrapping_add(accepted as u32), Ordering::Release);

        let rejected = bytes.len() - accepted;
        if rejected > 0 {
            self.dropped.fetch_add(rejected as u32, Ordering::Relaxed);
        }

        accepted
    }

    /// Dequeue the next byte, if any (consumer side).
    #[inline]
    pub fn try_recv(&self) -> Option<u8> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        let idx = (read as usize) & Self::MASK;

        // SAFETY: Single consumer, slot published by the producer's Release store.
        let byte = unsafe { self.slots.get().cast::<u8>().add(idx).read() };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(byte)
    }

    /// Wait for the next byte (consumer side).
    ///
    /// `idle` runs every time the queue is found empty; it is the only
    /// suspension point of the console loop (a scheduler delay on target,
    /// a yield or sleep on host). There is no timeout.
    pub fn recv_blocking(&self, mut idle: impl FnMut()) -> u8 {
        loop {
            if let Some(byte) = self.try_recv() {
                return byte;
            }
            idle();
        }
    }

    /// Discard everything currently queued (consumer side).
    pub fn clear(&self) {
        let write = self.write_idx.load(Ordering::Acquire);
        self.read_idx.store(write, Ordering::Release);
    }

    /// Number of bytes waiting to be consumed.
    #[inline]
    pub fn len(&self) -> usize {
        let read = self.read_idx.load(Ordering::Acquire);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read) as usize
    }

    /// Check if there are bytes to consume.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get count of bytes rejected because the queue was full.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset dropped counter (e.g., after reporting).
    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Get the buffer capacity.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for ByteQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
