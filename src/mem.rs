//! Memory accessors used by the register commands.
//!
//! The console core never touches hardware itself. It goes through
//! [`MemoryAccess`], so tests and host runs can swap in a fake.

use heapless::FnvIndexMap;

/// 32-bit memory-mapped read/write primitives.
pub trait MemoryAccess {
    /// Read the word stored at `addr`.
    fn read_word(&mut self, addr: u32) -> u32;

    /// Store `value` at `addr`.
    fn write_word(&mut self, addr: u32, value: u32);
}

impl<M: MemoryAccess + ?Sized> MemoryAccess for &mut M {
    fn read_word(&mut self, addr: u32) -> u32 {
        (**self).read_word(addr)
    }

    fn write_word(&mut self, addr: u32, value: u32) {
        (**self).write_word(addr, value)
    }
}

/// Direct volatile access to the physical address space.
pub struct VolatileMemory {
    _private: (),
}

impl VolatileMemory {
    /// Create an accessor for the whole address space.
    ///
    /// # Safety
    ///
    /// Every address later passed to [`MemoryAccess`] is dereferenced as a
    /// `u32` pointer. The caller guarantees the console is only reachable by
    /// operators allowed to poke arbitrary registers, on a target where the
    /// addresses are identity-mapped.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl MemoryAccess for VolatileMemory {
    fn read_word(&mut self, addr: u32) -> u32 {
        // SAFETY: Upheld by the contract of `VolatileMemory::new`.
        unsafe { core::ptr::read_volatile(addr as usize as *const u32) }
    }

    fn write_word(&mut self, addr: u32, value: u32) {
        // SAFETY: Upheld by the contract of `VolatileMemory::new`.
        unsafe { core::ptr::write_volatile(addr as usize as *mut u32, value) }
    }
}

/// Simulated register map for host runs.
///
/// Unwritten addresses read as zero. Once `N` distinct addresses are in use,
/// writes to new addresses are discarded.
pub struct RegisterFile<const N: usize = 64> {
    words: FnvIndexMap<u32, u32, N>,
}

impl<const N: usize> RegisterFile<N> {
    /// Create an empty register map. N must be a power of 2.
    pub fn new() -> Self {
        Self {
            words: FnvIndexMap::new(),
        }
    }

    /// Stored value, `None` if never written.
    pub fn get(&self, addr: u32) -> Option<u32> {
        self.words.get(&addr).copied()
    }

    /// Number of distinct addresses written so far.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<const N: usize> Default for RegisterFile<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MemoryAccess for RegisterFile<N> {
    fn read_word(&mut self, addr: u32) -> u32 {
        self.get(addr).unwrap_or(0)
    }

    fn write_word(&mut self, addr: u32, value: u32) {
        if self.words.insert(addr, value).is_err() {
            log::warn!("register file full, write to {:#010x} discarded", addr);
        }
    }
}
