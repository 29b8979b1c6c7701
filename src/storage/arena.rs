//! Arena - append-only byte region that node records live in.
//!
//! The [`Arena`] hands out contiguous byte ranges addressed by
//! [`NodeOffset`]. It never frees, moves or reuses a range, so an offset
//! stays valid for as long as the arena exists.

use crate::common::{Error, NodeOffset, Result};

/// Largest arena size addressable by an `i32` offset.
pub const MAX_ARENA_BYTES: usize = i32::MAX as usize;

/// A bump allocator over a byte buffer.
///
/// # Layout
/// ```text
/// ┌──────────┬──────────┬──────────┬───────────────────────┐
/// │ record 0 │ record 1 │ record 2 │   unused capacity     │
/// └──────────┴──────────┴──────────┴───────────────────────┘
/// 0                                ↑ high-water mark
/// ```
///
/// Everything below the high-water mark has been handed out. Allocation
/// bumps the mark and zeroes the new range.
///
/// # Capacity
/// - Fixed: allocation fails with `ArenaExhausted` once the requested
///   bytes no longer fit.
/// - Unbounded: the buffer grows on demand. Growth may reallocate the
///   backing `Vec`, but offsets are indices, not pointers, so every
///   previously returned offset still names the same bytes. The arena is
///   still capped at [`MAX_ARENA_BYTES`].
///
/// # Example
/// ```
/// use arena_bptree::storage::Arena;
///
/// let mut arena = Arena::with_capacity(64).unwrap();
/// let offset = arena.allocate(16).unwrap();
/// arena.view_mut(offset, 16).unwrap()[0] = 0xAB;
/// assert_eq!(arena.view(offset, 16).unwrap()[0], 0xAB);
/// assert_eq!(arena.used(), 16);
/// ```
#[derive(Debug)]
pub struct Arena {
    /// Bytes below the high-water mark. `data.len()` is the mark itself.
    data: Vec<u8>,
    /// Fixed limit in bytes, or `None` when growing.
    capacity: Option<usize>,
}

impl Arena {
    /// Create a growing arena.
    pub fn unbounded() -> Self {
        Self {
            data: Vec::new(),
            capacity: None,
        }
    }

    /// Create a fixed-capacity arena, reserving all of its memory up front.
    ///
    /// # Errors
    /// - `Error::InvalidCapacity` if `capacity` is 0
    /// - `Error::CapacityTooLarge` if `capacity` exceeds `MAX_ARENA_BYTES`
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity {
                capacity,
                required: 1,
            });
        }
        if capacity > MAX_ARENA_BYTES {
            return Err(Error::CapacityTooLarge {
                capacity,
                max: MAX_ARENA_BYTES,
            });
        }

        Ok(Self {
            data: Vec::with_capacity(capacity),
            capacity: Some(capacity),
        })
    }

    // ========================================================================
    // Allocation
    // ========================================================================

    /// Reserve `size` zeroed bytes and return their starting offset.
    ///
    /// # Errors
    /// - `Error::ArenaExhausted` if the request does not fit
    pub fn allocate(&mut self, size: usize) -> Result<NodeOffset> {
        if !self.can_allocate(size) {
            tracing::warn!(
                requested = size,
                available = self.available(),
                "arena allocation refused"
            );
            return Err(Error::ArenaExhausted {
                requested: size,
                available: self.available(),
            });
        }

        let start = self.data.len();
        self.data.resize(start + size, 0);

        // can_allocate() bounds the end by MAX_ARENA_BYTES, so this fits.
        Ok(NodeOffset::new(start as i32))
    }

    /// Whether an allocation of `size` bytes would succeed.
    #[inline]
    pub fn can_allocate(&self, size: usize) -> bool {
        size <= self.available()
    }

    /// Bytes that can still be allocated.
    pub fn available(&self) -> usize {
        self.limit() - self.data.len()
    }

    /// High-water mark: total bytes handed out so far.
    #[inline]
    pub fn used(&self) -> usize {
        self.data.len()
    }

    /// Fixed capacity, or `None` for a growing arena.
    #[inline]
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    fn limit(&self) -> usize {
        self.capacity.unwrap_or(MAX_ARENA_BYTES)
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Read-only view of `len` bytes starting at `offset`.
    ///
    /// # Errors
    /// - `Error::InvalidOffset` if the range is negative or crosses the
    ///   high-water mark
    pub fn view(&self, offset: NodeOffset, len: usize) -> Result<&[u8]> {
        let start = self.checked_start(offset, len)?;
        Ok(&self.data[start..start + len])
    }

    /// Mutable view of `len` bytes starting at `offset`.
    ///
    /// # Errors
    /// - `Error::InvalidOffset` if the range is negative or crosses the
    ///   high-water mark
    pub fn view_mut(&mut self, offset: NodeOffset, len: usize) -> Result<&mut [u8]> {
        let start = self.checked_start(offset, len)?;
        Ok(&mut self.data[start..start + len])
    }

    fn checked_start(&self, offset: NodeOffset, len: usize) -> Result<usize> {
        let start = offset.as_index().ok_or(Error::InvalidOffset(offset))?;
        match start.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(start),
            _ => Err(Error::InvalidOffset(offset)),
        }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::unbounded()
    }
}
