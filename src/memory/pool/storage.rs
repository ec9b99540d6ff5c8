/*!
 * Slab Storage
 * One contiguous, slot-aligned reservation carved into fixed-size slots
 */

use crate::core::errors::ConfigError;
use crate::core::limits::MAX_SLAB_BYTES;
use crate::core::types::Size;
use crate::memory::config::PoolConfig;
use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::ptr::NonNull;

#[derive(Debug)]
pub(super) struct SlabStorage {
    base: NonNull<u8>,
    layout: Layout,
    stride: Size,
    slots: usize,
}

// SAFETY: the slab is plain bytes; slot ownership is arbitrated by the free
// list and ledger, never by this type.
unsafe impl Send for SlabStorage {}
unsafe impl Sync for SlabStorage {}

impl SlabStorage {
    /// Reserve the whole slab up front so acquisition never has to grow it
    pub fn reserve(config: &PoolConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let stride = config.stride();
        let bytes = stride * config.capacity;
        let layout = Layout::from_size_align(bytes, config.slot_align).map_err(|_| {
            ConfigError::SlabTooLarge {
                requested: bytes,
                limit: MAX_SLAB_BYTES,
            }
        })?;

        // SAFETY: validated capacity and stride are both non-zero
        let raw = unsafe { alloc_zeroed(layout) };
        let base = NonNull::new(raw).ok_or(ConfigError::ReservationFailed { bytes })?;

        Ok(Self {
            base,
            layout,
            stride,
            slots: config.capacity,
        })
    }

    #[inline]
    pub fn slot(&self, index: usize) -> NonNull<u8> {
        debug_assert!(index < self.slots, "slot index {index} out of range");
        // SAFETY: index < slots keeps the offset inside the reservation
        unsafe { NonNull::new_unchecked(self.base.as_ptr().add(index * self.stride)) }
    }

    /// Slot index for a block, if it is the exact start of one of our slots
    #[inline]
    pub fn index_of(&self, block: NonNull<u8>) -> Option<usize> {
        let offset = (block.as_ptr() as usize).checked_sub(self.base.as_ptr() as usize)?;
        if offset % self.stride != 0 {
            return None;
        }
        let index = offset / self.stride;
        (index < self.slots).then_some(index)
    }

    #[inline]
    pub fn stride(&self) -> Size {
        self.stride
    }

    pub fn bytes(&self) -> usize {
        self.layout.size()
    }

    /// Overwrite a released slot so stale reads stand out
    #[cfg(debug_assertions)]
    pub fn poison(&self, index: usize) {
        // SAFETY: the slot lies inside the reservation and is owned by no caller
        unsafe {
            std::ptr::write_bytes(
                self.slot(index).as_ptr(),
                crate::core::limits::FREED_SLOT_POISON,
                self.stride,
            );
        }
    }
}

impl Drop for SlabStorage {
    fn drop(&mut self) {
        // SAFETY: allocated in `reserve` with this exact layout
        unsafe { dealloc(self.base.as_ptr(), self.layout) };
    }
}
