/*!
 * Pooled Error Objects
 * Typed RAII ownership of a value living in gateway storage
 */

use super::ExceptionAllocator;
use crate::core::errors::AllocError;
use crate::core::types::AllocationTag;
use crate::memory::{BackingStrategy, SlotPool};
use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop};
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};

/// Error object stored in gateway storage, released on drop
///
/// # Example
///
/// ```ignore
/// let error = match gateway.store(ParseError::new(line)) {
///     Ok(error) => error,
///     Err((failure, _lost)) => return report(failure.fallback_report()),
/// };
/// // Dropping `error` drops the value and releases its slot
/// ```
pub struct PooledObject<'a, T, S: BackingStrategy = SlotPool> {
    ptr: NonNull<T>,
    gateway: &'a ExceptionAllocator<S>,
    _owns: PhantomData<T>,
}

// SAFETY: the object owns its T exclusively; the gateway is only used through &self
unsafe impl<T: Send, S: BackingStrategy> Send for PooledObject<'_, T, S> {}
unsafe impl<T: Sync, S: BackingStrategy> Sync for PooledObject<'_, T, S> {}

impl<'a, T, S: BackingStrategy> PooledObject<'a, T, S> {
    pub(super) fn new(gateway: &'a ExceptionAllocator<S>, value: T) -> Result<Self, (AllocError, T)> {
        match gateway.acquire(mem::size_of::<T>(), mem::align_of::<T>(), AllocationTag) {
            Ok(block) => {
                let ptr = block.cast::<T>();
                // SAFETY: fresh block, sized and aligned for T
                unsafe { ptr.as_ptr().write(value) };
                Ok(Self {
                    ptr,
                    gateway,
                    _owns: PhantomData,
                })
            }
            Err(error) => Err((error, value)),
        }
    }

    /// Move the value out and release its storage
    pub fn into_inner(self) -> T {
        let this = ManuallyDrop::new(self);
        // SAFETY: the value is initialized and read exactly once; the slot is
        // released with the layout it was acquired with
        unsafe {
            let value = this.ptr.as_ptr().read();
            this.gateway.release(
                this.ptr.cast(),
                mem::size_of::<T>(),
                mem::align_of::<T>(),
                AllocationTag,
            );
            value
        }
    }

    /// Address of the stored value
    pub fn as_ptr(&self) -> NonNull<T> {
        self.ptr
    }
}

impl<T, S: BackingStrategy> Deref for PooledObject<'_, T, S> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        // SAFETY: initialized in `new`, alive until drop
        unsafe { self.ptr.as_ref() }
    }
}

impl<T, S: BackingStrategy> DerefMut for PooledObject<'_, T, S> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: initialized in `new`, uniquely borrowed through &mut self
        unsafe { self.ptr.as_mut() }
    }
}

impl<T, S: BackingStrategy> Drop for PooledObject<'_, T, S> {
    fn drop(&mut self) {
        // SAFETY: drop the value once, then hand back the acquisition layout
        unsafe {
            ptr::drop_in_place(self.ptr.as_ptr());
            self.gateway.release(
                self.ptr.cast(),
                mem::size_of::<T>(),
                mem::align_of::<T>(),
                AllocationTag,
            );
        }
    }
}

impl<T: std::fmt::Debug, S: BackingStrategy> std::fmt::Debug for PooledObject<'_, T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PooledObject").field(&**self).finish()
    }
}
