use std::{
    alloc::{self, Layout},
    marker::PhantomData,
    mem::size_of,
    ptr::{self, NonNull},
};

use crate::collections::{ReserveStrategy, TryReserveError};


/// Low level utility for more ergonomically allocating, reallocating, and deallocating
/// a buffer of memory on the global heap without having to worry about all the corner cases involved.
/// In particular:
///
/// - Produces `NonNull::dangling` on zero-sized types.
/// - Produces `NonNull::dangling` on zero-length allocations.
/// - Avoids freeing `NonNull::dangling`.
/// - Catches all overflows in capacity computations (promotes them to "capacity overflow" errors).
/// - Relocates by allocating the new buffer first, moving the live prefix over, and only then releasing the old buffer,
///   so a failed allocation leaves the old buffer and its contents untouched.
///
/// This type does not in anyway inspect the memory it manages. When dropped it *will* free its memory, but it *won't* try to drop its contents.
/// It is up to the user of `RawArray` to handle the actual things *stored* inside of `RawArray`.
///
/// Note that a zero-sized type never allocates, so `capacity()` always returns `usize::MAX`.
pub(crate) struct RawArray<T, R: ReserveStrategy> {
    ptr:      NonNull<T>,
    cap:      usize,
    _phantom: PhantomData<(T, fn() -> R)>,
}

// SAFETY: `RawArray` uniquely owns its allocation, just like `Box<[T]>` would.
unsafe impl<T: Send, R: ReserveStrategy> Send for RawArray<T, R> {}
unsafe impl<T: Sync, R: ReserveStrategy> Sync for RawArray<T, R> {}

impl<T, R: ReserveStrategy> RawArray<T, R> {
    const IS_ZST: bool = size_of::<T>() == 0;

    /// Creates the biggest possible `RawArray` without allocating.
    /// If `T` has a non-zero size, then this makes a `RawArray` with a capacity of `0`.
    /// If `T` is zero-sized, then it makes a `RawArray` with a capacity of `usize::MAX`.
    /// Useful for implementing delayed allocation.
    #[must_use]
    pub const fn new() -> Self {
        Self { ptr: NonNull::dangling(), cap: 0, _phantom: PhantomData }
    }

    /// Creates a `RawArray` with exactly the capacity and alignment requirements for a `[T; capacity]`.
    /// This is equivalent to calling `RawArray::new` when `capacity` is `0` or `T` is zero-sized.
    ///
    /// Non-fallible version of `try_with_capacity`.
    ///
    /// # Panics
    ///
    /// Panics if the requested capacity exceed `isize::MAX` bytes.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::try_with_capacity(capacity) {
            Ok(arr) => arr,
            Err(err) => handle_error(err),
        }
    }

    /// Tries to create a `RawArray` with exactly the capacity and alignment requirements for a `[T; capacity]`.
    /// This is equivalent to calling `RawArray::new` when `capacity` is `0` or `T` is zero-sized.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        // Don't allocate here, because `drop` will not deallocate when capacity is 0.
        if Self::IS_ZST || capacity == 0 {
            return Ok(Self::new());
        }

        let ptr = Self::allocate(capacity)?;
        Ok(Self { ptr, cap: capacity, _phantom: PhantomData })
    }

    /// Get the capacity of the allocation.
    ///
    /// This will always be `usize::MAX` if `T` is zero-sized.
    #[inline]
    pub const fn capacity(&self) -> usize {
        if Self::IS_ZST {
            usize::MAX
        } else {
            self.cap
        }
    }

    /// Get a raw pointer to the start of the allocation.
    /// Note that this is a dangling pointer when either `capacity() == 0` or `T` is zero-sized.
    /// In the former case, you must be careful.
    #[inline]
    pub const fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Ensures that the buffer contains at least enough space to hold `len + additional` elements.
    /// If it doesn't already have enough capacity, will reallocate according to the reserve strategy to get amortized *O*(1) behavior.
    ///
    /// `len` may not exceed `self.capacity()`, and only the first `len` elements are moved on reallocation.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` bytes.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM.
    #[inline]
    pub fn reserve(&mut self, len: usize, additional: usize) {
        // Callers expect this function to be very cheap when there is already sufficient capacity.
        // Therefore, we move all the resizing and error-handling logic behind a call,
        // while making sure that this function is likely to be inlined as just a comparison and a call if the comparison fails.
        #[cold]
        fn do_reserve_and_handle<T, R: ReserveStrategy>(
            slf: &mut RawArray<T, R>,
            len: usize,
            additional: usize,
        ) {
            if let Err(err) = slf.grow_amortized(len, additional) {
                handle_error(err);
            }
        }

        if self.needs_to_grow(len, additional) {
            do_reserve_and_handle(self, len, additional);
        }
    }

    /// A specialized version of `self.reserve(len, 1)`, which requires the caller to ensure `len == self.capacity()`.
    #[inline(never)]
    pub fn grow_one(&mut self) {
        if let Err(err) = self.grow_amortized(self.cap, 1) {
            handle_error(err);
        }
    }

    /// The same as `reserve`, but returns on errors instead of panicking or aborting.
    pub fn try_reserve(&mut self, len: usize, additional: usize) -> Result<(), TryReserveError> {
        if self.needs_to_grow(len, additional) {
            self.grow_amortized(len, additional)?;
        }
        Ok(())
    }

    /// Ensures that the buffer contains at least enough space to hold `len + additional` elements.
    /// If it doesn't already, will reallocate exactly the amount of memory necessary.
    ///
    /// `len` may not exceed `self.capacity()`.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM.
    pub fn reserve_exact(&mut self, len: usize, additional: usize) {
        if let Err(err) = self.try_reserve_exact(len, additional) {
            handle_error(err);
        }
    }

    /// The same as `reserve_exact`, but returns on errors instead of panicking or aborting.
    pub fn try_reserve_exact(&mut self, len: usize, additional: usize) -> Result<(), TryReserveError> {
        if self.needs_to_grow(len, additional) {
            self.grow_exact(len, additional)?;
        }
        Ok(())
    }

    /// Shrinks the buffer down to the specified capacity, moving over the first `len` elements.
    /// If the given amount is 0, actually completely deallocates.
    ///
    /// # Panics
    ///
    /// Panics if the given amount is *larger* than the current capacity, or smaller than `len`.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM.
    pub fn shrink_to_fit(&mut self, len: usize, cap: usize) {
        if let Err(err) = self.shrink(len, cap) {
            handle_error(err);
        }
    }

    /// Release the allocation, leaving an empty, unallocated buffer behind.
    ///
    /// # Safety
    ///
    /// All elements in the buffer must already have been dropped or moved out.
    pub unsafe fn release(&mut self) {
        if let Some((ptr, layout)) = self.current_memory() {
            // SAFETY: `current_memory` only returns memory we allocated with exactly this layout.
            unsafe { alloc::dealloc(ptr.as_ptr(), layout) };
        }
        self.ptr = NonNull::dangling();
        self.cap = 0;
    }

    //--------------------------------------------------------------

    fn current_memory(&self) -> Option<(NonNull<u8>, Layout)> {
        if Self::IS_ZST || self.cap == 0 {
            None
        } else {
            // SAFETY: this layout was already validated when the memory was allocated.
            unsafe {
                let layout = Layout::from_size_align_unchecked(size_of::<T>() * self.cap, core::mem::align_of::<T>());
                Some((self.ptr.cast(), layout))
            }
        }
    }

    fn allocate(capacity: usize) -> Result<NonNull<T>, TryReserveError> {
        debug_assert!(!Self::IS_ZST && capacity > 0);

        let layout = Layout::array::<T>(capacity).map_err(|_| TryReserveError::CapacityOverflow)?;
        // SAFETY: `layout` has a non-zero size, as both `capacity` and the size of `T` are non-zero.
        let ptr = unsafe { alloc::alloc(layout) };
        NonNull::new(ptr.cast()).ok_or(TryReserveError::AllocError(layout))
    }

    /// Returns if the buffer needs to grow to fulfill the needed extra capacity.
    /// Mainly used to make inlining reserve-calls possible without inlining `grow`.
    #[inline]
    fn needs_to_grow(&self, len: usize, additional: usize) -> bool {
        additional > self.capacity().wrapping_sub(len)
    }

    fn grow_amortized(&mut self, len: usize, additional: usize) -> Result<(), TryReserveError> {
        debug_assert!(additional > 0);

        if Self::IS_ZST {
            // Since we return a capacity of `usize::MAX` when the element size is 0, getting to here necessarily means that `RawArray` is overfull.
            return Err(TryReserveError::CapacityOverflow);
        }

        let required_cap = len.checked_add(additional).ok_or(TryReserveError::CapacityOverflow)?;
        let new_cap = R::calculate(self.cap, required_cap).map_err(|_| TryReserveError::CapacityOverflow)?;
        debug_assert!(new_cap >= required_cap);

        self.relocate(new_cap, len)
    }

    fn grow_exact(&mut self, len: usize, additional: usize) -> Result<(), TryReserveError> {
        if Self::IS_ZST {
            return Err(TryReserveError::CapacityOverflow);
        }

        let new_cap = len.checked_add(additional).ok_or(TryReserveError::CapacityOverflow)?;
        self.relocate(new_cap, len)
    }

    fn shrink(&mut self, len: usize, cap: usize) -> Result<(), TryReserveError> {
        assert!(cap <= self.capacity(), "Tried to shrink to a larger capacity");
        assert!(len <= cap, "Tried to shrink below the number of live elements");

        if Self::IS_ZST {
            return Ok(());
        }

        if cap == 0 {
            // SAFETY: `len == 0`, so there is nothing left in the buffer.
            unsafe { self.release() };
            Ok(())
        } else {
            self.relocate(cap, len)
        }
    }

    /// Move the first `len` elements into a fresh allocation of `new_cap` elements and release the old one.
    ///
    /// On error, the current allocation is left untouched.
    fn relocate(&mut self, new_cap: usize, len: usize) -> Result<(), TryReserveError> {
        debug_assert!(len <= new_cap && len <= self.cap);

        let new_ptr = Self::allocate(new_cap)?;
        // SAFETY:
        // - Both allocations hold at least `len` elements and are distinct.
        // - Elements are moved bitwise, the old slots are never read again.
        unsafe {
            ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), len);
            self.release();
        }
        self.ptr = new_ptr;
        self.cap = new_cap;
        Ok(())
    }
}

impl<T, R: ReserveStrategy> Drop for RawArray<T, R> {
    fn drop(&mut self) {
        // SAFETY: the owner of the `RawArray` is responsible for its contents.
        unsafe { self.release() };
    }
}

/// Central function for reserve error handling
#[cold]
#[track_caller]
fn handle_error(e: TryReserveError) -> ! {
    match e {
        TryReserveError::CapacityOverflow => capacity_overflow(),
        TryReserveError::AllocError(layout) => alloc::handle_alloc_error(layout),
    }
}

#[track_caller]
fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::{DoubleOrMinReserveStrategy, QuadrupleOrMinReserveStrategy};

    #[test]
    fn raw_array_new_does_not_allocate() {
        let arr = RawArray::<u32, QuadrupleOrMinReserveStrategy>::new();
        assert_eq!(arr.capacity(), 0);

        let arr = RawArray::<(), QuadrupleOrMinReserveStrategy>::new();
        assert_eq!(arr.capacity(), usize::MAX);
    }

    #[test]
    fn raw_array_grow_moves_live_prefix() {
        let mut arr = RawArray::<u32, QuadrupleOrMinReserveStrategy>::with_capacity(2);
        unsafe {
            arr.ptr().write(7);
            arr.ptr().add(1).write(9);
        }

        arr.grow_one();
        assert_eq!(arr.capacity(), 8);
        unsafe {
            assert_eq!(arr.ptr().read(), 7);
            assert_eq!(arr.ptr().add(1).read(), 9);
        }

        arr.reserve_exact(2, 30);
        assert_eq!(arr.capacity(), 32);
        unsafe { assert_eq!(arr.ptr().add(1).read(), 9) };

        arr.shrink_to_fit(2, 2);
        assert_eq!(arr.capacity(), 2);
        unsafe { assert_eq!(arr.ptr().read(), 7) };
    }

    #[test]
    fn raw_array_strategy_drives_growth() {
        let mut arr = RawArray::<u8, DoubleOrMinReserveStrategy>::with_capacity(3);
        arr.reserve(3, 1);
        assert_eq!(arr.capacity(), 6);
    }

    #[test]
    fn raw_array_overflow_is_reported() {
        let mut arr = RawArray::<u64, QuadrupleOrMinReserveStrategy>::new();
        assert_eq!(arr.try_reserve(0, usize::MAX), Err(TryReserveError::CapacityOverflow));
        assert_eq!(arr.try_reserve_exact(0, isize::MAX as usize), Err(TryReserveError::CapacityOverflow));
        assert_eq!(arr.capacity(), 0);

        let mut zst = RawArray::<(), QuadrupleOrMinReserveStrategy>::new();
        assert_eq!(zst.try_reserve(usize::MAX, 1), Err(TryReserveError::CapacityOverflow));
    }

    #[test]
    fn raw_array_shrink_to_zero_releases() {
        let mut arr = RawArray::<u16, QuadrupleOrMinReserveStrategy>::with_capacity(16);
        arr.shrink_to_fit(0, 0);
        assert_eq!(arr.capacity(), 0);
    }
}
