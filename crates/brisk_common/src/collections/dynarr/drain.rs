use core::{
    fmt,
    iter::FusedIterator,
    mem::{self, size_of, ManuallyDrop},
    ptr::{self, NonNull},
    slice,
};

use crate::collections::{QuadrupleOrMinReserveStrategy, ReserveStrategy};

use super::DynArr;

/// A draining iterator for `DynArr<T>`.
///
/// This `struct` is created by [`DynArr::drain`].
/// See its documentation for more.
pub struct Drain<'a, T: 'a, R: ReserveStrategy = QuadrupleOrMinReserveStrategy> {
    /// Index of tail to preserve.
    tail_start: usize,
    /// Length of the tail.
    tail_len:   usize,
    /// Current remaining range to remove.
    iter:       slice::Iter<'a, T>,
    arr:        NonNull<DynArr<T, R>>,
}

impl<'a, T, R: ReserveStrategy> Drain<'a, T, R> {
    /// # Safety
    ///
    /// The length of `arr` must already have been cut down to the start of the drained range,
    /// `iter` must cover the drained range, and `[tail_start, tail_start + tail_len)` must hold the live tail.
    pub(super) unsafe fn new(arr: NonNull<DynArr<T, R>>, iter: slice::Iter<'a, T>, tail_start: usize, tail_len: usize) -> Self {
        Self { tail_start, tail_len, iter, arr }
    }

    /// Returns the remaining items of this iterator as a slice.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr!['a', 'b', 'c'];
    /// let mut drain = arr.drain(..);
    /// assert_eq!(drain.as_slice(), &['a', 'b', 'c']);
    /// let _ = drain.next().unwrap();
    /// assert_eq!(drain.as_slice(), &['b', 'c']);
    /// ```
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        self.iter.as_slice()
    }

    /// Keep unyielded elements in the source `DynArr`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr!['a', 'b', 'c'];
    /// let mut drain = arr.drain(..);
    ///
    /// assert_eq!(drain.next().unwrap(), 'a');
    ///
    /// // This call keeps 'b' and 'c' in the array.
    /// drain.keep_rest();
    ///
    /// // If we wouldn't call `keep_rest()`, `arr` would be empty.
    /// assert_eq!(arr, ['b', 'c']);
    /// ```
    pub fn keep_rest(self) {
        // At this moment layout looks like this:
        //
        // [head] [yielded by next] [unyielded] [yielded by next_back] [tail]
        //        ^-- start         \_________/-- unyielded_len        \____/-- self.tail_len
        //                          ^-- unyielded_ptr                  ^-- tail
        //
        // Normally the `Drop` impl would drop [unyielded] and then move [tail] to the `start`.
        // Here we want to
        // 1. Move [unyielded] to `start`
        // 2. Move [tail] to a new start at `start + len(unyielded)`
        // 3. Update length of the original array to `len(head) + len(unyielded) + len(tail)`
        //    a. In case of ZST, this is the only thing we want to do
        // 4. Do *not* drop self, as everything is put in a consistent state already, there is nothing to do
        let mut this = ManuallyDrop::new(self);

        unsafe {
            let source_arr = this.arr.as_mut();

            let start = source_arr.len;
            let tail = this.tail_start;

            let unyielded_len = this.iter.len();
            let unyielded_ptr = this.iter.as_slice().as_ptr();

            // ZST have no identity
            if size_of::<T>() != 0 {
                let start_ptr = source_arr.as_mut_ptr().add(start);

                // memmove back unyielded elements
                if unyielded_ptr != start_ptr as *const T {
                    ptr::copy(unyielded_ptr, start_ptr, unyielded_len);
                }

                // memmove back untouched tail
                if tail != (start + unyielded_len) {
                    let src = source_arr.as_ptr().add(tail);
                    let dst = start_ptr.add(unyielded_len);
                    ptr::copy(src, dst, this.tail_len);
                }
            }

            source_arr.set_len(start + unyielded_len + this.tail_len);
        }
    }
}

impl<T: fmt::Debug, R: ReserveStrategy> fmt::Debug for Drain<'_, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Drain").field(&self.iter.as_slice()).finish()
    }
}

impl<T, R: ReserveStrategy> AsRef<[T]> for Drain<'_, T, R> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

unsafe impl<T: Sync, R: ReserveStrategy> Sync for Drain<'_, T, R> {}
unsafe impl<T: Send, R: ReserveStrategy> Send for Drain<'_, T, R> {}

impl<T, R: ReserveStrategy> Iterator for Drain<'_, T, R> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|elt| unsafe { ptr::read(elt as *const _) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<T, R: ReserveStrategy> DoubleEndedIterator for Drain<'_, T, R> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back().map(|elt| unsafe { ptr::read(elt as *const _) })
    }
}

impl<T, R: ReserveStrategy> Drop for Drain<'_, T, R> {
    fn drop(&mut self) {
        // Moves back the un-`Drain`ed elements to restore the original `DynArr`
        struct DropGuard<'r, 'a, T, R: ReserveStrategy>(&'r mut Drain<'a, T, R>);

        impl<T, R: ReserveStrategy> Drop for DropGuard<'_, '_, T, R> {
            fn drop(&mut self) {
                if self.0.tail_len > 0 {
                    unsafe {
                        let source_arr = self.0.arr.as_mut();
                        // memmove back untouched tail, update to new length
                        let start = source_arr.len;
                        let tail = self.0.tail_start;
                        if tail != start {
                            let src = source_arr.as_ptr().add(tail);
                            let dst = source_arr.as_mut_ptr().add(start);
                            ptr::copy(src, dst, self.0.tail_len);
                        }
                        source_arr.set_len(start + self.0.tail_len);
                    }
                }
            }
        }

        let iter = mem::take(&mut self.iter);
        let drop_len = iter.len();

        let mut arr = self.arr;

        if size_of::<T>() == 0 {
            // ZST have no identity, so we don't need to move them around, we only need to drop the correct amount.
            // This can be achieved by manipulating the DynArr length instead of moving values out from `iter`.
            unsafe {
                let arr = arr.as_mut();
                let old_len = arr.len;
                arr.set_len(old_len + drop_len + self.tail_len);
                arr.truncate(old_len + self.tail_len);
            }
            return;
        }

        // ensure elements are moved back into their appropriate places, even when drop_in_place panics
        let _guard = DropGuard(self);

        if drop_len == 0 {
            return;
        }

        let drop_ptr = iter.as_slice().as_ptr();

        unsafe {
            // drop_ptr comes from a slice::Iter which only gives us a &[T], but drop_in_place needs a pointer with mutable provenance.
            // Therefore we reconstruct it from the original array.
            let arr_ptr = arr.as_mut().as_mut_ptr();
            let drop_offset = drop_ptr.offset_from(arr_ptr) as usize;
            let to_drop = ptr::slice_from_raw_parts_mut(arr_ptr.add(drop_offset), drop_len);
            ptr::drop_in_place(to_drop);
        }
    }
}

impl<T, R: ReserveStrategy> ExactSizeIterator for Drain<'_, T, R> {}

impl<T, R: ReserveStrategy> FusedIterator for Drain<'_, T, R> {}
