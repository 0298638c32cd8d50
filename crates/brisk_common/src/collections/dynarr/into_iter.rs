use core::{
    fmt,
    iter::FusedIterator,
    ptr,
    slice,
};

use crate::collections::{imp::array::RawArray, QuadrupleOrMinReserveStrategy, ReserveStrategy};

/// An iterator that moves out of a `DynArr`.
///
/// This `struct` is created by the `into_iter` method on [`DynArr`](super::DynArr) (provided by the [`IntoIterator`] trait).
///
/// Elements that were not yielded are dropped together with the iterator, after which the buffer is released.
pub struct IntoIter<T, R: ReserveStrategy = QuadrupleOrMinReserveStrategy> {
    arr:   RawArray<T, R>,
    /// Index of the next element to yield from the front.
    start: usize,
    /// One past the index of the next element to yield from the back.
    end:   usize,
}

impl<T, R: ReserveStrategy> IntoIter<T, R> {
    pub(super) fn new(arr: RawArray<T, R>, len: usize) -> Self {
        Self { arr, start: 0, end: len }
    }

    /// Returns the remaining items of this iterator as a slice.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let arr = dynarr!['a', 'b', 'c'];
    /// let mut into_iter = arr.into_iter();
    /// assert_eq!(into_iter.as_slice(), &['a', 'b', 'c']);
    /// let _ = into_iter.next().unwrap();
    /// assert_eq!(into_iter.as_slice(), &['b', 'c']);
    /// ```
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.arr.ptr().add(self.start), self.end - self.start) }
    }

    /// Returns the remaining items of this iterator as a mutable slice.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let arr = dynarr!['a', 'b', 'c'];
    /// let mut into_iter = arr.into_iter();
    /// into_iter.as_mut_slice()[2] = 'z';
    /// assert_eq!(into_iter.next().unwrap(), 'a');
    /// assert_eq!(into_iter.next().unwrap(), 'b');
    /// assert_eq!(into_iter.next().unwrap(), 'z');
    /// ```
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.arr.ptr().add(self.start), self.end - self.start) }
    }
}

impl<T: fmt::Debug, R: ReserveStrategy> fmt::Debug for IntoIter<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, R: ReserveStrategy> AsRef<[T]> for IntoIter<T, R> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, R: ReserveStrategy> Iterator for IntoIter<T, R> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }
        let idx = self.start;
        self.start += 1;
        // SAFETY: `idx` lies in the live window, and moves past it before anything else can observe the slot.
        Some(unsafe { ptr::read(self.arr.ptr().add(idx)) })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.start;
        (len, Some(len))
    }

    #[inline]
    fn count(self) -> usize {
        self.len()
    }
}

impl<T, R: ReserveStrategy> DoubleEndedIterator for IntoIter<T, R> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        Some(unsafe { ptr::read(self.arr.ptr().add(self.end)) })
    }
}

impl<T, R: ReserveStrategy> ExactSizeIterator for IntoIter<T, R> {}

impl<T, R: ReserveStrategy> FusedIterator for IntoIter<T, R> {}

impl<T, R: ReserveStrategy> Drop for IntoIter<T, R> {
    fn drop(&mut self) {
        let remaining: *mut [T] = self.as_mut_slice();
        // Mark everything as yielded first, a panicking element drop then leaks the rest instead of dropping it twice.
        self.start = self.end;
        unsafe { ptr::drop_in_place(remaining) };
        // RawArray handles deallocation
    }
}
