use core::{
    cmp, fmt,
    hash::{Hash, Hasher},
    iter,
    mem::{self, size_of, ManuallyDrop},
    ops::{self, Bound, Index, IndexMut, Range, RangeBounds},
    ptr::{self, NonNull},
    slice::{self, SliceIndex},
};

use super::{
    imp::array::RawArray,
    impl_slice_partial_eq_generic,
    OutOfRangeError,
    QuadrupleOrMinReserveStrategy,
    ReserveStrategy,
    TryReserveError,
    DEFAULT_CAPACITY,
};

mod drain;
pub use drain::Drain;

mod into_iter;
pub use into_iter::IntoIter;


/// Create a [`DynArr`] containing the arguments.
///
/// `dynarr!` allows `DynArr`s to be defined with the same syntax as array expressions.
/// There are two forms of this macro:
///
/// - Create a [`DynArr`] containing a given list of elements, with a capacity equal to the number of elements:
///
/// ```
/// # use brisk_common::dynarr;
/// let arr = dynarr![1, 2, 3];
/// assert_eq!(arr[0], 1);
/// assert_eq!(arr.capacity(), 3);
/// ```
///
/// - Create a [`DynArr`] from a given element and size:
///
/// ```
/// # use brisk_common::dynarr;
/// let arr = dynarr![1; 3];
/// assert_eq!(arr, [1, 1, 1]);
/// ```
///
/// Note that unlike array expressions this syntax supports all elements which implement [`Clone`] and the number of elements doesn't have to be a constant.
///
/// This will use `clone` to duplicate an expression, so one should be careful using this with types having a nonstandard `Clone` implementation.
///
/// `dynarr![]` creates an empty array with the default capacity.
#[macro_export]
macro_rules! dynarr {
    () => {
        $crate::collections::DynArr::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::collections::from_elem($elem, $n)
    };
    ($($x:expr),+ $(,)?) => {{
        let mut arr = $crate::collections::DynArr::with_capacity($crate::count_exprs!($($x),+));
        $( arr.push($x); )+
        arr
    }};
}

/// Create a `DynArr` holding `n` clones of `elem`.
///
/// Backs the `dynarr![elem; n]` form of the macro.
pub fn from_elem<T: Clone>(elem: T, n: usize) -> DynArr<T> {
    let mut arr = DynArr::with_capacity(n);
    arr.extend_with(n, elem);
    arr
}

/// A contiguous growable array type, written as `DynArr<T>`, short for 'dynamic array'.
///
/// The array owns a single heap buffer and tracks two counts: the number of live elements (its length)
/// and the number of slots in the buffer (its capacity).
/// Slots `[0, len)` always hold live elements, slots `[len, capacity)` are never read.
///
/// When an element is appended to a full array, the buffer is relocated into a new allocation,
/// chosen by the array's [`ReserveStrategy`] (by default [`QuadrupleOrMinReserveStrategy`], which grows by a factor of [`GROWTH_FACTOR`](super::GROWTH_FACTOR)).
/// Any relocation invalidates raw pointers previously returned by [`as_ptr`](DynArr::as_ptr) or [`as_mut_ptr`](DynArr::as_mut_ptr).
///
/// # Examples
///
/// ```
/// # use brisk_common::collections::DynArr;
/// let mut arr = DynArr::new();
/// arr.push(1);
/// arr.push(2);
///
/// assert_eq!(arr.len(), 2);
/// assert_eq!(arr[0], 1);
///
/// assert_eq!(arr.pop(), Some(2));
/// assert_eq!(arr.len(), 1);
///
/// arr[0] = 7;
/// assert_eq!(arr[0], 7);
///
/// arr.extend([1, 2, 3]);
/// assert_eq!(arr, [7, 1, 2, 3]);
/// ```
///
/// The [`dynarr!`](crate::dynarr) macro is provided for convenient initialization:
///
/// ```
/// # use brisk_common::dynarr;
/// let mut arr1 = dynarr![1, 2, 3];
/// arr1.push(4);
/// let arr2 = dynarr![1, 2, 3, 4];
/// assert_eq!(arr1, arr2);
/// ```
///
/// # Indexing
///
/// `DynArr` allows access to values by index, because it implements the [`Index`] trait.
/// Indexing is always bounds checked, an index past the length panics:
///
/// ```should_panic
/// # use brisk_common::dynarr;
/// let arr = dynarr![0, 2, 4, 6];
/// println!("{}", arr[6]); // it will panic!
/// ```
///
/// Use [`at`](DynArr::at) or [`get`](slice::get) to check whether the index is valid instead of panicking.
///
/// # Capacity and reallocation
///
/// The capacity is the amount of space allocated for any future elements that will be added to the array.
/// This is not to be confused with the *length*, which specifies the number of actual elements within the array.
/// Growth never happens implicitly except on the append and insert paths, and memory is only returned
/// by [`shrink_to_fit`](DynArr::shrink_to_fit), [`shrink_to`](DynArr::shrink_to), [`reset`](DynArr::reset) or dropping the array.
///
/// Zero-sized types never allocate, the capacity of such an array is always `usize::MAX`.
pub struct DynArr<T, R: ReserveStrategy = QuadrupleOrMinReserveStrategy> {
    arr: RawArray<T, R>,
    len: usize,
}

static_assertions::assert_eq_size!(DynArr<u8>, [usize; 3]);

impl<T> DynArr<T> {
    /// Constructs a new, empty `DynArr<T>` with room for [`DEFAULT_CAPACITY`] elements.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::collections::DynArr;
    /// let arr: DynArr<i32> = DynArr::new();
    /// assert!(arr.is_empty());
    /// assert_eq!(arr.capacity(), 4);
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity_for(DEFAULT_CAPACITY)
    }

    /// Constructs a new, empty `DynArr<T>` without allocating.
    ///
    /// The array will not allocate until elements are pushed onto it.
    #[inline]
    #[must_use]
    pub const fn new_unallocated() -> Self {
        Self::unallocated()
    }

    /// Constructs a new, empty `DynArr<T>` with at least the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::collections::DynArr;
    /// let mut arr = DynArr::with_capacity(10);
    /// assert_eq!(arr.len(), 0);
    /// assert_eq!(arr.capacity(), 10);
    ///
    /// for i in 0..10 {
    ///     arr.push(i);
    /// }
    /// assert_eq!(arr.capacity(), 10);
    ///
    /// // ...but this may make the array reallocate
    /// arr.push(11);
    /// assert!(arr.capacity() >= 11);
    /// ```
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_for(capacity)
    }

    /// Constructs a new, empty `DynArr<T>` with at least the specified capacity, returning an error when the buffer could not be allocated.
    #[inline]
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        Ok(Self { arr: RawArray::try_with_capacity(capacity)?, len: 0 })
    }
}

impl<T, R: ReserveStrategy> DynArr<T, R> {
    /// Constructs a new, empty `DynArr<T, R>` using the reserve strategy `R`, with room for [`DEFAULT_CAPACITY`] elements.
    ///
    /// Strategies are stateless, the strategy value is only used to pick `R` by inference.
    ///
    /// ```
    /// # use brisk_common::collections::{DynArr, DoubleOrMinReserveStrategy};
    /// let mut arr = DynArr::new_in(DoubleOrMinReserveStrategy);
    /// arr.extend([1, 2, 3, 4, 5]);
    /// assert_eq!(arr.capacity(), 8);
    /// ```
    #[inline]
    #[must_use]
    pub fn new_in(_strategy: R) -> Self {
        Self::with_capacity_for(DEFAULT_CAPACITY)
    }

    /// Constructs a new, empty `DynArr<T, R>` using the reserve strategy `R`, with at least the specified capacity.
    ///
    /// As with [`new_in`](DynArr::new_in), the strategy value is only used to pick `R` by inference.
    #[inline]
    #[must_use]
    pub fn with_capacity_in(capacity: usize, _strategy: R) -> Self {
        Self::with_capacity_for(capacity)
    }

    #[inline]
    const fn unallocated() -> Self {
        Self { arr: RawArray::new(), len: 0 }
    }

    #[inline]
    fn with_capacity_for(capacity: usize) -> Self {
        Self { arr: RawArray::with_capacity(capacity), len: 0 }
    }

    /// Move the contents out of `self` into a new array, leaving `self` empty and unallocated.
    ///
    /// The returned array keeps the original buffer, so no elements are copied or cloned.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut a = dynarr![1, 2, 3];
    /// let b = a.take();
    /// assert_eq!(b, [1, 2, 3]);
    /// assert!(a.is_empty());
    /// assert_eq!(a.capacity(), 0);
    /// ```
    #[inline]
    #[must_use = "use `reset` if the elements are not needed"]
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::unallocated())
    }

    /// Returns the total number of elements the array can hold without reallocating.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.arr.capacity()
    }

    /// Returns the number of elements in the array, also referred to as its 'length'.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array contains no elements.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of bytes occupied by the live elements.
    #[inline]
    pub const fn size_bytes(&self) -> usize {
        self.len * size_of::<T>()
    }

    /// Returns the number of bytes of the buffer, live or not.
    #[inline]
    pub const fn capacity_bytes(&self) -> usize {
        // Zero-sized types report a capacity of `usize::MAX`, the product is still 0.
        self.capacity() * size_of::<T>()
    }

    /// Reserves capacity for at least `additional` more elements to be inserted in the given `DynArr<T>`.
    /// The collection may reserve more space to speculatively avoid frequent reallocations.
    /// After calling `reserve`, capacity will be greater than or equal to `self.len() + additional`.
    /// Does nothing if capacity is already sufficient.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` bytes.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        self.arr.reserve(self.len, additional);
    }

    /// Reserves the minimum capacity for at least `additional` more elements to be inserted in the given `DynArr<T>`.
    /// Unlike [`reserve`](DynArr::reserve), this will not deliberately over-allocate to speculatively avoid frequent allocations.
    /// After calling `reserve_exact`, capacity will be equal to `self.len() + additional`, or unchanged if it was already sufficient.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` bytes.
    #[inline]
    pub fn reserve_exact(&mut self, additional: usize) {
        self.arr.reserve_exact(self.len, additional);
    }

    /// Ensures the capacity is at least `capacity`, growing to exactly `capacity` when it is currently smaller.
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr![1, 2];
    /// arr.reserve_to(10);
    /// assert_eq!(arr.capacity(), 10);
    /// arr.reserve_to(3);
    /// assert_eq!(arr.capacity(), 10);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` bytes.
    #[inline]
    pub fn reserve_to(&mut self, capacity: usize) {
        if capacity > self.capacity() {
            self.arr.reserve_exact(self.len, capacity - self.len);
        }
    }

    /// Tries to reserve capacity for at least `additional` more elements to be inserted in the given `DynArr<T>`.
    ///
    /// # Errors
    ///
    /// If the capacity overflows, or the allocator reports a failure, then an error is returned and the array is left untouched.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.arr.try_reserve(self.len, additional)
    }

    /// Tries to reserve the minimum capacity for at least `additional` elements to be inserted in the given `DynArr<T>`.
    ///
    /// # Errors
    ///
    /// If the capacity overflows, or the allocator reports a failure, then an error is returned and the array is left untouched.
    pub fn try_reserve_exact(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.arr.try_reserve_exact(self.len, additional)
    }

    /// Shrinks the capacity of the array to its length, when more than half of the buffer is unused.
    ///
    /// An empty array releases its buffer entirely.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::collections::DynArr;
    /// let mut arr = DynArr::with_capacity(10);
    /// arr.extend([1, 2, 3]);
    /// assert_eq!(arr.capacity(), 10);
    /// arr.shrink_to_fit();
    /// assert_eq!(arr.capacity(), 3);
    /// ```
    pub fn shrink_to_fit(&mut self) {
        if self.capacity() > self.len.saturating_mul(2) {
            self.arr.shrink_to_fit(self.len, self.len);
        }
    }

    /// Shrinks the capacity of the array with a lower bound.
    ///
    /// The capacity will remain at least as large as both the length and the supplied value.
    /// If the current capacity is less than the lower limit, this is a no-op.
    pub fn shrink_to(&mut self, min_capacity: usize) {
        let target = cmp::max(self.len, min_capacity);
        if self.capacity() > target {
            self.arr.shrink_to_fit(self.len, target);
        }
    }

    /// Shortens the array, keeping the first `len` elements and dropping the rest.
    ///
    /// If `len` is greater or equal to the array's current length, this has no effect.
    ///
    /// Note that this method has no effect on the allocated capacity of the array.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr![1, 2, 3, 4, 5];
    /// arr.truncate(2);
    /// assert_eq!(arr, [1, 2]);
    /// ```
    pub fn truncate(&mut self, len: usize) {
        // This is safe because:
        //
        // * the slice passed to `drop_in_place` is valid; the `len > self.len` case avoids creating an invalid slice, and
        // * the `len` of the array is shrunk before calling `drop_in_place`,
        //   such that no value will be dropped twice in case `drop_in_place` were to panic once (if it panics twice, the program aborts).
        unsafe {
            if len > self.len {
                return;
            }
            let remaining_len = self.len - len;
            let s = ptr::slice_from_raw_parts_mut(self.as_mut_ptr().add(len), remaining_len);
            self.len = len;
            ptr::drop_in_place(s);
        }
    }

    /// Extracts a slice containing the entire array.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self
    }

    /// Extracts a mutable slice of the entire array.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }

    /// Returns a raw pointer to the array's buffer, or a dangling raw pointer valid for zero sized reads if the array didn't allocate.
    ///
    /// The caller must ensure that the array outlives the pointer this function returns, or else it will end up pointing to garbage.
    /// Modifying the array may cause its buffer to be relocated, which would also make any pointers to it invalid.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.arr.ptr()
    }

    /// Returns an unsafe mutable pointer to the array's buffer, or a dangling raw pointer valid for zero sized reads if the array didn't allocate.
    ///
    /// The same relocation rules as for [`as_ptr`](DynArr::as_ptr) apply.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.arr.ptr()
    }

    /// Forces the length of the array to `new_len`.
    ///
    /// # Safety
    ///
    /// - `new_len` must be less than or equal to [`capacity()`](DynArr::capacity).
    /// - The elements at `old_len..new_len` must be initialized.
    #[inline]
    pub unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.capacity());
        self.len = new_len;
    }

    /// Returns a reference to the element at `index`, or an [`OutOfRangeError`] when `index >= len`.
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let arr = dynarr![10, 20];
    /// assert_eq!(arr.at(1), Ok(&20));
    /// assert!(arr.at(2).is_err());
    /// ```
    #[inline]
    pub fn at(&self, index: usize) -> Result<&T, OutOfRangeError> {
        let len = self.len;
        self.get(index).ok_or(OutOfRangeError { index, len })
    }

    /// Returns a mutable reference to the element at `index`, or an [`OutOfRangeError`] when `index >= len`.
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, OutOfRangeError> {
        let len = self.len;
        self.get_mut(index).ok_or(OutOfRangeError { index, len })
    }

    /// Returns a reference to the first element.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty.
    #[inline]
    #[track_caller]
    pub fn front(&self) -> &T {
        match self.first() {
            Some(elem) => elem,
            None => empty_access_failed("front"),
        }
    }

    /// Returns a mutable reference to the first element.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty.
    #[inline]
    #[track_caller]
    pub fn front_mut(&mut self) -> &mut T {
        match self.first_mut() {
            Some(elem) => elem,
            None => empty_access_failed("front_mut"),
        }
    }

    /// Returns a reference to the last element.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty.
    #[inline]
    #[track_caller]
    pub fn back(&self) -> &T {
        match self.last() {
            Some(elem) => elem,
            None => empty_access_failed("back"),
        }
    }

    /// Returns a mutable reference to the last element.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty.
    #[inline]
    #[track_caller]
    pub fn back_mut(&mut self) -> &mut T {
        match self.last_mut() {
            Some(elem) => elem,
            None => empty_access_failed("back_mut"),
        }
    }

    /// Returns an iterator over the elements, from the last to the first.
    #[inline]
    pub fn rev_iter(&self) -> iter::Rev<slice::Iter<'_, T>> {
        self.iter().rev()
    }

    /// Returns an iterator over mutable references to the elements, from the last to the first.
    #[inline]
    pub fn rev_iter_mut(&mut self) -> iter::Rev<slice::IterMut<'_, T>> {
        self.iter_mut().rev()
    }

    /// Removes an element from the array and returns it.
    ///
    /// The removed element is replaced by the last element of the array.
    ///
    /// This does not preserve ordering, but is *O*(1).
    /// If you need to preserve the element order, use [`remove`](DynArr::remove) instead.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr!["foo", "bar", "baz", "qux"];
    ///
    /// assert_eq!(arr.swap_remove(1), "bar");
    /// assert_eq!(arr, ["foo", "qux", "baz"]);
    /// ```
    #[inline]
    #[track_caller]
    pub fn swap_remove(&mut self, index: usize) -> T {
        let len = self.len;
        if index >= len {
            index_failed("swap_remove", OutOfRangeError { index, len });
        }

        unsafe {
            // We replace self[index] with the last element.
            // Note that if the bounds check above succeeds there must be a last element (which can be self[index] itself).
            let value = ptr::read(self.as_ptr().add(index));
            let base_ptr = self.as_mut_ptr();
            ptr::copy(base_ptr.add(len - 1), base_ptr.add(index), 1);
            self.set_len(len - 1);
            value
        }
    }

    /// Inserts an element at position `index` within the array, shifting all elements after it to the right.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr![1, 2, 3];
    /// arr.insert(1, 4);
    /// assert_eq!(arr, [1, 4, 2, 3]);
    /// arr.insert(4, 5);
    /// assert_eq!(arr, [1, 4, 2, 3, 5]);
    /// ```
    #[track_caller]
    pub fn insert(&mut self, index: usize, element: T) {
        if let Err(err) = self.emplace(index, move || element) {
            index_failed("insert", err);
        }
    }

    /// Constructs an element in place at position `index`, shifting all elements after it to the right, and returns a reference to it.
    ///
    /// `index` is validated before `f` runs, so `f` is never called for an invalid position.
    /// The element is produced before anything is shifted, so a panicking `f` leaves the array unchanged.
    ///
    /// # Errors
    ///
    /// Returns an [`OutOfRangeError`] if `index > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr![1, 3];
    /// *arr.emplace(1, || 2).unwrap() += 10;
    /// assert_eq!(arr, [1, 12, 3]);
    /// assert!(arr.emplace(5, || 0).is_err());
    /// ```
    pub fn emplace<F>(&mut self, index: usize, f: F) -> Result<&mut T, OutOfRangeError> where
        F: FnOnce() -> T
    {
        let len = self.len;
        if index > len {
            return Err(OutOfRangeError { index, len });
        }

        // space for the new element
        if len == self.capacity() {
            self.arr.grow_one();
        }

        let element = f();
        unsafe {
            let p = self.as_mut_ptr().add(index);
            if index < len {
                // Shift everything over to make space. (Duplicating the `index`th element into two consecutive places.)
                ptr::copy(p, p.add(1), len - index);
            }
            // Write it in, overwriting the first copy of the `index`th element.
            ptr::write(p, element);
            self.set_len(len + 1);
            Ok(&mut *p)
        }
    }

    /// Removes and returns the element at position `index` within the array, shifting all elements after it to the left.
    ///
    /// Note: Because this shifts over the remaining elements, it has a worst-case performance of *O*(*n*).
    /// If you don't need the order of elements to be preserved, use [`swap_remove`](DynArr::swap_remove) instead.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr![1, 2, 3];
    /// assert_eq!(arr.remove(1), 2);
    /// assert_eq!(arr, [1, 3]);
    /// ```
    #[track_caller]
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.len;
        if index >= len {
            index_failed("remove", OutOfRangeError { index, len });
        }
        unsafe { self.remove_unchecked(index) }
    }

    /// Removes the element at `index`, shifting all elements after it to the left.
    ///
    /// Returns the position of the element that now follows the erased one, which equals `index`.
    ///
    /// # Errors
    ///
    /// Returns an [`OutOfRangeError`] if `index >= len`, leaving the array unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr![1, 2, 3];
    /// assert_eq!(arr.erase(0), Ok(0));
    /// assert_eq!(arr, [2, 3]);
    /// assert!(arr.erase(2).is_err());
    /// ```
    pub fn erase(&mut self, index: usize) -> Result<usize, OutOfRangeError> {
        let len = self.len;
        if index >= len {
            return Err(OutOfRangeError { index, len });
        }
        // The array is consistent again before the removed element gets dropped.
        drop(unsafe { self.remove_unchecked(index) });
        Ok(index)
    }

    /// Removes the elements in `range`, shifting the tail down to close the gap.
    ///
    /// Returns the position of the element that now follows the erased range, which equals the start of the range.
    ///
    /// # Panics
    ///
    /// Panics if the starting point is greater than the end point or if the end point is greater than the length of the array.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr![1, 2, 3, 4, 5];
    /// assert_eq!(arr.erase_range(1..3), 1);
    /// assert_eq!(arr, [1, 4, 5]);
    /// ```
    #[track_caller]
    pub fn erase_range<RA>(&mut self, range: RA) -> usize where
        RA: RangeBounds<usize>
    {
        let Range { start, end } = slice_range(range, self.len);
        drop(self.drain(start..end));
        start
    }

    unsafe fn remove_unchecked(&mut self, index: usize) -> T {
        let len = self.len;
        // The place we are taking from.
        let ptr = self.as_mut_ptr().add(index);
        // Copy it out, unsafely having a copy of the value on the stack and in the array at the same time.
        let ret = ptr::read(ptr);
        // Shift everything down to fill in that spot.
        ptr::copy(ptr.add(1), ptr, len - index - 1);
        self.set_len(len - 1);
        ret
    }

    /// Retains only the elements specified by the predicate.
    ///
    /// In other words, remove all elements `e` for which `f(&e)` returns `false`.
    /// This method operates in place, visiting each element exactly once in the original order, and preserves the order of the retained elements.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr![1, 2, 3, 4];
    /// arr.retain(|&x| x % 2 == 0);
    /// assert_eq!(arr, [2, 4]);
    /// ```
    pub fn retain<F>(&mut self, mut f: F) where
        F: FnMut(&T) -> bool
    {
        self.retain_mut(|elem| f(elem));
    }

    /// Retains only the elements specified by the predicate, passing a mutable reference to it.
    ///
    /// In other words, remove all elements `e` such that `f(&mut e)` returns `false`.
    /// This method operates in place, visiting each element exactly once in the original order, and preserves the order of the retained elements.
    pub fn retain_mut<F>(&mut self, mut f: F) where
        F: FnMut(&mut T) -> bool
    {
        let original_len = self.len;
        // Avoid double drop if the drop guard is not executed, since we may make some holes during the process.
        unsafe { self.set_len(0) };

        // DynArr: [Kept, Kept, Hole, Hole, Hole, Hole, Unchecked, Unchecked]
        //         |<-              processed len   ->| ^- next to check
        //                     |<-  deleted cnt     ->|
        //         |<-              original_len                          ->|
        // Kept: Elements to which the predicate returns true on.
        // Hole: Moved or dropped element slot.
        // Unchecked: Unchecked valid elements.
        //
        // This drop guard will be invoked when predicate or `drop` of elements panicked.
        // It shifts unchecked elements to cover holes and `set_len` to the current length.
        struct BackshiftOnDrop<'a, T, R: ReserveStrategy> {
            a:             &'a mut DynArr<T, R>,
            processed_len: usize,
            deleted_cnt:   usize,
            original_len:  usize,
        }

        impl<T, R: ReserveStrategy> Drop for BackshiftOnDrop<'_, T, R> {
            fn drop(&mut self) {
                if self.deleted_cnt > 0 {
                    // SAFETY: trailing unchecked items must be valid since we never touch them.
                    unsafe {
                        ptr::copy(
                            self.a.as_ptr().add(self.processed_len),
                            self.a.as_mut_ptr().add(self.processed_len - self.deleted_cnt),
                            self.original_len - self.processed_len
                        );
                    }
                }
                // SAFETY: After filling holes, all items are in contiguous memory.
                unsafe {
                    self.a.set_len(self.original_len - self.deleted_cnt);
                }
            }
        }

        let mut g = BackshiftOnDrop { a: self, processed_len: 0, deleted_cnt: 0, original_len };

        fn process_loop<F, T, R: ReserveStrategy, const DELETED: bool>(
            original_len: usize,
            f: &mut F,
            g: &mut BackshiftOnDrop<'_, T, R>
        ) where
            F: FnMut(&mut T) -> bool
        {
            while g.processed_len != original_len {
                // SAFETY: Unchecked element must be valid.
                let cur = unsafe { &mut *g.a.as_mut_ptr().add(g.processed_len) };
                if !f(cur) {
                    // Advance early to avoid double drop if `drop_in_place` panicked.
                    g.processed_len += 1;
                    g.deleted_cnt += 1;
                    // SAFETY: We never touch this element again after dropped.
                    unsafe { ptr::drop_in_place(cur) };
                    if DELETED {
                        continue;
                    } else {
                        break;
                    }
                }
                if DELETED {
                    // SAFETY: `deleted_cnt` > 0, so the hole slot must not overlap with the current element.
                    unsafe {
                        let hole_slot = g.a.as_mut_ptr().add(g.processed_len - g.deleted_cnt);
                        ptr::copy_nonoverlapping(cur, hole_slot, 1);
                    }
                }
                g.processed_len += 1;
            }
        }

        // Stage 1: Nothing was deleted
        process_loop::<F, T, R, false>(original_len, &mut f, &mut g);

        // Stage 2: Some elements were deleted
        process_loop::<F, T, R, true>(original_len, &mut f, &mut g);

        drop(g);
    }

    /// Appends an element to the back of the array.
    ///
    /// When the array is full, its buffer is relocated first, which invalidates every pointer into the old buffer.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr![1, 2];
    /// arr.push(3);
    /// assert_eq!(arr, [1, 2, 3]);
    /// ```
    #[inline]
    pub fn push(&mut self, value: T) {
        // This will panic or abort if we would allocate > isize::MAX bytes or if the length increment would overflow for zero-sized types.
        let len = self.len;
        if len == self.capacity() {
            self.arr.grow_one();
        }
        unsafe {
            let end = self.as_mut_ptr().add(len);
            ptr::write(end, value);
            self.len = len + 1;
        }
    }

    /// Constructs an element at the back of the array and returns a reference to it.
    ///
    /// ```
    /// # use brisk_common::collections::DynArr;
    /// let mut arr = DynArr::new();
    /// let elem = arr.push_with(|| String::from("hello"));
    /// elem.push_str(" world");
    /// assert_eq!(arr[0], "hello world");
    /// ```
    pub fn push_with<F>(&mut self, f: F) -> &mut T where
        F: FnOnce() -> T
    {
        let len = self.len;
        if len == self.capacity() {
            self.arr.grow_one();
        }
        let value = f();
        unsafe {
            let end = self.as_mut_ptr().add(len);
            ptr::write(end, value);
            self.len = len + 1;
            &mut *end
        }
    }

    /// Appends an element if there is sufficient spare capacity, otherwise an error is returned with the element.
    ///
    /// Unlike [`push`](DynArr::push) this method will not reallocate when there's insufficient capacity.
    #[inline]
    pub fn push_within_capacity(&mut self, value: T) -> Result<(), T> {
        if self.len == self.capacity() {
            return Err(value);
        }
        unsafe {
            let end = self.as_mut_ptr().add(self.len);
            ptr::write(end, value);
            self.len += 1;
        }
        Ok(())
    }

    /// Removes the last element from an array and returns it, or [`None`] if it is empty.
    ///
    /// The capacity is never reduced.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr![1, 2, 3];
    /// assert_eq!(arr.pop(), Some(3));
    /// assert_eq!(arr, [1, 2]);
    /// ```
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            unsafe {
                self.len -= 1;
                Some(ptr::read(self.as_ptr().add(self.len)))
            }
        }
    }

    /// Moves all the elements of `other` into `self`, leaving `other` empty.
    ///
    /// `other` keeps its capacity.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr![1, 2, 3];
    /// let mut arr2 = dynarr![4, 5, 6];
    /// arr.append(&mut arr2);
    /// assert_eq!(arr, [1, 2, 3, 4, 5, 6]);
    /// assert!(arr2.is_empty());
    /// ```
    #[inline]
    pub fn append<R2: ReserveStrategy>(&mut self, other: &mut DynArr<T, R2>) {
        let count = other.len();
        self.reserve(count);
        unsafe {
            ptr::copy_nonoverlapping(other.as_ptr(), self.as_mut_ptr().add(self.len), count);
            other.set_len(0);
        }
        self.len += count;
    }

    /// Removes the specified range from the array in bulk, returning all removed elements as an iterator.
    /// If the iterator is dropped before being fully consumed, it drops the remaining removed elements.
    ///
    /// The returned iterator keeps a mutable borrow on the array to optimize its implementation.
    ///
    /// # Panics
    ///
    /// Panics if the starting point is greater than the end point or if the end point is greater than the length of the array.
    ///
    /// # Leaking
    ///
    /// If the returned iterator goes out of scope without being dropped (due to [`mem::forget`], for example),
    /// the array may have lost and leaked elements arbitrarily, including elements outside the range.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::{dynarr, collections::DynArr};
    /// let mut arr = dynarr![1, 2, 3];
    /// let u: DynArr<_> = arr.drain(1..).collect();
    /// assert_eq!(arr, &[1]);
    /// assert_eq!(u, &[2, 3]);
    ///
    /// // A full range clears the array, like `clear()` does
    /// arr.drain(..);
    /// assert!(arr.is_empty());
    /// ```
    #[track_caller]
    pub fn drain<RA>(&mut self, range: RA) -> Drain<'_, T, R> where
        RA: RangeBounds<usize>
    {
        // When the Drain is first created, it shortens the length of the source array to make sure no uninitialized or
        // moved-from elements are accessible at all if the Drain's destructor never gets to run.
        //
        // Drain will ptr::read out the values to remove.
        // When finished, the remaining tail of the array is copied back to cover the hole, and the array length is restored to the new length.
        let len = self.len;
        let Range { start, end } = slice_range(range, len);

        unsafe {
            // set the array's length to start, to be safe in case Drain is leaked
            self.set_len(start);
            let range_slice = slice::from_raw_parts(self.as_ptr().add(start), end - start);
            Drain::new(NonNull::from(self), range_slice.iter(), end, len - end)
        }
    }

    /// Clears the array, removing all values.
    ///
    /// Note that this method has no effect on the allocated capacity of the array, use [`reset`](DynArr::reset) to also release the buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr![1, 2, 3];
    /// arr.clear();
    /// assert!(arr.is_empty());
    /// assert_eq!(arr.capacity(), 3);
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        let elems: *mut [T] = self.as_mut_slice();

        // SAFETY:
        // - `elems` comes directly from `as_mut_slice` and is therefore valid.
        // - Setting `self.len` before calling `drop_in_place` means that, if an element's `Drop` impl panics, the array's `Drop` impl will do nothing (leaking the rest of the elements) instead of dropping some twice.
        unsafe {
            self.len = 0;
            ptr::drop_in_place(elems);
        }
    }

    /// Drops every element and releases the buffer, leaving the array with a capacity of 0.
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr![1, 2, 3];
    /// arr.reset();
    /// assert!(arr.is_empty());
    /// assert_eq!(arr.capacity(), 0);
    /// ```
    pub fn reset(&mut self) {
        self.clear();
        // SAFETY: every element was dropped by `clear`.
        unsafe { self.arr.release() };
    }

    /// Splits the collection into two at the given index.
    ///
    /// Returns a newly allocated array containing the elements in the range `[at, len)`.
    /// After the call, the original array will be left containing the elements `[0, at)` with its previous capacity unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr![1, 2, 3];
    /// let arr2 = arr.split_off(1);
    /// assert_eq!(arr, [1]);
    /// assert_eq!(arr2, [2, 3]);
    /// ```
    #[inline]
    #[must_use = "use `.truncate()` if you don't need the other half"]
    #[track_caller]
    pub fn split_off(&mut self, at: usize) -> Self {
        let len = self.len;
        if at > len {
            index_failed("split_off", OutOfRangeError { index: at, len });
        }

        let other_len = len - at;
        let mut other = Self::with_capacity_for(other_len);

        // Unsafely `set_len` and copy items to `other`.
        unsafe {
            self.set_len(at);
            ptr::copy_nonoverlapping(self.as_ptr().add(at), other.as_mut_ptr(), other_len);
            other.set_len(other_len);
        }
        other
    }

    /// Resizes the array in-place so that `len` is equal to `new_len`.
    ///
    /// If `new_len` is greater than `len`, the array is extended by the difference, with each additional slot filled with the result of calling the closure `f`.
    /// The return values from `f` will end up in the array in the order they have been generated.
    ///
    /// If `new_len` is less than `len`, the array is simply truncated.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr![1, 2, 3];
    /// arr.resize_with(5, Default::default);
    /// assert_eq!(arr, [1, 2, 3, 0, 0]);
    ///
    /// let mut p = 1;
    /// arr.resize_with(7, || { p *= 2; p });
    /// assert_eq!(arr, [1, 2, 3, 0, 0, 2, 4]);
    /// ```
    pub fn resize_with<F>(&mut self, new_len: usize, f: F) where
        F: FnMut() -> T
    {
        let len = self.len;
        if new_len > len {
            let additional = new_len - len;
            self.extend_trusted(additional, iter::repeat_with(f));
        } else {
            self.truncate(new_len);
        }
    }

    /// Appends exactly `additional` items taken from `iter`, reserving the room for them up front.
    ///
    /// The length is written back through a guard, so a panicking iterator keeps every element appended so far.
    fn extend_trusted<I>(&mut self, additional: usize, iter: I) where
        I: Iterator<Item = T>
    {
        self.reserve(additional);

        let ptr = self.as_mut_ptr();
        let len_slot = &mut self.len;
        let mut local_len = scopeguard::guard(*len_slot, move |len| *len_slot = len);
        for elem in iter.take(additional) {
            // SAFETY: `reserve` made room for `additional` elements past the current length.
            unsafe { ptr::write(ptr.add(*local_len), elem) };
            *local_len += 1;
        }
    }

    /// Extend the array by `n` clones of `value`, moving `value` itself into the last slot.
    fn extend_with(&mut self, n: usize, value: T) where
        T: Clone
    {
        if n == 0 {
            return;
        }
        self.reserve(n);
        self.extend_trusted(n - 1, iter::repeat(&value).cloned());
        self.push(value);
    }

    /// Extend the array from an iterator of unknown length, growing as the iterator keeps producing.
    fn extend_desugared<I>(&mut self, mut iter: I) where
        I: Iterator<Item = T>
    {
        while let Some(element) = iter.next() {
            let len = self.len;
            if len == self.capacity() {
                let (lower, _) = iter.size_hint();
                self.reserve(lower.saturating_add(1));
            }
            unsafe {
                ptr::write(self.as_mut_ptr().add(len), element);
                // Since next() executes user code which can panic we have to bump the length after each step.
                self.len = len + 1;
            }
        }
    }
}

impl<T: Clone, R: ReserveStrategy> DynArr<T, R> {
    /// Creates an array holding clones of every element of `values`.
    ///
    /// The capacity is chosen by the reserve strategy as if the array grew to `values.len()` elements from that same size,
    /// which for the default strategy leaves room for [`GROWTH_FACTOR`](super::GROWTH_FACTOR) times as many elements.
    ///
    /// ```
    /// # use brisk_common::collections::DynArr;
    /// let arr: DynArr<i32> = DynArr::from_range(&[1, 2, 3]);
    /// assert_eq!(arr, [1, 2, 3]);
    /// assert_eq!(arr.capacity(), 12);
    /// ```
    pub fn from_range(values: &[T]) -> Self {
        let len = values.len();
        let capacity = R::calculate(len, len).unwrap_or(len);
        let mut arr = Self::with_capacity_for(capacity);
        arr.extend_trusted(len, values.iter().cloned());
        arr
    }

    /// Resizes the array in-place so that `len` is equal to `new_len`.
    ///
    /// If `new_len` is greater than `len`, the array is extended by the difference, with each additional slot filled with `value`.
    /// If `new_len` is less than `len`, the array is simply truncated.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr!["hello"];
    /// arr.resize(3, "world");
    /// assert_eq!(arr, ["hello", "world", "world"]);
    ///
    /// let mut arr = dynarr![1, 2, 3, 4];
    /// arr.resize(2, 0);
    /// assert_eq!(arr, [1, 2]);
    /// ```
    pub fn resize(&mut self, new_len: usize, value: T) {
        let len = self.len;
        if new_len > len {
            self.extend_with(new_len - len, value);
        } else {
            self.truncate(new_len);
        }
    }

    /// Clones and appends all elements in a slice to the array.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr![1];
    /// arr.extend_from_slice(&[2, 3, 4]);
    /// assert_eq!(arr, [1, 2, 3, 4]);
    /// ```
    pub fn extend_from_slice(&mut self, other: &[T]) {
        self.extend_trusted(other.len(), other.iter().cloned());
    }

    /// Copies elements from `src` range to the end of the array.
    ///
    /// # Panics
    ///
    /// Panics if the starting point is greater than the end point or if the end point is greater than the length of the array.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr![0, 1, 2, 3, 4];
    /// arr.extend_from_within(2..);
    /// assert_eq!(arr, [0, 1, 2, 3, 4, 2, 3, 4]);
    /// ```
    #[track_caller]
    pub fn extend_from_within<RA>(&mut self, src: RA) where
        RA: RangeBounds<usize>
    {
        let Range { start, end } = slice_range(src, self.len);
        let count = end - start;
        self.reserve(count);
        for idx in start..end {
            // `reserve` already made room, so pushing never relocates while we read from the buffer.
            let value = self[idx].clone();
            self.push(value);
        }
    }

    /// Inserts clones of every element of `values` at `index`, shifting the elements after it to the right.
    ///
    /// # Errors
    ///
    /// Returns an [`OutOfRangeError`] if `index > len`, leaving the array unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr![1, 5];
    /// arr.insert_from_slice(1, &[2, 3, 4]).unwrap();
    /// assert_eq!(arr, [1, 2, 3, 4, 5]);
    /// ```
    pub fn insert_from_slice(&mut self, index: usize, values: &[T]) -> Result<(), OutOfRangeError> {
        let len = self.len;
        if index > len {
            return Err(OutOfRangeError { index, len });
        }

        let count = values.len();
        if count == 0 {
            return Ok(());
        }
        self.reserve(count);

        unsafe {
            let p = self.as_mut_ptr().add(index);
            // Move the tail out of the way, the gap now holds `count` uninitialized slots.
            ptr::copy(p, p.add(count), len - index);

            // If a clone panics the tail leaks instead of being dropped twice.
            self.set_len(index);
            for (i, value) in values.iter().enumerate() {
                ptr::write(p.add(i), value.clone());
            }
            self.set_len(len + count);
        }
        Ok(())
    }
}

impl<T: Default, R: ReserveStrategy> DynArr<T, R> {
    /// Resizes the array in-place so that `len` is equal to `new_len`, filling new slots with `T::default()`.
    ///
    /// When `new_len` exceeds the capacity, the buffer grows to exactly `new_len`.
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let mut arr = dynarr![1, 2];
    /// arr.resize_default(4);
    /// assert_eq!(arr, [1, 2, 0, 0]);
    /// ```
    pub fn resize_default(&mut self, new_len: usize) {
        self.reserve_to(new_len);
        self.resize_with(new_len, T::default);
    }
}

//--------------------------------------------------------------

/// Turn any range into a `start..end` range within `[0, len]`.
#[track_caller]
fn slice_range<RA>(range: RA, len: usize) -> Range<usize> where
    RA: RangeBounds<usize>
{
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => match start.checked_add(1) {
            Some(start) => start,
            None => range_failed(format_args!("attempted to index slice from after maximum usize")),
        },
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&end) => match end.checked_add(1) {
            Some(end) => end,
            None => range_failed(format_args!("attempted to index slice up to maximum usize")),
        },
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    };

    if start > end {
        range_failed(format_args!("slice index starts at {start} but ends at {end}"));
    }
    if end > len {
        range_failed(format_args!("range end index {end} out of range for slice of length {len}"));
    }
    start..end
}

#[cold]
#[track_caller]
fn range_failed(msg: fmt::Arguments<'_>) -> ! {
    panic!("{msg}");
}

#[cold]
#[track_caller]
fn index_failed(op: &str, err: OutOfRangeError) -> ! {
    panic!("{op}: {err}");
}

#[cold]
#[track_caller]
fn empty_access_failed(op: &str) -> ! {
    panic!("{op}: the array is empty");
}

//--------------------------------------------------------------

impl<T, R: ReserveStrategy> ops::Deref for DynArr<T, R> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }
}

impl<T, R: ReserveStrategy> ops::DerefMut for DynArr<T, R> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }
}

impl<T: Clone, R: ReserveStrategy> Clone for DynArr<T, R> {
    /// Clones into a freshly allocated buffer of the same capacity.
    fn clone(&self) -> Self {
        let mut arr = Self::with_capacity_for(self.capacity());
        arr.extend_trusted(self.len, self.iter().cloned());
        arr
    }

    /// Overwrites the contents of `self` with a clone of the contents of `source`, reusing the buffer of `self` where it is large enough.
    fn clone_from(&mut self, source: &Self) {
        // drop anything that will not be overwritten
        self.truncate(source.len);

        // self.len <= source.len due to the truncate above, so the slices here are always in-bounds.
        let (init, tail) = source.split_at(self.len);

        // reuse the contained values' allocations/resources.
        self.clone_from_slice(init);
        self.extend_from_slice(tail);
    }
}

impl<T: Hash, R: ReserveStrategy> Hash for DynArr<T, R> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        Hash::hash(&**self, state)
    }
}

impl<T, I: SliceIndex<[T]>, R: ReserveStrategy> Index<I> for DynArr<T, R> {
    type Output = I::Output;

    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        Index::index(&**self, index)
    }
}

impl<T, I: SliceIndex<[T]>, R: ReserveStrategy> IndexMut<I> for DynArr<T, R> {
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(&mut **self, index)
    }
}

impl<T, R: ReserveStrategy> FromIterator<T> for DynArr<T, R> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let mut arr = Self::with_capacity_for(lower);
        arr.extend_desugared(iter);
        arr
    }
}

impl<T, R: ReserveStrategy> IntoIterator for DynArr<T, R> {
    type Item = T;
    type IntoIter = IntoIter<T, R>;

    /// Creates a consuming iterator, that is, one that moves each value out of the array (from start to end).
    /// The array cannot be used after calling this.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::dynarr;
    /// let arr = dynarr!["a".to_string(), "b".to_string()];
    /// let mut iter = arr.into_iter();
    ///
    /// let first_element: Option<String> = iter.next();
    ///
    /// assert_eq!(first_element, Some("a".to_string()));
    /// assert_eq!(iter.next(), Some("b".to_string()));
    /// assert_eq!(iter.next(), None);
    /// ```
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        let me = ManuallyDrop::new(self);
        // SAFETY: `me` is never dropped, so ownership of the buffer moves into the iterator.
        let arr = unsafe { ptr::read(&me.arr) };
        IntoIter::new(arr, me.len)
    }
}

impl<'a, T, R: ReserveStrategy> IntoIterator for &'a DynArr<T, R> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, R: ReserveStrategy> IntoIterator for &'a mut DynArr<T, R> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, R: ReserveStrategy> Extend<T> for DynArr<T, R> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.extend_desugared(iter.into_iter())
    }
}

/// Extend implementation that copies elements out of references before pushing them onto the array.
impl<'a, T: Copy + 'a, R: ReserveStrategy> Extend<&'a T> for DynArr<T, R> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend_desugared(iter.into_iter().copied())
    }
}

impl_slice_partial_eq_generic! { [R0: ReserveStrategy, R1: ReserveStrategy] DynArr<T, R0>, DynArr<U, R1> }
impl_slice_partial_eq_generic! { [R: ReserveStrategy] DynArr<T, R>, &[U] }
impl_slice_partial_eq_generic! { [R: ReserveStrategy] DynArr<T, R>, &mut [U] }
impl_slice_partial_eq_generic! { [R: ReserveStrategy] &[T], DynArr<U, R> }
impl_slice_partial_eq_generic! { [R: ReserveStrategy] &mut [T], DynArr<U, R> }
impl_slice_partial_eq_generic! { [R: ReserveStrategy] DynArr<T, R>, [U] }
impl_slice_partial_eq_generic! { [R: ReserveStrategy] [T], DynArr<U, R> }
impl_slice_partial_eq_generic! { [R: ReserveStrategy, const N: usize] DynArr<T, R>, [U; N] }
impl_slice_partial_eq_generic! { [R: ReserveStrategy, const N: usize] DynArr<T, R>, &[U; N] }
impl_slice_partial_eq_generic! { [R: ReserveStrategy, const N: usize] [T; N], DynArr<U, R> }

impl<T: PartialOrd, R0: ReserveStrategy, R1: ReserveStrategy> PartialOrd<DynArr<T, R1>> for DynArr<T, R0> {
    #[inline]
    fn partial_cmp(&self, other: &DynArr<T, R1>) -> Option<cmp::Ordering> {
        PartialOrd::partial_cmp(&**self, &**other)
    }
}

impl<T: Eq, R: ReserveStrategy> Eq for DynArr<T, R> {}

impl<T: Ord, R: ReserveStrategy> Ord for DynArr<T, R> {
    #[inline]
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        Ord::cmp(&**self, &**other)
    }
}

impl<T, R: ReserveStrategy> Drop for DynArr<T, R> {
    fn drop(&mut self) {
        unsafe {
            // use drop for [T]
            // use a raw slice to refer to the elements of the array as weakest necessary type;
            // could avoid questions of validity in certain cases
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.as_mut_ptr(), self.len))
        }
        // RawArray handles deallocation
    }
}

impl<T, R: ReserveStrategy> Default for DynArr<T, R> {
    /// Creates an empty `DynArr<T>` with the default capacity.
    fn default() -> Self {
        Self::with_capacity_for(DEFAULT_CAPACITY)
    }
}

impl<T: fmt::Debug, R: ReserveStrategy> fmt::Debug for DynArr<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T, R: ReserveStrategy> AsRef<[T]> for DynArr<T, R> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, R: ReserveStrategy> AsMut<[T]> for DynArr<T, R> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T: Clone, R: ReserveStrategy> From<&[T]> for DynArr<T, R> {
    /// Allocate a `DynArr<T>` and fill it by cloning `s`'s items, see [`DynArr::from_range`].
    fn from(s: &[T]) -> Self {
        Self::from_range(s)
    }
}

impl<T: Clone, R: ReserveStrategy> From<&mut [T]> for DynArr<T, R> {
    fn from(s: &mut [T]) -> Self {
        Self::from_range(s)
    }
}

impl<T, R: ReserveStrategy, const N: usize> From<[T; N]> for DynArr<T, R> {
    /// Allocate a `DynArr<T>` with a capacity of exactly `N` and move `s`'s items into it.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brisk_common::collections::DynArr;
    /// let arr: DynArr<i32> = DynArr::from([1, 2, 3]);
    /// assert_eq!(arr, [1, 2, 3]);
    /// assert_eq!(arr.capacity(), 3);
    /// ```
    fn from(s: [T; N]) -> Self {
        let s = ManuallyDrop::new(s);
        let mut arr = Self::with_capacity_for(N);
        // SAFETY: the array was forgotten, so every element is moved exactly once.
        unsafe {
            ptr::copy_nonoverlapping(s.as_ptr(), arr.as_mut_ptr(), N);
            arr.set_len(N);
        }
        arr
    }
}

impl<T: Clone, R: ReserveStrategy, const N: usize> From<&[T; N]> for DynArr<T, R> {
    fn from(s: &[T; N]) -> Self {
        Self::from_range(s.as_slice())
    }
}
