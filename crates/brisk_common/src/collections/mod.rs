
mod imp;

mod dynarr;

use core::{alloc::Layout, fmt};

pub use dynarr::*;

//--------------------------------------------------------------

macro_rules! impl_slice_partial_eq_generic {
    ([$($vars:tt)*] $lhs:ty, $rhs:ty $(where $ty:ty: $bound:ident)?) => {
        impl<T, U, $($vars)*> PartialEq<$rhs> for $lhs  where
            T : PartialEq<U>,
            $($ty: $bound)?
        {
            #[inline]
            fn eq(&self, other: &$rhs) -> bool { self[..] == other[..] }
            #[inline]
            fn ne(&self, other: &$rhs) -> bool { self[..] != other[..] }
        }
    };
}
use impl_slice_partial_eq_generic;

//--------------------------------------------------------------

/// The error type for `try_reserve` methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TryReserveError {
    /// The computed capacity exceeded the collection's maximum (usually `isize::MAX` bytes).
    CapacityOverflow,
    /// The allocator returned an error for the given layout.
    AllocError(Layout),
}

impl fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")?;
        match self {
            TryReserveError::CapacityOverflow => f.write_str(" because the computed capacity exceeded the collection's maximum"),
            TryReserveError::AllocError(layout) => write!(f, " because the memory allocator returned an error (size: {}, align: {})", layout.size(), layout.align()),
        }
    }
}

impl std::error::Error for TryReserveError {}

/// The error returned by checked positional operations when the position lies outside of the valid window.
///
/// For element access the valid window is `[0, len)`, for insertion it is `[0, len]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutOfRangeError {
    /// Index that was requested.
    pub index: usize,
    /// Length of the collection at the time of the request.
    pub len:   usize,
}

impl fmt::Display for OutOfRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "index out of range: the index is {} but the length is {}", self.index, self.len)
    }
}

impl std::error::Error for OutOfRangeError {}

//--------------------------------------------------------------

/// Capacity of a `DynArr` created with [`DynArr::new`].
pub const DEFAULT_CAPACITY: usize = 4;

/// Multiplier applied to the capacity of a full `DynArr` by the default reserve strategy.
pub const GROWTH_FACTOR: usize = 4;

static_assertions::const_assert!(GROWTH_FACTOR > 1);

/// A trait used to define a strategy to reserve additional memory for containers.
pub trait ReserveStrategy {
    /// Calculate the new capacity for a container.
    ///
    /// `cur_capacity` represents the current capacity of the container.
    ///
    /// `min_capacity` represents the minimum required capacity to be able to resize.
    ///
    /// Returns `Err(())` if the capacity were to overflow
    fn calculate(cur_capacity: usize, min_capacity: usize) -> Result<usize, ()>;
}

/// The default reserve strategy: multiplies the current capacity by [`GROWTH_FACTOR`], or returns the minimum required capacity, whichever is bigger.
///
/// An empty container grows to at least a single element.
pub struct QuadrupleOrMinReserveStrategy;

impl ReserveStrategy for QuadrupleOrMinReserveStrategy {
    fn calculate(cur_capacity: usize, min_capacity: usize) -> Result<usize, ()> {
        let grown_cap = cur_capacity.saturating_mul(GROWTH_FACTOR);
        let new_cap = grown_cap.max(min_capacity).max(1);
        if new_cap <= isize::MAX as usize {
            Ok(new_cap)
        } else if min_capacity <= isize::MAX as usize {
            // Growing by the full factor would overflow, but the request itself still fits
            Ok(isize::MAX as usize)
        } else {
            Err(())
        }
    }
}

/// A reserve strategy that will try to either return double the current capacity, or the minimum required capacity, whichever is bigger.
pub struct DoubleOrMinReserveStrategy;

impl ReserveStrategy for DoubleOrMinReserveStrategy {
    fn calculate(cur_capacity: usize, min_capacity: usize) -> Result<usize, ()> {
        let double_cap = cur_capacity.saturating_mul(2);
        let new_cap = if double_cap > min_capacity { double_cap } else { min_capacity };
        if new_cap <= isize::MAX as usize {
            Ok(new_cap)
        } else {
            Err(())
        }
    }
}

/// A reserve strategy that will return a power of 2 capacity
pub struct Pow2ReserveStrategy;

impl ReserveStrategy for Pow2ReserveStrategy {
    fn calculate(_cur_capacity: usize, min_capacity: usize) -> Result<usize, ()> {
        match min_capacity.checked_next_power_of_two() {
            Some(new_cap) if new_cap <= isize::MAX as usize => Ok(new_cap),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadruple_strategy() {
        assert_eq!(QuadrupleOrMinReserveStrategy::calculate(0, 1), Ok(1));
        assert_eq!(QuadrupleOrMinReserveStrategy::calculate(4, 5), Ok(16));
        assert_eq!(QuadrupleOrMinReserveStrategy::calculate(4, 40), Ok(40));
        assert_eq!(QuadrupleOrMinReserveStrategy::calculate(usize::MAX / 2, usize::MAX / 2 + 1), Err(()));
        assert_eq!(QuadrupleOrMinReserveStrategy::calculate(isize::MAX as usize / 2, isize::MAX as usize / 2 + 1), Ok(isize::MAX as usize));
    }

    #[test]
    fn double_strategy() {
        assert_eq!(DoubleOrMinReserveStrategy::calculate(4, 5), Ok(8));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(4, 20), Ok(20));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(usize::MAX / 2 + 1, usize::MAX / 2 + 2), Err(()));
    }

    #[test]
    fn pow2_strategy() {
        assert_eq!(Pow2ReserveStrategy::calculate(4, 5), Ok(8));
        assert_eq!(Pow2ReserveStrategy::calculate(0, 16), Ok(16));
        assert_eq!(Pow2ReserveStrategy::calculate(0, usize::MAX), Err(()));
    }

    #[test]
    fn error_messages() {
        let err = OutOfRangeError { index: 10, len: 3 };
        assert_eq!(err.to_string(), "index out of range: the index is 10 but the length is 3");
        assert!(TryReserveError::CapacityOverflow.to_string().contains("capacity exceeded"));
    }
}
