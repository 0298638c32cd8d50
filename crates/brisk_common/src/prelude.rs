pub use core::prelude::*;

pub use crate::bytes::*;

pub use crate::collections::{DynArr, OutOfRangeError, TryReserveError};
pub use crate::dynarr;
