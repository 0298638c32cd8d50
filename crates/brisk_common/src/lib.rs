//! Common building blocks for brisk: the hand-managed [`DynArr`](collections::DynArr) container,
//! byte-size helpers and timestamps used by the logger.

mod bytes;

pub mod collections;
pub mod time;

pub use bytes::*;
pub use brisk_base::count_exprs;

pub mod prelude;
