use core::fmt::{self, Display};

use brisk_common::collections::{DynArr, ReserveStrategy};

use crate::{LogCategory, LogLevel, LogLocation, Logger};

struct DynArrInfo<'a, T, R: ReserveStrategy> {
    name : &'a str,
    arr  : &'a DynArr<T, R>,
}

impl<T, R: ReserveStrategy> Display for DynArrInfo<'_, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arr = self.arr;
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Size: {}, Size (in bytes): {}", arr.len(), arr.size_bytes())?;
        writeln!(f, "Capacity: {}, Capacity (in bytes): {}", arr.capacity(), arr.capacity_bytes())?;
        match (arr.first(), arr.last()) {
            (Some(front), Some(back)) => write!(f, "Memory range: {:p} - {:p}", front, back),
            _ => f.write_str("Memory range: (empty)"),
        }
    }
}

struct DynArrElements<'a, T> {
    elems: &'a [T],
}

impl<T: Display> Display for DynArrElements<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Elements:")?;
        for elem in self.elems {
            write!(f, " {elem}")?;
        }
        Ok(())
    }
}

/// Log the name, size, capacity and memory range of `arr` at info level.
#[track_caller]
pub fn log_dynarr_info<T, R: ReserveStrategy>(logger: &Logger, category: LogCategory, name: &str, arr: &DynArr<T, R>) {
    logger.log_fmt(category, LogLevel::Info, LogLocation::caller(), format_args!("{}", DynArrInfo { name, arr }));
}

/// Log the same info as [`log_dynarr_info`], followed by every element of `arr`.
#[track_caller]
pub fn log_dynarr_contents<T: Display, R: ReserveStrategy>(logger: &Logger, category: LogCategory, name: &str, arr: &DynArr<T, R>) {
    logger.log_fmt(category, LogLevel::Info, LogLocation::caller(), format_args!("{}\n{}", DynArrInfo { name, arr }, DynArrElements { elems: arr.as_slice() }));
}
