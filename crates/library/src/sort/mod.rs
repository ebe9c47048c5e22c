//! Copying files into their buckets.
//!
//! The primary entry point is [`sort`], which scans the source backend and
//! then copies every discovered file into the output backend at once,
//! streaming the outcome of each copy as it completes. [`sort_file`] handles
//! a single [`WorkItem`](crate::scan::WorkItem).
//!
//! Nothing is deduplicated: two files with the same name and extension from
//! different source directories land on the same destination, and whichever
//! copy finishes last wins.

mod file;
mod stream;

pub use self::file::{Copied, sort_file};
pub use self::stream::{SortEvent, sort};
