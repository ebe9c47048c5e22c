//! Sorting a directory tree into per-extension buckets.
//!
//! The work happens in two strictly sequential phases:
//!
//! 1. [`scan`] eagerly lists every regular file in the source backend and
//!    turns each into a [`WorkItem`](scan::WorkItem) with its destination
//!    already decided.
//! 2. [`sort`] copies every work item into the output backend concurrently,
//!    streaming a [`SortEvent`](sort::SortEvent) per file as they finish.

pub mod bucket;
pub mod error;
pub mod scan;
pub mod sort;

pub use crate::bucket::{Bucket, NO_EXTENSION_BUCKET};

/// Upper bound on copies running at the same time. Every copy holds a
/// source and a destination file open on its own blocking thread.
pub const MAX_PROCESS_CONCURRENCY: usize = 32;
