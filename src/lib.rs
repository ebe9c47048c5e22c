//! Copy every file in a directory tree into per-extension buckets.
//!
//! `photos/cat.jpg` ends up at `<output>/JPG/cat.jpg`, `notes/README` at
//! `<output>/NO_EXTENSION/README`. The source tree is never modified and its
//! layout is not preserved in the output.

pub mod cli;
pub mod error;
mod run;

pub use crate::run::{Outcome, run};
