use crate::error::{ErrorKind, Result};
use bucketeer_library::sort::{SortEvent, sort};
use bucketeer_storage::BackendHandle;
use bucketeer_storage::backend::LocalBackend;
use exn::ResultExt;
use futures::StreamExt;
use std::path::{self, PathBuf};
use std::pin::pin;
use std::sync::Arc;

/// How a run that didn't hit a fatal error ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The source tree contained no files.
    Empty,
    /// Every discovered file was attempted. Individual failures are only
    /// visible in the log.
    Sorted(u64),
}

/// Sort the files below `source_dir` into buckets under `output_dir`.
///
/// Relative paths are resolved against the current directory. The source
/// directory is checked before anything is created; the output directory is
/// then created if it's missing. The returned future resolves only after
/// every copy has finished, successfully or not.
///
/// # Errors
/// Only fatal conditions are returned: an invalid source directory, an
/// output directory that can't be created, or a failed scan. They have
/// already been logged by the time they are returned.
pub async fn run(source_dir: PathBuf, output_dir: PathBuf) -> Result<Outcome> {
    let result = run_inner(source_dir, output_dir).await;
    if let Err(err) = &result {
        tracing::error!(error = ?err, "{}", **err);
    }
    result
}

async fn run_inner(source_dir: PathBuf, output_dir: PathBuf) -> Result<Outcome> {
    let source_dir = path::absolute(&source_dir).or_raise(|| ErrorKind::InvalidSource(source_dir.clone()))?;
    let source: BackendHandle =
        Arc::new(LocalBackend::open("source", &source_dir).or_raise(|| ErrorKind::InvalidSource(source_dir.clone()))?);
    let output_dir = path::absolute(&output_dir).or_raise(|| ErrorKind::Output(output_dir.clone()))?;
    let output: BackendHandle =
        Arc::new(LocalBackend::new("output", &output_dir).or_raise(|| ErrorKind::Output(output_dir.clone()))?);

    let mut discovered = 0;
    let mut events = pin!(sort(&source, &output));
    while let Some(event) = events.next().await {
        match event {
            Ok(SortEvent::Started) => tracing::info!("Starting scan of source directory: {}", source_dir.display()),
            Ok(SortEvent::DiscoveryComplete(0)) => {
                tracing::warn!("No files found in the source directory.");
                return Ok(Outcome::Empty);
            },
            Ok(SortEvent::DiscoveryComplete(count)) => {
                discovered = count;
                tracing::info!("Found {count} files. Starting asynchronous copying...");
            },
            Ok(SortEvent::Copied(copied)) => {
                tracing::debug!(destination = %copied.destination.display(), bytes = copied.bytes, "Copied file");
            },
            Ok(SortEvent::Complete) => tracing::info!("All files processed. Sorting complete!"),
            Err(e) if e.is_fatal() => return Err(e).or_raise(|| ErrorKind::Scan),
            Err(e) => tracing::error!(error = ?e, "{}", *e),
        }
    }
    Ok(Outcome::Sorted(discovered))
}
