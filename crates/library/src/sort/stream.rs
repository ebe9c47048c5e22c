use crate::MAX_PROCESS_CONCURRENCY;
use crate::error::Result;
use crate::scan::discover;
use crate::sort::file::{Copied, sort_file};
use async_stream::stream;
use bucketeer_storage::BackendHandle;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};

/// Progress events emitted by [`sort`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete): exactly once, with the
///    total file count.
/// 3. [`Copied`](Self::Copied): zero or more times, one per file that was
///    copied, in completion order.
/// 4. [`Complete`](Self::Complete): exactly once, after every file has been
///    dealt with.
///
/// A scan failure terminates the stream straight after
/// [`Started`](Self::Started); neither of the later markers is emitted.
#[derive(Debug)]
pub enum SortEvent {
    /// Scanning has begun.
    Started,
    /// The source tree has been fully listed; the total count is now known.
    DiscoveryComplete(u64),
    /// A file has been copied into its bucket.
    Copied(Copied),
    /// Every discovered file has either been copied or failed.
    Complete,
}

/// Streams [`SortEvent`]s while copying every file in `source` into its
/// bucket in `output`.
///
/// The whole batch of work items is planned up front, but only
/// [`MAX_PROCESS_CONCURRENCY`] copies are in flight at any moment, each one
/// holding two open files; another starts as each finishes. The stream only
/// emits [`Complete`](SortEvent::Complete) once every item has resolved. Individual file failures are surfaced as `Err` items without
/// terminating the stream; only a scan failure is fatal.
pub fn sort<'a>(source: &'a BackendHandle, output: &'a BackendHandle) -> impl Stream<Item = Result<SortEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield Ok(SortEvent::Started);

        let items = match discover(source).await {
            Ok(items) => items,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
        yield Ok(SortEvent::DiscoveryComplete(u64::try_from(items.len()).unwrap_or(0)));

        let mut pending = items.into_iter().map(|item| sort_file(source, output, item));
        let mut processing = FuturesUnordered::new();
        processing.extend(pending.by_ref().take(MAX_PROCESS_CONCURRENCY));
        while let Some(result) = processing.next().await {
            yield result.map(SortEvent::Copied);
            // Each finished copy makes room for exactly one more.
            if let Some(next) = pending.next() {
                processing.push(next);
            }
        }

        yield Ok(SortEvent::Complete);
    })
}
