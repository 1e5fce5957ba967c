//! Lazy page walking for multi-page operations.

use std::future::Future;

use async_stream::try_stream;
use futures::Stream;
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::models::PageEnvelope;

/// Drive a paged operation as a lazy, forward-only item stream.
///
/// Pages are fetched strictly in increasing index order starting at 1,
/// each page's items are yielded in server order, and the walk ends when
/// the service reports no next page or returns no envelope at all. An
/// empty item list alone does not terminate the walk. Cancellation is
/// checked at every page boundary and surfaces as [`Error::Canceled`],
/// distinct from normal exhaustion. The stream is single-pass; once
/// consumed it cannot be restarted.
pub(crate) fn paged<T, F, Fut>(
    cancel: CancellationToken,
    mut fetch: F,
) -> impl Stream<Item = Result<T, Error>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Option<PageEnvelope<T>>, Error>>,
{
    try_stream! {
        let mut page = 1u32;
        loop {
            let fetched = if cancel.is_cancelled() {
                Err(Error::Canceled)
            } else {
                fetch(page).await
            };
            let envelope = match fetched? {
                Some(envelope) => envelope,
                None => break,
            };

            let has_next = envelope.has_next_page;
            for item in envelope.items {
                yield item;
            }
            if !has_next {
                break;
            }
            page += 1;
        }
    }
}
