//! Lazy pagination over token-based listings

use futures::stream::{self, Stream, TryStreamExt};
use std::future::Future;

use crate::client::Page;
use crate::error::{AwsError, Result};

/// Turn a page fetcher into a lazy stream of items.
///
/// `fetch` receives the continuation token (`None` for the first page). Pages
/// are requested only as the stream is polled, and calling `paginate` again
/// starts over from the first page.
pub fn paginate<'a, T, F, Fut>(mut fetch: F) -> impl Stream<Item = Result<T>> + 'a
where
    T: 'a,
    F: FnMut(Option<String>) -> Fut + 'a,
    Fut: Future<Output = Result<Page<T>>> + 'a,
{
    // None: exhausted, Some(token): fetch the page after `token`
    let start: Option<Option<String>> = Some(None);

    stream::try_unfold(start, move |state| {
        let next = state.map(&mut fetch);
        async move {
            let Some(page) = next else {
                return Ok::<_, AwsError>(None);
            };
            let page = page.await?;
            Ok(Some((page.items, page.next_token.map(Some))))
        }
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok)))
    .try_flatten()
}
