use std::future::Future;

use futures::stream::{self, TryStreamExt};

use crate::provider::{CatalogError, Page};

pub const PLAYLIST_PAGE_SIZE: usize = 50;
pub const TRACK_PAGE_SIZE: usize = 100;

/// Walk a listing endpoint from offset 0 until the provider reports no further page.
///
/// `fetch_page` is called with `(limit, offset)`. Items are concatenated in the order
/// the pages and their items were returned. There is no cap on the total size.
pub async fn fetch_all<T, F, Fut>(page_size: usize, mut fetch_page: F) -> Result<Vec<T>, CatalogError>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<Page<T>, CatalogError>>,
{
    let page_size = page_size.max(1);

    stream::try_unfold(Some(0usize), move |offset| {
        let request = offset.map(|offset| (offset, fetch_page(page_size, offset)));
        async move {
            let Some((offset, request)) = request else {
                return Ok(None);
            };

            let page = request.await?;
            tracing::debug!(
                offset,
                items = page.items.len(),
                has_next = page.has_next,
                "fetched page"
            );

            if page.items.is_empty() && page.has_next {
                tracing::warn!(offset, "empty page reported a next page");
            }

            let next = page.has_next.then_some(offset + page_size);
            Ok(Some((page.items, next)))
        }
    })
    .try_concat()
    .await
}
