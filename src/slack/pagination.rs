/// Cursor pagination shared by the Slack list endpoints.
use std::future::Future;

use crate::error::ApiError;

/// Upper bound on pages fetched per call, in case a server keeps handing out cursors.
const MAX_PAGES: usize = 500;

/// One page of results plus the cursor for the next one.
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

/// Fetches pages until the cursor runs out.
///
/// `fetch_page` receives `None` for the first page and the previous page's
/// cursor afterwards. Any page error aborts the whole collection.
pub async fn collect_pages<T, F, Fut>(
    method: &'static str,
    fetch_page: F,
) -> Result<Vec<T>, ApiError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, ApiError>>,
{
    match collect_pages_partial(method, fetch_page).await {
        (items, None) => Ok(items),
        (_, Some(error)) => Err(error),
    }
}

/// Fetches pages until the cursor runs out or a page fails.
///
/// Items from the pages before the failure are kept; the error, if any, is
/// returned alongside them.
pub async fn collect_pages_partial<T, F, Fut>(
    method: &'static str,
    mut fetch_page: F,
) -> (Vec<T>, Option<ApiError>)
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, ApiError>>,
{
    let mut items = Vec::new();
    let mut cursor = None;

    for page_index in 0..MAX_PAGES {
        let page = match fetch_page(cursor.take()).await {
            Ok(page) => page,
            Err(error) => return (items, Some(error)),
        };
        tracing::debug!(method, page = page_index, items = page.items.len(), "Fetched page");
        items.extend(page.items);

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => return (items, None),
        }
    }

    tracing::warn!(method, "Stopped paginating after {} pages", MAX_PAGES);
    (items, None)
}
