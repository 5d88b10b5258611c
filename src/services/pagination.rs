//! Cursor pagination helper
//!
//! Walks a cursor-paged endpoint to completion and concatenates every page in
//! server order. Two cursor strategies are in use:
//! - Data listings continue from the key of the last item received
//! - File listings continue from the server's `next` link
//!
//! Termination relies on the server eventually reporting an empty `next` link;
//! there is no page cap.

use std::future::Future;
use tracing::debug;

use crate::error::ApiFailure;

/// One fetched page
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items on the page
    pub items: Vec<T>,
    /// Non-empty when more pages follow
    pub next: Option<String>,
}

impl<T> Page<T> {
    /// Page of `items`; an empty `next` is treated as absent
    pub fn new(items: Vec<T>, next: Option<&str>) -> Self {
        Self {
            items,
            next: next.filter(|n| !n.is_empty()).map(str::to_string),
        }
    }
}

/// How the cursor advances between pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStrategy {
    /// Continue after the last item's key
    LastItemKey,
    /// Continue from the server's next link
    NextLink,
}

/// Pagination helper for cursor-paged endpoints
pub struct PaginationHelper;

impl PaginationHelper {
    /// Fetch every page and concatenate the items
    ///
    /// # Arguments
    /// * `label` - Endpoint name for logs
    /// * `strategy` - How the cursor advances
    /// * `key_of` - Cursor key of an item, used by [`CursorStrategy::LastItemKey`]
    /// * `fetch_page` - Fetches the page after the given cursor
    ///
    /// With [`CursorStrategy::LastItemKey`] an empty page stops the walk, since
    /// there is no key to continue after.
    ///
    /// # Errors
    /// The first page failure aborts the walk; items already collected are dropped
    pub async fn paginate<T, K, F, Fut>(
        label: &str,
        strategy: CursorStrategy,
        key_of: K,
        mut fetch_page: F,
    ) -> Result<Vec<T>, ApiFailure>
    where
        K: Fn(&T) -> &str,
        F: FnMut(Option<String>) -> Fut,
        Fut: Future<Output = Result<Page<T>, ApiFailure>>,
    {
        let mut all_items = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_number = 0usize;

        loop {
            page_number += 1;
            debug!("Fetching {} page {} after {:?}", label, page_number, cursor);

            let page = fetch_page(cursor.clone()).await?;
            let received = page.items.len();

            let next_cursor = match strategy {
                CursorStrategy::LastItemKey => page.items.last().map(|item| key_of(item).to_string()),
                CursorStrategy::NextLink => page.next.clone(),
            };
            all_items.extend(page.items);

            debug!("Received {} items in {} page {}", received, label, page_number);

            if page.next.is_none() {
                break;
            }

            match next_cursor {
                Some(next) => cursor = Some(next),
                None => {
                    // an empty page leaves nothing to continue after
                    debug!(
                        "Empty {} page {} still reported more results, stopping",
                        label, page_number
                    );
                    break;
                }
            }
        }

        debug!(
            "Pagination of {} completed after {} pages. Total items: {}",
            label,
            page_number,
            all_items.len()
        );

        Ok(all_items)
    }
}
