//! Sequential batching of bulk writes

use indexmap::IndexMap;
use std::future::Future;
use tracing::debug;

use crate::error::ApiFailure;

/// Send `items` in consecutive groups of at most `batch_size`, one after another
///
/// Each group's per-key results are merged into one map in input order. The first
/// failing group aborts the whole write; groups already sent stay written.
pub async fn write_in_batches<T, F, Fut>(
    items: Vec<T>,
    batch_size: usize,
    mut send_batch: F,
) -> Result<IndexMap<String, String>, ApiFailure>
where
    F: FnMut(Vec<T>) -> Fut,
    Fut: Future<Output = Result<Vec<(String, String)>, ApiFailure>>,
{
    let batch_size = batch_size.max(1);
    let total = items.len();
    let batch_count = total.div_ceil(batch_size);
    let mut results = IndexMap::with_capacity(total);
    let mut remaining = items.into_iter().peekable();
    let mut batch_number = 0usize;

    while remaining.peek().is_some() {
        batch_number += 1;
        let batch: Vec<T> = remaining.by_ref().take(batch_size).collect();
        debug!(
            "Writing batch {}/{} with {} items",
            batch_number,
            batch_count,
            batch.len()
        );

        let written = send_batch(batch).await?;
        results.extend(written);
    }

    Ok(results)
}
