// aurora-backup/src/backup/locator.rs
use std::future::Future;

use tracing::debug;

use crate::errors::{BackupError, Result};
use crate::provider::{Identified, Page};

/// Walks a paginated listing and returns the first item whose identifier
/// starts with `prefix`, stopping as soon as it is found.
///
/// # Arguments
/// * `resource` - Human-readable resource name, used in the `NotFound` error.
/// * `prefix` - Literal identifier prefix (no glob or regex semantics).
/// * `list_page` - Fetches the page after `marker` (`None` for the first page).
pub async fn find_first<T, F, Fut>(resource: &'static str, prefix: &str, mut list_page: F) -> Result<T>
where
    T: Identified,
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut marker = None;
    loop {
        let page = list_page(marker).await?;
        if let Some(found) = page
            .items
            .into_iter()
            .find(|item| item.identifier().starts_with(prefix))
        {
            return Ok(found);
        }
        match page.next_marker {
            Some(next) => marker = Some(next),
            None => break,
        }
    }

    Err(BackupError::NotFound {
        resource,
        prefix: prefix.to_string(),
    })
}

/// Collects every item across all pages whose identifier starts with `prefix`.
/// Zero matches is an empty vector, not an error. Order follows the listing.
pub async fn find_all<T, F, Fut>(prefix: &str, mut list_page: F) -> Result<Vec<T>>
where
    T: Identified,
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut matches = Vec::new();
    let mut marker = None;
    let mut pages = 0usize;
    loop {
        let page = list_page(marker).await?;
        pages += 1;
        matches.extend(
            page.items
                .into_iter()
                .filter(|item| item.identifier().starts_with(prefix)),
        );
        match page.next_marker {
            Some(next) => marker = Some(next),
            None => break,
        }
    }

    debug!(prefix, pages, matches = matches.len(), "Prefix lookup finished");
    Ok(matches)
}
