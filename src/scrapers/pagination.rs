use crate::models::{IdSet, ListingId};
use anyhow::Result;
use tracing::{error, info};

/// One cursor over the listing index. Implemented by the headless browser
/// and by scripted drivers in tests.
pub trait PageDriver {
    /// Raw `attr1` values of the listing cards on the current page
    fn listing_ids(&mut self) -> Result<Vec<String>>;

    /// Advance to the next page. `Ok(false)` when there is none.
    fn next_page(&mut self) -> Result<bool>;
}

/// Highest page number advertised by the pagination menu, ignoring
/// non-numeric items such as "plus" and "minus"
pub fn last_page_number<I, S>(attrs: I) -> Option<u32>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    attrs
        .into_iter()
        .filter_map(|attr| {
            let attr = attr.as_ref();
            if !attr.is_empty() && attr.chars().all(|c| c.is_ascii_digit()) {
                attr.parse().ok()
            } else {
                None
            }
        })
        .max()
}

/// The tighter of the advertised last page and the configured ceiling
pub fn page_limit(advertised: Option<u32>, ceiling: Option<u32>) -> Option<u32> {
    match (advertised, ceiling) {
        (Some(a), Some(c)) => Some(a.min(c)),
        (a, c) => a.or(c),
    }
}

/// Walk the index, collecting every listing ID seen.
///
/// A page whose cards cannot be read is logged and counted as empty. The
/// walk ends when the page limit is reached, when there is no next page, or
/// when the next control cannot be used.
pub fn collect_listing_ids<D: PageDriver>(driver: &mut D, limit: Option<u32>) -> IdSet {
    let mut ids = IdSet::new();
    let mut pages = 0u32;

    loop {
        match driver.listing_ids() {
            Ok(found) => {
                ids.extend(
                    found
                        .into_iter()
                        .filter(|id| !id.trim().is_empty())
                        .map(ListingId::from),
                );
            }
            Err(e) => error!("An error occurred on page {}: {:#}", pages + 1, e),
        }
        pages += 1;
        info!("Collected {} pages so far...", pages);

        if limit.is_some_and(|max| pages >= max) {
            info!("Reached page limit of {}", pages);
            break;
        }

        match driver.next_page() {
            Ok(true) => info!("Moving to the next page..."),
            Ok(false) => {
                info!("No more pages. Scraping complete.");
                break;
            }
            Err(e) => {
                info!("No more pages or error with Next button ({:#}). Scraping complete.", e);
                break;
            }
        }
    }

    info!("Total Number of {} IDs are Found", ids.len());
    ids
}
